use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;

/// Transactional email outbox. Rows are written alongside the operation that
/// triggers them and drained by the background worker; delivery failures are
/// recorded on the row and never surface to the triggering request.
#[derive(Clone)]
pub struct NotificationService {
    pool: PgPool,
}

#[derive(Debug, Clone, FromRow)]
struct OutboxEmail {
    id: Uuid,
    recipient: String,
    subject: String,
    body: String,
    attempts: i32,
    max_attempts: i32,
}

impl NotificationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enqueue(&self, recipient: &str, subject: &str, body: &str) -> Result<()> {
        sqlx::query("INSERT INTO email_outbox (recipient, subject, body) VALUES ($1, $2, $3)")
            .bind(recipient)
            .bind(subject)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Claims and attempts one pending email. Returns whether a row was
    /// processed so the worker loop knows when to idle.
    pub async fn run_once(&self) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OutboxEmail>(
            r#"SELECT id, recipient, subject, body, attempts, max_attempts
               FROM email_outbox
               WHERE status = 'pending'
               ORDER BY created_at ASC
               FOR UPDATE SKIP LOCKED
               LIMIT 1"#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(email) = row else {
            tx.commit().await?;
            return Ok(false);
        };

        match deliver(email.clone()).await {
            Ok(()) => {
                sqlx::query(
                    r#"UPDATE email_outbox
                       SET status = 'sent', attempts = attempts + 1, last_error = NULL, updated_at = NOW()
                       WHERE id = $1"#,
                )
                .bind(email.id)
                .execute(&mut *tx)
                .await?;
            }
            Err(reason) => {
                tracing::warn!(recipient = %email.recipient, error = %reason, "email delivery failed");
                let exhausted = email.attempts + 1 >= email.max_attempts;
                sqlx::query(
                    r#"UPDATE email_outbox
                       SET status = CASE WHEN $2 THEN 'failed' ELSE 'pending' END,
                           attempts = attempts + 1,
                           last_error = $3,
                           updated_at = NOW()
                       WHERE id = $1"#,
                )
                .bind(email.id)
                .bind(exhausted)
                .bind(reason)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(true)
    }
}

async fn deliver(email: OutboxEmail) -> std::result::Result<(), String> {
    let config = crate::config::get_config();
    let from = format!("Jobify <{}>", config.from_email)
        .parse()
        .map_err(|e| format!("invalid sender address: {}", e))?;
    let to = email
        .recipient
        .parse()
        .map_err(|e| format!("invalid recipient address: {}", e))?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject)
        .header(ContentType::TEXT_HTML)
        .body(email.body)
        .map_err(|e| format!("failed to build message: {}", e))?;

    let host = config.smtp_host.clone();
    let port = config.smtp_port;
    let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());

    // SMTP transport is blocking; keep it off the request runtime.
    tokio::task::spawn_blocking(move || {
        let mailer = SmtpTransport::relay(&host)
            .map_err(|e| format!("smtp transport error: {}", e))?
            .port(port)
            .credentials(creds)
            .build();
        mailer
            .send(&message)
            .map(|_| ())
            .map_err(|e| format!("smtp send error: {}", e))
    })
    .await
    .map_err(|e| format!("delivery task panicked: {}", e))?
}

/// Enqueue helper that downgrades failures to a log line. Registration,
/// password reset and application submission all use this: the primary
/// operation never fails because the outbox write did.
pub async fn enqueue_best_effort(
    notifications: &NotificationService,
    recipient: &str,
    content: &crate::services::email_templates::EmailContent,
) {
    if let Err(err) = notifications
        .enqueue(recipient, &content.subject, &content.body)
        .await
    {
        tracing::warn!(recipient = %recipient, error = %err, "failed to enqueue email");
    }
}
