use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::application_dto::{ApplicationListQuery, UpdateApplicationStatusPayload};
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, DocumentRef};
use crate::services::job_service::parse_filter;
use crate::services::media_service::{MediaService, StoredFile};

const APPLICATION_COLUMNS: &str = "id, job_id, applicant_id, status, resume_url, resume_name, \
     resume_public_id, cover_letter, additional_documents, notes, rejection_reason, \
     interview_date, interview_location, interview_notes, created_at, updated_at";

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

pub struct ApplicationList {
    pub items: Vec<Application>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub num_of_pages: i64,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn exists(&self, job_id: Uuid, applicant_id: Uuid) -> Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM applications WHERE job_id = $1 AND applicant_id = $2",
        )
        .bind(job_id)
        .bind(applicant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Inserts the application with its initial `pending` status. A duplicate
    /// (job, applicant) pair that slips past the pre-check is stopped by the
    /// unique index and surfaced as the same conflict.
    pub async fn create(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        cover_letter: Option<String>,
        resume: &StoredFile,
    ) -> Result<Application> {
        let result = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (job_id, applicant_id, resume_url, resume_name, resume_public_id, cover_letter)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(job_id)
        .bind(applicant_id)
        .bind(&resume.url)
        .bind(&resume.name)
        .bind(&resume.public_id)
        .bind(cover_letter)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|err| match Error::from(err) {
            Error::Conflict(_) => {
                Error::Conflict("You have already applied for this job".to_string())
            }
            other => other,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    pub async fn list_for_job(
        &self,
        job_id: Uuid,
        query: ApplicationListQuery,
    ) -> Result<ApplicationList> {
        self.list_scoped("job_id", job_id, query).await
    }

    pub async fn list_for_applicant(
        &self,
        applicant_id: Uuid,
        query: ApplicationListQuery,
    ) -> Result<ApplicationList> {
        self.list_scoped("applicant_id", applicant_id, query).await
    }

    async fn list_scoped(
        &self,
        scope_column: &str,
        scope_id: Uuid,
        query: ApplicationListQuery,
    ) -> Result<ApplicationList> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let status = parse_filter::<ApplicationStatus>(query.status.as_deref(), "status")?;

        let order = match query.sort.as_deref() {
            Some("oldest") => "created_at ASC",
            _ => "created_at DESC",
        };

        let (status_clause, bind_status) = match status {
            Some(status) => (" AND status::text = $2", Some(status.as_str())),
            None => ("", None),
        };

        let items_query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE {scope_column} = $1{status_clause} \
             ORDER BY {order} LIMIT ${} OFFSET ${}",
            if bind_status.is_some() { 3 } else { 2 },
            if bind_status.is_some() { 4 } else { 3 },
        );
        let total_query = format!(
            "SELECT COUNT(*) FROM applications WHERE {scope_column} = $1{status_clause}"
        );

        let mut items_statement = sqlx::query_as::<_, Application>(&items_query).bind(scope_id);
        if let Some(status) = bind_status {
            items_statement = items_statement.bind(status);
        }
        let items = items_statement
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query).bind(scope_id);
        if let Some(status) = bind_status {
            total_statement = total_statement.bind(status);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let num_of_pages = ((total as f64) / (limit as f64)).ceil() as i64;

        Ok(ApplicationList {
            items,
            total,
            page,
            limit,
            num_of_pages,
        })
    }

    pub async fn status_counts_for_job(
        &self,
        job_id: Uuid,
    ) -> Result<Vec<(ApplicationStatus, i64)>> {
        let counts = sqlx::query_as::<_, (ApplicationStatus, i64)>(
            "SELECT status, COUNT(*) FROM applications WHERE job_id = $1 GROUP BY status",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn status_counts_for_applicant(
        &self,
        applicant_id: Uuid,
    ) -> Result<Vec<(ApplicationStatus, i64)>> {
        let counts = sqlx::query_as::<_, (ApplicationStatus, i64)>(
            "SELECT status, COUNT(*) FROM applications WHERE applicant_id = $1 GROUP BY status",
        )
        .bind(applicant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Applies a status transition. Annex fields follow the target state:
    /// they are taken from the payload when entering their state, kept when
    /// staying in it, and cleared when leaving it.
    pub async fn update_status(
        &self,
        application: &Application,
        target: ApplicationStatus,
        payload: &UpdateApplicationStatusPayload,
    ) -> Result<Application> {
        if !application.status.can_transition_to(target) {
            return Err(Error::BadRequest(format!(
                "Cannot change application status from {} to {}",
                application.status.as_str(),
                target.as_str()
            )));
        }

        let rejection_reason = if target == ApplicationStatus::Rejected {
            payload
                .rejection_reason
                .clone()
                .or_else(|| application.rejection_reason.clone())
        } else {
            None
        };

        let (interview_date, interview_location, interview_notes) =
            if target == ApplicationStatus::Interview {
                (
                    payload.interview_date.or(application.interview_date),
                    payload
                        .interview_location
                        .clone()
                        .or_else(|| application.interview_location.clone()),
                    payload
                        .interview_notes
                        .clone()
                        .or_else(|| application.interview_notes.clone()),
                )
            } else {
                (None, None, None)
            };

        let notes = payload.notes.clone().or_else(|| application.notes.clone());

        let updated = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $2,
                notes = $3,
                rejection_reason = $4,
                interview_date = $5,
                interview_location = $6,
                interview_notes = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#
        ))
        .bind(application.id)
        .bind(target)
        .bind(notes)
        .bind(rejection_reason)
        .bind(interview_date)
        .bind(interview_location)
        .bind(interview_notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Removes the application after a best-effort release of every stored
    /// file attached to it. Cleanup failures are logged and never block the
    /// delete.
    pub async fn delete(&self, media: &MediaService, application: &Application) -> Result<()> {
        for handle in application.file_handles() {
            if let Err(err) = media.delete(&handle).await {
                tracing::warn!(handle = %handle, error = %err, "failed to release stored file");
            }
        }

        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(application.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// File handles of every application attached to a job; used before a job
    /// delete cascades.
    pub async fn file_handles_for_job(&self, job_id: Uuid) -> Result<Vec<String>> {
        let rows: Vec<(Option<String>, sqlx::types::Json<Vec<DocumentRef>>)> = sqlx::query_as(
            "SELECT resume_public_id, additional_documents FROM applications WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .flat_map(|(resume, documents)| {
                resume
                    .into_iter()
                    .chain(documents.0.into_iter().filter_map(|doc| doc.public_id))
            })
            .collect())
    }
}
