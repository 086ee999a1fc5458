use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::auth_dto::RegisterPayload;
use crate::dto::user_dto::{UpdateProfilePayload, UserListQuery};
use crate::error::{Error, Result};
use crate::models::user::{Role, SocialLinks, User};
use crate::services::job_service::parse_filter;
use crate::utils::crypto;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, location, bio, skills, \
     resume_url, resume_public_id, profile_image, profile_image_public_id, phone_number, \
     social_links, company, job_title, password_reset_token, password_reset_expires, \
     created_at, updated_at";

// Serializes the first-account bootstrap so two concurrent first
// registrations cannot both observe an empty table.
const REGISTRATION_LOCK_KEY: i64 = 0x4a6f_6269;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

pub struct UserList {
    pub items: Vec<User>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub num_of_pages: i64,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a user. The first account ever created is promoted to
    /// admin; everyone else gets the requested role, defaulting to
    /// job-seeker.
    pub async fn register(&self, payload: RegisterPayload) -> Result<User> {
        let email = payload.email.trim().to_lowercase();
        let password_hash = crypto::hash_password(&payload.password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let email_taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
        if email_taken.is_some() {
            return Err(Error::BadRequest("Email already exists".to_string()));
        }

        let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let role = if user_count == 0 {
            Role::Admin
        } else {
            payload.role.unwrap_or(Role::JobSeeker)
        };

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(payload.name.trim())
        .bind(&email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn update_profile(&self, id: Uuid, payload: UpdateProfilePayload) -> Result<User> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        let existing_links = user.social_links.map(|links| links.0).unwrap_or_default();
        let social_links = match payload.social_links {
            Some(incoming) => SocialLinks {
                linkedin: incoming.linkedin.or(existing_links.linkedin),
                github: incoming.github.or(existing_links.github),
                twitter: incoming.twitter.or(existing_links.twitter),
                portfolio: incoming.portfolio.or(existing_links.portfolio),
            },
            None => existing_links,
        };

        let updated = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2,
                location = $3,
                bio = $4,
                skills = $5,
                phone_number = $6,
                company = $7,
                job_title = $8,
                social_links = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name.unwrap_or(user.name))
        .bind(payload.location.unwrap_or(user.location))
        .bind(payload.bio.or(user.bio))
        .bind(payload.skills.unwrap_or(user.skills))
        .bind(payload.phone_number.or(user.phone_number))
        .bind(payload.company.or(user.company))
        .bind(payload.job_title.or(user.job_title))
        .bind(sqlx::types::Json(social_links))
        .fetch_one(&self.pool)
        .await?;

        Ok(updated)
    }

    pub async fn update_password(&self, id: Uuid, password: &str) -> Result<()> {
        let password_hash = crypto::hash_password(password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_reset_token(
        &self,
        id: Uuid,
        token_digest: &str,
        expires: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"UPDATE users
               SET password_reset_token = $2, password_reset_expires = $3, updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(token_digest)
        .bind(expires)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_valid_reset_token(&self, token_digest: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users
               WHERE password_reset_token = $1 AND password_reset_expires > NOW()"#
        ))
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Consumes a reset: sets the new password and clears the token.
    pub async fn reset_password(&self, id: Uuid, password: &str) -> Result<()> {
        let password_hash = crypto::hash_password(password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;
        sqlx::query(
            r#"UPDATE users
               SET password_hash = $2,
                   password_reset_token = NULL,
                   password_reset_expires = NULL,
                   updated_at = NOW()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_profile_image(
        &self,
        id: Uuid,
        url: &str,
        public_id: &str,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET profile_image = $2, profile_image_public_id = $3, updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(url)
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn update_resume(&self, id: Uuid, url: &str, public_id: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"UPDATE users
               SET resume_url = $2, resume_public_id = $3, updated_at = NOW()
               WHERE id = $1
               RETURNING {USER_COLUMNS}"#
        ))
        .bind(id)
        .bind(url)
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn list(&self, query: UserListQuery) -> Result<UserList> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let role = parse_filter::<Role>(query.role.as_deref(), "role")?;

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(role) = role {
            filters.push(format!("role::text = ${}", args.len() + 1));
            args.push(role.as_str().to_string());
        }
        if let Some(search) = query.search {
            let pattern = format!("%{}%", search);
            let first = args.len() + 1;
            filters.push(format!(
                "(name ILIKE ${} OR email ILIKE ${} OR company ILIKE ${})",
                first,
                first + 1,
                first + 2
            ));
            for _ in 0..3 {
                args.push(pattern.clone());
            }
        }

        let where_clause = if filters.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let order = match query.sort.as_deref() {
            Some("oldest") => "created_at ASC",
            Some("a-z") => "name ASC",
            Some("z-a") => "name DESC",
            _ => "created_at DESC",
        };

        let items_query = format!(
            "SELECT {USER_COLUMNS} FROM users {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            order,
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM users {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, User>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        let items = items_statement
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let num_of_pages = ((total as f64) / (limit as f64)).ceil() as i64;

        Ok(UserList {
            items,
            total,
            page,
            limit,
            num_of_pages,
        })
    }

    pub async fn role_counts(&self) -> Result<Vec<(Role, i64)>> {
        let counts =
            sqlx::query_as::<_, (Role, i64)>("SELECT role, COUNT(*) FROM users GROUP BY role")
                .fetch_all(&self.pool)
                .await?;
        Ok(counts)
    }

    pub async fn update_role(&self, id: Uuid, role: Role) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
