use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::dto::job_dto::{CreateJobPayload, JobListQuery, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job::{ExperienceLevel, Job, JobStatus, JobType};

const JOB_COLUMNS: &str = "id, title, company, location, job_type, status, description, \
     requirements, responsibilities, salary_min, salary_max, salary_currency, experience, \
     skills, benefits, application_deadline, company_website, contact_email, featured, \
     created_by, created_at, updated_at";

#[derive(Clone)]
pub struct JobService {
    pool: PgPool,
}

pub struct JobList {
    pub items: Vec<Job>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub num_of_pages: i64,
}

fn sort_clause(sort: Option<&str>) -> &'static str {
    match sort {
        Some("oldest") => "created_at ASC",
        Some("a-z") => "title ASC",
        Some("z-a") => "title DESC",
        _ => "created_at DESC",
    }
}

/// Filter params arrive as strings; `all` (or absence) means no filter and
/// anything outside the enum is rejected at the boundary.
pub(crate) fn parse_filter<T>(raw: Option<&str>, what: &str) -> Result<Option<T>>
where
    T: FromStr,
{
    match raw {
        None => Ok(None),
        Some("all") => Ok(None),
        Some(value) => T::from_str(value)
            .map(Some)
            .map_err(|_| Error::BadRequest(format!("Please provide a valid {}", what))),
    }
}

impl JobService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, created_by: Uuid, payload: CreateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (
                title, company, location, job_type, status, description, requirements,
                responsibilities, salary_min, salary_max, salary_currency, experience,
                skills, benefits, application_deadline, company_website, contact_email,
                featured, created_by
            ) VALUES (
                $1,$2,$3,$4,$5,$6,$7,
                $8,$9,$10,$11,$12,
                $13,$14,$15,$16,$17,
                $18,$19
            )
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(payload.title.trim())
        .bind(payload.company.trim())
        .bind(payload.location.trim())
        .bind(payload.job_type.unwrap_or(JobType::FullTime))
        .bind(payload.status.unwrap_or(JobStatus::Open))
        .bind(payload.description.trim())
        .bind(payload.requirements.trim())
        .bind(payload.responsibilities)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.salary_currency.unwrap_or_else(|| "USD".to_string()))
        .bind(payload.experience.unwrap_or(ExperienceLevel::MidLevel))
        .bind(payload.skills)
        .bind(payload.benefits)
        .bind(payload.application_deadline)
        .bind(payload.company_website)
        .bind(payload.contact_email)
        .bind(payload.featured)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateJobPayload) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET
                title = COALESCE($2, title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                job_type = COALESCE($5, job_type),
                status = COALESCE($6, status),
                description = COALESCE($7, description),
                requirements = COALESCE($8, requirements),
                responsibilities = COALESCE($9, responsibilities),
                salary_min = COALESCE($10, salary_min),
                salary_max = COALESCE($11, salary_max),
                salary_currency = COALESCE($12, salary_currency),
                experience = COALESCE($13, experience),
                skills = COALESCE($14, skills),
                benefits = COALESCE($15, benefits),
                application_deadline = COALESCE($16, application_deadline),
                company_website = COALESCE($17, company_website),
                contact_email = COALESCE($18, contact_email),
                featured = COALESCE($19, featured),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.title)
        .bind(payload.company)
        .bind(payload.location)
        .bind(payload.job_type)
        .bind(payload.status)
        .bind(payload.description)
        .bind(payload.requirements)
        .bind(payload.responsibilities)
        .bind(payload.salary_min)
        .bind(payload.salary_max)
        .bind(payload.salary_currency)
        .bind(payload.experience)
        .bind(payload.skills)
        .bind(payload.benefits)
        .bind(payload.application_deadline)
        .bind(payload.company_website)
        .bind(payload.contact_email)
        .bind(payload.featured)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn update_status(&self, id: Uuid, status: JobStatus) -> Result<Job> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(job)
    }

    pub async fn list(&self, query: JobListQuery, created_by: Option<Uuid>) -> Result<JobList> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let status = parse_filter::<JobStatus>(query.status.as_deref(), "status")?;
        let job_type = parse_filter::<JobType>(query.job_type.as_deref(), "job type")?;
        let experience =
            parse_filter::<ExperienceLevel>(query.experience.as_deref(), "experience level")?;

        let mut filters = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(created_by) = created_by {
            filters.push(format!("created_by = ${}::uuid", args.len() + 1));
            args.push(created_by.to_string());
        }
        if let Some(search) = query.search {
            let pattern = format!("%{}%", search);
            let first = args.len() + 1;
            filters.push(format!(
                "(title ILIKE ${} OR company ILIKE ${} OR description ILIKE ${} OR requirements ILIKE ${})",
                first,
                first + 1,
                first + 2,
                first + 3
            ));
            for _ in 0..4 {
                args.push(pattern.clone());
            }
        }
        if let Some(status) = status {
            filters.push(format!("status::text = ${}", args.len() + 1));
            args.push(status.as_str().to_string());
        }
        if let Some(job_type) = job_type {
            filters.push(format!("job_type::text = ${}", args.len() + 1));
            args.push(job_type.as_str().to_string());
        }
        if let Some(experience) = experience {
            filters.push(format!("experience::text = ${}", args.len() + 1));
            args.push(experience.as_str().to_string());
        }
        if let Some(location) = query.location {
            filters.push(format!("location ILIKE ${}", args.len() + 1));
            args.push(format!("%{}%", location));
        }
        if query.featured == Some(true) {
            filters.push("featured = TRUE".to_string());
        }

        let where_clause = if filters.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let items_query = format!(
            "SELECT {JOB_COLUMNS} FROM jobs {} ORDER BY {} LIMIT ${} OFFSET ${}",
            where_clause,
            sort_clause(query.sort.as_deref()),
            args.len() + 1,
            args.len() + 2
        );
        let total_query = format!("SELECT COUNT(*) FROM jobs {}", where_clause);

        let mut items_statement = sqlx::query_as::<_, Job>(&items_query);
        for value in &args {
            items_statement = items_statement.bind(value);
        }
        items_statement = items_statement.bind(limit).bind(offset);
        let items = items_statement.fetch_all(&self.pool).await?;

        let mut total_statement = sqlx::query_scalar::<_, i64>(&total_query);
        for value in &args {
            total_statement = total_statement.bind(value);
        }
        let total = total_statement.fetch_one(&self.pool).await?;

        let num_of_pages = ((total as f64) / (limit as f64)).ceil() as i64;

        Ok(JobList {
            items,
            total,
            page,
            limit,
            num_of_pages,
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Job>> {
        let job =
            sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(job)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn status_counts(&self, created_by: Uuid) -> Result<Vec<(JobStatus, i64)>> {
        let counts = sqlx::query_as::<_, (JobStatus, i64)>(
            "SELECT status, COUNT(*) FROM jobs WHERE created_by = $1 GROUP BY status",
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    pub async fn type_counts(&self, created_by: Uuid) -> Result<Vec<(JobType, i64)>> {
        let counts = sqlx::query_as::<_, (JobType, i64)>(
            "SELECT job_type, COUNT(*) FROM jobs WHERE created_by = $1 GROUP BY job_type",
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sorts_fall_back_to_latest() {
        assert_eq!(sort_clause(None), "created_at DESC");
        assert_eq!(sort_clause(Some("latest")), "created_at DESC");
        assert_eq!(sort_clause(Some("oldest")), "created_at ASC");
        assert_eq!(sort_clause(Some("a-z")), "title ASC");
        assert_eq!(sort_clause(Some("z-a")), "title DESC");
        assert_eq!(sort_clause(Some("bogus")), "created_at DESC");
    }

    #[test]
    fn all_and_absent_filters_are_no_ops() {
        assert_eq!(parse_filter::<JobStatus>(None, "status").unwrap(), None);
        assert_eq!(
            parse_filter::<JobStatus>(Some("all"), "status").unwrap(),
            None
        );
        assert_eq!(
            parse_filter::<JobStatus>(Some("open"), "status").unwrap(),
            Some(JobStatus::Open)
        );
    }

    #[test]
    fn invalid_filter_values_are_rejected() {
        let err = parse_filter::<JobStatus>(Some("paused"), "status").unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg == "Please provide a valid status"));
    }
}
