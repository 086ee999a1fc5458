use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::job::{ExperienceLevel, Job, JobStatus, JobType};
use crate::services::job_service::JobList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[validate(length(min = 1, max = 100, message = "please provide a job title"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "please provide a company name"))]
    pub company: String,
    #[validate(length(min = 1, max = 100, message = "please provide a job location"))]
    pub location: String,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
    #[validate(length(min = 1, message = "please provide a job description"))]
    pub description: String,
    #[validate(length(min = 1, message = "please provide job requirements"))]
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub experience: Option<ExperienceLevel>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub company_website: Option<String>,
    #[validate(email(message = "please provide a valid contact email"))]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(min = 1, max = 100, message = "please provide a job title"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "please provide a company name"))]
    pub company: Option<String>,
    #[validate(length(min = 1, max = 100, message = "please provide a job location"))]
    pub location: Option<String>,
    pub job_type: Option<JobType>,
    pub status: Option<JobStatus>,
    #[validate(length(min = 1, message = "please provide a job description"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "please provide job requirements"))]
    pub requirements: Option<String>,
    pub responsibilities: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: Option<String>,
    pub experience: Option<ExperienceLevel>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub company_website: Option<String>,
    #[validate(email(message = "please provide a valid contact email"))]
    pub contact_email: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobStatusPayload {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct JobListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    pub job_type: Option<String>,
    pub experience: Option<String>,
    pub location: Option<String>,
    pub featured: Option<bool>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub description: String,
    pub requirements: String,
    pub responsibilities: Option<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub salary_currency: String,
    pub experience: ExperienceLevel,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub application_deadline: Option<DateTime<Utc>>,
    pub company_website: Option<String>,
    pub contact_email: Option<String>,
    pub featured: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Job> for JobResponse {
    fn from(value: Job) -> Self {
        Self {
            id: value.id,
            title: value.title,
            company: value.company,
            location: value.location,
            job_type: value.job_type,
            status: value.status,
            description: value.description,
            requirements: value.requirements,
            responsibilities: value.responsibilities,
            salary_min: value.salary_min,
            salary_max: value.salary_max,
            salary_currency: value.salary_currency,
            experience: value.experience,
            skills: value.skills,
            benefits: value.benefits,
            application_deadline: value.application_deadline,
            company_website: value.company_website,
            contact_email: value.contact_email,
            featured: value.featured,
            created_by: value.created_by,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub total_jobs: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
}

impl From<JobList> for JobListResponse {
    fn from(value: JobList) -> Self {
        Self {
            jobs: value.items.into_iter().map(Into::into).collect(),
            total_jobs: value.total,
            num_of_pages: value.num_of_pages,
            current_page: value.page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyJobsResponse {
    pub jobs: Vec<JobResponse>,
    pub total_jobs: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
    pub stats: JobStatusStats,
}

/// Status buckets are always fully populated so consumers never null-check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusStats {
    pub open: i64,
    pub interview: i64,
    pub closed: i64,
}

impl JobStatusStats {
    pub fn from_counts(counts: &[(JobStatus, i64)]) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            match status {
                JobStatus::Open => stats.open = *count,
                JobStatus::Interview => stats.interview = *count,
                JobStatus::Closed => stats.closed = *count,
            }
        }
        stats
    }

    pub fn total(&self) -> i64 {
        self.open + self.interview + self.closed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTypeStats {
    #[serde(rename = "full-time")]
    pub full_time: i64,
    #[serde(rename = "part-time")]
    pub part_time: i64,
    pub remote: i64,
    pub internship: i64,
    pub contract: i64,
}

impl JobTypeStats {
    pub fn from_counts(counts: &[(JobType, i64)]) -> Self {
        let mut stats = Self::default();
        for (job_type, count) in counts {
            match job_type {
                JobType::FullTime => stats.full_time = *count,
                JobType::PartTime => stats.part_time = *count,
                JobType::Remote => stats.remote = *count,
                JobType::Internship => stats.internship = *count,
                JobType::Contract => stats.contract = *count,
            }
        }
        stats
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatsResponse {
    pub status_stats: JobStatusStats,
    pub type_stats: JobTypeStats,
    pub total_jobs: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_counts_zero_fill_every_bucket() {
        let status = JobStatusStats::from_counts(&[]);
        assert_eq!(status, JobStatusStats::default());
        assert_eq!(status.total(), 0);

        let types = JobTypeStats::from_counts(&[]);
        let json = serde_json::to_value(&types).unwrap();
        for key in ["full-time", "part-time", "remote", "internship", "contract"] {
            assert_eq!(json[key], 0, "missing zero bucket for {key}");
        }
    }

    #[test]
    fn observed_counts_merge_into_the_template() {
        let stats = JobStatusStats::from_counts(&[(JobStatus::Open, 4), (JobStatus::Closed, 1)]);
        assert_eq!(stats.open, 4);
        assert_eq!(stats.interview, 0);
        assert_eq!(stats.closed, 1);
        assert_eq!(stats.total(), 5);
    }
}
