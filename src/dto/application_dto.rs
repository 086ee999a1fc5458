use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::application::{Application, ApplicationStatus, DocumentRef};
use crate::services::application_service::ApplicationList;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplicationStatusPayload {
    pub status: String,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_location: Option<String>,
    pub interview_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub resume_name: String,
    pub cover_letter: Option<String>,
    pub additional_documents: Vec<DocumentRef>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_location: Option<String>,
    pub interview_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            job_id: value.job_id,
            applicant_id: value.applicant_id,
            status: value.status,
            resume_url: value.resume_url,
            resume_name: value.resume_name,
            cover_letter: value.cover_letter,
            additional_documents: value.additional_documents.0,
            notes: value.notes,
            rejection_reason: value.rejection_reason,
            interview_date: value.interview_date,
            interview_location: value.interview_location,
            interview_notes: value.interview_notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationListResponse {
    pub applications: Vec<ApplicationResponse>,
    pub total_applications: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
    pub stats: ApplicationStatusStats,
}

impl ApplicationListResponse {
    pub fn from_list(list: ApplicationList, counts: &[(ApplicationStatus, i64)]) -> Self {
        Self {
            applications: list.items.into_iter().map(Into::into).collect(),
            total_applications: list.total,
            num_of_pages: list.num_of_pages,
            current_page: list.page,
            stats: ApplicationStatusStats::from_counts(counts),
        }
    }
}

/// Fixed-key template covering every status; absent categories stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationStatusStats {
    pub pending: i64,
    pub reviewed: i64,
    pub interview: i64,
    pub rejected: i64,
    pub accepted: i64,
}

impl ApplicationStatusStats {
    pub fn from_counts(counts: &[(ApplicationStatus, i64)]) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            match status {
                ApplicationStatus::Pending => stats.pending = *count,
                ApplicationStatus::Reviewed => stats.reviewed = *count,
                ApplicationStatus::Interview => stats.interview = *count,
                ApplicationStatus::Rejected => stats.rejected = *count,
                ApplicationStatus::Accepted => stats.accepted = *count,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_applications_still_yield_all_five_buckets() {
        let json = serde_json::to_value(ApplicationStatusStats::from_counts(&[])).unwrap();
        for key in ["pending", "reviewed", "interview", "rejected", "accepted"] {
            assert_eq!(json[key], 0, "missing zero bucket for {key}");
        }
    }

    #[test]
    fn observed_categories_overwrite_their_bucket_only() {
        let stats = ApplicationStatusStats::from_counts(&[
            (ApplicationStatus::Pending, 7),
            (ApplicationStatus::Accepted, 2),
        ]);
        assert_eq!(
            stats,
            ApplicationStatusStats {
                pending: 7,
                accepted: 2,
                ..Default::default()
            }
        );
    }
}
