use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "application_status", rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Interview,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }

    /// Moves a recruiter may make from each state. Backward moves that undo a
    /// mistake stay legal; `accepted` is terminal. Re-setting the current
    /// status is always allowed so annex fields can be updated in place.
    pub fn allowed_targets(&self) -> &'static [ApplicationStatus] {
        match self {
            ApplicationStatus::Pending => &[
                ApplicationStatus::Reviewed,
                ApplicationStatus::Interview,
                ApplicationStatus::Rejected,
            ],
            ApplicationStatus::Reviewed => &[
                ApplicationStatus::Pending,
                ApplicationStatus::Interview,
                ApplicationStatus::Rejected,
                ApplicationStatus::Accepted,
            ],
            ApplicationStatus::Interview => &[
                ApplicationStatus::Reviewed,
                ApplicationStatus::Accepted,
                ApplicationStatus::Rejected,
            ],
            ApplicationStatus::Rejected => &[ApplicationStatus::Reviewed],
            ApplicationStatus::Accepted => &[],
        }
    }

    pub fn can_transition_to(&self, target: ApplicationStatus) -> bool {
        *self == target || self.allowed_targets().contains(&target)
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "interview" => Ok(ApplicationStatus::Interview),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "accepted" => Ok(ApplicationStatus::Accepted),
            other => Err(format!("invalid application status: {}", other)),
        }
    }
}

/// Reference to an externally stored document: public URL plus the opaque
/// handle the media store needs to release it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub url: String,
    pub name: String,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub resume_url: String,
    pub resume_name: String,
    pub resume_public_id: Option<String>,
    pub cover_letter: Option<String>,
    pub additional_documents: sqlx::types::Json<Vec<DocumentRef>>,
    pub notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub interview_location: Option<String>,
    pub interview_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Every stored file handle attached to this application.
    pub fn file_handles(&self) -> Vec<String> {
        self.resume_public_id
            .iter()
            .cloned()
            .chain(
                self.additional_documents
                    .0
                    .iter()
                    .filter_map(|doc| doc.public_id.clone()),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ApplicationStatus::*;
    use super::*;

    #[test]
    fn pending_moves_forward_but_not_straight_to_accepted() {
        assert!(Pending.can_transition_to(Reviewed));
        assert!(Pending.can_transition_to(Interview));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Accepted));
    }

    #[test]
    fn corrections_move_backward() {
        assert!(Reviewed.can_transition_to(Pending));
        assert!(Interview.can_transition_to(Reviewed));
        assert!(Rejected.can_transition_to(Reviewed));
    }

    #[test]
    fn accepted_is_terminal() {
        for target in [Pending, Reviewed, Interview, Rejected] {
            assert!(!Accepted.can_transition_to(target));
        }
    }

    #[test]
    fn same_status_is_always_allowed() {
        for status in ApplicationStatus::ALL {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn rejected_cannot_jump_to_accepted() {
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Rejected.can_transition_to(Interview));
    }

    #[test]
    fn file_handles_collects_resume_and_documents() {
        let app = Application {
            id: Uuid::new_v4(),
            job_id: Uuid::new_v4(),
            applicant_id: Uuid::new_v4(),
            status: Pending,
            resume_url: "/uploads/resumes/a.pdf".into(),
            resume_name: "a.pdf".into(),
            resume_public_id: Some("resumes/a.pdf".into()),
            cover_letter: None,
            additional_documents: sqlx::types::Json(vec![
                DocumentRef {
                    url: "/uploads/documents/b.pdf".into(),
                    name: "b.pdf".into(),
                    public_id: Some("documents/b.pdf".into()),
                },
                DocumentRef {
                    url: "https://elsewhere.example/c.pdf".into(),
                    name: "c.pdf".into(),
                    public_id: None,
                },
            ]),
            notes: None,
            rejection_reason: None,
            interview_date: None,
            interview_location: None,
            interview_notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(app.file_handles(), vec!["resumes/a.pdf", "documents/b.pdf"]);
    }
}
