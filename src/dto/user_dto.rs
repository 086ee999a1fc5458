use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::user::{Role, SocialLinks, User};
use crate::services::user_service::UserList;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(length(min = 3, max = 50, message = "name must be 3 to 50 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "location must be at most 100 characters"))]
    pub location: Option<String>,
    #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub phone_number: Option<String>,
    #[validate(length(max = 100, message = "company must be at most 100 characters"))]
    pub company: Option<String>,
    #[validate(length(max = 100, message = "job title must be at most 100 characters"))]
    pub job_title: Option<String>,
    pub social_links: Option<SocialLinks>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUserRolePayload {
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub location: String,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
    pub social_links: Option<SocialLinks>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            role: value.role,
            location: value.location,
            bio: value.bio,
            skills: value.skills,
            resume_url: value.resume_url,
            profile_image: value.profile_image,
            phone_number: value.phone_number,
            social_links: value.social_links.map(|links| links.0),
            company: value.company,
            job_title: value.job_title,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total_users: i64,
    pub num_of_pages: i64,
    pub current_page: i64,
    pub stats: RoleStats,
}

impl UserListResponse {
    pub fn from_list(list: UserList, counts: &[(Role, i64)]) -> Self {
        Self {
            users: list.items.into_iter().map(Into::into).collect(),
            total_users: list.total,
            num_of_pages: list.num_of_pages,
            current_page: list.page,
            stats: RoleStats::from_counts(counts),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStats {
    pub admin: i64,
    pub recruiter: i64,
    #[serde(rename = "job-seeker")]
    pub job_seeker: i64,
}

impl RoleStats {
    pub fn from_counts(counts: &[(Role, i64)]) -> Self {
        let mut stats = Self::default();
        for (role, count) in counts {
            match role {
                Role::Admin => stats.admin = *count,
                Role::Recruiter => stats.recruiter = *count,
                Role::JobSeeker => stats.job_seeker = *count,
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_stats_serialize_with_canonical_keys() {
        let json =
            serde_json::to_value(RoleStats::from_counts(&[(Role::JobSeeker, 3)])).unwrap();
        assert_eq!(json["job-seeker"], 3);
        assert_eq!(json["admin"], 0);
        assert_eq!(json["recruiter"], 0);
    }
}
