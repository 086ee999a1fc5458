use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::models::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

/// Caller identity resolved by the bearer gate, available to handlers via
/// request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-or-admin predicate every resource handler re-checks.
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.id == owner_id || self.is_admin()
    }
}

pub fn sign_token(user: &User) -> crate::error::Result<String> {
    let config = crate::config::get_config();
    let exp = (Utc::now() + chrono::Duration::hours(config.jwt_lifetime_hours)).timestamp();
    let claims = Claims {
        sub: user.id.to_string(),
        name: user.name.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: exp as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| crate::error::Error::Internal(format!("Failed to sign token: {}", e)))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Authentication invalid"})),
    )
        .into_response()
}

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"message": "Not allowed to access this route"})),
    )
        .into_response()
}

fn resolve_bearer(req: &Request) -> Option<AuthUser> {
    let auth_header = req.headers().get(axum::http::header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;

    let config = crate::config::get_config();
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .ok()?;

    let id = Uuid::parse_str(&data.claims.sub).ok()?;
    Some(AuthUser {
        id,
        name: data.claims.name,
        email: data.claims.email,
        role: data.claims.role,
    })
}

pub async fn require_bearer_auth(mut req: Request, next: Next) -> Response {
    match resolve_bearer(&req) {
        Some(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        None => unauthorized(),
    }
}

async fn require_role(req: Request, next: Next, allowed: &[Role]) -> Response {
    let Some(user) = req.extensions().get::<AuthUser>() else {
        return unauthorized();
    };
    if !allowed.contains(&user.role) {
        return forbidden();
    }
    next.run(req).await
}

pub async fn require_recruiter_or_admin(req: Request, next: Next) -> Response {
    require_role(req, next, &[Role::Recruiter, Role::Admin]).await
}

pub async fn require_admin(req: Request, next: Next) -> Response {
    require_role(req, next, &[Role::Admin]).await
}

pub async fn require_job_seeker(req: Request, next: Next) -> Response {
    require_role(req, next, &[Role::JobSeeker]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SocialLinks;
    use std::env;

    fn init_test_config() {
        env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
        env::set_var("DATABASE_URL", "postgres://localhost/jobify_test");
        env::set_var("JWT_SECRET", "test_secret_key");
        env::set_var("JWT_LIFETIME_HOURS", "24");
        env::set_var("PUBLIC_BASE_URL", "http://localhost:5000");
        env::set_var("SMTP_HOST", "localhost");
        env::set_var("SMTP_PORT", "587");
        env::set_var("SMTP_USER", "jobify");
        env::set_var("SMTP_PASS", "jobify");
        env::set_var("FROM_EMAIL", "no-reply@jobify.test");
        let _ = crate::config::init_config();
    }

    fn sample_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Sample".into(),
            email: "sample@example.com".into(),
            password_hash: "hash".into(),
            role,
            location: "My City".into(),
            bio: None,
            skills: vec![],
            resume_url: None,
            resume_public_id: None,
            profile_image: None,
            profile_image_public_id: None,
            phone_number: None,
            social_links: Some(sqlx::types::Json(SocialLinks::default())),
            company: None,
            job_title: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn request_with_auth(header: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[test]
    fn signed_token_resolves_back_to_the_caller() {
        init_test_config();
        let user = sample_user(Role::Recruiter);
        let token = sign_token(&user).unwrap();

        let req = request_with_auth(Some(&format!("Bearer {}", token)));
        let resolved = resolve_bearer(&req).expect("token should resolve");
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, user.email);
        assert_eq!(resolved.role, Role::Recruiter);
    }

    #[test]
    fn garbage_and_missing_tokens_do_not_resolve() {
        init_test_config();
        assert!(resolve_bearer(&request_with_auth(None)).is_none());
        assert!(resolve_bearer(&request_with_auth(Some("Basic abc"))).is_none());
        assert!(resolve_bearer(&request_with_auth(Some("Bearer not.a.jwt"))).is_none());
    }

    #[test]
    fn ownership_predicate_admits_owner_and_admin_only() {
        let owner_id = Uuid::new_v4();
        let owner = AuthUser {
            id: owner_id,
            name: "o".into(),
            email: "o@x.com".into(),
            role: Role::JobSeeker,
        };
        let admin = AuthUser {
            id: Uuid::new_v4(),
            name: "a".into(),
            email: "a@x.com".into(),
            role: Role::Admin,
        };
        let stranger = AuthUser {
            id: Uuid::new_v4(),
            name: "s".into(),
            email: "s@x.com".into(),
            role: Role::Recruiter,
        };
        assert!(owner.owns_or_admin(owner_id));
        assert!(admin.owns_or_admin(owner_id));
        assert!(!stranger.owns_or_admin(owner_id));
    }
}
