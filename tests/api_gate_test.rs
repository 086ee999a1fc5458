use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tokio_test::assert_ok;
use tower::ServiceExt;
use uuid::Uuid;

use jobify_backend::{
    middleware::auth::{sign_token, Claims},
    models::user::{Role, User},
    AppState,
};

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
    let _ = jobify_backend::config::init_config();
}

/// Router over a lazy pool: nothing in these tests may reach the database,
/// which is exactly what they assert (gates fire first).
fn test_router() -> Router {
    init_test_config();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/jobify_test")
        .expect("lazy pool");
    jobify_backend::api_router(AppState::new(pool))
}

fn user_with_role(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Test User".into(),
        email: "test@example.com".into(),
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
        social_links: None,
        company: None,
        job_title: None,
        password_reset_token: None,
        password_reset_expires: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn bearer(role: Role) -> String {
    init_test_config();
    let token = sign_token(&user_with_role(role)).expect("sign token");
    format!("Bearer {}", token)
}

async fn body_json(body: Body) -> JsonValue {
    let bytes = to_bytes(body, usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_is_public() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_root_greets_without_auth() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/api/v1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Welcome to Jobify API");
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = test_router();
    let response = app
        .oneshot(Request::get("/api/v1/jobs").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Authentication invalid");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::get("/api/v1/jobs")
                .header("Authorization", "Bearer not.a.jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = test_router();
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        name: "Stale".into(),
        email: "stale@example.com".into(),
        role: Role::Recruiter,
        exp: (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test_secret_key"),
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::get("/api/v1/jobs")
                .header("Authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn job_seeker_cannot_create_jobs() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::post("/api/v1/jobs")
                .header("Authorization", bearer(Role::JobSeeker))
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Not allowed to access this route");
}

#[tokio::test]
async fn job_seeker_cannot_update_application_status() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::patch(format!("/api/v1/applications/{}/status", Uuid::new_v4()))
                .header("Authorization", bearer(Role::JobSeeker))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({"status": "reviewed"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn recruiter_cannot_submit_applications() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::post("/api/v1/applications")
                .header("Authorization", bearer(Role::Recruiter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn recruiter_cannot_manage_users() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::get("/api/v1/users")
                .header("Authorization", bearer(Role::Recruiter))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_validation_flattens_into_message_envelope() {
    let app = test_router();
    let payload = json!({
        "name": "Al",
        "email": "not-an-email",
        "password": "123"
    });
    let response = app
        .oneshot(
            Request::post("/api/v1/auth/register")
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    let message = body["message"].as_str().expect("message string");
    assert!(message.contains("name:"), "got: {message}");
    assert!(message.contains("email:"), "got: {message}");
    assert!(message.contains("password:"), "got: {message}");
}

#[tokio::test]
async fn malformed_job_id_is_rejected_before_lookup() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::get("/api/v1/jobs/not-a-uuid")
                .header("Authorization", bearer(Role::JobSeeker))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Invalid job ID");
}

#[tokio::test]
async fn invalid_job_status_value_is_rejected_before_lookup() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::patch(format!("/api/v1/jobs/{}/status", Uuid::new_v4()))
                .header("Authorization", bearer(Role::Recruiter))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({"status": "paused"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Please provide a valid status");
}

#[tokio::test]
async fn invalid_application_status_value_is_rejected_before_lookup() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::patch(format!("/api/v1/applications/{}/status", Uuid::new_v4()))
                .header("Authorization", bearer(Role::Recruiter))
                .header("Content-Type", "application/json")
                .body(Body::from(json!({"status": "shortlisted"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "Please provide a valid status");
}

#[tokio::test]
async fn update_password_requires_a_token() {
    let app = test_router();
    let response = app
        .oneshot(
            Request::patch("/api/v1/auth/update-password")
                .header("Content-Type", "application/json")
                .body(
                    Body::from(
                        json!({"old_password": "a", "new_password": "longenough"}).to_string(),
                    ),
                )
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn signing_tokens_works_outside_the_runtime() {
    init_test_config();
    tokio_test::assert_ok!(sign_token(&user_with_role(Role::Admin)));
}
