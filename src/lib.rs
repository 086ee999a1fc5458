pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{
    handler::Handler,
    middleware::from_fn,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;

use crate::middleware::auth::{
    require_admin, require_bearer_auth, require_job_seeker, require_recruiter_or_admin,
};
use crate::services::{
    application_service::ApplicationService, job_service::JobService,
    media_service::MediaService, notification_service::NotificationService,
    user_service::UserService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_service: UserService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub notification_service: NotificationService,
    pub media_service: MediaService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let user_service = UserService::new(pool.clone());
        let job_service = JobService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let notification_service = NotificationService::new(pool.clone());
        let media_service = MediaService::new(
            config.uploads_dir.clone(),
            config.public_base_url.clone(),
        );

        Self {
            pool,
            user_service,
            job_service,
            application_service,
            notification_service,
            media_service,
        }
    }
}

/// The full API surface. Bearer auth is a router-level layer on every
/// protected group; role gates sit on the individual methods that need them,
/// with resource ownership re-checked inside the handlers.
pub fn api_router(state: AppState) -> Router {
    let auth_api = Router::new()
        .route("/api/v1/auth/register", post(routes::auth::register))
        .route("/api/v1/auth/login", post(routes::auth::login))
        .route(
            "/api/v1/auth/forgot-password",
            post(routes::auth::forgot_password),
        )
        .route(
            "/api/v1/auth/reset-password/:token",
            post(routes::auth::reset_password),
        )
        .route(
            "/api/v1/auth/update-password",
            patch(routes::auth::update_password.layer(from_fn(require_bearer_auth))),
        );

    let jobs_api = Router::new()
        .route(
            "/api/v1/jobs",
            get(routes::job::list_jobs)
                .post(routes::job::create_job.layer(from_fn(require_recruiter_or_admin))),
        )
        .route(
            "/api/v1/jobs/:id",
            get(routes::job::get_job)
                .patch(routes::job::update_job.layer(from_fn(require_recruiter_or_admin)))
                .delete(routes::job::delete_job.layer(from_fn(require_recruiter_or_admin))),
        )
        .route(
            "/api/v1/jobs/my-jobs/all",
            get(routes::job::my_jobs.layer(from_fn(require_recruiter_or_admin))),
        )
        .route(
            "/api/v1/jobs/:id/status",
            patch(routes::job::update_job_status.layer(from_fn(require_recruiter_or_admin))),
        )
        .route(
            "/api/v1/jobs/stats/all",
            get(routes::job::job_stats.layer(from_fn(require_recruiter_or_admin))),
        )
        .route_layer(from_fn(require_bearer_auth));

    let applications_api = Router::new()
        .route(
            "/api/v1/applications",
            post(routes::application::create_application.layer(from_fn(require_job_seeker))),
        )
        .route(
            "/api/v1/applications/my-applications",
            get(routes::application::my_applications),
        )
        .route(
            "/api/v1/applications/:id",
            get(routes::application::get_application)
                .delete(routes::application::delete_application),
        )
        .route(
            "/api/v1/applications/job/:job_id",
            get(routes::application::job_applications
                .layer(from_fn(require_recruiter_or_admin))),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(
                routes::application::update_application_status
                    .layer(from_fn(require_recruiter_or_admin)),
            ),
        )
        .route_layer(from_fn(require_bearer_auth));

    let users_api = Router::new()
        .route("/api/v1/users/me", get(routes::user::current_user))
        .route("/api/v1/users/profile", patch(routes::user::update_profile))
        .route(
            "/api/v1/users/profile/image",
            post(routes::user::upload_profile_image),
        )
        .route(
            "/api/v1/users/profile/resume",
            post(routes::user::upload_resume),
        )
        .route(
            "/api/v1/users",
            get(routes::user::list_users.layer(from_fn(require_admin))),
        )
        .route(
            "/api/v1/users/:id",
            get(routes::user::get_user.layer(from_fn(require_admin)))
                .delete(routes::user::delete_user.layer(from_fn(require_admin))),
        )
        .route(
            "/api/v1/users/:id/role",
            patch(routes::user::update_user_role.layer(from_fn(require_admin))),
        )
        .route_layer(from_fn(require_bearer_auth));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/v1", get(routes::health::welcome))
        .merge(auth_api)
        .merge(jobs_api)
        .merge(applications_api)
        .merge(users_api)
        .with_state(state)
}
