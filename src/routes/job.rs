use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::job_dto::{
        CreateJobPayload, JobListQuery, JobListResponse, JobResponse, JobStatsResponse,
        JobStatusStats, JobTypeStats, MyJobsResponse, UpdateJobPayload, UpdateJobStatusPayload,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::job::{Job, JobStatus},
    AppState,
};

fn parse_job_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::BadRequest("Invalid job ID".to_string()))
}

async fn fetch_job(state: &AppState, id: Uuid) -> Result<Job> {
    state
        .job_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No job found with id: {}", id)))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobPayload,
    responses(
        (status = 201, description = "Job created successfully", body = Json<JobResponse>),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller may not post jobs")
    )
)]
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let job = state.job_service.create(auth.id, payload).await?;
    Ok((StatusCode::CREATED, Json(JobResponse::from(job))))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(
        ("search" = Option<String>, Query, description = "Free-text search"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("job_type" = Option<String>, Query, description = "Filter by job type"),
        ("experience" = Option<String>, Query, description = "Filter by experience level"),
        ("location" = Option<String>, Query, description = "Location substring filter"),
        ("featured" = Option<bool>, Query, description = "Featured jobs only"),
        ("sort" = Option<String>, Query, description = "latest|oldest|a-z|z-a"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "List of jobs", body = Json<JobListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let result = state.job_service.list(query, None).await?;
    Ok(Json(JobListResponse::from(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job found", body = Json<JobResponse>),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_job_id(&id)?;
    let job = fetch_job(&state, id).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    request_body = UpdateJobPayload,
    responses(
        (status = 200, description = "Job updated successfully", body = Json<JobResponse>),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let id = parse_job_id(&id)?;
    let job = fetch_job(&state, id).await?;
    if !auth.owns_or_admin(job.created_by) {
        return Err(Error::Forbidden(
            "You are not authorized to update this job".to_string(),
        ));
    }
    let job = state.job_service.update(id, payload).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job deleted successfully"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_job(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_job_id(&id)?;
    let job = fetch_job(&state, id).await?;
    if !auth.owns_or_admin(job.created_by) {
        return Err(Error::Forbidden(
            "You are not authorized to delete this job".to_string(),
        ));
    }

    // release dependent application files before the row cascade removes them
    let handles = state
        .application_service
        .file_handles_for_job(job.id)
        .await?;
    for handle in handles {
        if let Err(err) = state.media_service.delete(&handle).await {
            tracing::warn!(handle = %handle, error = %err, "failed to release stored file");
        }
    }

    state.job_service.delete(job.id).await?;
    Ok(Json(json!({ "message": "Job deleted successfully" })))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/my-jobs/all",
    responses(
        (status = 200, description = "Jobs owned by the caller plus status counts", body = Json<MyJobsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn my_jobs(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<JobListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.job_service.list(query, Some(auth.id)).await?;
    let counts = state.job_service.status_counts(auth.id).await?;

    Ok(Json(MyJobsResponse {
        jobs: list.items.into_iter().map(Into::into).collect(),
        total_jobs: list.total,
        num_of_pages: list.num_of_pages,
        current_page: list.page,
        stats: JobStatusStats::from_counts(&counts),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/jobs/{id}/status",
    params(
        ("id" = String, Path, description = "Job ID")
    ),
    request_body = UpdateJobStatusPayload,
    responses(
        (status = 200, description = "Status updated", body = Json<JobResponse>),
        (status = 400, description = "Invalid status"),
        (status = 403, description = "Caller does not own the job"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn update_job_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateJobStatusPayload>,
) -> Result<impl IntoResponse> {
    let status = JobStatus::from_str(&payload.status)
        .map_err(|_| Error::BadRequest("Please provide a valid status".to_string()))?;
    let id = parse_job_id(&id)?;
    let job = fetch_job(&state, id).await?;
    if !auth.owns_or_admin(job.created_by) {
        return Err(Error::Forbidden(
            "You are not authorized to update this job".to_string(),
        ));
    }
    let job = state.job_service.update_status(id, status).await?;
    Ok(Json(JobResponse::from(job)))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/stats/all",
    responses(
        (status = 200, description = "Status and type aggregation for the caller", body = Json<JobStatsResponse>)
    )
)]
#[axum::debug_handler]
pub async fn job_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let status_counts = state.job_service.status_counts(auth.id).await?;
    let type_counts = state.job_service.type_counts(auth.id).await?;

    let status_stats = JobStatusStats::from_counts(&status_counts);
    let total_jobs = status_stats.total();
    Ok(Json(JobStatsResponse {
        status_stats,
        type_stats: JobTypeStats::from_counts(&type_counts),
        total_jobs,
    }))
}
