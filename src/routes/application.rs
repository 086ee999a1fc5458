use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::Utc;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    dto::application_dto::{
        ApplicationListQuery, ApplicationListResponse, ApplicationResponse,
        UpdateApplicationStatusPayload,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::application::{Application, ApplicationStatus},
    models::job::JobStatus,
    services::{
        email_templates,
        media_service::UploadKind,
        notification_service::enqueue_best_effort,
    },
    AppState,
};

fn parse_application_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::BadRequest("Invalid application ID".to_string()))
}

async fn fetch_application(state: &AppState, id: Uuid) -> Result<Application> {
    state
        .application_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No application found with id: {}", id)))
}

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut job_id: Option<Uuid> = None;
    let mut cover_letter: Option<String> = None;
    let mut resume: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "job_id" => {
                let raw = field.text().await.unwrap_or_default();
                job_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| Error::BadRequest("Invalid job ID".to_string()))?,
                );
            }
            "cover_letter" => {
                let text = field.text().await.unwrap_or_default();
                if !text.trim().is_empty() {
                    cover_letter = Some(text);
                }
            }
            "resume" => {
                let filename = field.file_name().unwrap_or("resume.bin").to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!(error = %e, "failed to read resume upload");
                    Error::BadRequest("Failed to read file upload".to_string())
                })?;
                if !data.is_empty() {
                    resume = Some((filename, data));
                }
            }
            _ => {}
        }
    }

    // preconditions, in order, each its own failure
    let job_id = job_id.ok_or_else(|| Error::BadRequest("Please provide a job ID".to_string()))?;
    let job = state
        .job_service
        .get_by_id(job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No job found with id: {}", job_id)))?;
    if job.status != JobStatus::Open {
        return Err(Error::BadRequest(
            "This job is no longer accepting applications".to_string(),
        ));
    }
    if let Some(deadline) = job.application_deadline {
        if Utc::now() >= deadline {
            return Err(Error::BadRequest(
                "The application deadline for this job has passed".to_string(),
            ));
        }
    }
    if state.application_service.exists(job.id, auth.id).await? {
        return Err(Error::Conflict(
            "You have already applied for this job".to_string(),
        ));
    }
    let (resume_name, resume_data) =
        resume.ok_or_else(|| Error::BadRequest("Please upload your resume".to_string()))?;

    let stored = state
        .media_service
        .store(UploadKind::Resume, &resume_name, &resume_data)
        .await?;

    let application = state
        .application_service
        .create(job.id, auth.id, cover_letter, &stored)
        .await?;

    enqueue_best_effort(
        &state.notification_service,
        &auth.email,
        &email_templates::application_confirmation(&auth.name, &job.title, &job.company),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[axum::debug_handler]
pub async fn my_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let list = state
        .application_service
        .list_for_applicant(auth.id, query)
        .await?;
    let counts = state
        .application_service
        .status_counts_for_applicant(auth.id)
        .await?;
    Ok(Json(ApplicationListResponse::from_list(list, &counts)))
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_application_id(&id)?;
    let application = fetch_application(&state, id).await?;

    let job = state
        .job_service
        .get_by_id(application.job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No job found with id: {}", application.job_id)))?;

    let may_view = application.applicant_id == auth.id
        || job.created_by == auth.id
        || auth.is_admin();
    if !may_view {
        return Err(Error::Forbidden(
            "You are not authorized to view this application".to_string(),
        ));
    }

    Ok(Json(ApplicationResponse::from(application)))
}

#[axum::debug_handler]
pub async fn job_applications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(job_id): Path<String>,
    Query(query): Query<ApplicationListQuery>,
) -> Result<impl IntoResponse> {
    let job_id =
        Uuid::parse_str(&job_id).map_err(|_| Error::BadRequest("Invalid job ID".to_string()))?;
    let job = state
        .job_service
        .get_by_id(job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No job found with id: {}", job_id)))?;
    if !auth.owns_or_admin(job.created_by) {
        return Err(Error::Forbidden(
            "You are not authorized to view these applications".to_string(),
        ));
    }

    let list = state.application_service.list_for_job(job.id, query).await?;
    let counts = state
        .application_service
        .status_counts_for_job(job.id)
        .await?;
    Ok(Json(ApplicationListResponse::from_list(list, &counts)))
}

#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateApplicationStatusPayload>,
) -> Result<impl IntoResponse> {
    if payload.status.trim().is_empty() {
        return Err(Error::BadRequest("Please provide a status".to_string()));
    }
    let target = ApplicationStatus::from_str(&payload.status)
        .map_err(|_| Error::BadRequest("Please provide a valid status".to_string()))?;

    let id = parse_application_id(&id)?;
    let application = fetch_application(&state, id).await?;

    let job = state
        .job_service
        .get_by_id(application.job_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No job found with id: {}", application.job_id)))?;
    if !auth.owns_or_admin(job.created_by) {
        return Err(Error::Forbidden(
            "You are not authorized to update this application".to_string(),
        ));
    }

    let updated = state
        .application_service
        .update_status(&application, target, &payload)
        .await?;
    Ok(Json(ApplicationResponse::from(updated)))
}

#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_application_id(&id)?;
    let application = fetch_application(&state, id).await?;

    if !auth.owns_or_admin(application.applicant_id) {
        return Err(Error::Forbidden(
            "You are not authorized to delete this application".to_string(),
        ));
    }

    state
        .application_service
        .delete(&state.media_service, &application)
        .await?;
    Ok(Json(json!({ "message": "Application deleted successfully" })))
}
