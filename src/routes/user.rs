use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::user_dto::{
        UpdateProfilePayload, UpdateUserRolePayload, UserListQuery, UserListResponse, UserResponse,
    },
    error::{Error, Result},
    middleware::auth::AuthUser,
    models::user::{Role, User},
    services::media_service::UploadKind,
    AppState,
};

fn parse_user_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::BadRequest("Invalid user ID".to_string()))
}

async fn fetch_user(state: &AppState, id: Uuid) -> Result<User> {
    state
        .user_service
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("No user found with id: {}", id)))
}

#[axum::debug_handler]
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse> {
    let user = state
        .user_service
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.update_profile(auth.id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}

async fn read_upload(multipart: &mut Multipart, field_name: &str) -> Result<Option<(String, bytes::Bytes)>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name().unwrap_or_default() != field_name {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.bin").to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::error!(error = %e, "failed to read file upload");
            Error::BadRequest("Failed to read file upload".to_string())
        })?;
        if !data.is_empty() {
            return Ok(Some((filename, data)));
        }
    }
    Ok(None)
}

#[axum::debug_handler]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (filename, data) = read_upload(&mut multipart, "image")
        .await?
        .ok_or_else(|| Error::BadRequest("Please upload an image".to_string()))?;

    let user = state
        .user_service
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let stored = state
        .media_service
        .store(UploadKind::ProfileImage, &filename, &data)
        .await?;

    if let Some(old) = user.profile_image_public_id {
        if let Err(err) = state.media_service.delete(&old).await {
            tracing::warn!(handle = %old, error = %err, "failed to release old profile image");
        }
    }

    let user = state
        .user_service
        .update_profile_image(auth.id, &stored.url, &stored.public_id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn upload_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let (filename, data) = read_upload(&mut multipart, "resume")
        .await?
        .ok_or_else(|| Error::BadRequest("Please upload a resume".to_string()))?;

    let user = state
        .user_service
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let stored = state
        .media_service
        .store(UploadKind::Resume, &filename, &data)
        .await?;

    if let Some(old) = user.resume_public_id {
        if let Err(err) = state.media_service.delete(&old).await {
            tracing::warn!(handle = %old, error = %err, "failed to release old resume");
        }
    }

    let user = state
        .user_service
        .update_resume(auth.id, &stored.url, &stored.public_id)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.user_service.list(query).await?;
    let counts = state.user_service.role_counts().await?;
    Ok(Json(UserListResponse::from_list(list, &counts)))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_user_id(&id)?;
    let user = fetch_user(&state, id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRolePayload>,
) -> Result<impl IntoResponse> {
    let role = Role::from_str(&payload.role)
        .map_err(|_| Error::BadRequest("Please provide a valid role".to_string()))?;
    let id = parse_user_id(&id)?;
    fetch_user(&state, id).await?;
    let user = state.user_service.update_role(id, role).await?;
    Ok(Json(UserResponse::from(user)))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_user_id(&id)?;
    let user = fetch_user(&state, id).await?;

    if user.id == auth.id {
        return Err(Error::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    state.user_service.delete(user.id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
