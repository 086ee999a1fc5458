use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{Duration, Utc};
use serde_json::json;
use validator::Validate;

use crate::{
    dto::auth_dto::{
        AuthResponse, ForgotPasswordPayload, LoginPayload, RegisterPayload, ResetPasswordPayload,
        UpdatePasswordPayload,
    },
    error::{Error, Result},
    middleware::auth::{sign_token, AuthUser},
    services::{email_templates, notification_service::enqueue_best_effort},
    utils::{crypto, token},
    AppState,
};

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.register(payload).await?;

    enqueue_best_effort(
        &state.notification_service,
        &user.email,
        &email_templates::welcome(&user.name),
    )
    .await;

    let token = sign_token(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let user = state
        .user_service
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid credentials".to_string()))?;

    let password_ok = crypto::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
    if !password_ok {
        return Err(Error::Unauthorized("Invalid credentials".to_string()));
    }

    let token = sign_token(&user)?;
    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

#[axum::debug_handler]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let user = state
        .user_service
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    let config = crate::config::get_config();
    let reset_token = token::generate_reset_token(64);
    let expires = Utc::now() + Duration::minutes(config.password_reset_ttl_minutes);
    state
        .user_service
        .set_reset_token(user.id, &token::hash_reset_token(&reset_token), expires)
        .await?;

    let reset_url = format!(
        "{}/api/v1/auth/reset-password/{}",
        config.public_base_url, reset_token
    );
    enqueue_best_effort(
        &state.notification_service,
        &user.email,
        &email_templates::password_reset(&user.name, &reset_url),
    )
    .await;

    Ok(Json(json!({
        "message": "Password reset link sent to your email"
    })))
}

#[axum::debug_handler]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    Json(payload): Json<ResetPasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let user = state
        .user_service
        .find_by_valid_reset_token(&token::hash_reset_token(&reset_token))
        .await?
        .ok_or_else(|| Error::BadRequest("Token is invalid or has expired".to_string()))?;

    state
        .user_service
        .reset_password(user.id, &payload.password)
        .await?;

    Ok(Json(json!({
        "message": "Password reset successful. Please log in with your new password."
    })))
}

#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdatePasswordPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let user = state
        .user_service
        .find_by_id(auth.id)
        .await?
        .ok_or_else(|| Error::Unauthorized("User not found".to_string()))?;

    let password_ok = crypto::verify_password(&payload.old_password, &user.password_hash)
        .map_err(|e| Error::Internal(format!("Failed to verify password: {}", e)))?;
    if !password_ok {
        return Err(Error::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    state
        .user_service
        .update_password(user.id, &payload.new_password)
        .await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
