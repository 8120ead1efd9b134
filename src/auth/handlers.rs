use super::service::AuthService;
use super::types::{MessageResponse, SigninRequest, SigninResponse, SignupRequest};
use crate::error::AppError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_signup(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(request) = payload.map_err(|e| anyhow::anyhow!("Malformed signup body: {e}"))?;

    auth.signup(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User signed up successfully!".to_string(),
        }),
    ))
}

pub async fn handle_signin(
    Extension(auth): Extension<Arc<AuthService>>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<SigninResponse>, AppError> {
    let Json(request) = payload.map_err(|e| anyhow::anyhow!("Malformed signin body: {e}"))?;

    let user = auth.signin(request).await?;

    Ok(Json(SigninResponse {
        message: "User signed in successfully!".to_string(),
        user,
    }))
}
