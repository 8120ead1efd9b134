use crate::auth::service::AuthError;
use crate::feedback::engine::QueryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Everything a handler can fail with.
///
/// Feedback failures answer `{"error": ..}`, credential failures answer
/// `{"message": ..}`, anything else is a generic 500.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Query(QueryError::MissingParameters) => StatusCode::BAD_REQUEST,
            AppError::Query(_) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Query(e) => json!({ "error": e.to_string() }),
            AppError::Auth(e) => {
                if let Some(source) = std::error::Error::source(e) {
                    tracing::error!("{}: {:#}", e, source);
                }
                json!({ "message": e.to_string() })
            }
            AppError::InternalError(e) => {
                tracing::error!("Error: {:#}", e);
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
        };

        (status, Json(body)).into_response()
    }
}
