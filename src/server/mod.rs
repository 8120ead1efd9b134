//! HTTP surface.
//!
//! Wires the feedback and credential handlers into one axum `Router`. Shared
//! state travels as `Extension` layers: the loaded dataset and the auth
//! service, both behind `Arc` and both immutable once the router is built.

use crate::auth::handlers::{handle_signin, handle_signup};
use crate::auth::service::AuthService;
use crate::error::INTERNAL_ERROR_MESSAGE;
use crate::feedback::handlers::{
    handle_detailed_summary, handle_feedback_by_model, handle_feedback_by_sentiment,
    handle_feedback_details, handle_list_all,
};
use crate::feedback::types::FeedbackDataset;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{
    extract::Extension,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{error, info};

pub type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

pub fn build_router(
    dataset: Arc<FeedbackDataset>,
    auth: Arc<AuthService>,
    allowed_origins: &[String],
) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    let app = Router::new()
        .route("/data", get(handle_list_all))
        .route("/feedback/:model", get(handle_feedback_by_model))
        .route(
            "/feedback/details/:model/:index/:date",
            get(handle_feedback_details),
        )
        .route(
            "/feedback/:model/:feature/:sentiment",
            get(handle_feedback_by_sentiment),
        )
        .route("/detailed-summary", get(handle_detailed_summary))
        .route("/api/detailed-summary", get(handle_detailed_summary))
        .route("/signup", post(handle_signup))
        .route("/signin", post(handle_signin))
        .fallback(handle_not_found)
        .layer(Extension(dataset))
        .layer(Extension(auth))
        .layer(cors)
        .layer(catch_panic_layer());

    Ok(app)
}

pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin {origin:?}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Turns a handler panic into the generic `500` JSON body.
pub fn catch_panic_layer() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic payload"
    };
    error!("Error: handler panicked: {}", details);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

async fn handle_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests;
