use super::engine::{self, SummaryCriteria};
use super::types::{FeedbackDataset, SummaryParams};
use crate::error::AppError;
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_list_all(Extension(dataset): Extension<Arc<FeedbackDataset>>) -> Response {
    let records = engine::list_all(&dataset);
    tracing::debug!("Sample data: {:?}", &records[..records.len().min(5)]);

    Json(records).into_response()
}

pub async fn handle_feedback_by_model(
    Extension(dataset): Extension<Arc<FeedbackDataset>>,
    Path(model): Path<String>,
) -> Response {
    let records = engine::by_model(&dataset, &model);
    tracing::debug!("Model {} matched {} records", model, records.len());

    Json(records).into_response()
}

pub async fn handle_feedback_details(
    Extension(dataset): Extension<Arc<FeedbackDataset>>,
    Path((model, index, date)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let record = engine::by_model_index_date(&dataset, &model, &index, &date).inspect_err(|e| {
        tracing::warn!("Feedback details {}/{}/{}: {}", model, index, date, e);
    })?;

    Ok(Json(record).into_response())
}

pub async fn handle_detailed_summary(
    Extension(dataset): Extension<Arc<FeedbackDataset>>,
    Query(params): Query<SummaryParams>,
) -> Result<Response, AppError> {
    tracing::info!("Received request with params: {:?}", params);

    let criteria = SummaryCriteria::from_params(params).inspect_err(|_| {
        tracing::warn!("Missing detailed summary parameters");
    })?;
    tracing::info!("Filtering with models: {:?}", criteria.models);

    let results = engine::by_criteria(&dataset, &criteria);
    tracing::info!(
        "Found {} matching records",
        results.as_ref().map_or(0, Vec::len)
    );

    Ok(Json(results?).into_response())
}

pub async fn handle_feedback_by_sentiment(
    Extension(dataset): Extension<Arc<FeedbackDataset>>,
    Path((model, feature, sentiment)): Path<(String, String, String)>,
) -> Result<Response, AppError> {
    let records = engine::by_model_feature_sentiment(&dataset, &model, &feature, &sentiment)
        .inspect_err(|e| {
            tracing::warn!("Feedback {}/{}/{}: {}", model, feature, sentiment, e);
        })?;

    Ok(Json(records).into_response())
}
