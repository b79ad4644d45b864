// src/handlers/result.rs

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::result::{SaveResultRequest, UserResultsRequest},
    store::ResultStore,
};

/// Saves a finished test.
///
/// * Rejects the request with 400 when any of `username`, `testTitle`,
///   `takenAt` is missing or empty, or `answers` is absent.
/// * Appends the result to the store.
/// * Returns 201 Created with the stored result.
pub async fn save_result(
    State(store): State<Arc<dyn ResultStore>>,
    Json(payload): Json<SaveResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let record = payload
        .into_record()
        .ok_or_else(|| AppError::BadRequest("Invalid result data".to_string()))?;

    let saved = store.append(record).await.map_err(|e| {
        tracing::error!("Failed to save result: {:?}", e);
        e
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Result saved successfully",
            "result": saved
        })),
    ))
}

/// Lists every result of one user, oldest first.
pub async fn list_user_results(
    State(store): State<Arc<dyn ResultStore>>,
    Json(payload): Json<UserResultsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = payload
        .username
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Username required".to_string()))?;

    let results = store.by_user(&username).await?;

    Ok(Json(results))
}
