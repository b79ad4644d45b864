// src/handlers/analytics.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    config::Config,
    error::AppError,
    models::analytics::AnalyticsRequest,
    store::ResultStore,
};

/// Returns dashboard analytics over all results, or one user's results.
///
/// The report is recomputed from a fresh store snapshot on every call.
/// A storage failure is the only error path (500).
pub async fn get_analytics(
    State(store): State<Arc<dyn ResultStore>>,
    State(config): State<Config>,
    Json(req): Json<AnalyticsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = req.username_filter();

    let results = match username {
        Some(name) => store.by_user(name).await,
        None => store.all().await,
    }
    .map_err(|e| {
        tracing::error!("Failed to load results for analytics: {:?}", e);
        e
    })?;

    let report = config.analytics_timezone.compute(&results, username);

    tracing::debug!(
        "Analytics over {} results: {} tests ranked, {} active months",
        results.len(),
        report.top_tests.len(),
        report.activity.len()
    );

    Ok(Json(report))
}
