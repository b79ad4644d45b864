// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::post,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{analytics, result},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (results, analytics).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (results store, config).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let result_routes = Router::new()
        .route("/save", post(result::save_result))
        .route("/getByUser", post(result::list_user_results));

    let analytics_routes = Router::new().route("/", post(analytics::get_analytics));

    Router::new()
        .nest("/api/results", result_routes)
        .nest("/api/analytics", analytics_routes)
        .fallback(not_found)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
