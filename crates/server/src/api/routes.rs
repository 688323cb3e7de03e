use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::request_id::{make_span_with_request_id, request_id_middleware};
use super::AppState;

/// Creates the API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/recommend", post(handlers::recommend))
        .route("/admin/reload", post(handlers::reload))
        .with_state(state)
        // Layers run outside-in from the bottom, so the id is set before the span
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
}
