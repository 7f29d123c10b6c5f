use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{events, handlers, runs};
use crate::metrics;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Acquisition runs
        .route("/runs", post(runs::trigger_run))
        .route("/runs/last", get(runs::last_run))
        // Storage-change notifications (hosted event dispatcher)
        .route("/events/storage", post(events::storage_event))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(metrics::metrics_handler))
        .layer(TraceLayer::new_for_http())
}
