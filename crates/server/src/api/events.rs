//! Storage-change notification webhook.
//!
//! This endpoint is the hosting runtime for the event dispatcher: it
//! forwards the parsed notification and translates the structured outcome
//! back into an HTTP response. Redelivery on failure is the notifier's
//! concern, not ours.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use bovespa_core::dispatcher::StorageEvent;

use crate::state::AppState;

pub async fn storage_event(
    State(state): State<Arc<AppState>>,
    Json(event): Json<StorageEvent>,
) -> impl IntoResponse {
    let outcome = state.dispatcher().dispatch(event).await;
    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.body))
}
