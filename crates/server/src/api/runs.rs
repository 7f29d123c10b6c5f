//! Acquisition run endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use bovespa_core::converter::CsvParquetConverter;
use bovespa_core::orchestrator::{AcquisitionRunner, RunOutcome};
use bovespa_core::WebDriverAgent;

use crate::state::AppState;

/// Terminal report of one acquisition run, kept for `GET /runs/last`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(flatten)]
    pub status: RunStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    Complete {
        raw_path: PathBuf,
        refined_path: PathBuf,
    },
    Partial {
        raw_path: PathBuf,
        error: String,
    },
    Failed {
        error: String,
    },
}

/// Execute one acquisition session.
///
/// Only one session may be in flight per instance; a concurrent trigger
/// gets 409 instead of queuing.
pub async fn trigger_run(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let Ok(_guard) = state.run_lock().try_lock() else {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "error": "an acquisition session is already in flight" })),
        )
            .into_response();
    };

    let run_id = uuid::Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!("Acquisition run {} triggered", run_id);

    let config = state.config();
    let agent = match WebDriverAgent::new(config.agent.clone()) {
        Ok(agent) => agent,
        Err(e) => {
            error!("Failed to create rendering agent: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let runner = AcquisitionRunner::new(
        config.orchestrator.clone(),
        config.scraper.clone(),
        config.detector.clone(),
        CsvParquetConverter::new(config.converter.clone()),
    );

    let result = runner.run(agent).await;
    let (http_status, status) = match result {
        Ok(RunOutcome::Complete {
            raw_path,
            refined_path,
        }) => (
            StatusCode::OK,
            RunStatus::Complete {
                raw_path,
                refined_path,
            },
        ),
        Ok(RunOutcome::Partial {
            raw_path,
            conversion_error,
        }) => (
            StatusCode::OK,
            RunStatus::Partial {
                raw_path,
                error: conversion_error,
            },
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            RunStatus::Failed {
                error: e.to_string(),
            },
        ),
    };

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        status,
    };
    *state.last_run().write().await = Some(report.clone());

    (http_status, Json(report)).into_response()
}

/// Last terminal run report, if any run has finished since startup.
pub async fn last_run(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.last_run().read().await.clone() {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no run has completed yet" })),
        )
            .into_response(),
    }
}
