//! Types for the acquisition orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::scraper::ScraperError;

/// Terminal result of a successful-enough acquisition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Both artifacts landed.
    Complete {
        raw_path: PathBuf,
        refined_path: PathBuf,
    },
    /// The raw artifact landed but conversion failed; the raw file is
    /// preserved for manual reprocessing, not retried.
    Partial {
        raw_path: PathBuf,
        conversion_error: String,
    },
}

impl RunOutcome {
    pub fn raw_path(&self) -> &PathBuf {
        match self {
            RunOutcome::Complete { raw_path, .. } => raw_path,
            RunOutcome::Partial { raw_path, .. } => raw_path,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RunOutcome::Complete { .. })
    }
}

/// Total failure of an acquisition session: no raw artifact landed.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Scrape(#[from] ScraperError),

    #[error("Failed to land raw artifact: {0}")]
    Landing(#[from] std::io::Error),
}
