//! Types for the page interaction state machine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentError;
use crate::detector::DetectorError;

/// Phases of one scrape session, advanced strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapePhase {
    Idle,
    Navigated,
    SegmentMenuOpen,
    SegmentSelected,
    DownloadTriggered,
    DownloadComplete,
    Failed,
}

impl ScrapePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapePhase::Idle => "idle",
            ScrapePhase::Navigated => "navigated",
            ScrapePhase::SegmentMenuOpen => "segment_menu_open",
            ScrapePhase::SegmentSelected => "segment_selected",
            ScrapePhase::DownloadTriggered => "download_triggered",
            ScrapePhase::DownloadComplete => "download_complete",
            ScrapePhase::Failed => "failed",
        }
    }
}

/// Errors that terminate a scrape session.
#[derive(Debug, Error)]
pub enum ScraperError {
    /// The page never presented its anchor element within the load timeout.
    #[error("Navigation timed out waiting for {selector}")]
    NavigationTimeout { selector: String },

    /// The segment control stayed blocked through every retry.
    #[error("Segment selection blocked after {attempts} attempts")]
    InteractionBlocked { attempts: u32 },

    /// Download never completed (or completed empty).
    #[error(transparent)]
    Download(#[from] DetectorError),

    /// An agent operation failed outside the recoverable cases.
    #[error("Rendering agent error: {0}")]
    Agent(#[from] AgentError),
}
