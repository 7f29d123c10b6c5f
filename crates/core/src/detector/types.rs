//! Types for download completion detection.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can terminate a download watch.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// The deadline elapsed without any completed file appearing.
    #[error("Download timed out after {waited_secs}s with no completed file")]
    DownloadTimeout { waited_secs: u64 },

    /// The deadline elapsed and the only completed candidate was empty.
    #[error("Downloaded file is empty: {path}")]
    DownloadEmpty { path: PathBuf },

    /// Directory listing or metadata read failed.
    #[error("I/O error while watching downloads: {0}")]
    Io(#[from] std::io::Error),
}

/// A file observed in the watched directory during one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCandidate {
    /// Absolute path of the observed file.
    pub path: PathBuf,
    /// Last observed size in bytes.
    pub size_bytes: u64,
    /// Whether the file carries the in-progress marker suffix.
    pub partial: bool,
    /// Consecutive polls that read the current size.
    pub stable_reads: u32,
}

impl DownloadCandidate {
    /// Whether this candidate qualifies as a finished download given the
    /// required number of stable reads.
    pub fn is_complete(&self, required_reads: u32) -> bool {
        !self.partial && self.size_bytes > 0 && self.stable_reads >= required_reads
    }
}
