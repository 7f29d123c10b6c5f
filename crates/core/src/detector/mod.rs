//! Download completion detection.
//!
//! Browsers give no callback when a file download finishes; the only
//! observable signal is the watched directory itself. This module polls a
//! directory for files that appeared after a known snapshot and promotes a
//! candidate to "complete" once its size stays identical across a fixed
//! number of consecutive reads and it carries no in-progress marker.

mod config;
mod types;
mod watcher;

pub use config::DetectorConfig;
pub use types::{DetectorError, DownloadCandidate};
pub use watcher::DownloadWatcher;
