//! Configuration for the download completion detector.

use serde::{Deserialize, Serialize};

/// Detector tuning knobs.
///
/// The poll interval and stabilization read count are configuration rather
/// than constants so tests can shrink them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    /// Directory poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of consecutive identical size reads required to declare a
    /// download complete.
    #[serde(default = "default_stable_reads")]
    pub stable_reads: u32,

    /// Filename suffix marking an in-progress download.
    #[serde(default = "default_partial_suffix")]
    pub partial_suffix: String,

    /// Preferred substring when several completed files are candidates.
    #[serde(default = "default_preferred_substring")]
    pub preferred_substring: Option<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            stable_reads: default_stable_reads(),
            partial_suffix: default_partial_suffix(),
            preferred_substring: default_preferred_substring(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_stable_reads() -> u32 {
    3
}

fn default_partial_suffix() -> String {
    ".crdownload".to_string()
}

fn default_preferred_substring() -> Option<String> {
    Some("IBOVDia".to_string())
}
