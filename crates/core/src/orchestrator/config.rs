//! Configuration for the acquisition orchestrator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory layout for one deployment instance.
///
/// Exactly one session may use these directories at a time; the
/// pre-existing-files snapshot taken before a download trigger assumes no
/// concurrent writer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Directory the rendering agent downloads into.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Root under which `date=YYYY-MM-DD` partitions are created.
    #[serde(default = "default_partition_root")]
    pub partition_root: PathBuf,

    /// Working directory for per-session diagnostics (failure screenshots).
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            partition_root: default_partition_root(),
            work_dir: default_work_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("data/downloads")
}

fn default_partition_root() -> PathBuf {
    PathBuf::from("data/lake")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data/work")
}
