//! Directory-polling download watcher.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::config::DetectorConfig;
use super::types::{DetectorError, DownloadCandidate};

/// Polls a directory for a new, size-stable file.
pub struct DownloadWatcher {
    config: DetectorConfig,
}

impl DownloadWatcher {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(DetectorConfig::default())
    }

    /// List the files currently present in a directory.
    ///
    /// Callers take this snapshot immediately before triggering a download
    /// so that only files appearing afterwards are considered.
    pub async fn snapshot(dir: &Path) -> Result<HashSet<PathBuf>, DetectorError> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = HashSet::new();
        while let Some(entry) = entries.next_entry().await? {
            files.insert(entry.path());
        }
        Ok(files)
    }

    /// Wait until a new download in `dir` completes, or the deadline elapses.
    ///
    /// A file is complete once it carries no partial marker, its size is
    /// non-zero, and the size has been read identical on
    /// `stable_reads` consecutive polls. When several completed files
    /// exist, the one matching the preferred substring wins; otherwise the
    /// first listed is used. Listing order is filesystem-dependent, so the
    /// tie-break is not deterministic across sessions, but the chosen
    /// candidate is tracked and kept for the remainder of the watch.
    pub async fn wait_for_download(
        &self,
        dir: &Path,
        preexisting: &HashSet<PathBuf>,
        deadline: Duration,
    ) -> Result<PathBuf, DetectorError> {
        let start = Instant::now();
        let poll = Duration::from_millis(self.config.poll_interval_ms);
        let mut tracked: Option<DownloadCandidate> = None;

        while start.elapsed() < deadline {
            let (completed, partial) = self.classify_new_files(dir, preexisting).await?;

            if let Some(path) = self.pick_candidate(&completed, tracked.as_ref()) {
                let size = fs::metadata(&path).await?.len();

                if size > 0 {
                    let stable_reads = match &tracked {
                        Some(prev) if prev.path == path && prev.size_bytes == size => {
                            prev.stable_reads + 1
                        }
                        _ => 1,
                    };

                    if stable_reads > 1 {
                        debug!(
                            "File size stable: {} bytes ({}/{})",
                            size, stable_reads, self.config.stable_reads
                        );
                    } else {
                        debug!("File growing: {} bytes", size);
                    }

                    let candidate = DownloadCandidate {
                        path: path.clone(),
                        size_bytes: size,
                        partial: false,
                        stable_reads,
                    };

                    if candidate.is_complete(self.config.stable_reads) {
                        info!("Download complete: {} ({} bytes)", path.display(), size);
                        return Ok(path);
                    }
                    tracked = Some(candidate);
                } else {
                    warn!("File found but empty: {}", path.display());
                    tracked = None;
                }
            } else if let Some(path) = partial.first() {
                match fs::metadata(path).await {
                    Ok(meta) => debug!("Partial download: {} bytes", meta.len()),
                    Err(_) => debug!("Partial download in progress"),
                }
            } else {
                debug!(
                    "Waiting for download to start... ({}s)",
                    start.elapsed().as_secs()
                );
            }

            tokio::time::sleep(poll).await;
        }

        // Final classification pass: a completed file that never stabilized
        // within the deadline is still accepted if it is non-empty now.
        let (completed, _) = self.classify_new_files(dir, preexisting).await?;
        if let Some(path) = self.pick_candidate(&completed, tracked.as_ref()) {
            let size = fs::metadata(&path).await?.len();
            if size > 0 {
                info!(
                    "Download accepted after deadline: {} ({} bytes)",
                    path.display(),
                    size
                );
                return Ok(path);
            }
            return Err(DetectorError::DownloadEmpty { path });
        }

        Err(DetectorError::DownloadTimeout {
            waited_secs: deadline.as_secs(),
        })
    }

    /// Split new files into completed and partial, by marker suffix.
    async fn classify_new_files(
        &self,
        dir: &Path,
        preexisting: &HashSet<PathBuf>,
    ) -> Result<(Vec<PathBuf>, Vec<PathBuf>), DetectorError> {
        let current = Self::snapshot(dir).await?;
        let mut completed = Vec::new();
        let mut partial = Vec::new();

        for path in current {
            if preexisting.contains(&path) {
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.ends_with(&self.config.partial_suffix) {
                partial.push(path);
            } else {
                completed.push(path);
            }
        }

        Ok((completed, partial))
    }

    /// Choose one completed file to track.
    fn pick_candidate(
        &self,
        completed: &[PathBuf],
        tracked: Option<&DownloadCandidate>,
    ) -> Option<PathBuf> {
        if completed.is_empty() {
            return None;
        }

        // Keep tracking the candidate from the previous poll if it is
        // still present, so the stabilization counter stays meaningful.
        if let Some(prev) = tracked {
            if completed.contains(&prev.path) {
                return Some(prev.path.clone());
            }
        }

        if let Some(ref substring) = self.config.preferred_substring {
            if let Some(preferred) = completed.iter().find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.contains(substring.as_str()))
            }) {
                return Some(preferred.clone());
            }
        }

        Some(completed[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_config() -> DetectorConfig {
        DetectorConfig {
            poll_interval_ms: 10,
            stable_reads: 3,
            partial_suffix: ".crdownload".to_string(),
            preferred_substring: Some("IBOVDia".to_string()),
        }
    }

    #[tokio::test]
    async fn test_stable_file_is_accepted() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        let file = temp.path().join("IBOVDia_28-07-25.csv");
        fs::write(&file, vec![0u8; 100]).await.unwrap();

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result, file);
    }

    #[tokio::test]
    async fn test_growing_file_needs_three_stable_reads() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();
        let file = temp.path().join("IBOVDia_28-07-25.csv");

        // Start empty, grow to the final size after a couple of polls.
        fs::write(&file, b"").await.unwrap();
        let grower = {
            let file = file.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(30)).await;
                fs::write(&file, vec![1u8; 100]).await.unwrap();
            })
        };

        let watcher = DownloadWatcher::new(fast_config());
        let started = std::time::Instant::now();
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_secs(5))
            .await
            .unwrap();
        grower.await.unwrap();

        assert_eq!(result, file);
        // Three consecutive identical reads at 10ms polls means the watch
        // cannot return before the growth write plus two further polls.
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_partial_marker_never_completes() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        let partial = temp.path().join("IBOVDia_28-07-25.csv.crdownload");
        fs::write(&partial, vec![0u8; 4096]).await.unwrap();

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_millis(100))
            .await;
        assert!(matches!(
            result,
            Err(DetectorError::DownloadTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_renamed_partial_is_accepted() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        let partial = temp.path().join("IBOVDia_28-07-25.csv.crdownload");
        let finished = temp.path().join("IBOVDia_28-07-25.csv");
        fs::write(&partial, vec![0u8; 256]).await.unwrap();

        let renamer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            fs::rename(&partial, &finished).await.unwrap();
        });

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_secs(5))
            .await
            .unwrap();
        renamer.await.unwrap();
        assert!(result.ends_with("IBOVDia_28-07-25.csv"));
    }

    #[tokio::test]
    async fn test_empty_file_at_deadline() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        let file = temp.path().join("IBOVDia_28-07-25.csv");
        fs::write(&file, b"").await.unwrap();

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_millis(100))
            .await;
        assert!(matches!(result, Err(DetectorError::DownloadEmpty { .. })));
    }

    #[tokio::test]
    async fn test_no_file_times_out() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_millis(80))
            .await;
        assert!(matches!(
            result,
            Err(DetectorError::DownloadTimeout { waited_secs: 0 })
        ));
    }

    #[tokio::test]
    async fn test_preexisting_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("IBOVDia_27-07-25.csv");
        fs::write(&old, vec![0u8; 512]).await.unwrap();

        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();
        assert!(snapshot.contains(&old));

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_millis(80))
            .await;
        assert!(matches!(
            result,
            Err(DetectorError::DownloadTimeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_preferred_substring_wins() {
        let temp = TempDir::new().unwrap();
        let snapshot = DownloadWatcher::snapshot(temp.path()).await.unwrap();

        fs::write(temp.path().join("other.csv"), vec![0u8; 64])
            .await
            .unwrap();
        let preferred = temp.path().join("IBOVDia_28-07-25.csv");
        fs::write(&preferred, vec![0u8; 64]).await.unwrap();

        let watcher = DownloadWatcher::new(fast_config());
        let result = watcher
            .wait_for_download(temp.path(), &snapshot, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(result, preferred);
    }
}
