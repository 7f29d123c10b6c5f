//! Acquisition runner implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{info, warn};

use crate::agent::RenderingAgent;
use crate::converter::{ConversionJob, Converter};
use crate::detector::{DetectorConfig, DownloadWatcher};
use crate::metrics;
use crate::partition;
use crate::scraper::{ScrapeSession, ScraperConfig};

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, RunOutcome};

/// Runs one acquisition session end to end.
pub struct AcquisitionRunner<C: Converter> {
    config: OrchestratorConfig,
    scraper_config: ScraperConfig,
    detector_config: DetectorConfig,
    converter: C,
}

impl<C: Converter> AcquisitionRunner<C> {
    pub fn new(
        config: OrchestratorConfig,
        scraper_config: ScraperConfig,
        detector_config: DetectorConfig,
        converter: C,
    ) -> Self {
        Self {
            config,
            scraper_config,
            detector_config,
            converter,
        }
    }

    /// Execute one session with the given (exclusively owned) agent.
    ///
    /// Three terminal outcomes: `Ok(Complete)`, `Ok(Partial)` when the raw
    /// artifact landed but conversion failed, `Err` when no raw artifact
    /// was produced. Nothing is retried at this layer.
    pub async fn run<A: RenderingAgent>(
        &self,
        agent: A,
    ) -> Result<RunOutcome, OrchestratorError> {
        let start = Instant::now();
        info!("Starting acquisition session");

        fs::create_dir_all(&self.config.download_dir).await?;
        fs::create_dir_all(&self.config.work_dir).await?;

        let session = ScrapeSession::new(
            agent,
            self.scraper_config.clone(),
            DownloadWatcher::new(self.detector_config.clone()),
        );

        let downloaded = match session
            .acquire(&self.config.download_dir, &self.config.work_dir)
            .await
        {
            Ok(path) => path,
            Err(e) => {
                metrics::RUNS_TOTAL.with_label_values(&["failed"]).inc();
                return Err(e.into());
            }
        };

        let raw_path = self.land_raw_artifact(&downloaded).await?;
        let refined_path = raw_path.with_extension("parquet");

        let outcome = match self
            .converter
            .convert(ConversionJob {
                input_path: raw_path.clone(),
                output_path: refined_path.clone(),
            })
            .await
        {
            Ok(report) => {
                metrics::RUNS_TOTAL.with_label_values(&["complete"]).inc();
                metrics::CONVERTED_ROWS.observe(report.rows as f64);
                RunOutcome::Complete {
                    raw_path,
                    refined_path: report.output_path,
                }
            }
            Err(e) => {
                // The landed raw file stays where it is for manual
                // reprocessing.
                warn!("Conversion failed, raw artifact preserved: {}", e);
                metrics::RUNS_TOTAL.with_label_values(&["partial"]).inc();
                RunOutcome::Partial {
                    raw_path,
                    conversion_error: e.to_string(),
                }
            }
        };

        info!(
            "Acquisition session finished in {}ms ({})",
            start.elapsed().as_millis(),
            if outcome.is_complete() {
                "complete"
            } else {
                "partial"
            }
        );
        Ok(outcome)
    }

    /// Move the downloaded file into its date partition.
    async fn land_raw_artifact(&self, downloaded: &Path) -> Result<PathBuf, OrchestratorError> {
        let basename = downloaded
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
            .to_string();

        let resolution = partition::resolve(&basename);
        if resolution.fell_back {
            warn!(
                "Partition fallback: no date token in '{}', using {}",
                basename, resolution.key
            );
            metrics::PARTITION_FALLBACKS.inc();
        }

        let partition_dir = self.config.partition_root.join(resolution.key.dir_name());
        fs::create_dir_all(&partition_dir).await?;

        let raw_path = partition_dir.join(&basename);
        Self::move_file(downloaded, &raw_path).await?;

        let checksum = Sha256::digest(fs::read(&raw_path).await?);
        info!(
            "Raw artifact landed: {} (sha256 {:x})",
            raw_path.display(),
            checksum
        );

        Ok(raw_path)
    }

    /// Rename, falling back to copy+remove across filesystems.
    async fn move_file(source: &Path, destination: &Path) -> Result<(), std::io::Error> {
        match fs::rename(source, destination).await {
            Ok(()) => Ok(()),
            Err(e)
                if e.kind() == std::io::ErrorKind::CrossesDevices
                    || e.raw_os_error() == Some(18) =>
            {
                fs::copy(source, destination).await?;
                fs::remove_file(source).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::CsvParquetConverter;
    use crate::testing::{MockAgent, MockConverter};
    use tempfile::TempDir;

    fn fast_configs(temp: &TempDir) -> (OrchestratorConfig, ScraperConfig, DetectorConfig) {
        let orchestrator = OrchestratorConfig {
            download_dir: temp.path().join("downloads"),
            partition_root: temp.path().join("lake"),
            work_dir: temp.path().join("work"),
        };
        let scraper = ScraperConfig {
            retry_backoff_ms: 1,
            settle_delay_ms: 1,
            ..ScraperConfig::default()
        };
        let detector = DetectorConfig {
            poll_interval_ms: 5,
            stable_reads: 1,
            ..DetectorConfig::default()
        };
        (orchestrator, scraper, detector)
    }

    async fn agent_with_download(temp: &TempDir, content: &[u8]) -> MockAgent {
        let agent = MockAgent::new();
        let download_link = ScraperConfig::default().selectors.download_link;
        let path = temp.path().join("downloads").join("IBOVDia_28-07-25.csv");
        agent
            .drop_on_click(&download_link, path, content.to_vec())
            .await;
        agent
    }

    #[tokio::test]
    async fn test_complete_run_lands_both_artifacts() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, scraper, detector) = fast_configs(&temp);
        let agent = agent_with_download(&temp, b"Codigo;Part\nPETR4;3,456\nVALE3;5,1\n").await;

        let runner = AcquisitionRunner::new(
            orchestrator,
            scraper,
            detector,
            CsvParquetConverter::with_defaults(),
        );
        let outcome = runner.run(agent).await.unwrap();

        let partition = temp.path().join("lake/date=2025-07-28");
        match outcome {
            RunOutcome::Complete {
                raw_path,
                refined_path,
            } => {
                assert_eq!(raw_path, partition.join("IBOVDia_28-07-25.csv"));
                assert_eq!(refined_path, partition.join("IBOVDia_28-07-25.parquet"));
                assert!(raw_path.exists());
                assert!(refined_path.exists());
            }
            other => panic!("Expected complete outcome, got {:?}", other),
        }

        // Download dir no longer holds the moved file.
        assert!(!temp
            .path()
            .join("downloads/IBOVDia_28-07-25.csv")
            .exists());
    }

    #[tokio::test]
    async fn test_conversion_failure_is_partial() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, scraper, detector) = fast_configs(&temp);
        // Header-only payload: lands fine, converts to zero rows.
        let agent = agent_with_download(&temp, b"Codigo;Part\n").await;

        let runner = AcquisitionRunner::new(
            orchestrator,
            scraper,
            detector,
            CsvParquetConverter::with_defaults(),
        );
        let outcome = runner.run(agent).await.unwrap();

        match outcome {
            RunOutcome::Partial {
                raw_path,
                conversion_error,
            } => {
                // Raw artifact preserved for manual reprocessing.
                assert!(raw_path.exists());
                assert!(conversion_error.contains("No rows"));
            }
            other => panic!("Expected partial outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scrape_failure_is_total() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, mut scraper, detector) = fast_configs(&temp);
        scraper.download_deadline_secs = 0;

        let agent = MockAgent::new();
        let runner =
            AcquisitionRunner::new(orchestrator, scraper, detector, MockConverter::new());
        let result = runner.run(agent).await;

        assert!(matches!(result, Err(OrchestratorError::Scrape(_))));
        assert!(!temp.path().join("lake").exists());
    }

    #[tokio::test]
    async fn test_partition_fallback_uses_current_date() {
        let temp = TempDir::new().unwrap();
        let (orchestrator, scraper, mut detector) = fast_configs(&temp);
        // Keep the preferred-name tie-break out of the way.
        detector.preferred_substring = None;

        let agent = MockAgent::new();
        let download_link = ScraperConfig::default().selectors.download_link;
        agent
            .drop_on_click(
                &download_link,
                temp.path().join("downloads").join("listing.csv"),
                b"Codigo;Part\nPETR4;3,456\n".to_vec(),
            )
            .await;

        let runner = AcquisitionRunner::new(
            orchestrator,
            scraper,
            detector,
            CsvParquetConverter::with_defaults(),
        );
        let outcome = runner.run(agent).await.unwrap();

        let today = chrono::Utc::now().date_naive();
        let expected = temp
            .path()
            .join("lake")
            .join(format!("date={}", today.format("%Y-%m-%d")));
        assert!(outcome.raw_path().starts_with(&expected));
    }
}
