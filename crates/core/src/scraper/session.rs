//! Scrape session implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::agent::{AgentError, RenderingAgent};
use crate::detector::DownloadWatcher;

use super::config::ScraperConfig;
use super::types::{ScrapePhase, ScraperError};

/// Script used as the lower-level click path when hit-testing reports the
/// control as obscured.
const SCRIPT_CLICK: &str = "arguments[0].click();";

/// Script that hides a blocking overlay element.
const SCRIPT_HIDE_OVERLAY: &str = "arguments[0].style.display = 'none';";

/// One end-to-end interaction with the index page.
///
/// The session owns its rendering agent exclusively and releases it on
/// every exit path, success or failure.
pub struct ScrapeSession<A: RenderingAgent> {
    agent: A,
    config: ScraperConfig,
    watcher: DownloadWatcher,
    phase: ScrapePhase,
}

impl<A: RenderingAgent> ScrapeSession<A> {
    pub fn new(agent: A, config: ScraperConfig, watcher: DownloadWatcher) -> Self {
        Self {
            agent,
            config,
            watcher,
            phase: ScrapePhase::Idle,
        }
    }

    /// Drive the page flow until a download completes in `download_dir`.
    ///
    /// On failure a best-effort screenshot is written into `work_dir`
    /// before the originating error is surfaced.
    pub async fn acquire(
        mut self,
        download_dir: &Path,
        work_dir: &Path,
    ) -> Result<PathBuf, ScraperError> {
        let result = self.drive(download_dir).await;

        match &result {
            Ok(path) => {
                self.advance(ScrapePhase::DownloadComplete);
                info!("Scrape session complete: {}", path.display());
            }
            Err(e) => {
                error!("Scrape failed during {}: {}", self.phase.as_str(), e);
                self.capture_failure_screenshot(work_dir).await;
                self.advance(ScrapePhase::Failed);
            }
        }

        if let Err(e) = self.agent.close().await {
            warn!("Failed to release rendering session: {}", e);
        }

        result
    }

    async fn drive(&mut self, download_dir: &Path) -> Result<PathBuf, ScraperError> {
        let selectors = self.config.selectors.clone();

        info!("Navigating to {}", self.config.url);
        self.agent.navigate(&self.config.url).await?;
        self.agent
            .wait_for(
                &selectors.page_anchor,
                Duration::from_secs(self.config.page_load_timeout_secs),
            )
            .await
            .map_err(|e| match e {
                AgentError::WaitTimeout { selector, .. } => {
                    ScraperError::NavigationTimeout { selector }
                }
                other => ScraperError::Agent(other),
            })?;
        self.advance(ScrapePhase::Navigated);

        self.open_segment_menu().await?;

        let option = self
            .agent
            .wait_for(
                &selectors.sector_option,
                Duration::from_secs(self.config.option_timeout_secs),
            )
            .await?;
        self.agent.click(&option).await?;
        self.advance(ScrapePhase::SegmentSelected);

        // The page re-renders asynchronously after the selection; there is
        // no ready signal to wait on, only this settle delay.
        tokio::time::sleep(Duration::from_millis(self.config.settle_delay_ms)).await;

        let link = self
            .agent
            .wait_for(
                &selectors.download_link,
                Duration::from_secs(self.config.download_link_timeout_secs),
            )
            .await?;

        // Snapshot must be taken before the click so only files appearing
        // afterwards count as the download.
        let preexisting = DownloadWatcher::snapshot(download_dir).await?;
        debug!("Pre-download snapshot: {} files", preexisting.len());

        self.agent.click(&link).await?;
        self.advance(ScrapePhase::DownloadTriggered);
        info!(
            "Download triggered, waiting up to {}s for completion",
            self.config.download_deadline_secs
        );

        let path = self
            .watcher
            .wait_for_download(
                download_dir,
                &preexisting,
                Duration::from_secs(self.config.download_deadline_secs),
            )
            .await?;

        Ok(path)
    }

    /// Open the segment menu, recovering from overlay-obscured clicks.
    async fn open_segment_menu(&mut self) -> Result<(), ScraperError> {
        let attempts = self.config.menu_retries;

        for attempt in 1..=attempts {
            debug!("Attempt {}/{} to open segment menu", attempt, attempts);
            match self.try_open_menu().await {
                Ok(()) => {
                    self.advance(ScrapePhase::SegmentMenuOpen);
                    return Ok(());
                }
                Err(e) => warn!("Segment menu attempt {} failed: {}", attempt, e),
            }

            self.dismiss_overlay().await;
            tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
        }

        Err(ScraperError::InteractionBlocked { attempts })
    }

    /// One attempt at clicking the segment control, falling back to a
    /// direct script invocation when the click is intercepted.
    async fn try_open_menu(&self) -> Result<(), AgentError> {
        let control = self
            .agent
            .wait_for(
                &self.config.selectors.segment_control,
                Duration::from_secs(self.config.page_load_timeout_secs),
            )
            .await?;

        match self.agent.click(&control).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_intercepted() => {
                warn!("Standard click intercepted, retrying via script click");
                self.agent.execute_script(SCRIPT_CLICK, Some(&control)).await
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort probe for the known blocking overlay; absence is fine.
    async fn dismiss_overlay(&self) {
        match self.agent.find(&self.config.selectors.blocking_overlay).await {
            Ok(overlay) => {
                match self
                    .agent
                    .execute_script(SCRIPT_HIDE_OVERLAY, Some(&overlay))
                    .await
                {
                    Ok(()) => info!("Blocking overlay hidden"),
                    Err(e) => debug!("Overlay hide failed: {}", e),
                }
            }
            Err(_) => {
                // No overlay present.
            }
        }
    }

    /// Capture a diagnostic screenshot; failure never masks the original
    /// error.
    async fn capture_failure_screenshot(&self, work_dir: &Path) {
        match self.agent.screenshot().await {
            Ok(png) => {
                let path = work_dir.join("error_screenshot.png");
                match tokio::fs::write(&path, png).await {
                    Ok(()) => info!("Failure screenshot saved to {}", path.display()),
                    Err(e) => warn!("Failed to write failure screenshot: {}", e),
                }
            }
            Err(e) => warn!("Failed to capture failure screenshot: {}", e),
        }
    }

    fn advance(&mut self, to: ScrapePhase) {
        debug!("Phase: {} -> {}", self.phase.as_str(), to.as_str());
        self.phase = to;
    }
}
