//! Mock rendering agent for testing.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::agent::{AgentError, ElementHandle, RenderingAgent};
use crate::scraper::SelectorTable;

/// Mock implementation of the `RenderingAgent` trait.
///
/// Controllable behavior for testing the interaction flow:
/// - mark selectors missing (waits fail immediately instead of sleeping)
/// - script N intercepted clicks per selector, for both the standard and
///   the script-click path
/// - drop a file into a directory when a selector is clicked, simulating
///   the browser download
/// - count clicks, script clicks, overlay hides and screenshots
///
/// Clones share state, so tests can keep a handle after moving the agent
/// into a session.
#[derive(Clone)]
pub struct MockAgent {
    inner: Arc<Inner>,
}

struct Inner {
    missing: RwLock<HashSet<String>>,
    click_failures: RwLock<HashMap<String, u32>>,
    script_click_failures: RwLock<HashMap<String, u32>>,
    click_counts: RwLock<HashMap<String, u32>>,
    script_click_counts: RwLock<HashMap<String, u32>>,
    overlay_hides: RwLock<u32>,
    drops: RwLock<HashMap<String, (PathBuf, Vec<u8>)>>,
    navigations: RwLock<Vec<String>>,
    screenshots: RwLock<u32>,
    closed: RwLock<bool>,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgent {
    /// Create a mock agent where every selector resolves, except the
    /// default blocking overlay (absent until `set_overlay_present`).
    pub fn new() -> Self {
        let mut missing = HashSet::new();
        missing.insert(SelectorTable::default().blocking_overlay);

        Self {
            inner: Arc::new(Inner {
                missing: RwLock::new(missing),
                click_failures: RwLock::new(HashMap::new()),
                script_click_failures: RwLock::new(HashMap::new()),
                click_counts: RwLock::new(HashMap::new()),
                script_click_counts: RwLock::new(HashMap::new()),
                overlay_hides: RwLock::new(0),
                drops: RwLock::new(HashMap::new()),
                navigations: RwLock::new(Vec::new()),
                screenshots: RwLock::new(0),
                closed: RwLock::new(false),
            }),
        }
    }

    /// Mark a selector as absent from the page.
    pub async fn set_missing(&self, selector: &str) {
        self.inner.missing.write().await.insert(selector.to_string());
    }

    /// Make the default blocking overlay present or absent.
    pub async fn set_overlay_present(&self, present: bool) {
        let overlay = SelectorTable::default().blocking_overlay;
        let mut missing = self.inner.missing.write().await;
        if present {
            missing.remove(&overlay);
        } else {
            missing.insert(overlay);
        }
    }

    /// The next `count` standard clicks on `selector` are intercepted.
    pub async fn fail_clicks(&self, selector: &str, count: u32) {
        self.inner
            .click_failures
            .write()
            .await
            .insert(selector.to_string(), count);
    }

    /// The next `count` script clicks on `selector` fail as well.
    pub async fn fail_script_clicks(&self, selector: &str, count: u32) {
        self.inner
            .script_click_failures
            .write()
            .await
            .insert(selector.to_string(), count);
    }

    /// Write `content` to `path` when `selector` is successfully clicked.
    pub async fn drop_on_click(&self, selector: &str, path: PathBuf, content: Vec<u8>) {
        self.inner
            .drops
            .write()
            .await
            .insert(selector.to_string(), (path, content));
    }

    pub async fn click_count(&self, selector: &str) -> u32 {
        *self
            .inner
            .click_counts
            .read()
            .await
            .get(selector)
            .unwrap_or(&0)
    }

    pub async fn script_click_count(&self, selector: &str) -> u32 {
        *self
            .inner
            .script_click_counts
            .read()
            .await
            .get(selector)
            .unwrap_or(&0)
    }

    pub async fn overlay_hide_count(&self) -> u32 {
        *self.inner.overlay_hides.read().await
    }

    pub async fn screenshot_count(&self) -> u32 {
        *self.inner.screenshots.read().await
    }

    pub async fn navigations(&self) -> Vec<String> {
        self.inner.navigations.read().await.clone()
    }

    pub async fn closed(&self) -> bool {
        *self.inner.closed.read().await
    }

    async fn write_drop(&self, selector: &str) -> Result<(), AgentError> {
        let drops = self.inner.drops.read().await;
        if let Some((path, content)) = drops.get(selector) {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AgentError::ApiError(e.to_string()))?;
            }
            tokio::fs::write(path, content)
                .await
                .map_err(|e| AgentError::ApiError(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl RenderingAgent for MockAgent {
    fn name(&self) -> &str {
        "mock"
    }

    async fn navigate(&self, url: &str) -> Result<(), AgentError> {
        self.inner.navigations.write().await.push(url.to_string());
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<ElementHandle, AgentError> {
        if self.inner.missing.read().await.contains(selector) {
            return Err(AgentError::ElementNotFound(selector.to_string()));
        }
        Ok(ElementHandle::new(selector))
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, AgentError> {
        // Missing elements fail fast instead of burning test wall-clock.
        if self.inner.missing.read().await.contains(selector) {
            return Err(AgentError::WaitTimeout {
                selector: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            });
        }
        Ok(ElementHandle::new(selector))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), AgentError> {
        let selector = element.id.clone();
        *self
            .inner
            .click_counts
            .write()
            .await
            .entry(selector.clone())
            .or_insert(0) += 1;

        {
            let mut failures = self.inner.click_failures.write().await;
            if let Some(remaining) = failures.get_mut(&selector) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(AgentError::ClickIntercepted(format!(
                        "element {} is obscured",
                        selector
                    )));
                }
            }
        }

        self.write_drop(&selector).await
    }

    async fn execute_script(
        &self,
        script: &str,
        element: Option<&ElementHandle>,
    ) -> Result<(), AgentError> {
        if script.contains("style.display") {
            *self.inner.overlay_hides.write().await += 1;
            return Ok(());
        }

        if script.contains(".click()") {
            let selector = element
                .map(|e| e.id.clone())
                .ok_or_else(|| AgentError::ScriptFailed("no element argument".to_string()))?;

            *self
                .inner
                .script_click_counts
                .write()
                .await
                .entry(selector.clone())
                .or_insert(0) += 1;

            {
                let mut failures = self.inner.script_click_failures.write().await;
                if let Some(remaining) = failures.get_mut(&selector) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(AgentError::ScriptFailed(format!(
                            "script click on {} failed",
                            selector
                        )));
                    }
                }
            }

            return self.write_drop(&selector).await;
        }

        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, AgentError> {
        *self.inner.screenshots.write().await += 1;
        // PNG magic followed by nothing useful; enough for a file to exist.
        Ok(vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
    }

    async fn close(&self) -> Result<(), AgentError> {
        *self.inner.closed.write().await = true;
        Ok(())
    }
}
