//! Types for rendering agent operations.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while driving the rendering agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Session could not be created: {0}")]
    SessionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("No element matched selector: {0}")]
    ElementNotFound(String),

    #[error("Timed out after {timeout_secs}s waiting for element: {selector}")]
    WaitTimeout { selector: String, timeout_secs: u64 },

    #[error("Click intercepted by another element: {0}")]
    ClickIntercepted(String),

    #[error("Script execution failed: {0}")]
    ScriptFailed(String),

    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Agent API error: {0}")]
    ApiError(String),
}

impl AgentError {
    /// Whether this error is the overlay/obscured-control case that the
    /// interaction retry path is designed to recover from.
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Self::ClickIntercepted(_))
    }
}

/// Opaque handle to an element located on the rendered page.
///
/// The identifier is backend-specific and only meaningful for the agent
/// session that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    pub id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Trait for page-rendering backends.
///
/// One agent instance owns exactly one rendering session; the session is
/// released by `close`, which must be safe to call on every exit path.
#[async_trait]
pub trait RenderingAgent: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Load the given URL and block until the navigation settles.
    async fn navigate(&self, url: &str) -> Result<(), AgentError>;

    /// Locate an element by CSS selector without waiting.
    async fn find(&self, selector: &str) -> Result<ElementHandle, AgentError>;

    /// Poll for an element until it is present or the timeout elapses.
    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, AgentError>;

    /// Click a previously located element through normal hit-testing.
    async fn click(&self, element: &ElementHandle) -> Result<(), AgentError>;

    /// Execute a script, optionally passing an element as `arguments[0]`.
    ///
    /// This is the lower-level invocation path used to click controls that
    /// normal hit-testing reports as obscured, and to hide overlays.
    async fn execute_script(
        &self,
        script: &str,
        element: Option<&ElementHandle>,
    ) -> Result<(), AgentError>;

    /// Capture a PNG screenshot of the current page.
    async fn screenshot(&self) -> Result<Vec<u8>, AgentError>;

    /// Release the rendering session.
    async fn close(&self) -> Result<(), AgentError>;
}
