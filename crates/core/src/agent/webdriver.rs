//! WebDriver rendering agent implementation.
//!
//! Speaks the W3C WebDriver wire protocol over HTTP against a driver
//! endpoint (chromedriver, geckodriver, a Selenium grid node). Only the
//! handful of endpoints the acquisition flow needs are implemented.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::WebDriverConfig;

use super::{AgentError, ElementHandle, RenderingAgent};

/// W3C element identifier key in protocol responses.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// WebDriver protocol client.
pub struct WebDriverAgent {
    client: Client,
    config: WebDriverConfig,
    /// Active session id (created lazily, cleared on close).
    session: Arc<RwLock<Option<String>>>,
}

impl WebDriverAgent {
    /// Create a new agent against the configured driver endpoint.
    pub fn new(config: WebDriverConfig) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| AgentError::SessionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        })
    }

    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    /// Capabilities payload for session creation.
    ///
    /// Headless mode and the download directory preference mirror what the
    /// page flow needs: downloads must land in the watched directory
    /// without a prompt.
    fn capabilities(&self) -> Value {
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
        ];
        if self.config.headless {
            args.push("--headless".to_string());
        }

        json!({
            "capabilities": {
                "alwaysMatch": {
                    "goog:chromeOptions": {
                        "args": args,
                        "prefs": {
                            "download.default_directory": self.config.download_dir,
                            "download.prompt_for_download": false,
                            "download.directory_upgrade": true,
                        }
                    }
                }
            }
        })
    }

    /// Map a protocol-level error payload to an `AgentError`.
    fn protocol_error(value: &Value) -> AgentError {
        let error = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        match error {
            "element click intercepted" => AgentError::ClickIntercepted(message),
            "no such element" => AgentError::ElementNotFound(message),
            "timeout" | "script timeout" => AgentError::Timeout,
            _ => AgentError::ApiError(format!("{}: {}", error, message)),
        }
    }

    /// Issue a request and unwrap the protocol `value` envelope.
    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AgentError> {
        let url = format!("{}{}", self.base_url(), path);
        let mut req = self.client.request(method, &url);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                AgentError::Timeout
            } else {
                AgentError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AgentError::ApiError(e.to_string()))?;

        let value = payload.get("value").cloned().unwrap_or(Value::Null);
        if !status.is_success() {
            return Err(Self::protocol_error(&value));
        }
        Ok(value)
    }

    /// Session id, creating the session on first use.
    async fn ensure_session(&self) -> Result<String, AgentError> {
        {
            let session = self.session.read().await;
            if let Some(ref id) = *session {
                return Ok(id.clone());
            }
        }

        let value = self
            .request(reqwest::Method::POST, "/session", Some(self.capabilities()))
            .await?;

        let id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AgentError::SessionFailed("no sessionId in driver response".to_string())
            })?
            .to_string();

        debug!("WebDriver session created: {}", id);
        let mut session = self.session.write().await;
        *session = Some(id.clone());
        Ok(id)
    }

    fn element_from_value(selector: &str, value: &Value) -> Result<ElementHandle, AgentError> {
        value
            .get(ELEMENT_KEY)
            .and_then(Value::as_str)
            .map(ElementHandle::new)
            .ok_or_else(|| AgentError::ElementNotFound(selector.to_string()))
    }
}

#[async_trait]
impl RenderingAgent for WebDriverAgent {
    fn name(&self) -> &str {
        "webdriver"
    }

    async fn navigate(&self, url: &str) -> Result<(), AgentError> {
        let session = self.ensure_session().await?;
        self.request(
            reqwest::Method::POST,
            &format!("/session/{}/url", session),
            Some(json!({ "url": url })),
        )
        .await
        .map_err(|e| match e {
            AgentError::ApiError(msg) => AgentError::NavigationFailed(msg),
            other => other,
        })?;
        Ok(())
    }

    async fn find(&self, selector: &str) -> Result<ElementHandle, AgentError> {
        let session = self.ensure_session().await?;
        let value = self
            .request(
                reqwest::Method::POST,
                &format!("/session/{}/element", session),
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        Self::element_from_value(selector, &value)
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, AgentError> {
        let deadline = tokio::time::Instant::now() + timeout;
        let poll = Duration::from_millis(self.config.poll_interval_ms);

        loop {
            match self.find(selector).await {
                Ok(element) => return Ok(element),
                Err(AgentError::ElementNotFound(_)) => {
                    if tokio::time::Instant::now() >= deadline {
                        return Err(AgentError::WaitTimeout {
                            selector: selector.to_string(),
                            timeout_secs: timeout.as_secs(),
                        });
                    }
                    tokio::time::sleep(poll).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), AgentError> {
        let session = self.ensure_session().await?;
        self.request(
            reqwest::Method::POST,
            &format!("/session/{}/element/{}/click", session, element.id),
            Some(json!({})),
        )
        .await?;
        Ok(())
    }

    async fn execute_script(
        &self,
        script: &str,
        element: Option<&ElementHandle>,
    ) -> Result<(), AgentError> {
        let session = self.ensure_session().await?;

        let args = match element {
            Some(e) => json!([{ ELEMENT_KEY: e.id }]),
            None => json!([]),
        };

        self.request(
            reqwest::Method::POST,
            &format!("/session/{}/execute/sync", session),
            Some(json!({ "script": script, "args": args })),
        )
        .await
        .map_err(|e| match e {
            AgentError::ApiError(msg) => AgentError::ScriptFailed(msg),
            other => other,
        })?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, AgentError> {
        let session = self.ensure_session().await?;
        let value = self
            .request(
                reqwest::Method::GET,
                &format!("/session/{}/screenshot", session),
                None,
            )
            .await
            .map_err(|e| AgentError::ScreenshotFailed(e.to_string()))?;

        let encoded = value
            .as_str()
            .ok_or_else(|| AgentError::ScreenshotFailed("non-string payload".to_string()))?;

        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| AgentError::ScreenshotFailed(e.to_string()))
    }

    async fn close(&self) -> Result<(), AgentError> {
        let id = {
            let mut session = self.session.write().await;
            session.take()
        };

        if let Some(id) = id {
            if let Err(e) = self
                .request(reqwest::Method::DELETE, &format!("/session/{}", id), None)
                .await
            {
                warn!("Failed to delete WebDriver session {}: {}", id, e);
                return Err(e);
            }
            debug!("WebDriver session deleted: {}", id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_mapping() {
        let intercepted = json!({
            "error": "element click intercepted",
            "message": "Element <select id=\"segment\"> is not clickable"
        });
        assert!(matches!(
            WebDriverAgent::protocol_error(&intercepted),
            AgentError::ClickIntercepted(_)
        ));

        let missing = json!({ "error": "no such element", "message": "..." });
        assert!(matches!(
            WebDriverAgent::protocol_error(&missing),
            AgentError::ElementNotFound(_)
        ));

        let timeout = json!({ "error": "timeout", "message": "..." });
        assert!(matches!(
            WebDriverAgent::protocol_error(&timeout),
            AgentError::Timeout
        ));

        let other = json!({ "error": "invalid session id", "message": "gone" });
        assert!(matches!(
            WebDriverAgent::protocol_error(&other),
            AgentError::ApiError(_)
        ));
    }

    #[test]
    fn test_element_from_value() {
        let value = json!({ ELEMENT_KEY: "elem-7" });
        let handle = WebDriverAgent::element_from_value("#segment", &value).unwrap();
        assert_eq!(handle.id, "elem-7");

        let empty = json!({});
        assert!(matches!(
            WebDriverAgent::element_from_value("#segment", &empty),
            Err(AgentError::ElementNotFound(_))
        ));
    }
}
