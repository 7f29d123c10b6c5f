//! Downstream job-start API client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::config::DispatcherConfig;
use super::types::JobRunnerError;

/// Trait for starting downstream batch jobs.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Start one run of the named job, returning its run identifier.
    async fn start_job(
        &self,
        job_name: &str,
        arguments: HashMap<String, String>,
    ) -> Result<String, JobRunnerError>;
}

#[derive(Debug, Deserialize)]
struct StartJobResponse {
    #[serde(rename = "runId")]
    run_id: String,
}

/// HTTP implementation against the job service's REST surface.
pub struct HttpJobRunner {
    client: Client,
    config: DispatcherConfig,
}

impl HttpJobRunner {
    pub fn new(config: DispatcherConfig) -> Result<Self, JobRunnerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| JobRunnerError::ConnectionFailed(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.service_url.trim_end_matches('/')
    }
}

#[async_trait]
impl JobRunner for HttpJobRunner {
    fn name(&self) -> &str {
        "http"
    }

    async fn start_job(
        &self,
        job_name: &str,
        arguments: HashMap<String, String>,
    ) -> Result<String, JobRunnerError> {
        let url = format!("{}/jobs/{}/runs", self.base_url(), job_name);
        debug!("Starting job {} with {} arguments", job_name, arguments.len());

        let response = self
            .client
            .post(&url)
            .json(&json!({ "arguments": arguments }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    JobRunnerError::Timeout
                } else if e.is_connect() {
                    JobRunnerError::ConnectionFailed(e.to_string())
                } else {
                    JobRunnerError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(JobRunnerError::JobNotFound(job_name.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobRunnerError::ApiError(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: StartJobResponse = response
            .json()
            .await
            .map_err(|e| JobRunnerError::ApiError(e.to_string()))?;
        Ok(parsed.run_id)
    }
}
