//! Configuration for the event dispatcher.

use serde::{Deserialize, Serialize};

/// Dispatcher settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatcherConfig {
    /// Downstream batch job to start per notification.
    #[serde(default = "default_job_name")]
    pub job_name: String,

    /// Base URL of the job-start API.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            job_name: default_job_name(),
            service_url: default_service_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_job_name() -> String {
    "bovespa-etl-job".to_string()
}

fn default_service_url() -> String {
    "http://127.0.0.1:8553".to_string()
}

fn default_timeout_secs() -> u32 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DispatcherConfig::default();
        assert_eq!(config.job_name, "bovespa-etl-job");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_job_name_override() {
        let toml = r#"
job_name = "custom-etl"
"#;
        let config: DispatcherConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.job_name, "custom-etl");
        assert_eq!(config.service_url, "http://127.0.0.1:8553");
    }
}
