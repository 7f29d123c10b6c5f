use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::detector::DetectorConfig;
use crate::dispatcher::DispatcherConfig;
use crate::orchestrator::OrchestratorConfig;
use crate::scraper::ScraperConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: WebDriverConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// WebDriver endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebDriverConfig {
    /// Driver endpoint URL (chromedriver's default port).
    #[serde(default = "default_webdriver_url")]
    pub url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_webdriver_timeout")]
    pub timeout_secs: u32,

    /// Poll interval for element waits, in milliseconds.
    #[serde(default = "default_webdriver_poll_ms")]
    pub poll_interval_ms: u64,

    /// Run the browser without a display.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Directory the browser downloads into. Must agree with the
    /// orchestrator's download directory; the server wires them together.
    #[serde(default = "default_agent_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            url: default_webdriver_url(),
            timeout_secs: default_webdriver_timeout(),
            poll_interval_ms: default_webdriver_poll_ms(),
            headless: default_headless(),
            download_dir: default_agent_download_dir(),
        }
    }
}

fn default_webdriver_url() -> String {
    "http://127.0.0.1:9515".to_string()
}

fn default_webdriver_timeout() -> u32 {
    60
}

fn default_webdriver_poll_ms() -> u64 {
    500
}

fn default_headless() -> bool {
    true
}

fn default_agent_download_dir() -> PathBuf {
    PathBuf::from("data/downloads")
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub agent_url: String,
    pub page_url: String,
    pub download_dir: PathBuf,
    pub partition_root: PathBuf,
    pub job_name: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            agent_url: config.agent.url.clone(),
            page_url: config.scraper.url.clone(),
            download_dir: config.orchestrator.download_dir.clone(),
            partition_root: config.orchestrator.partition_root.clone(),
            job_name: config.dispatcher.job_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.agent.url, "http://127.0.0.1:9515");
        assert_eq!(config.scraper.menu_retries, 3);
        assert_eq!(config.detector.stable_reads, 3);
        assert_eq!(config.dispatcher.job_name, "bovespa-etl-job");
    }

    #[test]
    fn test_deserialize_with_sections() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[agent]
url = "http://selenium:4444"
headless = false

[orchestrator]
partition_root = "/srv/lake"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.agent.url, "http://selenium:4444");
        assert!(!config.agent.headless);
        assert_eq!(
            config.orchestrator.partition_root,
            PathBuf::from("/srv/lake")
        );
    }

    #[test]
    fn test_sanitized_config() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.server.port, 8080);
        assert_eq!(sanitized.job_name, "bovespa-etl-job");
        assert!(sanitized.page_url.contains("IBOV"));
    }
}
