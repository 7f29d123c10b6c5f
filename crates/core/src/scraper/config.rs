//! Configuration for the page interaction state machine.

use serde::{Deserialize, Serialize};

use super::selectors::SelectorTable;

/// Scraper tuning knobs.
///
/// The page offers no generalized ready signal, so the settle delay and
/// retry backoff are explicit configuration instead of inline constants.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Index page URL.
    #[serde(default = "default_url")]
    pub url: String,

    /// Structural selectors, keyed by logical role.
    #[serde(default)]
    pub selectors: SelectorTable,

    /// Page load timeout (wait for the anchor element), in seconds.
    #[serde(default = "default_page_load_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// Wait for the sector menu option, in seconds.
    #[serde(default = "default_option_timeout_secs")]
    pub option_timeout_secs: u64,

    /// Wait for the download anchor, in seconds.
    #[serde(default = "default_download_link_timeout_secs")]
    pub download_link_timeout_secs: u64,

    /// Attempts at opening the segment menu before giving up.
    #[serde(default = "default_menu_retries")]
    pub menu_retries: u32,

    /// Backoff between segment menu attempts, in milliseconds.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Delay after selecting the sector option, allowing the page's own
    /// asynchronous re-render to finish, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Deadline for the download to complete, in seconds.
    #[serde(default = "default_download_deadline_secs")]
    pub download_deadline_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            selectors: SelectorTable::default(),
            page_load_timeout_secs: default_page_load_timeout_secs(),
            option_timeout_secs: default_option_timeout_secs(),
            download_link_timeout_secs: default_download_link_timeout_secs(),
            menu_retries: default_menu_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            download_deadline_secs: default_download_deadline_secs(),
        }
    }
}

fn default_url() -> String {
    "https://sistemaswebb3-listados.b3.com.br/indexPage/day/IBOV?language=pt-br".to_string()
}

fn default_page_load_timeout_secs() -> u64 {
    30
}

fn default_option_timeout_secs() -> u64 {
    20
}

fn default_download_link_timeout_secs() -> u64 {
    30
}

fn default_menu_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    2000
}

fn default_settle_delay_ms() -> u64 {
    3000
}

fn default_download_deadline_secs() -> u64 {
    300
}
