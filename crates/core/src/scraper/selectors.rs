//! Selector lookup table for the index page.
//!
//! All structural selectors live here, keyed by logical role, so drift in
//! the page's markup is a single-table change rather than a hunt through
//! the interaction flow.

use serde::{Deserialize, Serialize};

/// CSS selectors for the page elements the flow interacts with.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SelectorTable {
    /// Element whose presence signals the page has rendered.
    #[serde(default = "default_page_anchor")]
    pub page_anchor: String,

    /// Segment selection control.
    #[serde(default = "default_segment_control")]
    pub segment_control: String,

    /// Fixed menu entry to select (second option, "Setor de Atuação").
    #[serde(default = "default_sector_option")]
    pub sector_option: String,

    /// Anchor that triggers the file download.
    #[serde(default = "default_download_link")]
    pub download_link: String,

    /// Overlay known to intercept clicks while animations run.
    #[serde(default = "default_blocking_overlay")]
    pub blocking_overlay: String,
}

impl Default for SelectorTable {
    fn default() -> Self {
        Self {
            page_anchor: default_page_anchor(),
            segment_control: default_segment_control(),
            sector_option: default_sector_option(),
            download_link: default_download_link(),
            blocking_overlay: default_blocking_overlay(),
        }
    }
}

fn default_page_anchor() -> String {
    "#segment".to_string()
}

fn default_segment_control() -> String {
    "#segment".to_string()
}

fn default_sector_option() -> String {
    "#segment option:nth-child(2)".to_string()
}

fn default_download_link() -> String {
    "#divContainerIframeB3 form p a".to_string()
}

fn default_blocking_overlay() -> String {
    ".backdrop".to_string()
}
