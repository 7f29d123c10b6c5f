//! Page interaction state machine.
//!
//! Drives the rendering agent through the index page's UI flow:
//! navigation, segment selection (with overlay recovery and retries), and
//! the download trigger, then hands off to the completion detector. One
//! `ScrapeSession` owns one rendering session; the agent is released on
//! every exit path.

mod config;
mod selectors;
mod session;
mod types;

pub use config::ScraperConfig;
pub use selectors::SelectorTable;
pub use session::ScrapeSession;
pub use types::{ScrapePhase, ScraperError};
