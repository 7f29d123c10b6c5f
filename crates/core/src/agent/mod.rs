//! Rendering agent abstraction.
//!
//! This module provides a `RenderingAgent` trait for driving an external
//! page-rendering backend (navigation, element waits, clicks, script
//! execution). The acquisition pipeline depends only on this capability
//! set, not on any specific backend.

mod types;
mod webdriver;

pub use types::*;
pub use webdriver::WebDriverAgent;
