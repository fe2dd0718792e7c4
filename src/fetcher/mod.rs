//! Two-tier page fetching.
//!
//! [`static_client`] is the cheap path: a plain GET with a short deadline.
//! [`decision`] classifies the static response; hosts that need JavaScript
//! escalate to [`dynamic`], which renders the page in a headless Chromium
//! with the stealth and human-jitter behaviors bot walls look for.

pub mod browser;
pub mod decision;
pub mod dynamic;
pub mod js_scripts;
pub mod profiles;
pub mod static_client;

use std::time::Duration;
use thiserror::Error;

/// Failures from either fetch tier.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("dynamic fetch timed out after {0:?}")]
    Timeout(Duration),
}
