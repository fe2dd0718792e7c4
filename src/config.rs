//! Environment-driven configuration.
//!
//! In containerized deployments all knobs arrive as environment
//! variables; the two most common ones can also be overridden on the
//! command line (see the binary).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

const DEFAULT_WORKERS: usize = 10;
const DEFAULT_START_URL: &str = "https://www.hollywoodreporter.com";
const DEFAULT_BATCH_SIZE: usize = 20;
const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(2);
const DEFAULT_USER_AGENT: &str = "MyLearningCrawler/1.0 (crawler@example.com)";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `DB_URL`, required: the app fails fast without a store.
    pub database_url: String,
    /// `WORKERS`, default 10.
    pub workers: usize,
    /// `START_URL`.
    pub start_url: String,
    /// `BATCH_SIZE`, default 20.
    pub batch_size: usize,
    /// `RATE_LIMIT`: per-host request spacing, e.g. `2s` or `500ms`.
    pub rate_limit: Duration,
    /// `USER_AGENT`: sent on every request; the product token before `/`
    /// is also the robots.txt matching token.
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DB_URL").context("DB_URL must be set")?;
        let workers = parse_var("WORKERS", DEFAULT_WORKERS)?;
        let start_url = env::var("START_URL").unwrap_or_else(|_| DEFAULT_START_URL.to_string());
        let batch_size = parse_var("BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        let rate_limit = match env::var("RATE_LIMIT") {
            Ok(raw) => parse_duration(&raw).context("invalid RATE_LIMIT")?,
            Err(_) => DEFAULT_RATE_LIMIT,
        };
        let user_agent = env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());

        if workers == 0 {
            bail!("WORKERS must be positive");
        }
        if batch_size == 0 {
            bail!("BATCH_SIZE must be positive");
        }

        Ok(Self {
            database_url,
            workers,
            start_url,
            batch_size,
            rate_limit,
            user_agent,
        })
    }
}

fn parse_var(name: &str, default: usize) -> Result<usize> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Parse `2s`, `500ms` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(ms) = raw.strip_suffix("ms") {
        let value: u64 = ms.trim().parse().context("duration is not a number")?;
        return Ok(Duration::from_millis(value));
    }
    if let Some(secs) = raw.strip_suffix('s') {
        let value: u64 = secs.trim().parse().context("duration is not a number")?;
        return Ok(Duration::from_secs(value));
    }
    let value: u64 = raw.parse().context("duration is not a number")?;
    Ok(Duration::from_secs(value))
}
