//! Data models shared across the crawl pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Snapshot of one fetched page: metadata, visible text and outbound links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageData {
    pub url: String,
    pub title: String,
    pub text_content: String,
    pub status_code: u16,
    pub load_time: Duration,
    pub outbound_links: Vec<String>,
}

/// A product-detail URL destined for downstream per-site scraping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlQueueItem {
    pub url: String,
    pub domain: String,
}

/// Sites the product filter knows how to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    None,
    Amazon,
    Newegg,
    BestBuy,
}

impl DataSource {
    /// Classify a URL by its host.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let Some(host) = crate::urlutil::host_of(url) else {
            return Self::None;
        };
        if host.contains("amazon.") {
            Self::Amazon
        } else if host.contains("newegg.") {
            Self::Newegg
        } else if host.contains("bestbuy.") {
            Self::BestBuy
        } else {
            Self::None
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amazon => write!(f, "Amazon"),
            Self::Newegg => write!(f, "Newegg"),
            Self::BestBuy => write!(f, "BestBuy"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_hosts() {
        assert_eq!(
            DataSource::from_url("https://www.amazon.com/dp/B08N5WRWNW"),
            DataSource::Amazon
        );
        assert_eq!(
            DataSource::from_url("https://www.newegg.com/p/N82E16820236783"),
            DataSource::Newegg
        );
        assert_eq!(
            DataSource::from_url("https://www.bestbuy.com/site/6418599.p"),
            DataSource::BestBuy
        );
        assert_eq!(DataSource::from_url("https://example.com"), DataSource::None);
        assert_eq!(DataSource::from_url("not a url"), DataSource::None);
    }
}
