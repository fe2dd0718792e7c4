//! Fetch arbitration: static first, browser when the host demands it.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain_manager::DomainManager;
use crate::extractor::{extract, extract_outbound_links};
use crate::fetcher::FetchError;
use crate::fetcher::decision::{FetchAction, decide_action};
use crate::fetcher::dynamic::DynamicFetcher;
use crate::fetcher::static_client::StaticFetcher;
use crate::models::PageData;

/// Composes fetch + decision + extraction into one `parse` call.
///
/// Shares the [`DomainManager`] with the engine so the sticky dynamic
/// flags it sets are visible to every worker.
pub struct Parser<D> {
    static_fetcher: StaticFetcher,
    dynamic: D,
    domains: Arc<DomainManager>,
}

impl<D: DynamicFetcher> Parser<D> {
    pub fn new(static_fetcher: StaticFetcher, dynamic: D, domains: Arc<DomainManager>) -> Self {
        Self {
            static_fetcher,
            dynamic,
            domains,
        }
    }

    /// Fetch `url` through the cheapest tier that yields usable HTML and
    /// extract the page snapshot. `load_time` covers the whole
    /// arbitration, not just the winning fetch.
    pub async fn parse(&self, url: &str) -> Result<PageData, FetchError> {
        let start = Instant::now();

        let (html, status_code) = if self.domains.needs_dynamic(url) {
            debug!(url, "host flagged dynamic, skipping static attempt");
            (self.dynamic.fetch(url).await?, 200)
        } else {
            let response = self.static_fetcher.get(url).await?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(FetchError::Http)?;

            match decide_action(&body, status) {
                FetchAction::UseStatic => {
                    (String::from_utf8_lossy(&body).into_owned(), status)
                }
                FetchAction::MarkDynamic => {
                    info!(url, "static response is a JavaScript wall, marking host dynamic");
                    self.domains.mark_dynamic(url);
                    (self.dynamic.fetch(url).await?, 200)
                }
                FetchAction::RetryOneOff => {
                    debug!(url, body_len = body.len(), "static body too small, one-off dynamic retry");
                    (self.dynamic.fetch(url).await?, 200)
                }
            }
        };

        let mut data = extract(&html, url);
        data.status_code = status_code;
        data.load_time = start.elapsed();
        Ok(data)
    }

    /// Link-only fast path over a static fetch; used by the scout.
    pub async fn outbound_links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        let response = self.static_fetcher.get(url).await?;
        let body = response.bytes().await.map_err(FetchError::Http)?;
        let html = String::from_utf8_lossy(&body);
        Ok(extract_outbound_links(&html, url))
    }
}
