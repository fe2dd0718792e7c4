//! Per-host robots.txt cache.
//!
//! The first query for a host fetches and caches its robots.txt. The
//! fetch happens with no lock held on the cache; the result is committed
//! through `DashMap::entry(..).or_insert(..)`, so when two first-callers
//! race, the winner's value sticks and both observe the same verdict.

use dashmap::DashMap;
use robotstxt::DefaultMatcher;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use crate::urlutil::host_of;

/// Cached verdict source for one host.
///
/// `AllowAll` is the sentinel for "no robots.txt / fetch failed / not
/// 2xx": it is distinct from an empty rules body and means every path is
/// allowed.
#[derive(Debug, Clone)]
pub enum RobotsEntry {
    AllowAll,
    Rules(Arc<String>),
}

pub struct RobotsCache {
    client: reqwest::Client,
    agent_token: String,
    cache: DashMap<String, RobotsEntry>,
}

impl RobotsCache {
    #[must_use]
    pub fn new(client: reqwest::Client, agent_token: &str) -> Self {
        Self {
            client,
            agent_token: agent_token.to_string(),
            cache: DashMap::new(),
        }
    }

    /// True when no applicable rule disallows the URL. Unparseable URLs
    /// are refused outright; fetch failures fail open.
    pub async fn is_allowed(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = host_of(url) else {
            return false;
        };

        if let Some(entry) = self.cache.get(&host) {
            return self.check(entry.value(), url);
        }

        // First query for this host. Fetch outside any cache lock, then
        // commit; a concurrent winner's entry takes precedence.
        let fetched = self.fetch(parsed.scheme(), &host).await;
        let entry = self.cache.entry(host).or_insert(fetched);
        self.check(entry.value(), url)
    }

    async fn fetch(&self, scheme: &str, host: &str) -> RobotsEntry {
        let robots_url = format!("{scheme}://{host}/robots.txt");
        match self.client.get(&robots_url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => {
                    debug!(host, bytes = body.len(), "cached robots.txt");
                    RobotsEntry::Rules(Arc::new(body))
                }
                Err(e) => {
                    warn!(host, error = %e, "failed reading robots.txt body, allowing all");
                    RobotsEntry::AllowAll
                }
            },
            Ok(resp) => {
                debug!(host, status = %resp.status(), "no usable robots.txt, allowing all");
                RobotsEntry::AllowAll
            }
            Err(e) => {
                debug!(host, error = %e, "robots.txt fetch failed, allowing all");
                RobotsEntry::AllowAll
            }
        }
    }

    fn check(&self, entry: &RobotsEntry, url: &str) -> bool {
        match entry {
            RobotsEntry::AllowAll => true,
            RobotsEntry::Rules(body) => DefaultMatcher::default()
                .one_agent_allowed_by_robots(body, &self.agent_token, url),
        }
    }
}
