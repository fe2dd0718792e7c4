//! Per-host politeness: robots.txt verdicts, request spacing and the
//! sticky JavaScript-required flags.
//!
//! All three caches are keyed by the lowercased authority of the URL and
//! are created lazily on first use; they live until process exit.

pub mod rate_limiter;
pub mod robots;

use anyhow::{Context, Result};
use dashmap::DashSet;
use std::time::Duration;

use crate::urlutil::host_of;
use rate_limiter::RateLimiterMap;
use robots::RobotsCache;

/// Robots.txt fetches share the static fetch deadline.
const ROBOTS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Gatekeeper every worker consults before touching a host.
pub struct DomainManager {
    robots: RobotsCache,
    limiters: RateLimiterMap,
    dynamic_hosts: DashSet<String>,
}

impl DomainManager {
    /// `user_agent` is the full header value; the robots matcher uses its
    /// product token (the part before `/`). `fire_delay` is the per-host
    /// token-bucket refill interval.
    pub fn new(user_agent: &str, fire_delay: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(ROBOTS_FETCH_TIMEOUT)
            .build()
            .context("failed to build robots.txt client")?;
        let agent_token = user_agent.split('/').next().unwrap_or(user_agent);

        Ok(Self {
            robots: RobotsCache::new(client, agent_token),
            limiters: RateLimiterMap::new(fire_delay),
            dynamic_hosts: DashSet::new(),
        })
    }

    /// Block until the host's token bucket permits another request.
    ///
    /// Limiter lookup/creation holds the map entry only briefly; the wait
    /// itself happens outside it, so other hosts are never stalled.
    pub async fn wait(&self, url: &str) {
        let Some(host) = host_of(url) else { return };
        let limiter = self.limiters.limiter(&host);
        limiter.acquire().await;
    }

    /// True when no applicable robots.txt rule disallows the URL's path.
    ///
    /// First query for a host fetches `scheme://host/robots.txt`; any
    /// network error, non-2xx status or parse failure is cached as
    /// allow-all for that host (fail-open). Unparseable URLs are refused.
    pub async fn is_allowed(&self, url: &str) -> bool {
        self.robots.is_allowed(url).await
    }

    /// Whether the URL's host is known to require JavaScript rendering.
    #[must_use]
    pub fn needs_dynamic(&self, url: &str) -> bool {
        host_of(url).is_some_and(|host| self.dynamic_hosts.contains(&host))
    }

    /// Record that the URL's host requires JavaScript. Once set, the flag
    /// is never cleared.
    pub fn mark_dynamic(&self, url: &str) {
        if let Some(host) = host_of(url) {
            self.dynamic_hosts.insert(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dynamic_flag_is_sticky_per_host() {
        let mgr = DomainManager::new("TestCrawler/1.0", Duration::from_millis(1))
            .expect("manager");

        assert!(!mgr.needs_dynamic("https://example.com/a"));
        mgr.mark_dynamic("https://example.com/b");
        assert!(mgr.needs_dynamic("https://example.com/c"));
        assert!(!mgr.needs_dynamic("https://other.com/"));
    }

    #[test]
    fn unparseable_urls_never_need_dynamic() {
        let mgr = DomainManager::new("TestCrawler/1.0", Duration::from_millis(1))
            .expect("manager");
        mgr.mark_dynamic("::::");
        assert!(!mgr.needs_dynamic("::::"));
    }
}
