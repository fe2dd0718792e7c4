//! Headless-browser fetching for JavaScript-walled hosts.

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use rand::Rng;
use serde_json::json;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::FetchError;
use super::browser::{BrowserHandle, launch_browser};
use super::js_scripts::{LINK_SHIM_SCRIPT, STEALTH_PRELOAD_SCRIPT, smooth_scroll_script};
use super::profiles::random_profile;
use crate::urlutil::{host_of, registrable_domain};

/// Total deadline for one dynamic fetch: navigation, behaviors, capture.
const DYNAMIC_FETCH_TIMEOUT: Duration = Duration::from_secs(45);

/// How long a wait-selector hint is polled for before giving up.
const HINT_WAIT_MAX: Duration = Duration::from_secs(5);
const HINT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Contract for rendering a page with JavaScript executed.
///
/// A successful dynamic fetch returns the post-JS DOM HTML and reports
/// status 200 by definition.
pub trait DynamicFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Chromium-backed [`DynamicFetcher`].
///
/// The browser launches lazily on the first dynamic fetch and is reused
/// for the life of the process; every fetch runs in a fresh page that is
/// closed afterwards.
pub struct BrowserFetcher {
    headless: bool,
    browser: OnceCell<BrowserHandle>,
    /// Optional per-site CSS selectors to poll for after navigation, for
    /// hosts whose content renders late.
    wait_hints: HashMap<String, String>,
}

fn cdp_err(e: impl Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

impl BrowserFetcher {
    #[must_use]
    pub fn new(headless: bool) -> Self {
        let mut wait_hints = HashMap::new();
        wait_hints.insert("newegg.com".to_string(), "a.item-title".to_string());
        wait_hints.insert("bestbuy.com".to_string(), "h4.sku-title".to_string());
        Self {
            headless,
            browser: OnceCell::new(),
            wait_hints,
        }
    }

    async fn handle(&self) -> Result<&BrowserHandle, FetchError> {
        self.browser
            .get_or_try_init(|| launch_browser(self.headless))
            .await
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let handle = self.handle().await?;
        let page = handle
            .browser
            .new_page("about:blank")
            .await
            .map_err(cdp_err)?;

        let result = self.drive(&page, url).await;
        if let Err(e) = page.close().await {
            debug!(url, error = %e, "failed to close page");
        }
        result
    }

    /// The full behavior sequence, in order. Each step either matters for
    /// evading bot walls or for making dynamically-computed links visible
    /// to the static extractor downstream.
    async fn drive(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        // Jitter values are drawn up front; the RNG handle is not held
        // across awaits.
        let (click_x, click_y, pause_ms, scroll_px) = {
            let mut rng = rand::rng();
            (
                rng.random_range(300.0..500.0),
                rng.random_range(300.0..500.0),
                rng.random_range(500..1500),
                rng.random_range(300..700),
            )
        };

        // 1. Stealth pre-load script, registered before any document
        //    script runs on navigation.
        page.execute(AddScriptToEvaluateOnNewDocumentParams {
            source: STEALTH_PRELOAD_SCRIPT.to_string(),
            include_command_line_api: None,
            world_name: None,
            run_immediately: None,
        })
        .await
        .map_err(cdp_err)?;

        // 2.-3. Fingerprint: random desktop profile plus the header set a
        //        real navigation carries.
        let profile = random_profile();
        page.execute(SetUserAgentOverrideParams {
            user_agent: profile.user_agent.to_string(),
            accept_language: Some("en-US,en;q=0.9".to_string()),
            platform: Some("Linux".to_string()),
            user_agent_metadata: None,
        })
        .await
        .map_err(cdp_err)?;

        let headers = Headers::new(json!({
            "Accept-Language": "en-US,en;q=0.9",
            "sec-ch-ua": profile.sec_ch_ua,
            "sec-ch-ua-mobile": "?0",
            "sec-ch-ua-platform": "\"Linux\"",
            "Sec-Fetch-Dest": "document",
            "Sec-Fetch-Mode": "navigate",
            "Sec-Fetch-Site": "none",
            "Sec-Fetch-User": "?1",
        }));
        page.execute(
            SetExtraHttpHeadersParams::builder()
                .headers(headers)
                .build()
                .map_err(cdp_err)?,
        )
        .await
        .map_err(cdp_err)?;

        // 4. Desktop viewport.
        page.execute(
            SetDeviceMetricsOverrideParams::builder()
                .width(1920)
                .height(1080)
                .device_scale_factor(1.0)
                .mobile(false)
                .build()
                .map_err(cdp_err)?,
        )
        .await
        .map_err(cdp_err)?;

        // 5. Navigate, then optionally poll a per-site selector.
        page.goto(url).await.map_err(cdp_err)?;
        page.wait_for_navigation().await.map_err(cdp_err)?;
        self.wait_for_hint(page, url).await;

        // 6.-8. Human jitter: one click somewhere unremarkable, a short
        //        pause, a smooth partial scroll.
        if let Err(e) = page.click(Point::new(click_x, click_y)).await {
            debug!(url, error = %e, "synthetic click failed");
        }
        tokio::time::sleep(Duration::from_millis(pause_ms)).await;
        page.evaluate(smooth_scroll_script(scroll_px))
            .await
            .map_err(cdp_err)?;

        // 9. Link shim, so the static extractor sees JS-computed URLs.
        page.evaluate(LINK_SHIM_SCRIPT).await.map_err(cdp_err)?;

        // 10. Post-JS DOM snapshot.
        page.content().await.map_err(cdp_err)
    }

    async fn wait_for_hint(&self, page: &Page, url: &str) {
        let Some(selector) = host_of(url)
            .map(|host| registrable_domain(&host))
            .and_then(|domain| self.wait_hints.get(&domain))
        else {
            return;
        };

        let start = tokio::time::Instant::now();
        while start.elapsed() < HINT_WAIT_MAX {
            if page.find_element(selector.as_str()).await.is_ok() {
                debug!(url, selector = %selector, "wait hint satisfied");
                return;
            }
            tokio::time::sleep(HINT_POLL_INTERVAL).await;
        }
        warn!(url, selector = %selector, "wait hint never appeared, continuing");
    }
}

impl DynamicFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match tokio::time::timeout(DYNAMIC_FETCH_TIMEOUT, self.render(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(DYNAMIC_FETCH_TIMEOUT)),
        }
    }
}
