//! Headless Chromium lifecycle.

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace};

use super::FetchError;

/// A launched browser plus the task driving its CDP connection.
///
/// The handler task MUST be aborted when the browser goes away, otherwise
/// it runs forever; `Drop` takes care of that.
#[derive(Debug)]
pub struct BrowserHandle {
    pub browser: Browser,
    handler: JoinHandle<()>,
}

impl Drop for BrowserHandle {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Launch a Chromium instance configured for crawling.
///
/// Honors `CHROMIUM_PATH` when set; otherwise chromiumoxide searches the
/// usual install locations. The profile directory is unique per process
/// to avoid SingletonLock contention.
pub async fn launch_browser(headless: bool) -> Result<BrowserHandle, FetchError> {
    let user_data_dir =
        std::env::temp_dir().join(format!("webscout_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir)
        .map_err(|e| FetchError::Browser(format!("failed to create profile dir: {e}")))?;

    let mut config_builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone());

    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        config_builder = config_builder.chrome_executable(PathBuf::from(path));
    }

    if headless {
        config_builder = config_builder.headless_mode(HeadlessMode::default());
    } else {
        config_builder = config_builder.with_head();
    }

    config_builder = config_builder
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-background-networking")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-hang-monitor")
        .arg("--disable-popup-blocking")
        .arg("--metrics-recording-only")
        .arg("--password-store=basic")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    let browser_config = config_builder
        .build()
        .map_err(|e| FetchError::Browser(format!("failed to build browser config: {e}")))?;

    info!(profile = %user_data_dir.display(), "launching browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| FetchError::Browser(format!("failed to launch browser: {e}")))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let msg = e.to_string();
                // Chrome emits CDP events chromiumoxide doesn't model;
                // those deserialization failures are not actionable.
                let benign = msg.contains("data did not match any variant of untagged enum Message")
                    || msg.contains("Failed to deserialize WS response");
                if benign {
                    trace!("suppressed benign CDP error: {msg}");
                } else {
                    error!("browser handler error: {msg}");
                }
            }
        }
        debug!("browser handler task completed");
    });

    Ok(BrowserHandle {
        browser,
        handler: handler_task,
    })
}
