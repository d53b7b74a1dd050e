//! Browser session lifecycle.
//!
//! One `CrawlSession` owns a launched Chromium and a single page. The
//! session is mode-aware: headless for unattended runs, interactive when
//! the operator needs to see the window (CAPTCHA clearing, zero-card
//! retry).

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::ScraperError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub struct CrawlSession {
    browser: Browser,
    page: Page,
}

impl CrawlSession {
    /// Launches Chromium and opens a blank page.
    ///
    /// Each session gets its own user-data directory so parallel runs never
    /// fight over the profile lock. The executable comes from `CHROME_PATH`
    /// or `CHROMIUM_PATH`, defaulting to `chromium` on the PATH.
    pub async fn launch(config: &ScraperConfig, headless: bool) -> Result<Self, ScraperError> {
        let unique_id = format!(
            "{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        );
        let user_data_dir = std::env::temp_dir().join(format!("dabang-{}", unique_id));

        let chrome_path = std::env::var("CHROME_PATH")
            .or_else(|_| std::env::var("CHROMIUM_PATH"))
            .unwrap_or_else(|_| "chromium".to_string());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .user_data_dir(&user_data_dir)
            .window_size(1440, 960);

        if !headless {
            builder = builder.with_head();
        }

        builder = builder
            .no_sandbox()
            .request_timeout(config.timeout)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--lang=ko-KR");

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        if let Err(e) = page.set_user_agent(USER_AGENT).await {
            warn!("failed to set user agent: {}", e);
        }

        info!(
            "browser session started (headless={}, profile={})",
            headless,
            user_data_dir.display()
        );

        Ok(Self { browser, page })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Closes page and browser, tolerating an already-dead process.
    pub async fn close(mut self) {
        if let Err(e) = self.page.close().await {
            debug!("page close: {}", e);
        }
        if let Err(e) = self.browser.close().await {
            debug!("browser close: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("browser wait: {}", e);
        }
        info!("browser session closed");
    }
}
