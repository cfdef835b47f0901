use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use tracker_common::Target;
use tracker_drivers::browser::driver::TrackerDriver;

pub use tracker_drivers::browser::{error::RenderError, launch::LaunchProfile};

use crate::text::visible_text;

/// Turns a target page into its fully rendered, visible text.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, target: &Target) -> Result<String, RenderError>;
}

/// Renderer backed by a fresh WebDriver session per page.
pub struct WebDriverRenderer {
    endpoint: String,
    profile: LaunchProfile,
    page_load_timeout: Duration,
    settle_delay: Duration,
}

impl WebDriverRenderer {
    pub fn new(endpoint: impl Into<String>, profile: LaunchProfile) -> Self {
        Self {
            endpoint: endpoint.into(),
            profile,
            page_load_timeout: Duration::from_secs(30),
            settle_delay: Duration::ZERO,
        }
    }

    pub fn with_page_load_timeout(mut self, timeout: Duration) -> Self {
        self.page_load_timeout = timeout;
        self
    }

    /// Extra wait after `document.readyState` is `complete`, for disclosures
    /// injected by client-side scripts.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    async fn load_source(&self, driver: &TrackerDriver, url: &str) -> Result<String, RenderError> {
        driver.set_page_load_timeout(self.page_load_timeout).await?;
        driver.goto(url, self.page_load_timeout).await?;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        driver.page_source(url).await
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn render(&self, target: &Target) -> Result<String, RenderError> {
        let url = target.url().as_str();
        let driver = TrackerDriver::connect(&self.endpoint, &self.profile).await?;

        let loaded = self.load_source(&driver, url).await;

        // Always close the session before reporting, whatever happened above.
        if let Err(err) = driver.close().await {
            warn!(target: "browser.session", %url, error = %err, "failed to close browser session");
        }

        let html = loaded?;
        let text = visible_text(&html);
        debug!(
            target: "browser.session",
            %url,
            html_len = html.len(),
            text_len = text.len(),
            "page rendered"
        );
        Ok(text)
    }
}
