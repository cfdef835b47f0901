use crate::browser::{
    error::RenderError,
    launch::{build_launch_arguments, LaunchProfile},
};
use fantoccini::{error::CmdError, wd::TimeoutConfiguration, Client, ClientBuilder};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::debug;
use webdriver::capabilities::Capabilities;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Thin wrapper around a `fantoccini` WebDriver session.
///
/// One driver is one browser session. It is not reused across pages; call
/// [`TrackerDriver::close`] when done, on success and on failure.
pub struct TrackerDriver {
    client: Client,
    endpoint: String,
}

impl TrackerDriver {
    /// Open a new Chrome session on the WebDriver service at `endpoint`.
    ///
    /// `endpoint` is either a local chromedriver (`http://localhost:9515`) or
    /// a remote Selenium hub (`http://selenium:4444/wd/hub`).
    pub async fn connect(endpoint: &str, profile: &LaunchProfile) -> Result<Self, RenderError> {
        let mut caps = Capabilities::new();
        caps.insert("browserName".to_string(), json!("chrome"));
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": build_launch_arguments(profile) }),
        );

        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(endpoint)
            .await
            .map_err(|source| RenderError::Session {
                endpoint: endpoint.to_string(),
                source,
            })?;

        debug!(target: "browser.session", %endpoint, headless = profile.headless, "session opened");

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Bound how long the browser itself waits for a navigation to load.
    pub async fn set_page_load_timeout(&self, timeout: Duration) -> Result<(), RenderError> {
        self.client
            .update_timeouts(TimeoutConfiguration::new(None, Some(timeout), None))
            .await
            .map_err(RenderError::Timeouts)
    }

    /// Navigate to `url` and wait until the document reports `complete`.
    pub async fn goto(&self, url: &str, load_timeout: Duration) -> Result<(), RenderError> {
        self.client
            .goto(url)
            .await
            .map_err(|source| RenderError::Navigation {
                url: url.to_string(),
                source,
            })?;

        self.wait_until_loaded(url, load_timeout).await
    }

    async fn wait_until_loaded(&self, url: &str, limit: Duration) -> Result<(), RenderError> {
        let started = Instant::now();
        loop {
            let state = self
                .client
                .execute("return document.readyState;", vec![])
                .await
                .map_err(|source| RenderError::Navigation {
                    url: url.to_string(),
                    source,
                })?;

            if state.as_str() == Some("complete") {
                debug!(target: "browser.session", %url, elapsed = ?started.elapsed(), "page loaded");
                return Ok(());
            }
            if started.elapsed() >= limit {
                return Err(RenderError::LoadTimeout {
                    url: url.to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(READY_POLL_INTERVAL).await;
        }
    }

    /// Return the full rendered HTML of the current page.
    pub async fn page_source(&self, url: &str) -> Result<String, RenderError> {
        self.client
            .source()
            .await
            .map_err(|source| RenderError::Source {
                url: url.to_string(),
                source,
            })
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), CmdError> {
        self.client.close().await?;
        debug!(target: "browser.session", endpoint = %self.endpoint, "session closed");
        Ok(())
    }
}
