//! Driver layer for headless browser sessions.
//!
//! This crate wraps a WebDriver endpoint (a local chromedriver or a remote
//! Selenium hub) so callers can open one short-lived session per page.
//!
//! - [`browser::driver::TrackerDriver`]: `fantoccini` client wrapper
//! - [`browser::launch`]: Chrome launch profile and command-line arguments
//! - [`browser::error::RenderError`]: session and navigation failures
pub mod browser;
