use fantoccini::error::{CmdError, NewSessionError};
use std::time::Duration;
use thiserror::Error;

/// Failure to obtain the rendered content of a page.
///
/// Every variant keeps the underlying WebDriver error as its source.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser session could not start at {endpoint}: {source}")]
    Session {
        endpoint: String,
        #[source]
        source: NewSessionError,
    },

    #[error("could not configure browser timeouts: {0}")]
    Timeouts(#[source] CmdError),

    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CmdError,
    },

    #[error("page {url} did not finish loading within {waited:?}")]
    LoadTimeout { url: String, waited: Duration },

    #[error("could not read rendered source of {url}: {source}")]
    Source {
        url: String,
        #[source]
        source: CmdError,
    },
}
