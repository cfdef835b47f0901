//! Common types and utilities shared across tracker crates.
//!
//! This crate defines the run data model, the shared configuration error
//! type and the observability helpers used throughout the workspace. It stays
//! dependency-light so every other crate can depend on it.
//!
//! # Overview
//!
//! - [`Target`]: one configured page to scrape
//! - [`ExtractionResult`]: the per-target outcome of a run
//! - [`LedgerEntry`] and [`RunSummary`]: what a run produced
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`TrackerError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use tracker_common::{ExtractionResult, LedgerEntry, Target};
//!
//! let target = Target::parse("https://capital.com/").unwrap();
//! let entry = LedgerEntry::new(target, ExtractionResult::Percentage("76.5".into()));
//! assert_eq!(entry.to_string(), "https://capital.com/: 76.5");
//! ```
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub mod observability;

/// Broker pages visited when the configuration does not name any.
pub const DEFAULT_TARGETS: &[&str] = &[
    "https://www.home.saxo/en-mena/legal/risk-warning/saxo-risk-warning",
    "https://www.interactivebrokers.co.uk/de/index.php?f=38931&cc=US",
    "https://www.etoro.com/trading/cfd-leverage-and-margin/",
    "https://www.ig.com/en/risk-management/what-is-leverage",
    "https://www.icmarkets.eu/en/education/advantages-of-cfds",
    "https://helpcentre.trading212.com/hc/en-us",
    "https://www.plus500.com/en-es/",
    "https://capital.com/",
    "https://www.xtb.com/en/education/what-is-cfd-trading",
];

/// A configured page whose disclosure is tracked.
///
/// The configured string is kept verbatim so ledger lines match what the
/// operator wrote, while the parsed [`Url`] is what the browser navigates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    raw: String,
    url: Url,
}

impl Target {
    /// Parse a configured URL. Only `http` and `https` pages are accepted.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|e| TrackerError::InvalidTarget {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(Self {
                raw: trimmed.to_string(),
                url,
            }),
            other => Err(TrackerError::InvalidTarget {
                url: trimmed.to_string(),
                reason: format!("unsupported scheme `{other}`"),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Which stage of the per-target pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    RenderError,
    ExtractionError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::RenderError => f.write_str("RenderError"),
            FailureKind::ExtractionError => f.write_str("ExtractionError"),
        }
    }
}

/// Outcome of one target in one run.
///
/// The percentage is kept as the matched string so a disclosure such as
/// `76.5` is never rounded through a float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionResult {
    Percentage(String),
    Failed { kind: FailureKind, message: String },
}

impl ExtractionResult {
    /// Build a failure outcome; the message is flattened onto one line so a
    /// ledger entry never spans several lines.
    pub fn failed(kind: FailureKind, message: impl AsRef<str>) -> Self {
        let message = message
            .as_ref()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        Self::Failed { kind, message }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Percentage(_))
    }

    pub fn percentage(&self) -> Option<&str> {
        match self {
            Self::Percentage(p) => Some(p),
            Self::Failed { .. } => None,
        }
    }
}

impl fmt::Display for ExtractionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(p) => f.write_str(p),
            Self::Failed { kind, message } => write!(f, "Error: {kind}: {message}"),
        }
    }
}

/// A target paired with its outcome; rendered as one ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub target: Target,
    pub result: ExtractionResult,
}

impl LedgerEntry {
    pub fn new(target: Target, result: ExtractionResult) -> Self {
        Self { target, result }
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.result)
    }
}

/// Entries produced by the current run, in target order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub entries: Vec<LedgerEntry>,
}

impl RunSummary {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// One-line human summary, used in notification bodies and logs.
    pub fn headline(&self) -> String {
        format!(
            "Run {}: {} of {} targets extracted, {} failed.",
            self.date.format("%Y-%m-%d"),
            self.succeeded(),
            self.total(),
            self.failed()
        )
    }
}

/// Error types shared across the tracker workspace.
#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configured target is not a usable page URL.
    #[error("Invalid target `{url}`: {reason}")]
    InvalidTarget { url: String, reason: String },
}

/// Convenient alias for results that use [`TrackerError`].
pub type Result<T> = std::result::Result<T, TrackerError>;
