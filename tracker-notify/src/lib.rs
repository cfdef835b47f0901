//! Operator notification after a run.
//!
//! The [`Notifier`] trait is what the run orchestrator calls once per run;
//! [`smtp::SmtpNotifier`] is the mail implementation. Relay credentials come
//! from an injected [`credentials::CredentialProvider`] and are resolved at
//! send time, never at construction.
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracker_common::RunSummary;

pub mod credentials;
pub mod smtp;

pub use credentials::{CredentialProvider, EnvCredentials, SmtpCredentials, StaticCredentials};
pub use smtp::{Security, SmtpNotifier, SmtpSettings};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("mail credentials unavailable: {0}")]
    Credentials(String),

    #[error("invalid mail address `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to read ledger attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("mail relay {relay} failed: {source}")]
    Transport {
        relay: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },
}

/// Delivers the ledger to the operator.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send the ledger at `ledger` along with a summary of the run that just
    /// finished. Implementations do not retry.
    async fn notify(&self, ledger: &Path, summary: &RunSummary) -> Result<(), NotifyError>;
}
