use async_trait::async_trait;
use lettre::message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use tracker_common::RunSummary;

use crate::{CredentialProvider, NotifyError, Notifier};

/// How the relay connection is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// Plain connection upgraded with STARTTLS.
    StartTls,
    /// Implicit TLS.
    Tls,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub relay: String,
    pub port: u16,
    pub security: Security,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mails the whole ledger file to a fixed recipient.
pub struct SmtpNotifier {
    settings: SmtpSettings,
    credentials: Arc<dyn CredentialProvider>,
}

impl SmtpNotifier {
    pub fn new(settings: SmtpSettings, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// Build the message: configured body plus the run headline, with the
    /// ledger attached under its own file name.
    pub async fn compose(&self, ledger: &Path, summary: &RunSummary) -> Result<Message, NotifyError> {
        let contents = tokio::fs::read(ledger)
            .await
            .map_err(|source| NotifyError::Attachment {
                path: ledger.to_path_buf(),
                source,
            })?;
        let filename = ledger
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ledger.txt".to_string());

        let body = format!("{}\n\n{}\n", self.settings.body, summary.headline());

        let message = Message::builder()
            .from(parse_mailbox(&self.settings.from)?)
            .to(parse_mailbox(&self.settings.to)?)
            .subject(self.settings.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(body))
                    .singlepart(Attachment::new(filename).body(contents, ContentType::TEXT_PLAIN)),
            )?;
        Ok(message)
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let creds = self.credentials.smtp_credentials()?;
        let relay = &self.settings.relay;

        let builder = match self.settings.security {
            Security::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(relay),
            Security::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(relay),
        }
        .map_err(|source| NotifyError::Transport {
            relay: relay.clone(),
            source,
        })?;

        Ok(builder
            .port(self.settings.port)
            .credentials(Credentials::new(creds.username, creds.password))
            .build())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, ledger: &Path, summary: &RunSummary) -> Result<(), NotifyError> {
        let message = self.compose(ledger, summary).await?;
        let transport = self.transport()?;

        transport
            .send(message)
            .await
            .map_err(|source| NotifyError::Transport {
                relay: self.settings.relay.clone(),
                source,
            })?;

        info!(
            target: "notify",
            relay = %self.settings.relay,
            to = %self.settings.to,
            "ledger mailed"
        );
        Ok(())
    }
}
