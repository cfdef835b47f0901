use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, info_span, warn, Instrument};
use tracker_common::{ExtractionResult, FailureKind, LedgerEntry, RunSummary, Target};
use tracker_ledger::{Ledger, LedgerWriteError};
use tracker_notify::Notifier;
use tracker_web::extract::extract_percentage;
use tracker_web::render::PageRenderer;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RunError {
    /// The ledger could not be written; nothing after this point is trusted.
    #[error("run aborted: {0}")]
    Ledger(#[from] LedgerWriteError),
}

/// Drives one run over the configured targets.
///
/// Targets are processed one at a time, in order. A render or extraction
/// failure is recorded as that target's outcome and the loop moves on. A
/// ledger write failure aborts the run before the notifier is reached. The
/// notifier runs exactly once, after the last target has been recorded, and
/// its failure is only logged.
pub struct Orchestrator {
    targets: Vec<Target>,
    ledger: Ledger,
    renderer: Arc<dyn PageRenderer>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Orchestrator {
    pub fn new(targets: Vec<Target>, ledger: Ledger, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            targets,
            ledger,
            renderer,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Execute a full run dated `date`.
    pub async fn run(&self, date: NaiveDate) -> Result<RunSummary, RunError> {
        let span = info_span!(target: "tracker.run", "run", run_id = %Uuid::new_v4(), %date);
        self.run_targets(date).instrument(span).await
    }

    async fn run_targets(&self, date: NaiveDate) -> Result<RunSummary, RunError> {
        info!(
            target: "tracker.run",
            targets = self.targets.len(),
            ledger = %self.ledger.path().display(),
            "run started"
        );

        self.ledger.open_run(date)?;

        let mut summary = RunSummary::new(date);
        for target in &self.targets {
            let result = self.process(target).await;
            let entry = LedgerEntry::new(target.clone(), result);
            self.ledger.record(&entry)?;
            summary.push(entry);
        }

        self.notify(&summary).await;

        info!(
            target: "tracker.run",
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "{}",
            summary.headline()
        );
        Ok(summary)
    }

    /// Render and extract one target; never fails, errors become outcomes.
    async fn process(&self, target: &Target) -> ExtractionResult {
        let text = match self.renderer.render(target).await {
            Ok(text) => text,
            Err(err) => {
                warn!(target: "tracker.run", url = %target, error = %err, "render failed");
                return ExtractionResult::failed(FailureKind::RenderError, err.to_string());
            }
        };

        match extract_percentage(&text) {
            Ok(percentage) => {
                info!(target: "tracker.run", url = %target, %percentage, "disclosure extracted");
                ExtractionResult::Percentage(percentage)
            }
            Err(err) => {
                warn!(
                    target: "tracker.run",
                    url = %target,
                    text_len = err.text_len,
                    excerpt = %err.excerpt,
                    "{err}"
                );
                ExtractionResult::failed(FailureKind::ExtractionError, err.to_string())
            }
        }
    }

    async fn notify(&self, summary: &RunSummary) {
        let Some(notifier) = &self.notifier else {
            info!(target: "tracker.run", "no notifier configured; skipping notification");
            return;
        };

        if let Err(err) = notifier.notify(self.ledger.path(), summary).await {
            error!(target: "tracker.run", error = %err, "notification failed; ledger is intact");
        }
    }
}
