mod common;

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tracker_common::{ExtractionResult, FailureKind, RunSummary, Target};
use tracker_ledger::Ledger;
use tracker_notify::{Notifier, NotifyError};
use tracker_pipeline::{Orchestrator, RunError};
use tracker_web::render::{PageRenderer, RenderError};

/// Serves canned page text per URL; unknown URLs time out.
#[derive(Default)]
struct ScriptedRenderer {
    pages: HashMap<String, String>,
    visited: Mutex<Vec<String>>,
}

impl ScriptedRenderer {
    fn page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRenderer for ScriptedRenderer {
    async fn render(&self, target: &Target) -> Result<String, RenderError> {
        self.visited.lock().unwrap().push(target.to_string());
        self.pages
            .get(target.as_str())
            .cloned()
            .ok_or_else(|| RenderError::LoadTimeout {
                url: target.to_string(),
                waited: Duration::from_secs(30),
            })
    }
}

/// Captures what the ledger looked like at notification time.
#[derive(Default)]
struct RecordingNotifier {
    calls: Mutex<Vec<(String, RunSummary)>>,
    fail: bool,
}

impl RecordingNotifier {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<(String, RunSummary)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, ledger: &Path, summary: &RunSummary) -> Result<(), NotifyError> {
        let snapshot = fs::read_to_string(ledger).unwrap_or_default();
        self.calls.lock().unwrap().push((snapshot, summary.clone()));
        if self.fail {
            return Err(NotifyError::Credentials("EMAIL_PASSWORD is not set".into()));
        }
        Ok(())
    }
}

const CAPITAL: &str = "https://capital.com/";
const PLUS500: &str = "https://www.plus500.com/en-es/";
const XTB: &str = "https://www.xtb.com/en/education/what-is-cfd-trading";

fn targets(urls: &[&str]) -> Vec<Target> {
    urls.iter().map(|u| Target::parse(u).unwrap()).collect()
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn renderer() -> Arc<ScriptedRenderer> {
    Arc::new(
        ScriptedRenderer::default()
            .page(CAPITAL, "Risk warning: 76.5% of retail investor accounts lose money.")
            .page(PLUS500, "Trade CFDs with a regulated broker. Retail clients welcome."),
    )
}

#[tokio::test]
async fn records_every_target_even_when_some_fail() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let ledger = Ledger::new(tmp.path().join("data").join("data.txt"));
    let renderer = renderer();

    // XTB has no canned page, so rendering it fails.
    let orchestrator = Orchestrator::new(
        targets(&[XTB, CAPITAL, PLUS500]),
        ledger.clone(),
        renderer.clone(),
    );
    let summary = orchestrator.run(day(1)).await.unwrap();

    assert_eq!(renderer.visited(), vec![XTB, CAPITAL, PLUS500]);
    assert_eq!(summary.total(), 3);
    assert_eq!(summary.succeeded(), 1);

    assert!(matches!(
        &summary.entries[0].result,
        ExtractionResult::Failed { kind: FailureKind::RenderError, .. }
    ));
    assert_eq!(
        summary.entries[1].result,
        ExtractionResult::Percentage("76.5".into())
    );
    assert_eq!(
        summary.entries[2].result,
        ExtractionResult::failed(FailureKind::ExtractionError, "no percentage pattern found")
    );

    let contents = ledger.read_to_string().unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    // blank separator, header, one line per target
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "");
    assert_eq!(lines[1], "Date: 2024-03-01");
    assert!(lines[2].starts_with(&format!("{XTB}: Error: RenderError: page {XTB} did not finish loading")));
    assert_eq!(lines[3], format!("{CAPITAL}: 76.5"));
    assert_eq!(
        lines[4],
        format!("{PLUS500}: Error: ExtractionError: no percentage pattern found")
    );
}

#[tokio::test]
async fn second_run_appends_a_new_block() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let ledger = Ledger::new(tmp.path().join("data.txt"));
    let orchestrator = Orchestrator::new(targets(&[CAPITAL, PLUS500]), ledger.clone(), renderer());

    orchestrator.run(day(1)).await.unwrap();
    let first = ledger.read_to_string().unwrap();

    orchestrator.run(day(2)).await.unwrap();
    let both = ledger.read_to_string().unwrap();

    assert!(both.starts_with(&first));
    let second = &both[first.len()..];
    assert!(second.starts_with("\nDate: 2024-03-02\n"));
    assert_eq!(second.lines().count(), 4);
    assert_eq!(both.matches("Date: ").count(), 2);
}

#[tokio::test]
async fn notifies_once_after_the_last_entry() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let ledger = Ledger::new(tmp.path().join("data.txt"));
    let notifier = Arc::new(RecordingNotifier::default());

    let orchestrator = Orchestrator::new(targets(&[CAPITAL, XTB, PLUS500]), ledger.clone(), renderer())
        .with_notifier(notifier.clone());
    let summary = orchestrator.run(day(1)).await.unwrap();

    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    let (snapshot, notified) = &calls[0];
    assert_eq!(snapshot, &ledger.read_to_string().unwrap());
    assert!(snapshot.trim_end().ends_with("no percentage pattern found"));
    assert_eq!(notified, &summary);
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_run() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let ledger = Ledger::new(tmp.path().join("data.txt"));
    let notifier = Arc::new(RecordingNotifier::failing());

    let orchestrator = Orchestrator::new(targets(&[CAPITAL]), ledger.clone(), renderer())
        .with_notifier(notifier.clone());
    let summary = orchestrator.run(day(1)).await.unwrap();

    assert_eq!(summary.succeeded(), 1);
    assert_eq!(notifier.calls().len(), 1);
    assert_eq!(
        ledger.read_to_string().unwrap(),
        format!("\nDate: 2024-03-01\n{CAPITAL}: 76.5\n")
    );
}

#[tokio::test]
async fn ledger_failure_aborts_before_notifying() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("not-a-dir");
    fs::write(&blocker, "").unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let renderer = renderer();

    let orchestrator = Orchestrator::new(
        targets(&[CAPITAL, PLUS500]),
        Ledger::new(blocker.join("data.txt")),
        renderer.clone(),
    )
    .with_notifier(notifier.clone());

    let err = orchestrator.run(day(1)).await.unwrap_err();
    assert!(matches!(err, RunError::Ledger(_)));
    assert!(renderer.visited().is_empty());
    assert!(notifier.calls().is_empty());
}

/// Swaps the ledger file for a directory while a page is rendering.
struct LedgerBreakingRenderer {
    inner: Arc<ScriptedRenderer>,
    ledger: std::path::PathBuf,
}

#[async_trait]
impl PageRenderer for LedgerBreakingRenderer {
    async fn render(&self, target: &Target) -> Result<String, RenderError> {
        fs::remove_file(&self.ledger).unwrap();
        fs::create_dir(&self.ledger).unwrap();
        self.inner.render(target).await
    }
}

#[tokio::test]
async fn ledger_failure_mid_run_stops_at_that_target() {
    common::init_test_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data.txt");
    let notifier = Arc::new(RecordingNotifier::default());
    let inner = renderer();

    let orchestrator = Orchestrator::new(
        targets(&[CAPITAL, PLUS500]),
        Ledger::new(&path),
        Arc::new(LedgerBreakingRenderer {
            inner: inner.clone(),
            ledger: path.clone(),
        }),
    )
    .with_notifier(notifier.clone());

    let err = orchestrator.run(day(1)).await.unwrap_err();
    assert!(matches!(err, RunError::Ledger(_)));
    assert_eq!(inner.visited(), vec![CAPITAL]);
    assert!(notifier.calls().is_empty());
}
