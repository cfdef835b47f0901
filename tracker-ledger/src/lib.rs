//! Append-only plain-text ledger of run results.
//!
//! Layout, repeated once per run:
//!
//! ```text
//!
//! Date: 2024-03-01
//! https://capital.com/: 76.5
//! https://www.plus500.com/en-es/: Error: ExtractionError: no percentage pattern found
//! ```
//!
//! Every write opens the file in append mode, writes one chunk, flushes and
//! closes it again, so lines already written survive a crash later in the
//! run. Nothing here ever truncates or deletes the file.
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tracker_common::LedgerEntry;

#[derive(Debug, Error)]
pub enum LedgerWriteError {
    #[error("failed to create ledger directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to ledger {}: {source}", .path.display())]
    Append {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start a run block: a blank line followed by `Date: YYYY-MM-DD`.
    pub fn open_run(&self, date: NaiveDate) -> Result<(), LedgerWriteError> {
        self.append(&format!("\nDate: {}\n", date.format("%Y-%m-%d")))
    }

    /// Append one `<url>: <result>` line.
    pub fn record(&self, entry: &LedgerEntry) -> Result<(), LedgerWriteError> {
        self.append(&format!("{entry}\n"))
    }

    /// Whole ledger contents.
    pub fn read_to_string(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn append(&self, chunk: &str) -> Result<(), LedgerWriteError> {
        self.ensure_parent_dir()?;

        let append_err = |source| LedgerWriteError::Append {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;
        file.write_all(chunk.as_bytes()).map_err(append_err)?;
        file.flush().map_err(append_err)?;

        debug!(target: "ledger", path = %self.path.display(), bytes = chunk.len(), "appended");
        Ok(())
    }

    fn ensure_parent_dir(&self) -> Result<(), LedgerWriteError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|source| LedgerWriteError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })
            }
            _ => Ok(()),
        }
    }
}
