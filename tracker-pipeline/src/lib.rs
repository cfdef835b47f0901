//! Run orchestration: render, extract and record every target, then notify.
//!
//! See [`Orchestrator`] for the failure policy.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, RunError};
