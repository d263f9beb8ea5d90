//! # codefix-runner
//!
//! Executes corrected code and reports either success or a classified
//! failure.
//!
//! This crate provides:
//! - The [`CodeRunner`] abstraction used by the orchestrator
//! - [`PythonRunner`], which runs code in a fresh interpreter process with a
//!   wall-clock timeout
//! - [`MockRunner`] for tests

mod error;
mod python;

pub use error::{Result, RunnerError};
pub use python::{MockRunner, PythonRunner};

use async_trait::async_trait;
use codefix_core::RunOutcome;

/// Trait for executing submitted code (allows mocking in tests)
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// Execute `code` in a fresh context and report the outcome.
    ///
    /// Failures of the code itself are returned as `Ok(RunOutcome::Failure)`;
    /// `Err` is reserved for the runner being unable to execute anything.
    async fn run(&self, code: &str) -> Result<RunOutcome>;
}
