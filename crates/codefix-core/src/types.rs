//! Core type definitions for the correction pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Explanation recorded when the corrected code runs without error
pub const SUCCESS_EXPLANATION: &str = "Code ran successfully.";

/// Failure category reported when execution exceeds the wall-clock limit
pub const TIMEOUT_CATEGORY: &str = "Timeout";

/// Failure category reported when the interpreter exits without a report
pub const PROCESS_EXIT_CATEGORY: &str = "ProcessExit";

/// A runtime failure observed while executing corrected code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    /// Short tag for the kind of failure (e.g. `NameError`)
    pub category: String,
    /// Message produced by the execution environment
    pub detail: String,
}

impl Failure {
    pub fn new(category: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.category, self.detail)
    }
}

/// Outcome of executing one piece of code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Success,
    Failure(Failure),
}

impl RunOutcome {
    pub fn failure(category: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Failure(Failure::new(category, detail))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure category, if any
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(f) => Some(&f.category),
        }
    }
}

/// Fields of an attempt record before the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttempt {
    pub original: String,
    pub corrected: String,
    pub failure_detail: String,
    pub explanation: String,
}

/// One persisted outcome of a fix → run → classify cycle
///
/// Records are append-only: once the store hands one back it is never
/// updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub id: i64,
    pub original: String,
    pub corrected: String,
    /// Empty when the corrected code ran cleanly
    pub failure_detail: String,
    pub explanation: String,
    pub created_at: DateTime<Utc>,
}

/// What a caller gets back from one correction cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    /// Identifier of the history record written for this cycle
    pub id: i64,
    pub corrected: String,
    pub explanation: String,
    pub failure: Option<Failure>,
}

impl CorrectionOutcome {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// One-line summary in the form shown to users
    pub fn summary(&self) -> String {
        match &self.failure {
            None => format!("✅ {}", self.explanation),
            Some(f) => format!("❌ {}: {}", f.category, self.explanation),
        }
    }
}
