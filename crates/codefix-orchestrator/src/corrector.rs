//! One correction cycle: fix → run → classify → record → report

use codefix_core::{
    fix_code, CodefixConfig, CorrectionOutcome, ErrorTable, NewAttempt, RunOutcome,
    SUCCESS_EXPLANATION,
};
use codefix_runner::{CodeRunner, PythonRunner, RunnerError};
use codefix_storage::{HistoryStore, StorageError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors that abort a correction cycle.
///
/// Failures of the submitted code are not errors; they come back inside the
/// [`CorrectionOutcome`].
#[derive(Error, Debug)]
pub enum CorrectorError {
    #[error("could not save history: {0}")]
    History(#[source] StorageError),

    #[error("could not run code: {0}")]
    Runner(#[from] RunnerError),
}

pub type Result<T> = std::result::Result<T, CorrectorError>;

/// Runs correction cycles against a shared history store
pub struct Corrector<R: CodeRunner> {
    runner: R,
    table: ErrorTable,
    history: Arc<HistoryStore>,
}

impl Corrector<PythonRunner> {
    /// Build a corrector from configuration, running code with Python
    pub fn from_config(config: &CodefixConfig, history: Arc<HistoryStore>) -> Self {
        Self::with_runner(
            PythonRunner::from_config(&config.runner),
            config.error_table(),
            history,
        )
    }
}

impl<R: CodeRunner> Corrector<R> {
    /// Create a corrector with a custom runner
    pub fn with_runner(runner: R, table: ErrorTable, history: Arc<HistoryStore>) -> Self {
        Self {
            runner,
            table,
            history,
        }
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn table(&self) -> &ErrorTable {
        &self.table
    }

    /// Run one full cycle for `original`.
    ///
    /// Exactly one history record is written when this returns `Ok`. If the
    /// write fails nothing is persisted and the cycle fails with
    /// [`CorrectorError::History`].
    #[instrument(skip(self, original), fields(bytes = original.len()))]
    pub async fn correct(&self, original: &str) -> Result<CorrectionOutcome> {
        let corrected = fix_code(original);
        debug!(changed = corrected != original, "Applied pattern fixes");

        let outcome = self.runner.run(&corrected).await?;

        let (failure_detail, explanation, failure) = match outcome {
            RunOutcome::Success => (String::new(), SUCCESS_EXPLANATION.to_string(), None),
            RunOutcome::Failure(failure) => {
                let explanation = self.table.explain(&failure.category).to_string();
                (failure.detail.clone(), explanation, Some(failure))
            }
        };

        let attempt = NewAttempt {
            original: original.to_string(),
            corrected: corrected.clone(),
            failure_detail,
            explanation: explanation.clone(),
        };

        let id = self.history.append(&attempt).await.map_err(|e| {
            warn!("Failed to record correction attempt: {}", e);
            CorrectorError::History(e)
        })?;

        match &failure {
            None => info!(id, "Corrected code ran successfully"),
            Some(f) => info!(id, category = %f.category, "Corrected code failed"),
        }

        Ok(CorrectionOutcome {
            id,
            corrected,
            explanation,
            failure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codefix_core::Failure;
    use codefix_runner::MockRunner;
    use tempfile::TempDir;

    async fn create_store(dir: &TempDir) -> Arc<HistoryStore> {
        let store = HistoryStore::open_and_init(dir.path().join("history.db"))
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_successful_cycle_records_once() {
        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let corrector = Corrector::with_runner(MockRunner::new(), ErrorTable::builtin(), history);

        let outcome = corrector.correct("print \"hello\"").await.unwrap();
        assert_eq!(outcome.corrected, "print(\"hello\")");
        assert_eq!(outcome.explanation, "Code ran successfully.");
        assert!(outcome.failure.is_none());

        let records = corrector.history().recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, outcome.id);
        assert_eq!(records[0].original, "print \"hello\"");
        assert_eq!(records[0].corrected, "print(\"hello\")");
        assert_eq!(records[0].failure_detail, "");
        assert_eq!(records[0].explanation, "Code ran successfully.");
    }

    #[tokio::test]
    async fn test_failed_cycle_is_classified() {
        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let runner = MockRunner::new().with_outcome(
            "if x == 1:\n    print(\"ok\")",
            RunOutcome::failure("NameError", "name 'x' is not defined"),
        );
        let corrector = Corrector::with_runner(runner, ErrorTable::builtin(), history);

        let outcome = corrector
            .correct("if x = 1:\n    print \"ok\"")
            .await
            .unwrap();

        assert_eq!(outcome.corrected, "if x == 1:\n    print(\"ok\")");
        assert_eq!(
            outcome.explanation,
            "You used a variable that was never defined."
        );
        assert_eq!(
            outcome.failure,
            Some(Failure::new("NameError", "name 'x' is not defined"))
        );

        let records = corrector.history().recent(10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].failure_detail, "name 'x' is not defined");
        assert_eq!(
            records[0].explanation,
            "You used a variable that was never defined."
        );
    }

    #[tokio::test]
    async fn test_unknown_category_uses_fallback() {
        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let runner =
            MockRunner::new().with_outcome("boom()", RunOutcome::failure("WeirdError", "boom"));
        let corrector = Corrector::with_runner(runner, ErrorTable::builtin(), history);

        let outcome = corrector.correct("boom()").await.unwrap();
        assert_eq!(outcome.explanation, "Unknown error.");
    }

    #[tokio::test]
    async fn test_history_failure_aborts_cycle() {
        let dir = TempDir::new().unwrap();
        // schema never created, so the insert fails
        let store = HistoryStore::open(dir.path().join("history.db"))
            .await
            .unwrap();
        let history = Arc::new(store);
        let corrector =
            Corrector::with_runner(MockRunner::new(), ErrorTable::builtin(), history.clone());

        let err = corrector.correct("print(1)").await.unwrap_err();
        assert!(matches!(err, CorrectorError::History(_)));
        assert!(err.to_string().starts_with("could not save history"));

        history.init_schema().await.unwrap();
        assert_eq!(history.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_runner_failure_records_nothing() {
        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let corrector =
            Corrector::with_runner(MockRunner::unavailable(), ErrorTable::builtin(), history);

        let err = corrector.correct("print(1)").await.unwrap_err();
        assert!(matches!(err, CorrectorError::Runner(_)));
        assert_eq!(corrector.history().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_each_cycle_appends_one_record() {
        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let corrector = Corrector::with_runner(MockRunner::new(), ErrorTable::builtin(), history);

        for code in ["a = 1", "print 2", "if a = 1:"] {
            corrector.correct(code).await.unwrap();
        }

        let records = corrector.history().recent(10).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].original, "if a = 1:");
        assert_eq!(records[0].corrected, "if a == 1:");
    }

    #[tokio::test]
    async fn test_end_to_end_with_python() {
        let python = std::process::Command::new("python3")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);
        if !python {
            return;
        }

        let dir = TempDir::new().unwrap();
        let history = create_store(&dir).await;
        let corrector = Corrector::from_config(&CodefixConfig::default(), history);

        let outcome = corrector
            .correct("if x = 1:\n    print \"ok\"")
            .await
            .unwrap();
        assert_eq!(outcome.corrected, "if x == 1:\n    print(\"ok\")");
        assert_eq!(
            outcome.failure.as_ref().map(|f| f.category.as_str()),
            Some("NameError")
        );
        assert_eq!(
            outcome.explanation,
            "You used a variable that was never defined."
        );
        assert_eq!(corrector.history().count().await.unwrap(), 1);

        let ok = corrector.correct("print 1 + 1").await.unwrap();
        assert!(ok.succeeded());
        assert_eq!(corrector.history().count().await.unwrap(), 2);
    }
}
