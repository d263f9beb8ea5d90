//! Python code execution in a child interpreter

use async_trait::async_trait;
use codefix_core::{RunOutcome, RunnerConfig, PROCESS_EXIT_CATEGORY, TIMEOUT_CATEGORY};
use serde::Deserialize;
use std::collections::HashMap;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{CodeRunner, Result, RunnerError};

/// Prefix of the stderr line carrying the failure report. The per-run
/// token follows it, then the JSON body.
const REPORT_MARKER: &str = "__codefix_failure__ ";

/// Reads the run token (first line) and then the submitted source from stdin,
/// and executes the source against an empty globals dict, so the code sees
/// none of the bootstrap's names. Only a report carrying the token counts.
const BOOTSTRAP: &str = r#"
import json, sys
def _run():
    token = sys.stdin.readline().rstrip("\n")
    source = sys.stdin.read()
    try:
        exec(compile(source, "<submitted>", "exec"), {})
    except Exception as exc:
        sys.stdout.flush()
        sys.stderr.write("\n__codefix_failure__ " + token + " " + json.dumps({"category": type(exc).__name__, "detail": str(exc)}) + "\n")
        sys.stderr.flush()
        sys.exit(1)
_run()
"#;

#[derive(Debug, Deserialize)]
struct FailureReport {
    category: String,
    detail: String,
}

/// Runs code with a Python interpreter in its own process.
///
/// Each run starts a fresh interpreter in isolated mode (`-I`), so no state
/// survives between runs and the caller's variables are never visible. The
/// child is killed if it outlives the configured timeout.
#[derive(Debug, Clone)]
pub struct PythonRunner {
    interpreter: String,
    timeout: Duration,
}

impl PythonRunner {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(&config.interpreter, Duration::from_secs(config.timeout_secs))
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn execute(&self, code: &str, token: &str) -> Result<Output> {
        let mut child = Command::new(&self.interpreter)
            .args(["-I", "-c", BOOTSTRAP])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let source = format!("{}\n{}", token, code);
            tokio::spawn(async move {
                // the interpreter may exit before reading everything
                if let Err(e) = stdin.write_all(source.as_bytes()).await {
                    debug!("Failed to write source to interpreter: {}", e);
                }
            });
        }

        Ok(child.wait_with_output().await?)
    }
}

impl Default for PythonRunner {
    fn default() -> Self {
        Self::from_config(&RunnerConfig::default())
    }
}

#[async_trait]
impl CodeRunner for PythonRunner {
    #[instrument(skip(self, code), fields(interpreter = %self.interpreter, bytes = code.len()))]
    async fn run(&self, code: &str) -> Result<RunOutcome> {
        debug!("Executing submitted code");

        let token = Uuid::new_v4().simple().to_string();
        let output = match tokio::time::timeout(self.timeout, self.execute(code, &token)).await {
            Ok(output) => output?,
            Err(_) => {
                warn!("Execution exceeded {:?}, child killed", self.timeout);
                return Ok(RunOutcome::failure(
                    TIMEOUT_CATEGORY,
                    format!("execution exceeded {} seconds", self.timeout.as_secs_f32()),
                ));
            }
        };

        let outcome = interpret_output(&output, &token);
        debug!(success = outcome.is_success(), "Execution finished");
        Ok(outcome)
    }
}

/// Turn the interpreter's exit status and stderr into a run outcome
fn interpret_output(output: &Output, token: &str) -> RunOutcome {
    if output.status.success() {
        return RunOutcome::Success;
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if let Some(report) = parse_report(&stderr, token) {
        return RunOutcome::failure(report.category, report.detail);
    }

    let detail = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("interpreter exited with {}", output.status));

    RunOutcome::failure(PROCESS_EXIT_CATEGORY, detail)
}

/// Find the last report line written with this run's token
fn parse_report(stderr: &str, token: &str) -> Option<FailureReport> {
    let prefix = format!("{}{} ", REPORT_MARKER, token);
    stderr
        .lines()
        .rev()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .and_then(|json| serde_json::from_str(json).ok())
}

/// Scripted runner for testing
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    outcomes: HashMap<String, RunOutcome>,
    unavailable: bool,
}

impl MockRunner {
    /// Runner that reports success for any code without a scripted outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner whose every call fails as if the interpreter were missing
    pub fn unavailable() -> Self {
        Self {
            outcomes: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn with_outcome(mut self, code: &str, outcome: RunOutcome) -> Self {
        self.outcomes.insert(code.to_string(), outcome);
        self
    }
}

#[async_trait]
impl CodeRunner for MockRunner {
    async fn run(&self, code: &str) -> Result<RunOutcome> {
        if self.unavailable {
            return Err(RunnerError::Unavailable("mock runner".to_string()));
        }
        Ok(self
            .outcomes
            .get(code)
            .cloned()
            .unwrap_or(RunOutcome::Success))
    }
}
