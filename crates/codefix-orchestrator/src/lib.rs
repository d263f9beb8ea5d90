//! # codefix-orchestrator
//!
//! Wires the pattern fixer, the code runner, the error table and the history
//! store into one request/response cycle.

mod corrector;

pub use corrector::{Corrector, CorrectorError, Result};
