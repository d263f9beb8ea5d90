//! # codefix-core
//!
//! Core types for the codefix correction pipeline.
//!
//! This crate provides:
//! - The heuristic pattern fixer that patches submitted source line by line
//! - The error classification table (failure category → explanation)
//! - Attempt record and run outcome types shared by the other crates
//! - Workspace configuration loaded from `.codefix/config.toml`

mod classifier;
mod config;
mod error;
mod fixer;
mod types;

pub use classifier::{ErrorTable, UNKNOWN_ERROR};
pub use config::{CodefixConfig, RunnerConfig, ServerConfig, StorageConfig};
pub use error::{CodefixError, Result};
pub use fixer::{fix_code, fix_line};
pub use types::*;
