//! codefix storage - correction history on Turso
//!
//! This crate keeps the append-only log of correction attempts. Every cycle
//! of the corrector writes exactly one row; rows are never updated or
//! deleted.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │         Corrector (orchestrator)            │
//! └─────────────────┬───────────────────────────┘
//!                   │ append / recent
//! ┌─────────────────▼───────────────────────────┐
//! │         HistoryStore (this crate)           │
//! └─────────────────┬───────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────┐
//! │         Turso database                      │
//! │  • .codefix/history.db                      │
//! │  • Table: code_history                      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use codefix_core::NewAttempt;
//! use codefix_storage::HistoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = HistoryStore::open(".codefix/history.db").await?;
//! store.init_schema().await?;
//!
//! let id = store
//!     .append(&NewAttempt {
//!         original: "print 1".to_string(),
//!         corrected: "print(1)".to_string(),
//!         failure_detail: String::new(),
//!         explanation: "Code ran successfully.".to_string(),
//!     })
//!     .await?;
//!
//! for record in store.recent(10).await? {
//!     println!("#{} {}", record.id, record.explanation);
//! }
//! # let _ = id;
//! # Ok(())
//! # }
//! ```

pub mod db;

pub use db::{HistoryStore, Result, StorageError};
