//! # codefix-server
//!
//! JSON API around the corrector. Each request runs one correction cycle in
//! its own task; the history store is the only shared mutable state.

mod server;
mod stats;

pub use server::{router, serve, AppState, SharedState};
pub use stats::ServerStats;
