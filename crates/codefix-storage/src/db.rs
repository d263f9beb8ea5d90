//! History database using Turso.
//!
//! Architecture:
//!   - Database file: .codefix/history.db
//!   - One connection, used by one operation at a time behind a mutex
//!   - Schema: code_history table, one row per correction attempt
//!   - Ordering: by id, which only ever grows because rows are never deleted

use chrono::{DateTime, Utc};
use codefix_core::{AttemptRecord, NewAttempt};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use turso::{params, Builder, Connection};

/// Append-only store of correction attempts
pub struct HistoryStore {
    /// A turso connection must not be used by two tasks at once
    conn: Mutex<Connection>,
    path: String,
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("turso error: {0}")]
    Turso(#[from] turso::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record not found: {0}")]
    RecordNotFound(i64),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

const LAST_ROWID_QUERY: &str = "SELECT last_insert_rowid()";

const SELECT_COLUMNS: &str = "SELECT id, original_code, corrected_code, error_message, correction_reason, created_at FROM code_history";

impl HistoryStore {
    /// Open the history database at the specified path.
    ///
    /// The parent directory is created if needed. Call
    /// [`init_schema`](Self::init_schema) before first use.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db = Builder::new_local(&path_str).build().await?;
        let conn = db.connect()?;

        // PRAGMA statements may return rows, so use query()
        let _ = conn.query("PRAGMA journal_mode=WAL", params![]).await?;
        let _ = conn.query("PRAGMA busy_timeout=5000", params![]).await?;

        debug!("Opened history database at {}", path_str);

        Ok(HistoryStore {
            conn: Mutex::new(conn),
            path: path_str,
        })
    }

    /// Open the database and make sure the schema exists
    pub async fn open_and_init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let store = Self::open(path).await?;
        store.init_schema().await?;
        Ok(store)
    }

    /// Returns the database file path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Create the history table if it doesn't exist. Idempotent.
    pub async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"CREATE TABLE IF NOT EXISTS code_history (
                id INTEGER PRIMARY KEY,
                original_code TEXT NOT NULL,
                corrected_code TEXT NOT NULL,
                error_message TEXT NOT NULL DEFAULT '',
                correction_reason TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )"#,
            params![],
        )
        .await?;

        Ok(())
    }

    /// Append one attempt and return the identifier the store assigned.
    ///
    /// The insert and the id read-back run in one transaction, so a failed
    /// append leaves no row behind. The timestamp is taken here, at
    /// creation, and never changes.
    pub async fn append(&self, attempt: &NewAttempt) -> Result<i64> {
        self.append_with_id_query(attempt, LAST_ROWID_QUERY).await
    }

    async fn append_with_id_query(&self, attempt: &NewAttempt, id_query: &str) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().await?;

        let created_at = Utc::now();
        let inserted: Result<i64> = async {
            tx.execute(
                r#"INSERT INTO code_history (
                    original_code, corrected_code, error_message, correction_reason, created_at
                ) VALUES (?, ?, ?, ?, ?)"#,
                params![
                    attempt.original.clone(),
                    attempt.corrected.clone(),
                    attempt.failure_detail.clone(),
                    attempt.explanation.clone(),
                    created_at.to_rfc3339(),
                ],
            )
            .await?;

            let mut rows = tx.query(id_query, params![]).await?;
            match rows.next().await? {
                Some(row) => Ok(row.get(0)?),
                None => Err(StorageError::Other(
                    "insert did not report a row id".to_string(),
                )),
            }
        }
        .await;

        match inserted {
            Ok(id) => {
                tx.commit().await?;
                debug!(id, "Appended history record");
                Ok(id)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Failed to roll back history append: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// The most recent `limit` records, newest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<AttemptRecord>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = format!("{} ORDER BY id DESC LIMIT ?", SELECT_COLUMNS);
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.conn.lock().await;
        let mut rows = conn.query(&query, params![limit]).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(parse_record_row(&row)?);
        }

        Ok(records)
    }

    /// Fetch a single record by id
    pub async fn get(&self, id: i64) -> Result<AttemptRecord> {
        let query = format!("{} WHERE id = ?", SELECT_COLUMNS);
        let conn = self.conn.lock().await;
        let mut rows = conn.query(&query, params![id]).await?;

        if let Some(row) = rows.next().await? {
            parse_record_row(&row)
        } else {
            Err(StorageError::RecordNotFound(id))
        }
    }

    /// Number of records in the history
    pub async fn count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM code_history", params![])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(row.get(0)?)
        } else {
            Ok(0)
        }
    }
}

fn parse_record_row(row: &turso::Row) -> Result<AttemptRecord> {
    let created_at_str: String = row.get(5)?;

    Ok(AttemptRecord {
        id: row.get(0)?,
        original: row.get(1)?,
        corrected: row.get(2)?,
        failure_detail: row.get(3)?,
        explanation: row.get(4)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| StorageError::Other(format!("failed to parse created_at: {}", e)))?
            .with_timezone(&Utc),
    })
}
