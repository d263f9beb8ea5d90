//! Integration tests for the history store
//!
//! Covers:
//! - Appending records and the ids the store assigns
//! - Newest-first retrieval with limits
//! - Lookup of single records
//! - Persistence across reopen
//! - Appends and reads from many threads at once

use codefix_core::NewAttempt;
use codefix_storage::{HistoryStore, StorageError};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a temporary store for testing
async fn create_test_store() -> (HistoryStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("history.db");

    let store = HistoryStore::open(&db_path)
        .await
        .expect("Failed to open database");
    store.init_schema().await.expect("Failed to init schema");

    (store, temp_dir)
}

/// Helper to create an attempt
fn attempt(n: usize) -> NewAttempt {
    NewAttempt {
        original: format!("print {}", n),
        corrected: format!("print({})", n),
        failure_detail: String::new(),
        explanation: "Code ran successfully.".to_string(),
    }
}

#[tokio::test]
async fn test_append_assigns_increasing_ids() {
    let (store, _dir) = create_test_store().await;

    let first = store.append(&attempt(1)).await.expect("Failed to append");
    let second = store.append(&attempt(2)).await.expect("Failed to append");
    let third = store.append(&attempt(3)).await.expect("Failed to append");

    assert!(first < second && second < third);
    assert_eq!(store.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_append_stores_all_fields() {
    let (store, _dir) = create_test_store().await;

    let new = NewAttempt {
        original: "if x = 1:\n    print \"ok\"".to_string(),
        corrected: "if x == 1:\n    print(\"ok\")".to_string(),
        failure_detail: "name 'x' is not defined".to_string(),
        explanation: "You used a variable that was never defined.".to_string(),
    };
    let id = store.append(&new).await.expect("Failed to append");

    let record = store.get(id).await.expect("Failed to get record");
    assert_eq!(record.id, id);
    assert_eq!(record.original, new.original);
    assert_eq!(record.corrected, new.corrected);
    assert_eq!(record.failure_detail, new.failure_detail);
    assert_eq!(record.explanation, new.explanation);
}

#[tokio::test]
async fn test_recent_is_newest_first_and_limited() {
    let (store, _dir) = create_test_store().await;

    for n in 0..5 {
        store.append(&attempt(n)).await.expect("Failed to append");
    }

    let recent = store.recent(3).await.expect("Failed to query recent");
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].original, "print 4");
    assert_eq!(recent[2].original, "print 2");

    for pair in recent.windows(2) {
        assert!(pair[0].id > pair[1].id);
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_recent_returns_fewer_when_store_is_small() {
    let (store, _dir) = create_test_store().await;

    store.append(&attempt(1)).await.unwrap();
    store.append(&attempt(2)).await.unwrap();

    let recent = store.recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn test_get_missing_record() {
    let (store, _dir) = create_test_store().await;

    let result = store.get(42).await;
    assert!(matches!(result, Err(StorageError::RecordNotFound(42))));
}

#[tokio::test]
async fn test_history_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("history.db");

    {
        let store = HistoryStore::open_and_init(&db_path).await.unwrap();
        store.append(&attempt(7)).await.unwrap();
    }

    let store = HistoryStore::open_and_init(&db_path).await.unwrap();
    let recent = store.recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].corrected, "print(7)");
}

#[tokio::test]
async fn test_concurrent_appends_get_unique_ids() {
    let (store, _dir) = create_test_store().await;
    let store = Arc::new(store);

    let mut handles = Vec::new();
    for n in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move { store.append(&attempt(n)).await }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 8);
    assert_eq!(store.count().await.unwrap(), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_parallel_appends_and_reads_share_one_store() {
    let (store, _dir) = create_test_store().await;
    let store = Arc::new(store);

    let mut writers = Vec::new();
    let mut readers = Vec::new();
    for n in 0..64 {
        let store = Arc::clone(&store);
        if n % 2 == 0 {
            writers.push(tokio::spawn(async move { store.append(&attempt(n)).await }));
        } else {
            readers.push(tokio::spawn(async move { store.recent(10).await }));
        }
    }

    let mut ids = Vec::new();
    for handle in writers {
        ids.push(handle.await.unwrap().expect("append failed"));
    }
    for handle in readers {
        let records = handle.await.unwrap().expect("recent failed");
        assert!(records.len() <= 10);
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 32);
    assert_eq!(store.count().await.unwrap(), 32);
}
