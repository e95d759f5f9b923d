//! Unit tests for file-backed local storage
//!
//! These tests verify that stored values survive reopening the store.

use std::fs;

use near_outcome_resolver::storage::{LocalStore, LAST_TRANSACTION_HASH_KEY};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::DUMMY_TX_HASH;

/// What is tested: Values written to a file-backed store are loaded on reopen
/// Why: The last transaction hash persists across restarts
#[tokio::test]
async fn test_store_persists_across_reopen() {
    let test_dir = ".tmp/test_storage_reopen";
    let path = format!("{}/nested/local_storage.json", test_dir);
    let _ = fs::remove_dir_all(test_dir);

    let store = LocalStore::open(&path).await.unwrap();
    assert_eq!(store.get(LAST_TRANSACTION_HASH_KEY).await, None);
    store.record_last_transaction(DUMMY_TX_HASH).await.unwrap();
    store.set("theme", "dark").await.unwrap();
    drop(store);

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(
        reopened.get(LAST_TRANSACTION_HASH_KEY).await.as_deref(),
        Some(DUMMY_TX_HASH)
    );
    assert_eq!(reopened.remove("theme").await.unwrap().as_deref(), Some("dark"));
    drop(reopened);

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(reopened.get("theme").await, None);

    fs::remove_dir_all(test_dir).unwrap();
}

/// What is tested: A corrupt storage file is reported instead of silently discarded
/// Why: Overwriting it would lose the user's data
#[tokio::test]
async fn test_store_rejects_corrupt_file() {
    let test_dir = ".tmp/test_storage_corrupt";
    let path = format!("{}/local_storage.json", test_dir);
    fs::create_dir_all(test_dir).unwrap();
    fs::write(&path, "{not json").unwrap();

    let result = LocalStore::open(&path).await;
    fs::remove_dir_all(test_dir).unwrap();

    let err = result.err().expect("corrupt file should fail to open");
    assert!(format!("{:#}", err).contains("Failed to parse local storage"));
}
