#![cfg(test)]
use tempfile::TempDir;

use crate::record::{RecordStore, SeaOrmRecordStore};

/// Fresh initialized store backed by a SQLite file inside a temp dir.
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn temp_store() -> (TempDir, SeaOrmRecordStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("records.sqlite").display());
    let db = models::db::connect(&url).await.expect("connect db");
    let store = SeaOrmRecordStore::new(db);
    store.initialize().await.expect("initialize store");
    (dir, store)
}
