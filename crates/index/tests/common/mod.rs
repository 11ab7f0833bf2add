//! Shared helpers for index tests.

use presence_index::{IndexResult, IndexStore, SqliteStore};
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tempfile::TempDir;

/// A throwaway on-disk index that is removed on drop.
pub struct TestIndex {
    pub store: Arc<dyn IndexStore>,
    sqlite_store: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

impl TestIndex {
    pub async fn new() -> IndexResult<Self> {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let store = Arc::new(SqliteStore::new(temp_dir.path().join("data.db")).await?);

        Ok(Self {
            store: store.clone(),
            sqlite_store: store,
            _temp_dir: temp_dir,
        })
    }

    /// Raw pool access for assertions that go around the repository API.
    #[allow(dead_code)]
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite_store.pool()
    }
}

/// A deterministic 64-character content id.
pub fn content_id(seed: char) -> String {
    std::iter::repeat_n(seed, 64).collect()
}
