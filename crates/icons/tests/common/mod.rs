//! Shared helpers for resolver tests.

pub mod fixtures;
pub mod store;

use presence_core::config::IconsConfig;
use presence_icons::IconResolver;
use presence_index::{IndexStore, SqliteStore};
use std::sync::Arc;
use store::CountingStore;
use tempfile::TempDir;

pub const DOMAIN: &str = "https://cdn.example.com";

/// A resolver wired to a counting in-memory store and a temporary index.
pub struct TestResolver {
    pub resolver: Arc<IconResolver>,
    pub store: Arc<CountingStore>,
    pub index: Arc<dyn IndexStore>,
    temp_dir: TempDir,
}

impl TestResolver {
    pub async fn new() -> Self {
        Self::with_domain(DOMAIN).await
    }

    pub async fn with_domain(domain: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let index: Arc<dyn IndexStore> = Arc::new(
            SqliteStore::new(temp_dir.path().join("data.db"))
                .await
                .expect("Failed to open index"),
        );
        let store = Arc::new(CountingStore::default());
        let resolver = IconResolver::new(store.clone(), index.clone(), IconsConfig::new(domain))
            .await
            .expect("Failed to build resolver");

        Self {
            resolver: Arc::new(resolver),
            store,
            index,
            temp_dir,
        }
    }

    /// A second resolver over the same store and index, as after a restart
    /// with a different configuration.
    #[allow(dead_code)]
    pub async fn restart_with(&self, config: IconsConfig) -> Arc<IconResolver> {
        let index: Arc<dyn IndexStore> = Arc::new(
            SqliteStore::new(self.temp_dir.path().join("data.db"))
                .await
                .expect("Failed to reopen index"),
        );
        Arc::new(
            IconResolver::new(self.store.clone(), index, config)
                .await
                .expect("Failed to build resolver"),
        )
    }
}
