//! Local index of uploaded presence icons.
//!
//! Maps content ids to public URLs so repeat requests skip the upload. The
//! index is a cache: every row can be rebuilt by re-uploading its icon.

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{IndexError, IndexResult};
pub use models::IconRow;
pub use repos::IconRepo;
pub use store::{IndexStore, SqliteStore};

use presence_core::config::IndexConfig;
use std::sync::Arc;

/// Open the index described by configuration.
pub async fn from_config(config: &IndexConfig) -> IndexResult<Arc<dyn IndexStore>> {
    let path = config.resolved_path();
    if path.is_dir() {
        return Err(IndexError::Config(format!(
            "index path {} is a directory",
            path.display()
        )));
    }
    tracing::info!(path = %path.display(), "Using SQLite icon index");
    let store = SqliteStore::new(&path).await?;
    Ok(Arc::new(store) as Arc<dyn IndexStore>)
}
