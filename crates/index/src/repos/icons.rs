//! Icon record repository.

use crate::error::IndexResult;
use crate::models::IconRow;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Repository for uploaded icon records.
#[async_trait]
pub trait IconRepo: Send + Sync {
    /// Find the record whose display name or content id matches.
    ///
    /// When the name and the content id match different rows, the most
    /// recently inserted row is returned.
    async fn find_by_name_or_hash(
        &self,
        display_name: &str,
        content_id: &str,
    ) -> IndexResult<Option<IconRow>>;

    /// Insert a record, overwriting `url` and `display_name` if a row for
    /// `content_id` already exists.
    async fn insert(&self, content_id: &str, url: &str, display_name: &str) -> IndexResult<()>;

    /// Rewrite the URL of a record. Returns `true` when a row changed.
    async fn update_url(&self, content_id: &str, url: &str) -> IndexResult<bool>;

    /// Delete a record by content id. Returns `true` when a row was removed.
    async fn delete_by_hash(&self, content_id: &str) -> IndexResult<bool>;

    /// Stream every record in insertion order.
    ///
    /// The stream holds a database connection until it is dropped.
    fn stream_icons(&self) -> BoxStream<'_, IndexResult<IconRow>>;

    /// Count records.
    async fn count_icons(&self) -> IndexResult<u64>;

    /// Delete every record. Returns the number removed.
    async fn clear_icons(&self) -> IndexResult<u64>;
}
