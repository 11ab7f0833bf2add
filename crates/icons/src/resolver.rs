//! Icon resolution: hash, probe, reconcile, upload.

use crate::error::{IconError, IconResult};
use crate::guard::InFlight;
use bytes::Bytes;
use futures::TryStreamExt;
use presence_core::config::IconsConfig;
use presence_core::{
    ContentHash, ICON_CONTENT_TYPE, IconPayload, Thumbnail, icon_object_key, public_icon_url,
};
use presence_index::{IconRepo, IconRow, IndexStore};
use presence_storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outcome of a domain-migration sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records examined.
    pub scanned: u64,
    /// Records whose URL was rewritten.
    pub updated: u64,
}

/// Resolves icons to public URLs, keeping the object store and the local
/// index in agreement.
pub struct IconResolver {
    store: Arc<dyn ObjectStore>,
    index: Arc<dyn IndexStore>,
    config: IconsConfig,
    in_flight: InFlight,
}

impl IconResolver {
    /// Build a resolver. When `migrate_on_start` is set, cached URLs are
    /// rewritten to the configured public domain before this returns.
    pub async fn new(
        store: Arc<dyn ObjectStore>,
        index: Arc<dyn IndexStore>,
        config: IconsConfig,
    ) -> IconResult<Self> {
        let resolver = Self {
            store,
            index,
            config,
            in_flight: InFlight::new(),
        };

        if resolver.config.migrate_on_start {
            resolver.migrate_urls().await?;
        }

        Ok(resolver)
    }

    pub fn config(&self) -> &IconsConfig {
        &self.config
    }

    /// Names with a resolution currently in progress.
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Resolve raw icon bytes to the public URL of their uploaded thumbnail.
    ///
    /// A concurrent call for the same `name` returns the computed URL
    /// immediately without touching the store or the index.
    pub async fn resolve_icon_url(&self, icon: &[u8], name: &str) -> IconResult<String> {
        let hash = ContentHash::compute(icon);
        let content_id = hash.to_hex();
        let key = icon_object_key(&hash);
        let url = public_icon_url(&self.config.public_domain, &hash);

        let Some(_guard) = self.in_flight.try_acquire(name) else {
            debug!(name, content_id = %content_id, "Resolution already in progress for name");
            return Ok(url);
        };

        let exists = self.probe(&key).await;
        let mut record = self.index.find_by_name_or_hash(name, &content_id).await?;

        // Only a record for this content is stale. A record found by name
        // alone belongs to another icon whose object was not probed.
        if !exists
            && let Some(found) = record.take()
            && found.content_id == content_id
        {
            info!(
                name,
                content_id = %content_id,
                url = %found.url,
                "Remote object missing, dropping stale index entry"
            );
            self.index.delete_by_hash(&content_id).await?;
        }

        if let Some(record) = record {
            return self.reconcile_hit(record, &content_id, &url, name).await;
        }

        let thumbnail = Thumbnail::render(icon, self.config.thumbnail_size)?;
        let size = thumbnail.png.len();

        self.store
            .put(&key, Bytes::from(thumbnail.png), ICON_CONTENT_TYPE)
            .await
            .map_err(|source| IconError::RemoteWrite {
                key: key.clone(),
                source,
            })?;
        self.index.insert(&content_id, &url, name).await?;

        if !self.probe(&key).await {
            warn!(
                name,
                content_id = %content_id,
                key = %key,
                "Uploaded icon not visible after put, rolling back index entry"
            );
            self.index.delete_by_hash(&content_id).await?;
            return Err(IconError::RemoteVerify { key });
        }

        info!(
            name,
            content_id = %content_id,
            size,
            backend = self.store.backend_name(),
            "Uploaded icon"
        );
        Ok(url)
    }

    /// Resolve a base64 icon, either bare or as a `data:image/...;base64,` URL.
    pub async fn resolve_icon_base64(&self, encoded: &str, name: &str) -> IconResult<String> {
        let payload = IconPayload::from_base64(encoded)?;
        self.resolve_icon_url(payload.as_bytes(), name).await
    }

    /// Rewrite every cached URL to the configured public domain.
    ///
    /// Never touches the object store. Safe to run repeatedly.
    pub async fn migrate_urls(&self) -> IconResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let mut pending = Vec::new();

        // The index may hold a single connection; finish reading before
        // issuing any rewrite.
        {
            let mut rows = self.index.stream_icons();
            while let Some(row) = rows.try_next().await? {
                report.scanned += 1;
                let hash = match ContentHash::from_hex(&row.content_id) {
                    Ok(hash) => hash,
                    Err(e) => {
                        warn!(
                            name = %row.display_name,
                            content_id = %row.content_id,
                            error = %e,
                            "Skipping index entry with malformed content id"
                        );
                        continue;
                    }
                };
                let url = public_icon_url(&self.config.public_domain, &hash);
                if row.url != url {
                    pending.push((row, url));
                }
            }
        }

        for (row, url) in pending {
            if self.index.update_url(&row.content_id, &url).await? {
                info!(
                    name = %row.display_name,
                    content_id = %row.content_id,
                    old_url = %row.url,
                    new_url = %url,
                    "Migrated icon URL"
                );
                report.updated += 1;
            }
        }

        if report.updated > 0 {
            info!(
                scanned = report.scanned,
                updated = report.updated,
                domain = %self.config.public_domain,
                "Icon URL migration complete"
            );
        }
        Ok(report)
    }

    /// Delete every index record. Uploaded objects are left in place.
    pub async fn clear_index(&self) -> IconResult<u64> {
        let removed = self.index.clear_icons().await?;
        info!(removed, "Cleared icon index");
        Ok(removed)
    }

    async fn reconcile_hit(
        &self,
        record: IconRow,
        content_id: &str,
        url: &str,
        name: &str,
    ) -> IconResult<String> {
        if record.content_id != content_id {
            // Matched by name only, and the object for the new content is
            // already in the store.
            info!(
                name,
                content_id,
                previous_content_id = %record.content_id,
                "Adopting existing remote icon"
            );
            self.index.insert(content_id, url, name).await?;
            return Ok(url.to_string());
        }

        if record.url != url {
            info!(
                name,
                content_id,
                old_url = %record.url,
                new_url = url,
                "Refreshing cached icon URL"
            );
            self.index.update_url(content_id, url).await?;
            return Ok(url.to_string());
        }

        debug!(name, content_id, "Icon cache hit");
        Ok(record.url)
    }

    async fn probe(&self, key: &str) -> bool {
        match self.store.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(
                    key,
                    backend = self.store.backend_name(),
                    error = %e,
                    "Existence probe failed, treating object as absent"
                );
                false
            }
        }
    }
}
