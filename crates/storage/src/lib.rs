//! Object storage abstraction and backends for the presence icon cache.
//!
//! This crate provides:
//! - The `ObjectStore` trait used by the icon resolver
//! - Backends: local filesystem and S3-compatible (AWS S3, Cloudflare R2, MinIO)

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{
    filesystem::FilesystemBackend,
    s3::{S3Backend, S3BackendOptions},
};
pub use error::{StorageError, StorageResult};
pub use traits::ObjectStore;

use presence_core::config::{StorageConfig, r2_endpoint};
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::S3 {
            bucket,
            endpoint,
            account_id,
            region,
            prefix,
            access_key_id,
            secret_access_key,
            force_path_style,
            public_read,
        } => {
            // An explicit endpoint wins; otherwise an account ID selects R2.
            let endpoint = endpoint
                .clone()
                .or_else(|| account_id.as_deref().map(r2_endpoint));
            let region = region
                .clone()
                .or_else(|| account_id.as_ref().map(|_| "auto".to_string()));

            let backend = S3Backend::new(S3BackendOptions {
                bucket: bucket.clone(),
                endpoint,
                region,
                prefix: prefix.clone(),
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                force_path_style: *force_path_style,
                public_read: *public_read,
            })
            .await?;
            Ok(Arc::new(backend))
        }
    }
}
