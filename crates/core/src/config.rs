//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application data directory name under the per-user data directory.
pub const APP_DIR_NAME: &str = "ProcessReporter";

/// Directory name used by earlier releases (sic). Still opened when it holds
/// an index and [`APP_DIR_NAME`] does not, so its legacy tables get cleaned up.
pub const LEGACY_APP_DIR_NAME: &str = "ProcessRepoter";

/// Index database file name.
pub const INDEX_FILE_NAME: &str = "data.db";

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for storage.
        path: PathBuf,
    },
    /// S3-compatible storage (AWS S3, Cloudflare R2, MinIO).
    S3 {
        /// Bucket name.
        bucket: String,
        /// Optional endpoint URL (for MinIO, etc.).
        endpoint: Option<String>,
        /// Cloudflare account ID. When set and `endpoint` is not, the R2
        /// endpoint for this account is used.
        account_id: Option<String>,
        /// Region. Defaults to "auto" for R2 and "us-east-1" otherwise.
        region: Option<String>,
        /// Optional key prefix.
        prefix: Option<String>,
        /// Access key ID. Falls back to the ambient AWS credential chain if not set.
        access_key_id: Option<String>,
        /// Secret access key. Falls back to the ambient AWS credential chain if not set.
        secret_access_key: Option<String>,
        /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO.
        #[serde(default)]
        force_path_style: bool,
        /// Upload objects with the `public-read` canned ACL.
        #[serde(default = "default_public_read")]
        public_read: bool,
    },
}

fn default_public_read() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/storage"),
        }
    }
}

/// Endpoint of a Cloudflare R2 account.
pub fn r2_endpoint(account_id: &str) -> String {
    format!("https://{account_id}.r2.cloudflarestorage.com")
}

impl StorageConfig {
    /// Validate storage configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            StorageConfig::S3 {
                bucket,
                access_key_id,
                secret_access_key,
                ..
            } => {
                if bucket.trim().is_empty() {
                    return Err("s3 config requires a non-empty bucket".to_string());
                }
                match (access_key_id.as_ref(), secret_access_key.as_ref()) {
                    (Some(_), Some(_)) | (None, None) => Ok(()),
                    _ => Err(
                        "s3 config requires both access_key_id and secret_access_key when either is set"
                            .to_string(),
                    ),
                }
            }
            StorageConfig::Filesystem { .. } => Ok(()),
        }
    }
}

/// Local index configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Database file path. Defaults to the per-user application data directory.
    pub path: Option<PathBuf>,
}

impl IndexConfig {
    /// Resolve the database path, falling back to
    /// `{data_local_dir}/ProcessReporter/data.db`.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        match dirs::data_local_dir() {
            Some(dir) => default_index_path_in(&dir),
            None => PathBuf::from("./data").join(INDEX_FILE_NAME),
        }
    }
}

/// Default index path under `data_dir`, preferring an existing legacy index
/// when no current one exists.
pub fn default_index_path_in(data_dir: &Path) -> PathBuf {
    let current = data_dir.join(APP_DIR_NAME).join(INDEX_FILE_NAME);
    let legacy = data_dir.join(LEGACY_APP_DIR_NAME).join(INDEX_FILE_NAME);
    if !current.exists() && legacy.is_file() {
        return legacy;
    }
    current
}

/// Icon cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IconsConfig {
    /// Public domain that serves uploaded icons, e.g. "https://cdn.example.com".
    pub public_domain: String,
    /// Edge length of uploaded thumbnails in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,
    /// Rewrite cached URLs to the current public domain when the resolver starts.
    #[serde(default = "default_migrate_on_start")]
    pub migrate_on_start: bool,
}

fn default_thumbnail_size() -> u32 {
    crate::DEFAULT_THUMBNAIL_SIZE
}

fn default_migrate_on_start() -> bool {
    true
}

impl IconsConfig {
    /// Create a config for the given public domain with default settings.
    pub fn new(public_domain: impl Into<String>) -> Self {
        Self {
            public_domain: public_domain.into(),
            thumbnail_size: default_thumbnail_size(),
            migrate_on_start: default_migrate_on_start(),
        }
    }

    /// Validate icon configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.public_domain.trim().is_empty() {
            return Err("icons.public_domain must not be empty".to_string());
        }
        if self.thumbnail_size == 0 || self.thumbnail_size > crate::MAX_THUMBNAIL_SIZE {
            return Err(format!(
                "icons.thumbnail_size {} must be between 1 and {}",
                self.thumbnail_size,
                crate::MAX_THUMBNAIL_SIZE
            ));
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Local index configuration.
    #[serde(default)]
    pub index: IndexConfig,
    /// Icon cache configuration (required).
    pub icons: IconsConfig,
}

impl AppConfig {
    /// Create a test configuration with filesystem storage under `root`.
    ///
    /// **For testing only.**
    pub fn for_testing(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            storage: StorageConfig::Filesystem {
                path: root.join("storage"),
            },
            index: IndexConfig {
                path: Some(root.join(INDEX_FILE_NAME)),
            },
            icons: IconsConfig::new("https://cdn.example.com"),
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        self.storage.validate()?;
        self.icons.validate()?;
        Ok(())
    }
}
