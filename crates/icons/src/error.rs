//! Icon resolution errors.

use presence_index::IndexError;
use presence_storage::StorageError;
use thiserror::Error;

/// Failures surfaced by [`crate::IconResolver`].
///
/// Probe failures are not represented here: an existence check that errors
/// is logged and treated as "object absent".
#[derive(Debug, Error)]
pub enum IconError {
    /// The payload is not valid base64 or not a decodable image.
    #[error("invalid icon: {0}")]
    Decode(#[from] presence_core::Error),

    /// The object store rejected the upload.
    #[error("failed to upload {key}: {source}")]
    RemoteWrite {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The upload was acknowledged but the object is not visible.
    #[error("uploaded object {key} is not visible in the store")]
    RemoteVerify { key: String },

    #[error("index error: {0}")]
    Index(#[from] IndexError),
}

/// Result type for icon resolution.
pub type IconResult<T> = std::result::Result<T, IconError>;
