//! Icon payloads and thumbnail rendering.
//!
//! Window sources hand icons over as base64 text, usually wrapped in a data
//! URL (`data:image/png;base64,...`). The payload is decoded once, hashed over
//! its raw bytes, and only rendered into a thumbnail when it actually has to
//! be uploaded.

use crate::hash::ContentHash;
use base64::Engine;
use image::ImageFormat;
use image::imageops::FilterType;
use std::io::Cursor;

/// Decoded icon bytes as received from the window source.
#[derive(Clone, PartialEq, Eq)]
pub struct IconPayload {
    bytes: Vec<u8>,
}

impl IconPayload {
    /// Wrap raw, already decoded icon bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Decode a base64 icon, accepting either a data URL or bare base64.
    pub fn from_base64(encoded: &str) -> crate::Result<Self> {
        let encoded = encoded.trim();
        let body = if encoded.starts_with("data:") {
            let (header, body) = encoded.split_once(',').ok_or_else(|| {
                crate::Error::InvalidIcon("data URL has no payload separator".to_string())
            })?;
            if !header.ends_with(";base64") {
                return Err(crate::Error::InvalidIcon(format!(
                    "data URL is not base64 encoded: {header}"
                )));
            }
            body
        } else {
            encoded
        };

        if body.is_empty() {
            return Err(crate::Error::InvalidIcon("empty icon payload".to_string()));
        }

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(body)
            .map_err(|e| crate::Error::InvalidIcon(format!("invalid base64: {e}")))?;
        Ok(Self { bytes })
    }

    /// Raw decoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content hash of the decoded bytes.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::compute(&self.bytes)
    }
}

impl std::fmt::Debug for IconPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconPayload")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A PNG-encoded square thumbnail ready for upload.
#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub png: Vec<u8>,
    pub size: u32,
}

impl Thumbnail {
    /// Decode any supported raster format and render a `size`x`size` PNG.
    ///
    /// The source is scaled to cover the square and center-cropped, so
    /// non-square icons are never letterboxed.
    pub fn render(source: &[u8], size: u32) -> crate::Result<Self> {
        if size == 0 {
            return Err(crate::Error::Config(
                "thumbnail size must be greater than zero".to_string(),
            ));
        }

        let decoded = image::load_from_memory(source)?;
        let resized = decoded.resize_to_fill(size, size, FilterType::Lanczos3);

        let mut png = Vec::new();
        resized.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Self { png, size })
    }
}
