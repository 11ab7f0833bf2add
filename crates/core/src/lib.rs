//! Core domain types and shared logic for the presence icon cache.
//!
//! This crate defines the data model used across all other crates:
//! - Content hashes that identify icon payloads
//! - Icon payload decoding and thumbnail rendering
//! - Public URL construction for uploaded icons
//! - Configuration types

pub mod config;
pub mod error;
pub mod hash;
pub mod icon;
pub mod url;

pub use error::{Error, Result};
pub use hash::ContentHash;
pub use icon::{IconPayload, Thumbnail};
pub use url::{icon_object_key, public_icon_url};

/// Default edge length of uploaded icon thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;

/// Largest thumbnail edge accepted by configuration.
pub const MAX_THUMBNAIL_SIZE: u32 = 1024;

/// Content type of every uploaded icon object.
pub const ICON_CONTENT_TYPE: &str = "image/png";
