//! Database row types.

use sqlx::FromRow;
use time::OffsetDateTime;

/// One uploaded icon.
///
/// `content_id` is the lowercase hex SHA-256 of the icon bytes and is unique
/// across the table. `display_name` is informational only; several rows may
/// share it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct IconRow {
    pub id: i64,
    pub content_id: String,
    pub url: String,
    pub display_name: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
