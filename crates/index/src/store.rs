//! Index store trait and SQLite implementation.

use crate::error::{IndexError, IndexResult};
use crate::repos::IconRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined index store trait.
#[async_trait]
pub trait IndexStore: IconRepo + Send + Sync {
    /// Run schema migrations.
    async fn migrate(&self) -> IndexResult<()>;

    /// Check database connectivity.
    async fn health_check(&self) -> IndexResult<()>;
}

/// SQLite-backed icon index.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (or create) the index at `path` and bring its schema up to date.
    pub async fn new(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5));

        // One connection serializes every statement; callers must not hold a
        // stream open while issuing writes.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "Opened icon index");

        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn table_exists(&self, table: &str) -> IndexResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn legacy_row_count(&self) -> IndexResult<i64> {
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uploads")
            .fetch_one(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl IndexStore for SqliteStore {
    async fn migrate(&self) -> IndexResult<()> {
        // Rows in the old `uploads` table were keyed by a different digest and
        // can never be hit again; keeping them would only produce false name
        // matches.
        if self.table_exists("uploads").await? {
            let legacy_rows = self.legacy_row_count().await?;
            tracing::warn!(
                legacy_rows,
                "Dropping legacy uploads table; those icons will be re-uploaded on next use"
            );
            sqlx::query("DROP TABLE uploads").execute(&self.pool).await?;
        }

        if self.table_exists("icons").await? {
            let columns: Vec<(i32, String, String, i32, Option<String>, i32)> =
                sqlx::query_as("PRAGMA table_info(icons)")
                    .fetch_all(&self.pool)
                    .await?;
            let required = ["content_id", "url", "display_name"];
            let missing: Vec<&str> = required
                .iter()
                .filter(|col| !columns.iter().any(|(_, name, ..)| name.as_str() == **col))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(IndexError::Internal(format!(
                    "incompatible index schema: icons table is missing columns: {}. \
                     Delete the index file to recreate it.",
                    missing.join(", ")
                )));
            }
        }

        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> IndexResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::IconRow;
    use futures::StreamExt;
    use futures::stream::BoxStream;
    use time::OffsetDateTime;

    #[async_trait]
    impl IconRepo for SqliteStore {
        async fn find_by_name_or_hash(
            &self,
            display_name: &str,
            content_id: &str,
        ) -> IndexResult<Option<IconRow>> {
            let row = sqlx::query_as::<_, IconRow>(
                "SELECT * FROM icons WHERE display_name = ? OR content_id = ? ORDER BY id DESC LIMIT 1",
            )
            .bind(display_name)
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn insert(&self, content_id: &str, url: &str, display_name: &str) -> IndexResult<()> {
            let now = OffsetDateTime::now_utc();
            sqlx::query(
                "INSERT INTO icons (content_id, url, display_name, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?) \
                 ON CONFLICT(content_id) DO UPDATE SET \
                 url = excluded.url, display_name = excluded.display_name, updated_at = excluded.updated_at",
            )
            .bind(content_id)
            .bind(url)
            .bind(display_name)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn update_url(&self, content_id: &str, url: &str) -> IndexResult<bool> {
            let result = sqlx::query(
                "UPDATE icons SET url = ?, updated_at = ? WHERE content_id = ? AND url <> ?",
            )
            .bind(url)
            .bind(OffsetDateTime::now_utc())
            .bind(content_id)
            .bind(url)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn delete_by_hash(&self, content_id: &str) -> IndexResult<bool> {
            let result = sqlx::query("DELETE FROM icons WHERE content_id = ?")
                .bind(content_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }

        fn stream_icons(&self) -> BoxStream<'_, IndexResult<IconRow>> {
            sqlx::query_as::<_, IconRow>("SELECT * FROM icons ORDER BY id")
                .fetch(&self.pool)
                .map(|row| row.map_err(IndexError::from))
                .boxed()
        }

        async fn count_icons(&self) -> IndexResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM icons")
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }

        async fn clear_icons(&self) -> IndexResult<u64> {
            let result = sqlx::query("DELETE FROM icons").execute(&self.pool).await?;
            Ok(result.rows_affected())
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS icons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    content_id TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_icons_display_name ON icons(display_name);
"#;
