//! [`SqliteTier`]: the high-capacity key-value tier.

use std::path::Path;

use async_trait::async_trait;
use cardshare_core::tier::{Tier, TierResult};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;

use crate::{Result, schema::SCHEMA};

/// A key-value tier backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteTier {
  conn: tokio_rusqlite::Connection,
}

impl SqliteTier {
  /// Open (or create) a database at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let tier = Self { conn };
    tier.init_schema().await?;
    Ok(tier)
  }

  /// Open an in-memory database, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let tier = Self { conn };
    tier.init_schema().await?;
    Ok(tier)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of stored keys.
  pub async fn count(&self) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))?))
      .await?;
    Ok(n.max(0) as usize)
  }

  async fn read(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM entries WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  async fn write(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    let at = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                          updated_at = excluded.updated_at",
          rusqlite::params![key, value, at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    let key = key.to_owned();
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM entries WHERE key = ?1", rusqlite::params![key])?)
      })
      .await?;
    debug!(removed, "sqlite delete");
    Ok(())
  }
}

#[async_trait]
impl Tier for SqliteTier {
  fn name(&self) -> &str { "sqlite" }

  async fn get(&self, key: &str) -> TierResult<Option<String>> { Ok(self.read(key).await?) }

  async fn set(&self, key: &str, value: &str) -> TierResult<()> {
    Ok(self.write(key, value).await?)
  }

  async fn delete(&self, key: &str) -> TierResult<()> { Ok(self.remove(key).await?) }
}
