//! The storage-tier seam.
//!
//! A tier is a string key-value store. The [`Repository`](crate::Repository)
//! composes an ordered list of tiers, fastest first, into a read-through,
//! write-through cache. Backends live outside this crate (see
//! `cardshare-store`); only the volatile in-process tier is defined here.

use std::{
  collections::HashMap,
  sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use thiserror::Error;

use crate::error::BoxError;

#[derive(Debug, Error)]
pub enum TierError {
  /// The write would exceed the tier's capacity. Existing data is untouched.
  #[error("storage quota exceeded: need {needed} bytes, {available} available")]
  QuotaExceeded { needed: u64, available: u64 },

  #[error("storage backend error: {0}")]
  Backend(#[source] BoxError),
}

impl TierError {
  pub fn backend(e: impl Into<BoxError>) -> Self { Self::Backend(e.into()) }
}

pub type TierResult<T> = std::result::Result<T, TierError>;

/// One level of the storage hierarchy.
#[async_trait]
pub trait Tier: Send + Sync {
  /// Short name used in logs, e.g. `"memory"` or `"sqlite"`.
  fn name(&self) -> &str;

  async fn get(&self, key: &str) -> TierResult<Option<String>>;

  /// Insert or replace the value stored under `key`.
  async fn set(&self, key: &str, value: &str) -> TierResult<()>;

  /// Remove `key`. Removing an absent key succeeds.
  async fn delete(&self, key: &str) -> TierResult<()>;
}

// ─── In-memory tier ──────────────────────────────────────────────────────────

/// The volatile process-local cache tier.
#[derive(Debug, Default)]
pub struct MemoryTier {
  entries: RwLock<HashMap<String, String>>,
}

impl MemoryTier {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self) -> usize {
    self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[async_trait]
impl Tier for MemoryTier {
  fn name(&self) -> &str { "memory" }

  async fn get(&self, key: &str) -> TierResult<Option<String>> {
    let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
    Ok(entries.get(key).cloned())
  }

  async fn set(&self, key: &str, value: &str) -> TierResult<()> {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  async fn delete(&self, key: &str) -> TierResult<()> {
    let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
    entries.remove(key);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn memory_tier_basic_ops() {
    let tier = MemoryTier::new();
    assert_eq!(tier.get("a").await.unwrap(), None);

    tier.set("a", "1").await.unwrap();
    tier.set("a", "2").await.unwrap();
    assert_eq!(tier.get("a").await.unwrap().as_deref(), Some("2"));
    assert_eq!(tier.len(), 1);

    tier.delete("a").await.unwrap();
    tier.delete("a").await.unwrap();
    assert!(tier.is_empty());
  }
}
