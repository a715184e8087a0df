//! The tiered card repository.
//!
//! Tiers are ordered fastest to most durable. Reads return the first hit and
//! promote it into every faster tier; writes fan out to every tier and only
//! fail when no tier accepted them. A companion index under [`INDEX_KEY`]
//! lists card ids so [`Repository::get_all`] needs no store scan.
//!
//! A tier that rejects a write has its copy of the key removed, so reads fall
//! through to a tier holding the current value instead of a stale one. A tier
//! that fails a delete is masked by a [`TOMBSTONE`] written to it and to every
//! faster tier. The index and the record entries may still disagree after a
//! partial failure; readers skip ids whose record cannot be resolved.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
  Error, Result,
  card::{Card, CardId},
  tier::{MemoryTier, Tier},
};

/// Key of the JSON array of stored card ids.
pub const INDEX_KEY: &str = "all_cards";

/// Value marking a key deleted in a tier whose own delete failed. Reads stop
/// at it instead of consulting slower tiers.
pub const TOMBSTONE: &str = "null";

/// Key under which a card record is stored.
pub fn record_key(id: &CardId) -> String { format!("card:{id}") }

/// Card persistence over an ordered list of [`Tier`]s.
///
/// Construct once per process and share behind an `Arc`; there is no ambient
/// global store.
pub struct Repository {
  tiers:      Vec<Arc<dyn Tier>>,
  /// Serialises read-modify-write cycles of the index.
  index_lock: Mutex<()>,
}

impl Repository {
  /// Build a repository over `tiers`, fastest first.
  pub fn new(tiers: Vec<Arc<dyn Tier>>) -> Result<Self> {
    if tiers.is_empty() {
      return Err(Error::NoTiers);
    }
    Ok(Self { tiers, index_lock: Mutex::new(()) })
  }

  /// A repository with a single volatile tier.
  pub fn in_memory() -> Self {
    Self { tiers: vec![Arc::new(MemoryTier::new())], index_lock: Mutex::new(()) }
  }

  pub fn tier_names(&self) -> Vec<&str> { self.tiers.iter().map(|t| t.name()).collect() }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Store `card`, replacing any record with the same id.
  pub async fn save(&self, card: &Card) -> Result<()> {
    card.validate()?;

    let key = record_key(&card.id);
    let value = serde_json::to_string(card)?;
    if self.write_all(&key, &value).await == 0 {
      return Err(Error::AllTiersFailed { op: "write", key });
    }

    let _guard = self.index_lock.lock().await;
    let mut ids = self.ids().await;
    if !ids.contains(&card.id) {
      ids.push(card.id.clone());
      self.write_index(&ids).await?;
    }

    debug!(id = %card.id, "card saved");
    Ok(())
  }

  /// Remove the card from every tier and from the index.
  pub async fn delete(&self, id: &CardId) -> Result<()> {
    let key = record_key(id);
    if self.delete_all(&key).await == 0 {
      return Err(Error::AllTiersFailed { op: "delete", key });
    }

    let _guard = self.index_lock.lock().await;
    let mut ids = self.ids().await;
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() != before {
      self.write_index(&ids).await?;
    }

    debug!(%id, "card deleted");
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Look up a card. Tier failures are logged and treated as misses.
  pub async fn get(&self, id: &CardId) -> Option<Card> {
    self
      .read_through(&record_key(id), |raw| serde_json::from_str(raw).ok())
      .await
  }

  pub async fn exists(&self, id: &CardId) -> bool { self.get(id).await.is_some() }

  /// Every card listed in the index whose record resolves. Order follows the
  /// index but is not part of the contract.
  pub async fn get_all(&self) -> Vec<Card> {
    let mut cards = Vec::new();
    for id in self.ids().await {
      match self.get(&id).await {
        Some(card) => cards.push(card),
        None => debug!(%id, "index entry has no record; skipping"),
      }
    }
    cards
  }

  /// The stored id index; empty when no tier holds one.
  pub async fn ids(&self) -> Vec<CardId> {
    self
      .read_through(INDEX_KEY, |raw| serde_json::from_str(raw).ok())
      .await
      .unwrap_or_default()
  }

  // ── Tier fan-out ──────────────────────────────────────────────────────────

  /// First tier holding a parseable value wins; the raw value is promoted
  /// into every faster tier. A tombstone ends the lookup as a miss.
  async fn read_through<T, F>(&self, key: &str, parse: F) -> Option<T>
  where
    F: Fn(&str) -> Option<T>,
  {
    for (depth, tier) in self.tiers.iter().enumerate() {
      let raw = match tier.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => continue,
        Err(e) => {
          warn!(tier = tier.name(), key, error = %e, "tier read failed");
          continue;
        }
      };

      if raw == TOMBSTONE {
        debug!(tier = tier.name(), key, "tombstone; treating as absent");
        return None;
      }

      let Some(value) = parse(&raw) else {
        warn!(tier = tier.name(), key, "unreadable value in tier; ignoring");
        continue;
      };

      if depth > 0 {
        debug!(tier = tier.name(), key, "promoting into faster tiers");
        for faster in &self.tiers[..depth] {
          if let Err(e) = faster.set(key, &raw).await {
            warn!(tier = faster.name(), key, error = %e, "promotion failed");
          }
        }
      }
      return Some(value);
    }
    None
  }

  /// Returns how many tiers accepted the write. A tier that refused it
  /// drops its previous value for `key`.
  async fn write_all(&self, key: &str, value: &str) -> usize {
    let mut stored = 0;
    for tier in &self.tiers {
      match tier.set(key, value).await {
        Ok(()) => stored += 1,
        Err(e) => {
          warn!(tier = tier.name(), key, error = %e, "tier write failed; evicting old value");
          if let Err(e) = tier.delete(key).await {
            warn!(tier = tier.name(), key, error = %e, "could not evict stale value");
          }
        }
      }
    }
    stored
  }

  /// Returns how many tiers accepted the delete. When some tier failed, a
  /// tombstone goes into it and every faster tier so the leftover copy is
  /// never served.
  async fn delete_all(&self, key: &str) -> usize {
    let mut removed = 0;
    let mut deepest_failure = None;
    for (depth, tier) in self.tiers.iter().enumerate() {
      match tier.delete(key).await {
        Ok(()) => removed += 1,
        Err(e) => {
          warn!(tier = tier.name(), key, error = %e, "tier delete failed");
          deepest_failure = Some(depth);
        }
      }
    }

    if let Some(depth) = deepest_failure {
      for tier in &self.tiers[..=depth] {
        if let Err(e) = tier.set(key, TOMBSTONE).await {
          warn!(tier = tier.name(), key, error = %e, "tombstone write failed");
        }
      }
    }
    removed
  }

  async fn write_index(&self, ids: &[CardId]) -> Result<()> {
    let value = serde_json::to_string(ids)?;
    if self.write_all(INDEX_KEY, &value).await == 0 {
      warn!("index could not be written to any tier");
    }
    Ok(())
  }
}
