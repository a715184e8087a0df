//! [`DirTier`]: one JSON file per key under a directory, with a byte quota.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cardshare_core::tier::{Tier, TierResult};
use tokio::fs;
use tracing::{debug, warn};

use crate::{Error, Result};

const EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

/// A durable, quota-limited tier.
///
/// Keys are hex-encoded into file names so any key is a safe path component.
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never sees a half-written value.
#[derive(Debug, Clone)]
pub struct DirTier {
  root:  PathBuf,
  quota: u64,
}

impl DirTier {
  /// Open the directory at `root`, creating it if necessary. The sum of all
  /// stored values may not exceed `quota` bytes.
  pub async fn open(root: impl Into<PathBuf>, quota: u64) -> Result<Self> {
    let root = root.into();
    fs::create_dir_all(&root).await?;
    debug!(root = %root.display(), quota, "opened directory tier");
    Ok(Self { root, quota })
  }

  pub fn root(&self) -> &Path { &self.root }

  pub fn quota(&self) -> u64 { self.quota }

  fn path_for(&self, key: &str) -> PathBuf {
    self.root.join(format!("{}.{EXTENSION}", hex::encode(key)))
  }

  /// Bytes used by every stored value except the one at `skip`.
  async fn used_bytes(&self, skip: &Path) -> Result<u64> {
    let mut total = 0;
    let mut entries = fs::read_dir(&self.root).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path == skip || path.extension().is_none_or(|ext| ext != EXTENSION) {
        continue;
      }
      match entry.metadata().await {
        Ok(meta) if meta.is_file() => total += meta.len(),
        Ok(_) => {}
        // Removed by a concurrent delete.
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
      }
    }
    Ok(total)
  }

  async fn read(&self, key: &str) -> Result<Option<String>> {
    match fs::read_to_string(self.path_for(key)).await {
      Ok(value) => Ok(Some(value)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  async fn write(&self, key: &str, value: &str) -> Result<()> {
    let path = self.path_for(key);
    let used = self.used_bytes(&path).await?;
    let needed = value.len() as u64;
    let available = self.quota.saturating_sub(used);
    if needed > available {
      warn!(key, needed, available, "directory tier quota exceeded");
      return Err(Error::QuotaExceeded { needed, available });
    }

    let temp = path.with_extension(TEMP_EXTENSION);
    fs::write(&temp, value).await?;
    if let Err(e) = fs::rename(&temp, &path).await {
      let _ = fs::remove_file(&temp).await;
      return Err(e.into());
    }
    Ok(())
  }

  async fn remove(&self, key: &str) -> Result<()> {
    match fs::remove_file(self.path_for(key)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e.into()),
    }
  }
}

#[async_trait]
impl Tier for DirTier {
  fn name(&self) -> &str { "directory" }

  async fn get(&self, key: &str) -> TierResult<Option<String>> { Ok(self.read(key).await?) }

  async fn set(&self, key: &str, value: &str) -> TierResult<()> {
    Ok(self.write(key, value).await?)
  }

  async fn delete(&self, key: &str) -> TierResult<()> { Ok(self.remove(key).await?) }
}
