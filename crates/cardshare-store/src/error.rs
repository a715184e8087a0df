//! Error type for `cardshare-store`.

use cardshare_core::tier::TierError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("quota exceeded: need {needed} bytes, {available} available")]
  QuotaExceeded { needed: u64, available: u64 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for TierError {
  fn from(e: Error) -> Self {
    match e {
      Error::QuotaExceeded { needed, available } => {
        TierError::QuotaExceeded { needed, available }
      }
      other => TierError::backend(other),
    }
  }
}
