//! Error type for `cardshare-remote`.

use cardshare_core::fallback::Exhausted;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected status {0}")]
  Status(reqwest::StatusCode),

  /// The service answered but refused the request.
  #[error("rejected: {0}")]
  Rejected(String),

  #[error("nothing to encode")]
  EmptyPayload,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Exhausted(#[from] Exhausted),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
