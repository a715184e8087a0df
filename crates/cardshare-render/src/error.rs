//! Error type for `cardshare-render`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("png encoding failed: {0}")]
  Encode(#[from] image::ImageError),

  #[error("profile image unavailable: {0}")]
  Avatar(String),

  #[error("render task failed: {0}")]
  Join(#[from] tokio::task::JoinError),

  #[error("cannot read font {path}: {source}")]
  FontIo {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid font data: {0}")]
  Font(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
