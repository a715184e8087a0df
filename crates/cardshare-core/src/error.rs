//! Error types for `cardshare-core`.

use std::fmt;

use thiserror::Error;

/// A boxed error suitable for crossing trait-object boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Largest inline profile image accepted, in decoded bytes.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Why an inline profile image was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRejection {
  /// Not a base64 `data:image/*` payload.
  NotAnImage,
  TooLarge { bytes: usize },
}

impl ImageRejection {
  pub fn message(self) -> String {
    match self {
      Self::NotAnImage => "Please select a valid image file".to_owned(),
      Self::TooLarge { .. } => format!(
        "Image size must be less than {}MB",
        MAX_PROFILE_IMAGE_BYTES / (1024 * 1024)
      ),
    }
  }
}

/// A card that cannot be accepted: required fields empty after trimming, or
/// an unusable inline profile image.
///
/// Field names use the camelCase spelling of the JSON representation so they
/// can be reported to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
  pub missing: Vec<&'static str>,
  pub image:   Option<ImageRejection>,
}

impl ValidationError {
  /// Human-readable prompt listing every problem.
  pub fn message(&self) -> String {
    let mut parts = Vec::new();
    if !self.missing.is_empty() {
      parts.push(format!("Please fill in: {}", self.missing.join(", ")));
    }
    if let Some(image) = self.image {
      parts.push(image.message());
    }
    parts.join(". ")
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "invalid card: {}", self.message())
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("repository has no storage tiers")]
  NoTiers,

  #[error("every storage tier failed to {op} key {key:?}")]
  AllTiersFailed { op: &'static str, key: String },

  #[error("card link is not shareable: {0:?}")]
  NotShareable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
