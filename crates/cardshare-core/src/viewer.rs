//! Resolution of a shared card link.
//!
//! A viewer link carries a card id and, optionally, an embedded token. The
//! token is tried first, then the repository; when neither resolves, a
//! clearly-labelled placeholder card is returned instead of an error.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
  Error, Result,
  card::{Card, CardId},
  codec,
  repository::Repository,
  theme::Theme,
};

/// Where a resolved card came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSource {
  /// Decoded from the token embedded in the link.
  Token,
  /// Found in the repository by id.
  Repository,
  /// Sample data shown because nothing resolved.
  Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCard {
  pub card:   Card,
  pub source: CardSource,
}

impl ResolvedCard {
  pub fn is_placeholder(&self) -> bool { self.source == CardSource::Placeholder }
}

/// The sample card shown for links that are well-formed but unresolvable.
pub fn placeholder(id: &CardId) -> Card {
  Card {
    id:            id.clone(),
    full_name:     "Sample Professional".into(),
    designation:   "Digital Card Demo".into(),
    company:       "Digital Card Generator".into(),
    phone:         "+1 (555) 123-4567".into(),
    email:         "demo@digitalcard.com".into(),
    website:       "https://digitalcard.com".into(),
    linkedin:      "linkedin.com/in/sample".into(),
    github:        "github.com/sample".into(),
    theme:         Theme::Blue,
    profile_image: String::new(),
    created_at:    Utc::now(),
  }
}

/// Resolve a viewer link.
///
/// Fails only when `id` cannot be part of a link at all; every other miss
/// yields the placeholder.
pub async fn resolve(
  repo: &Repository,
  id: &CardId,
  token: Option<&str>,
) -> Result<ResolvedCard> {
  if !id.is_url_safe() {
    return Err(Error::NotShareable(id.to_string()));
  }

  if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
    match codec::decode(token) {
      Some(card) => {
        debug!(%id, "viewer link resolved from token");
        return Ok(ResolvedCard { card, source: CardSource::Token });
      }
      None => info!(%id, "viewer token did not decode; trying repository"),
    }
  }

  if let Some(card) = repo.get(id).await {
    debug!(%id, "viewer link resolved from repository");
    return Ok(ResolvedCard { card, source: CardSource::Repository });
  }

  info!(%id, "viewer link unresolved; showing placeholder");
  Ok(ResolvedCard { card: placeholder(id), source: CardSource::Placeholder })
}
