//! ETag computation for stored cards.
//!
//! ETags are SHA-256 hashes over every card field, each prefixed with its
//! length so adjacent fields cannot run together.

use axum::http::{HeaderMap, header};
use cardshare_core::Card;
use sha2::{Digest, Sha256};

pub fn compute_etag(card: &Card) -> String {
  let created = card.created_at.timestamp_micros().to_le_bytes();
  let fields: [&[u8]; 12] = [
    card.id.as_str().as_bytes(),
    card.full_name.as_bytes(),
    card.designation.as_bytes(),
    card.company.as_bytes(),
    card.phone.as_bytes(),
    card.email.as_bytes(),
    card.website.as_bytes(),
    card.linkedin.as_bytes(),
    card.github.as_bytes(),
    card.theme.as_ref().as_bytes(),
    card.profile_image.as_bytes(),
    &created,
  ];

  let mut hasher = Sha256::new();
  for field in fields {
    hasher.update((field.len() as u64).to_le_bytes());
    hasher.update(field);
  }
  format!("\"{}\"", hex::encode(hasher.finalize()))
}

/// Whether the request's `If-None-Match` header matches `etag`.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|tag| tag.trim().trim_start_matches("W/"))
    .any(|tag| tag == "*" || tag == etag)
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;
  use cardshare_core::{CardId, Theme};
  use chrono::{TimeZone as _, Utc};

  use super::*;

  fn card() -> Card {
    Card {
      id: CardId::new("card_1_abc"),
      full_name: "Jane Doe".into(),
      designation: "Engineer".into(),
      company: "Acme".into(),
      phone: "1".into(),
      email: "j@a.io".into(),
      website: String::new(),
      linkedin: String::new(),
      github: String::new(),
      theme: Theme::Blue,
      profile_image: String::new(),
      created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
  }

  #[test]
  fn stable_and_quoted() {
    let tag = compute_etag(&card());
    assert_eq!(tag, compute_etag(&card()));
    assert!(tag.starts_with('"') && tag.ends_with('"'));
    assert_eq!(tag.len(), 66);
  }

  #[test]
  fn any_field_change_changes_etag() {
    let mut edited = card();
    edited.theme = Theme::Dark;
    assert_ne!(compute_etag(&card()), compute_etag(&edited));

    // Shifting text between adjacent fields is still a change.
    let mut a = card();
    a.full_name = "Jane DoeX".into();
    a.designation = "ngineer".into();
    let mut b = card();
    b.full_name = "Jane Doe".into();
    b.designation = "Xngineer".into();
    assert_ne!(compute_etag(&a), compute_etag(&b));
  }

  #[test]
  fn matches_lists_wildcards_and_weak_tags() {
    let tag = compute_etag(&card());
    let mut headers = HeaderMap::new();
    assert!(!if_none_match(&headers, &tag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_str(&format!("\"x\", W/{tag}")).unwrap());
    assert!(if_none_match(&headers, &tag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
    assert!(if_none_match(&headers, &tag));

    headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"other\""));
    assert!(!if_none_match(&headers, &tag));
  }
}
