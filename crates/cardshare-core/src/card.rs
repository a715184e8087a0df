//! The card record: the single entity the pipeline stores, encodes, renders
//! and shares.
//!
//! Required fields are non-empty once a [`Card`] has passed
//! [`Card::validate`]; optional fields are empty strings when absent, never
//! missing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  ValidationError,
  error::{ImageRejection, MAX_PROFILE_IMAGE_BYTES},
  raster::{self, RasterImage},
  theme::Theme,
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// A generator-assigned card identifier, e.g. `card_1718000000000_3f9a1c`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// Generate a fresh id from the current time and six random characters.
  pub fn generate() -> Self {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    Self(format!("card_{millis}_{}", &random[..6]))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Whether the id can appear as a single URL path segment without escaping.
  pub fn is_url_safe(&self) -> bool {
    !self.0.is_empty()
      && self
        .0
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
  }
}

impl fmt::Display for CardId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for CardId {
  fn as_ref(&self) -> &str { &self.0 }
}

impl From<String> for CardId {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for CardId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A stored card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id:            CardId,
  pub full_name:     String,
  pub designation:   String,
  pub company:       String,
  pub phone:         String,
  pub email:         String,
  #[serde(default)]
  pub website:       String,
  #[serde(default)]
  pub linkedin:      String,
  #[serde(default)]
  pub github:        String,
  #[serde(default)]
  pub theme:         Theme,
  /// Empty, a remote URL, or an inline `data:` URL.
  #[serde(default)]
  pub profile_image: String,
  pub created_at:    DateTime<Utc>,
}

/// A contact method shown on the card body and exported to contact files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
  Phone,
  Email,
  Website,
  LinkedIn,
  GitHub,
}

impl ContactField {
  /// Display order on the card body.
  pub const ORDER: [ContactField; 5] = [
    ContactField::Phone,
    ContactField::Email,
    ContactField::Website,
    ContactField::LinkedIn,
    ContactField::GitHub,
  ];

  /// Whether the field holds a URL-ish value rather than an address.
  pub fn is_link(self) -> bool {
    matches!(self, Self::Website | Self::LinkedIn | Self::GitHub)
  }
}

impl Card {
  /// Check every required field is non-empty after trimming and that an
  /// inline profile image is a base64 `image/*` payload within
  /// [`MAX_PROFILE_IMAGE_BYTES`]. Remote image URLs are not fetched here.
  pub fn validate(&self) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
      ("fullName", &self.full_name),
      ("designation", &self.designation),
      ("company", &self.company),
      ("phone", &self.phone),
      ("email", &self.email),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(name, _)| name)
    .collect();

    let image = self.profile_image_problem();
    if missing.is_empty() && image.is_none() {
      Ok(())
    } else {
      Err(ValidationError { missing, image })
    }
  }

  fn profile_image_problem(&self) -> Option<ImageRejection> {
    if !raster::is_data_url(&self.profile_image) {
      return None;
    }
    match RasterImage::from_data_url(&self.profile_image) {
      Some(img) if !img.media_type.starts_with("image/") => Some(ImageRejection::NotAnImage),
      Some(img) if img.len() > MAX_PROFILE_IMAGE_BYTES => {
        Some(ImageRejection::TooLarge { bytes: img.len() })
      }
      Some(_) => None,
      None => Some(ImageRejection::NotAnImage),
    }
  }

  pub fn contact(&self, field: ContactField) -> &str {
    match field {
      ContactField::Phone => &self.phone,
      ContactField::Email => &self.email,
      ContactField::Website => &self.website,
      ContactField::LinkedIn => &self.linkedin,
      ContactField::GitHub => &self.github,
    }
  }

  /// Present contact fields in display order; empty ones are skipped.
  pub fn contact_fields(&self) -> impl Iterator<Item = (ContactField, &str)> + '_ {
    ContactField::ORDER
      .into_iter()
      .map(|field| (field, self.contact(field)))
      .filter(|(_, value)| !value.is_empty())
  }

  /// Up to two uppercase initials taken from the first two name tokens.
  pub fn initials(&self) -> String {
    self
      .full_name
      .split_whitespace()
      .take(2)
      .filter_map(|token| token.chars().next())
      .flat_map(char::to_uppercase)
      .collect()
  }

  /// The full name with whitespace runs collapsed to `_`, for file names.
  pub fn file_stem(&self) -> String {
    self.full_name.split_whitespace().collect::<Vec<_>>().join("_")
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

/// Untrusted creation input, as submitted by the designer form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDraft {
  pub full_name:     Option<String>,
  pub designation:   Option<String>,
  pub company:       Option<String>,
  pub phone:         Option<String>,
  pub email:         Option<String>,
  pub website:       Option<String>,
  pub linkedin:      Option<String>,
  pub github:        Option<String>,
  pub theme:         Option<String>,
  pub profile_image: Option<String>,
}

impl CardDraft {
  /// Validate and turn the draft into a new card with a fresh id.
  pub fn into_card(self) -> Result<Card, ValidationError> {
    self.into_card_with(CardId::generate(), Utc::now())
  }

  /// Like [`CardDraft::into_card`] with a caller-chosen id and timestamp.
  pub fn into_card_with(
    self,
    id: CardId,
    created_at: DateTime<Utc>,
  ) -> Result<Card, ValidationError> {
    fn clean(v: Option<String>) -> String {
      v.map(|s| s.trim().to_owned()).unwrap_or_default()
    }

    let card = Card {
      id,
      full_name: clean(self.full_name),
      designation: clean(self.designation),
      company: clean(self.company),
      phone: clean(self.phone),
      email: clean(self.email),
      website: clean(self.website),
      linkedin: clean(self.linkedin),
      github: clean(self.github),
      theme: self.theme.as_deref().map(Theme::resolve).unwrap_or_default(),
      profile_image: clean(self.profile_image),
      created_at,
    };
    card.validate()?;
    Ok(card)
  }
}
