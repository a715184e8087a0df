//! Transport codec: a card packed into a URL-safe token.
//!
//! The card is serialised as JSON with one- to three-letter keys, empty
//! optional fields omitted, and then base64-encoded with the URL-safe
//! alphabet and no padding. [`decode`] is the exact left inverse of
//! [`encode`] for valid cards and never fails loudly: malformed or foreign
//! input, or a payload whose card would not pass validation, yields
//! `None` so callers can fall back to another lookup path.

use std::borrow::Cow;

use base64::{
  Engine as _,
  engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
  card::{Card, CardId},
  theme::Theme,
};

/// Rough upper bound on the length of text a QR code scans reliably.
pub const QR_SAFE_PAYLOAD_LEN: usize = 2000;

#[derive(Serialize, Deserialize)]
struct Compact<'a> {
  #[serde(borrow)]
  i:   Cow<'a, str>,
  #[serde(borrow)]
  n:   Cow<'a, str>,
  #[serde(borrow)]
  d:   Cow<'a, str>,
  #[serde(borrow)]
  c:   Cow<'a, str>,
  #[serde(borrow)]
  p:   Cow<'a, str>,
  #[serde(borrow)]
  e:   Cow<'a, str>,
  #[serde(borrow, default, skip_serializing_if = "str::is_empty")]
  w:   Cow<'a, str>,
  #[serde(borrow, default, skip_serializing_if = "str::is_empty")]
  l:   Cow<'a, str>,
  #[serde(borrow, default, skip_serializing_if = "str::is_empty")]
  g:   Cow<'a, str>,
  #[serde(default)]
  t:   Theme,
  #[serde(borrow, default, skip_serializing_if = "str::is_empty")]
  img: Cow<'a, str>,
  cr:  DateTime<Utc>,
}

/// Pack `card` into a URL-safe token.
pub fn encode(card: &Card) -> String {
  let compact = Compact {
    i:   Cow::Borrowed(card.id.as_str()),
    n:   Cow::Borrowed(&card.full_name),
    d:   Cow::Borrowed(&card.designation),
    c:   Cow::Borrowed(&card.company),
    p:   Cow::Borrowed(&card.phone),
    e:   Cow::Borrowed(&card.email),
    w:   Cow::Borrowed(&card.website),
    l:   Cow::Borrowed(&card.linkedin),
    g:   Cow::Borrowed(&card.github),
    t:   card.theme,
    img: Cow::Borrowed(&card.profile_image),
    cr:  card.created_at,
  };
  // Serialising plain strings and a timestamp into a Vec cannot fail.
  let json = serde_json::to_vec(&compact).unwrap_or_default();
  URL_SAFE_NO_PAD.encode(json)
}

/// Unpack a token produced by [`encode`]. Returns `None` for anything that
/// is not a well-formed token.
pub fn decode(token: &str) -> Option<Card> {
  let token = token.trim();
  if token.is_empty() {
    return None;
  }

  let bytes = decode_base64(token)?;
  let compact: Compact<'_> = match serde_json::from_slice(&bytes) {
    Ok(c) => c,
    Err(e) => {
      debug!(error = %e, "token payload is not a compact card");
      return None;
    }
  };

  let card = Card {
    id:            CardId::new(compact.i.into_owned()),
    full_name:     compact.n.into_owned(),
    designation:   compact.d.into_owned(),
    company:       compact.c.into_owned(),
    phone:         compact.p.into_owned(),
    email:         compact.e.into_owned(),
    website:       compact.w.into_owned(),
    linkedin:      compact.l.into_owned(),
    github:        compact.g.into_owned(),
    theme:         compact.t,
    profile_image: compact.img.into_owned(),
    created_at:    compact.cr,
  };
  if let Err(e) = card.validate() {
    debug!(error = %e, "token carries an invalid card");
    return None;
  }
  Some(card)
}

/// Whether `payload` is short enough to embed in a QR code of `limit`
/// characters.
pub fn fits_in_qr(payload: &str, limit: usize) -> bool { payload.len() <= limit }

/// Tokens are URL-safe and unpadded, but accept the standard alphabet and
/// padding too since links get re-encoded by other tools.
fn decode_base64(token: &str) -> Option<Vec<u8>> {
  [&URL_SAFE_NO_PAD, &URL_SAFE, &STANDARD, &STANDARD_NO_PAD]
    .into_iter()
    .find_map(|engine| engine.decode(token).ok())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::card::test_helpers::jane;

  #[test]
  fn round_trip_full_card() {
    let card = jane();
    assert_eq!(decode(&encode(&card)), Some(card));
  }

  #[test]
  fn round_trip_with_empty_optionals() {
    let mut card = jane();
    card.website.clear();
    card.linkedin.clear();
    card.github.clear();
    card.profile_image.clear();

    let token = encode(&card);
    let decoded = decode(&token).unwrap();
    assert_eq!(decoded, card);
    assert_eq!(decoded.website, "");
    assert_eq!(decoded.github, "");
  }

  #[test]
  fn round_trip_unicode_and_inline_image() {
    let mut card = jane();
    card.full_name = "Zoë Łukasiewicz-O'Brien".into();
    card.company = "Ünïcode & Sons; \"Quoted\"".into();
    card.profile_image = "data:image/png;base64,iVBORw0KGgo=".into();
    assert_eq!(decode(&encode(&card)), Some(card));
  }

  #[test]
  fn token_is_url_safe() {
    let mut card = jane();
    card.company = "???>>>~~~".repeat(10);
    let token = encode(&card);
    assert!(
      token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
      "token has unsafe chars: {token}"
    );
  }

  #[test]
  fn omits_empty_optional_keys() {
    let mut card = jane();
    card.website.clear();
    let json = String::from_utf8(URL_SAFE_NO_PAD.decode(encode(&card)).unwrap()).unwrap();
    assert!(!json.contains("\"w\""), "{json}");
    assert!(json.contains("\"l\""), "{json}");
  }

  #[test]
  fn accepts_standard_alphabet_with_padding() {
    let card = jane();
    let json = URL_SAFE_NO_PAD.decode(encode(&card)).unwrap();
    assert_eq!(decode(&STANDARD.encode(json)), Some(card));
  }

  #[test]
  fn malformed_input_decodes_to_none() {
    assert_eq!(decode("not-a-valid-token"), None);
    assert_eq!(decode(""), None);
    assert_eq!(decode("   "), None);
    assert_eq!(decode("%%%"), None);
    assert_eq!(decode(&URL_SAFE_NO_PAD.encode("{\"i\":\"x\"}")), None);
    assert_eq!(decode(&URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0x00])), None);

    let blank_name = r#"{"i":"card_1","n":"","d":"B","c":"C","p":"D","e":"E","cr":"2024-06-10T08:30:00Z"}"#;
    assert_eq!(decode(&URL_SAFE_NO_PAD.encode(blank_name)), None);
    let spaces_email = r#"{"i":"card_1","n":"A","d":"B","c":"C","p":"D","e":"  ","cr":"2024-06-10T08:30:00Z"}"#;
    assert_eq!(decode(&URL_SAFE_NO_PAD.encode(spaces_email)), None);
  }

  #[test]
  fn unknown_theme_in_token_decodes_to_blue() {
    let json = r#"{"i":"card_1","n":"A","d":"B","c":"C","p":"D","e":"E","t":"plaid","cr":"2024-06-10T08:30:00Z"}"#;
    let card = decode(&URL_SAFE_NO_PAD.encode(json)).unwrap();
    assert_eq!(card.theme, Theme::Blue);
    assert_eq!(card.linkedin, "");
  }

  #[test]
  fn qr_fit_check() {
    assert!(fits_in_qr(&encode(&jane()), QR_SAFE_PAYLOAD_LEN));
    assert!(!fits_in_qr(&"x".repeat(QR_SAFE_PAYLOAD_LEN + 1), QR_SAFE_PAYLOAD_LEN));
  }
}
