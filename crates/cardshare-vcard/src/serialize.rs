//! vCard 3.0 serializer.
//!
//! Produces CRLF line endings and folds at 75 octets per RFC 2425 §5.8.1.

use cardshare_core::{Card, card::ContactField};

// ─── Line folding ────────────────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP continuation.
pub(crate) fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{s}\r\n");
  }

  let mut out = String::with_capacity(s.len() + s.len() / 37);
  let mut pos = 0usize;
  let mut first = true;

  while pos < s.len() {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= s.len() {
      s.len()
    } else {
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      out.push(' ');
    }
    out.push_str(&s[pos..end]);
    out.push_str("\r\n");
    pos = end;
    first = false;
  }

  out
}

// ─── Value escaping ──────────────────────────────────────────────────────────

/// Escape a text value: `\`, `,`, `;`, newline.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
    .replace("\r\n", "\\n")
    .replace('\n', "\\n")
}

/// Escape one component of the structured `N` property. Commas separate list
/// values inside a component and are left alone.
fn escape_component(s: &str) -> String {
  s.replace('\\', "\\\\").replace(';', "\\;").replace('\n', "\\n")
}

/// `N:family;given;;;` from a free-form display name. The last token is taken
/// as the family name.
fn structured_name(full_name: &str) -> String {
  let tokens: Vec<&str> = full_name.split_whitespace().collect();
  match tokens.split_last() {
    None => ";;;;".to_string(),
    Some((family, [])) => format!("{};;;;", escape_component(family)),
    Some((family, given)) => {
      format!("{};{};;;", escape_component(family), escape_component(&given.join(" ")))
    }
  }
}

/// Profile handles are often stored without a scheme (`linkedin.com/in/x`).
fn absolute_url(value: &str) -> String {
  if value.starts_with("http://") || value.starts_with("https://") {
    value.to_string()
  } else {
    format!("https://{value}")
  }
}

// ─── Serializer ──────────────────────────────────────────────────────────────

pub(crate) fn to_vcard(card: &Card) -> String {
  let mut out = String::new();
  let mut line = |s: String| out.push_str(&fold_line(&s));

  line("BEGIN:VCARD".into());
  line("VERSION:3.0".into());
  line(format!("FN:{}", escape_value(&card.full_name)));
  line(format!("N:{}", structured_name(&card.full_name)));
  line(format!("ORG:{}", escape_value(&card.company)));
  line(format!("TITLE:{}", escape_value(&card.designation)));

  for (field, value) in card.contact_fields() {
    match field {
      ContactField::Phone => line(format!("TEL;TYPE=WORK,VOICE:{}", escape_value(value))),
      ContactField::Email => line(format!("EMAIL;TYPE=INTERNET:{}", escape_value(value))),
      ContactField::Website => line(format!("URL:{}", escape_value(value))),
      ContactField::LinkedIn => {
        line(format!("URL;TYPE=LINKEDIN:{}", escape_value(&absolute_url(value))))
      }
      ContactField::GitHub => {
        line(format!("URL;TYPE=GITHUB:{}", escape_value(&absolute_url(value))))
      }
    }
  }

  line(format!("UID:{}", card.id));
  line(format!("REV:{}", card.created_at.format("%Y-%m-%dT%H:%M:%SZ")));
  line("END:VCARD".into());
  out
}

#[cfg(test)]
mod tests {
  use cardshare_core::{Card, CardId, Theme};
  use chrono::{TimeZone as _, Utc};

  use super::*;

  fn card() -> Card {
    Card {
      id: CardId::new("card_1718000000000_abc123"),
      full_name: "Jane Doe".into(),
      designation: "Engineer".into(),
      company: "Acme, Inc.".into(),
      phone: "+1-555-0100".into(),
      email: "jane@acme.com".into(),
      website: "https://jane.dev".into(),
      linkedin: "linkedin.com/in/jane".into(),
      github: "https://github.com/jane".into(),
      theme: Theme::Green,
      profile_image: String::new(),
      created_at: Utc.with_ymd_and_hms(2024, 6, 10, 8, 30, 0).unwrap(),
    }
  }

  #[test]
  fn full_card_lines() {
    let vcf = to_vcard(&card());
    let lines: Vec<&str> = vcf.split("\r\n").collect();
    assert_eq!(lines, vec![
      "BEGIN:VCARD",
      "VERSION:3.0",
      "FN:Jane Doe",
      "N:Doe;Jane;;;",
      "ORG:Acme\\, Inc.",
      "TITLE:Engineer",
      "TEL;TYPE=WORK,VOICE:+1-555-0100",
      "EMAIL;TYPE=INTERNET:jane@acme.com",
      "URL:https://jane.dev",
      "URL;TYPE=LINKEDIN:https://linkedin.com/in/jane",
      "URL;TYPE=GITHUB:https://github.com/jane",
      "UID:card_1718000000000_abc123",
      "REV:2024-06-10T08:30:00Z",
      "END:VCARD",
      "",
    ]);
  }

  #[test]
  fn empty_optional_fields_are_omitted() {
    let mut c = card();
    c.website.clear();
    c.linkedin.clear();
    c.github.clear();
    let vcf = to_vcard(&c);
    assert!(!vcf.contains("URL"));
    assert!(vcf.contains("TEL;TYPE=WORK,VOICE:+1-555-0100\r\n"));
  }

  #[test]
  fn single_token_name() {
    assert_eq!(structured_name("Cher"), "Cher;;;;");
    assert_eq!(structured_name("Mary Ann  Smith"), "Smith;Mary Ann;;;");
    assert_eq!(structured_name("  "), ";;;;");
  }

  #[test]
  fn escapes_special_characters() {
    assert_eq!(escape_value("a;b,c\\d\ne"), "a\\;b\\,c\\\\d\\ne");
  }

  #[test]
  fn long_lines_fold_at_75_octets() {
    let mut c = card();
    c.designation = "Principal ".repeat(12);
    let vcf = to_vcard(&c);
    for physical in vcf.split("\r\n") {
      assert!(physical.len() <= 75, "{physical:?}");
    }
    let unfolded = vcf.replace("\r\n ", "");
    assert!(unfolded.contains(&format!("TITLE:{}\r\n", c.designation)));
  }

  #[test]
  fn fold_respects_char_boundaries() {
    let s = format!("FN:{}", "é".repeat(60));
    let folded = fold_line(&s);
    assert_eq!(folded.replace("\r\n ", "").trim_end(), s);
  }
}
