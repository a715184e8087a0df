//! Card colour themes.
//!
//! A theme name coming from user input or an old record may be anything; it is
//! resolved to one of the five known themes, falling back to [`Theme::Blue`].

use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
  #[default]
  Blue,
  Green,
  Purple,
  Orange,
  Dark,
}

/// An sRGB colour triple.
pub type Rgb = [u8; 3];

/// The three colours a theme contributes to a rendered card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
  /// Header gradient start, bullets, and the accent bar.
  pub primary:   Rgb,
  /// Card background.
  pub secondary: Rgb,
  /// Header gradient end and headings.
  pub text:      Rgb,
}

impl Theme {
  /// Resolve a free-form theme name. Unknown or empty names yield `Blue`.
  pub fn resolve(name: &str) -> Self { name.trim().parse().unwrap_or_default() }

  pub fn palette(self) -> Palette {
    match self {
      Theme::Blue => Palette {
        primary:   [0x3B, 0x82, 0xF6],
        secondary: [0xEF, 0xF6, 0xFF],
        text:      [0x1E, 0x40, 0xAF],
      },
      Theme::Green => Palette {
        primary:   [0x10, 0xB9, 0x81],
        secondary: [0xEC, 0xFD, 0xF5],
        text:      [0x04, 0x78, 0x57],
      },
      Theme::Purple => Palette {
        primary:   [0x8B, 0x5C, 0xF6],
        secondary: [0xF3, 0xE8, 0xFF],
        text:      [0x7C, 0x3A, 0xED],
      },
      Theme::Orange => Palette {
        primary:   [0xF5, 0x9E, 0x0B],
        secondary: [0xFE, 0xF3, 0xC7],
        text:      [0xD9, 0x77, 0x06],
      },
      Theme::Dark => Palette {
        primary:   [0x37, 0x41, 0x51],
        secondary: [0xF9, 0xFA, 0xFB],
        text:      [0x11, 0x18, 0x27],
      },
    }
  }
}

impl<'de> Deserialize<'de> for Theme {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.as_deref().map(Theme::resolve).unwrap_or_default())
  }
}
