//! Font loading: explicit files first, then system discovery.

use std::path::Path;

use fontdb::{Database, Family, Query, Weight};
use fontdue::{Font, FontSettings};
use tracing::{debug, warn};

use crate::{Error, Result};

/// The two faces the card layout uses.
pub struct Fonts {
  pub(crate) regular: Font,
  pub(crate) bold:    Font,
}

impl Fonts {
  pub fn from_bytes(regular: &[u8], bold: &[u8]) -> Result<Self> {
    Ok(Self { regular: parse(regular, 0)?, bold: parse(bold, 0)? })
  }

  pub fn from_files(regular: &Path, bold: &Path) -> Result<Self> {
    let read = |path: &Path| {
      std::fs::read(path).map_err(|source| Error::FontIo { path: path.to_owned(), source })
    };
    Self::from_bytes(&read(regular)?, &read(bold)?)
  }

  /// Discover a sans-serif family among the installed system fonts. A missing
  /// bold face reuses the regular one.
  pub fn system() -> Option<Self> {
    let mut db = Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "loaded system font database");

    let regular = face(&db, Weight::NORMAL)?;
    let bold = face(&db, Weight::BOLD).unwrap_or_else(|| regular.clone());
    Some(Self { regular, bold })
  }

  /// Configured files when both are given, otherwise the system fonts.
  pub fn load(regular: Option<&Path>, bold: Option<&Path>) -> Option<Self> {
    if let (Some(regular), Some(bold)) = (regular, bold) {
      match Self::from_files(regular, bold) {
        Ok(fonts) => return Some(fonts),
        Err(e) => warn!(error = %e, "configured fonts unusable; trying system fonts"),
      }
    }
    let fonts = Self::system();
    if fonts.is_none() {
      warn!("no usable font found; cards will render without text");
    }
    fonts
  }
}

fn parse(data: &[u8], collection_index: u32) -> Result<Font> {
  Font::from_bytes(data, FontSettings { collection_index, ..FontSettings::default() })
    .map_err(Error::Font)
}

fn face(db: &Database, weight: Weight) -> Option<Font> {
  let query = Query { families: &[Family::SansSerif], weight, ..Query::default() };
  let id = db.query(&query)?;
  match db.with_face_data(id, |data, index| parse(data, index))? {
    Ok(font) => Some(font),
    Err(e) => {
      warn!(error = %e, weight = weight.0, "system font face failed to parse");
      None
    }
  }
}
