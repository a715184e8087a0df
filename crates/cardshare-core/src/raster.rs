//! Encoded raster images passed between the renderer, the publisher and the
//! QR emitter.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use bytes::Bytes;

pub const PNG: &str = "image/png";

/// An encoded image (PNG unless stated otherwise) and its media type.
///
/// Cloning is cheap; the payload is reference-counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
  pub data:       Bytes,
  pub media_type: String,
}

impl RasterImage {
  pub fn png(data: impl Into<Bytes>) -> Self {
    Self { data: data.into(), media_type: PNG.to_owned() }
  }

  /// Base64 of the payload with no `data:` prefix.
  pub fn to_base64(&self) -> String { B64.encode(&self.data) }

  /// A self-contained `data:<type>;base64,<payload>` URL.
  pub fn to_data_url(&self) -> String {
    format!("data:{};base64,{}", self.media_type, self.to_base64())
  }

  /// Parse a base64 `data:` URL. Returns `None` for anything else.
  pub fn from_data_url(url: &str) -> Option<Self> {
    let rest = url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let media_type = meta.strip_suffix(";base64")?;
    let data = B64.decode(payload.trim()).ok()?;
    let media_type = if media_type.is_empty() { "text/plain" } else { media_type };
    Some(Self { data: data.into(), media_type: media_type.to_owned() })
  }

  pub fn len(&self) -> usize { self.data.len() }

  pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

pub fn is_data_url(s: &str) -> bool { s.starts_with("data:") }
