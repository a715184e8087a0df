//! Profile-image resolution for the avatar circle.

use cardshare_core::raster::{RasterImage, is_data_url};
use image::RgbaImage;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Resolve `src` into pixels. Empty sources and every failure yield `None`;
/// the layout then draws initials instead.
pub async fn load(client: &reqwest::Client, src: &str) -> Option<RgbaImage> {
  let src = src.trim();
  if src.is_empty() {
    return None;
  }
  match fetch(client, src).await {
    Ok(img) => Some(img),
    Err(e) => {
      warn!(error = %e, "profile image unusable; falling back to initials");
      None
    }
  }
}

async fn fetch(client: &reqwest::Client, src: &str) -> Result<RgbaImage> {
  if is_data_url(src) {
    let raster = RasterImage::from_data_url(src)
      .ok_or_else(|| Error::Avatar("malformed data url".into()))?;
    return decode(&raster.data);
  }

  if src.starts_with("http://") || src.starts_with("https://") {
    debug!(url = src, "fetching profile image");
    let bytes = client
      .get(src)
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| Error::Avatar(e.to_string()))?
      .bytes()
      .await
      .map_err(|e| Error::Avatar(e.to_string()))?;
    return decode(&bytes);
  }

  Err(Error::Avatar("unsupported image source".into()))
}

pub(crate) fn decode(bytes: &[u8]) -> Result<RgbaImage> {
  image::load_from_memory(bytes)
    .map(|img| img.into_rgba8())
    .map_err(|e| Error::Avatar(e.to_string()))
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use axum::{Router, http::header, routing::get};
  use image::{ImageFormat, Rgba};

  use super::*;

  fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(3, 3, Rgba([10, 20, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
  }

  #[tokio::test]
  async fn data_url_is_decoded_locally() {
    let url = RasterImage::png(png_bytes()).to_data_url();
    let img = load(&reqwest::Client::new(), &url).await.unwrap();
    assert_eq!(img.dimensions(), (3, 3));
    assert_eq!(*img.get_pixel(1, 1), Rgba([10, 20, 30, 255]));
  }

  #[tokio::test]
  async fn unusable_sources_fall_back() {
    let client = reqwest::Client::new();
    assert!(load(&client, "").await.is_none());
    assert!(load(&client, "ftp://example.com/a.png").await.is_none());
    assert!(load(&client, "data:image/png;base64,!!!").await.is_none());
    assert!(load(&client, "data:image/png;base64,aGVsbG8=").await.is_none());
  }

  #[tokio::test]
  async fn http_source_is_fetched() {
    let app = Router::new()
      .route("/me.png", get(|| async { ([(header::CONTENT_TYPE, "image/png")], png_bytes()) }))
      .route("/missing.png", get(|| async { axum::http::StatusCode::NOT_FOUND }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = reqwest::Client::new();
    let img = load(&client, &format!("http://{addr}/me.png")).await.unwrap();
    assert_eq!(img.dimensions(), (3, 3));
    assert!(load(&client, &format!("http://{addr}/missing.png")).await.is_none());
  }
}
