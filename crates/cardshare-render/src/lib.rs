//! Deterministic PNG rendering of business cards.
//!
//! [`CardRenderer::render_with`] is a pure function of the card, the avatar
//! pixels and the loaded fonts: the same inputs always produce the same PNG
//! bytes. [`CardRenderer::render`] first resolves the card's profile image
//! (data URL or `http(s)` URL) and falls back to initials when that fails.

mod avatar;
mod canvas;
mod fonts;
mod layout;

pub mod error;

use std::{io::Cursor, sync::Arc};

use cardshare_core::{Card, RasterImage};
pub use error::{Error, Result};
pub use fonts::Fonts;
use image::ImageFormat;
pub use image::RgbaImage;
pub use layout::{HEIGHT, SCALE, WIDTH};
use tracing::debug;

/// Renders cards to PNG. Cheap to clone.
#[derive(Clone)]
pub struct CardRenderer {
  fonts:  Option<Arc<Fonts>>,
  client: reqwest::Client,
}

impl CardRenderer {
  /// Without fonts, shapes and the avatar are drawn but text is skipped.
  pub fn new(fonts: Option<Fonts>) -> Self {
    Self { fonts: fonts.map(Arc::new), client: reqwest::Client::new() }
  }

  /// Use `client` to fetch remote profile images.
  pub fn with_client(mut self, client: reqwest::Client) -> Self {
    self.client = client;
    self
  }

  pub fn has_fonts(&self) -> bool { self.fonts.is_some() }

  /// Resolve the profile image, then render.
  pub async fn render(&self, card: &Card) -> Result<RasterImage> {
    let avatar = avatar::load(&self.client, &card.profile_image).await;
    self.render_with(card, avatar).await
  }

  /// Render with already-resolved avatar pixels (`None` draws initials).
  pub async fn render_with(&self, card: &Card, avatar: Option<RgbaImage>) -> Result<RasterImage> {
    let card = card.clone();
    let fonts = self.fonts.clone();
    let png =
      tokio::task::spawn_blocking(move || encode(&card, avatar.as_ref(), fonts.as_deref()))
        .await??;
    debug!(bytes = png.len(), "card rendered");
    Ok(RasterImage::png(png))
  }
}

fn encode(card: &Card, avatar: Option<&RgbaImage>, fonts: Option<&Fonts>) -> Result<Vec<u8>> {
  let img = layout::paint(card, avatar, fonts);
  let mut buf = Cursor::new(Vec::new());
  img.write_to(&mut buf, ImageFormat::Png)?;
  Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
  use cardshare_core::{CardId, Theme};
  use chrono::{TimeZone as _, Utc};
  use image::Rgba;

  use super::*;

  fn card(theme: Theme) -> Card {
    Card {
      id: CardId::new("card_1718000000000_abc123"),
      full_name: "Jane Doe".into(),
      designation: "Engineer".into(),
      company: "Acme".into(),
      phone: "+1-555-0100".into(),
      email: "jane@acme.com".into(),
      website: "https://jane.dev".into(),
      linkedin: "linkedin.com/in/jane".into(),
      github: String::new(),
      theme,
      profile_image: String::new(),
      created_at: Utc.with_ymd_and_hms(2024, 6, 10, 8, 30, 0).unwrap(),
    }
  }

  fn decode(raster: &RasterImage) -> RgbaImage {
    image::load_from_memory(&raster.data).unwrap().into_rgba8()
  }

  #[tokio::test]
  async fn output_is_a_double_scale_png() {
    let raster = CardRenderer::new(None).render(&card(Theme::Blue)).await.unwrap();
    assert_eq!(raster.media_type, "image/png");
    assert_eq!(decode(&raster).dimensions(), (WIDTH * SCALE, HEIGHT * SCALE));
  }

  #[tokio::test]
  async fn rendering_is_deterministic() {
    let renderer = CardRenderer::new(None);
    let a = renderer.render(&card(Theme::Purple)).await.unwrap();
    let b = renderer.render(&card(Theme::Purple)).await.unwrap();
    assert_eq!(a, b);
  }

  #[tokio::test]
  async fn unknown_theme_renders_as_blue() {
    let renderer = CardRenderer::new(None);
    let blue = renderer.render(&card(Theme::Blue)).await.unwrap();
    let unknown = renderer.render(&card(Theme::resolve("neon"))).await.unwrap();
    assert_eq!(blue, unknown);
  }

  #[tokio::test]
  async fn theme_colours_land_in_their_regions() {
    let raster = CardRenderer::new(None).render(&card(Theme::Green)).await.unwrap();
    let img = decode(&raster);
    let palette = Theme::Green.palette();
    let rgb = |p: Rgba<u8>| [p.0[0], p.0[1], p.0[2]];

    // Body background, below the accent bar at the left edge.
    assert_eq!(rgb(*img.get_pixel(10, 990)), palette.secondary);
    // Accent bar.
    assert_eq!(rgb(*img.get_pixel(10, 924)), palette.primary);
    // Header gradient starts at the primary colour.
    let corner = rgb(*img.get_pixel(0, 0));
    for (got, want) in corner.iter().zip(palette.primary) {
      assert!(got.abs_diff(want) <= 2, "{corner:?}");
    }
  }

  #[tokio::test]
  async fn profile_image_replaces_initials() {
    let renderer = CardRenderer::new(None);
    let jane = card(Theme::Blue);
    let red = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));

    let plain = decode(&renderer.render_with(&jane, None).await.unwrap());
    let with = decode(&renderer.render_with(&jane, Some(red)).await.unwrap());

    // Avatar centre (80, 75) at scale 2.
    assert_eq!(*with.get_pixel(160, 150), Rgba([255, 0, 0, 255]));
    assert_ne!(plain.get_pixel(160, 150), with.get_pixel(160, 150));
  }

  #[tokio::test]
  async fn unusable_profile_image_falls_back() {
    let renderer = CardRenderer::new(None);
    let mut broken = card(Theme::Blue);
    broken.profile_image = "data:image/png;base64,not-an-image".into();

    let a = renderer.render(&broken).await.unwrap();
    let b = renderer.render_with(&card(Theme::Blue), None).await.unwrap();
    assert_eq!(a, b);
  }

  #[tokio::test]
  async fn renders_text_with_system_fonts_when_present() {
    let Some(fonts) = Fonts::system() else { return };
    let with_text = CardRenderer::new(Some(fonts)).render(&card(Theme::Dark)).await.unwrap();
    let without = CardRenderer::new(None).render(&card(Theme::Dark)).await.unwrap();
    assert_ne!(with_text, without);
  }
}
