//! The card layout: where every region of the image goes.

use cardshare_core::{Card, card::ContactField, theme::Rgb};
use image::RgbaImage;

use crate::{
  Fonts,
  canvas::{Align, Canvas, WHITE},
};

/// Logical canvas width.
pub const WIDTH: u32 = 800;
/// Logical canvas height.
pub const HEIGHT: u32 = 500;
/// Device pixels per logical pixel.
pub const SCALE: u32 = 2;

const HEADER_HEIGHT: f32 = 150.0;
const AVATAR: (f32, f32, f32) = (80.0, 75.0, 40.0);
const BODY_X: f32 = 50.0;
const ROW_START: f32 = 240.0;
const ROW_STEP: f32 = 35.0;
const BULLET_RADIUS: f32 = 4.0;
const ROW_TEXT_X: f32 = BODY_X + 20.0;
const ACCENT_Y: f32 = 460.0;
const ACCENT_HEIGHT: f32 = 5.0;

const BODY_TEXT: Rgb = [0x33, 0x33, 0x33];
const FOOTER_TEXT: Rgb = [0x66, 0x66, 0x66];
const FOOTER: &str = "Digital Business Card • Created with Digital Card Generator";

/// Paint `card` onto a fresh canvas. Text is skipped when `fonts` is `None`.
pub(crate) fn paint(card: &Card, avatar: Option<&RgbaImage>, fonts: Option<&Fonts>) -> RgbaImage {
  let palette = card.theme.palette();
  let mut canvas = Canvas::new(WIDTH, HEIGHT, SCALE, palette.secondary);
  let width = WIDTH as f32;

  // Header band.
  canvas.gradient_rect(0.0, 0.0, width, HEADER_HEIGHT, palette.primary, palette.text);

  // Avatar.
  let (ax, ay, ar) = AVATAR;
  canvas.fill_circle(ax, ay, ar, WHITE, 0.2);
  match avatar {
    Some(img) => canvas.image_in_circle(ax, ay, ar, img),
    None => {
      if let Some(f) = fonts {
        canvas.text(&f.bold, 28.0, ax, ay + 10.0, Align::Center, WHITE, 1.0, &card.initials());
      }
    }
  }
  canvas.stroke_circle(ax, ay, ar, 2.0, WHITE, 0.5);

  // Identity.
  if let Some(f) = fonts {
    canvas.text(&f.bold, 36.0, 150.0, 60.0, Align::Left, WHITE, 1.0, &card.full_name);
    canvas.text(&f.regular, 22.0, 150.0, 90.0, Align::Left, WHITE, 0.9, &card.designation);
    canvas.text(&f.regular, 20.0, 150.0, 115.0, Align::Left, WHITE, 0.8, &card.company);
    canvas.text(
      &f.bold,
      26.0,
      BODY_X,
      200.0,
      Align::Left,
      palette.text,
      1.0,
      "Contact Information",
    );
  }

  // Contact rows.
  let mut y = ROW_START;
  for (field, value) in card.contact_fields() {
    canvas.fill_circle(BODY_X + BULLET_RADIUS + 2.0, y - 7.0, BULLET_RADIUS, palette.primary, 1.0);
    if let Some(f) = fonts {
      let line = row_text(field, value);
      canvas.text(&f.regular, 20.0, ROW_TEXT_X, y, Align::Left, BODY_TEXT, 1.0, &line);
    }
    y += ROW_STEP;
  }

  // Accent bar and footer.
  canvas.fill_rect(0.0, ACCENT_Y, width, ACCENT_HEIGHT, palette.primary, 1.0);
  if let Some(f) = fonts {
    canvas.text(&f.regular, 14.0, width / 2.0, 485.0, Align::Center, FOOTER_TEXT, 1.0, FOOTER);
  }

  canvas.into_image()
}

fn row_text(field: ContactField, value: &str) -> String {
  match field {
    ContactField::LinkedIn => format!("LinkedIn: {value}"),
    ContactField::GitHub => format!("GitHub: {value}"),
    _ => value.to_string(),
  }
}
