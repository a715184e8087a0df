//! A scaled RGBA drawing surface.
//!
//! All coordinates are logical; the canvas multiplies them by its scale.
//! Shapes get a half-pixel coverage ramp on their edges. Every operation is a
//! pure function of its inputs, so identical calls produce identical pixels.

use cardshare_core::theme::Rgb;
use fontdue::Font;
use image::{Rgba, RgbaImage, imageops::FilterType};

pub(crate) const WHITE: Rgb = [0xFF, 0xFF, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
  Left,
  Center,
}

pub(crate) struct Canvas {
  img:   RgbaImage,
  scale: f32,
}

impl Canvas {
  pub fn new(width: u32, height: u32, scale: u32, background: Rgb) -> Self {
    let [r, g, b] = background;
    let img = RgbaImage::from_pixel(width * scale, height * scale, Rgba([r, g, b, 0xFF]));
    Self { img, scale: scale as f32 }
  }

  pub fn into_image(self) -> RgbaImage { self.img }

  // ─── Pixel access ──────────────────────────────────────────────────────────

  fn blend(&mut self, x: i64, y: i64, rgb: Rgb, alpha: f32) {
    if alpha <= 0.0 || x < 0 || y < 0 {
      return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= self.img.width() || y >= self.img.height() {
      return;
    }
    let a = alpha.min(1.0);
    let px = self.img.get_pixel_mut(x, y);
    for (dst, src) in px.0.iter_mut().zip(rgb) {
      *dst = (f32::from(src) * a + f32::from(*dst) * (1.0 - a)).round() as u8;
    }
  }

  /// Device-pixel bounds of a logical box, clamped to the image.
  fn device_span(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> (i64, i64, i64, i64) {
    let s = self.scale;
    let clamp_x = |v: f32| (v.max(0.0) as i64).min(i64::from(self.img.width()));
    let clamp_y = |v: f32| (v.max(0.0) as i64).min(i64::from(self.img.height()));
    (
      clamp_x((x0 * s).floor()),
      clamp_y((y0 * s).floor()),
      clamp_x((x1 * s).ceil()),
      clamp_y((y1 * s).ceil()),
    )
  }

  // ─── Shapes ────────────────────────────────────────────────────────────────

  pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: Rgb, alpha: f32) {
    let (x0, y0, x1, y1) = self.device_span(x, y, x + w, y + h);
    for py in y0..y1 {
      for px in x0..x1 {
        self.blend(px, py, rgb, alpha);
      }
    }
  }

  /// Fill a rectangle with a linear gradient running from `(0, 0)` to
  /// `(w, h)` of the rectangle, i.e. corner to corner.
  pub fn gradient_rect(&mut self, x: f32, y: f32, w: f32, h: f32, from: Rgb, to: Rgb) {
    let (x0, y0, x1, y1) = self.device_span(x, y, x + w, y + h);
    let len2 = w * w + h * h;
    for py in y0..y1 {
      for px in x0..x1 {
        let lx = (px as f32 + 0.5) / self.scale - x;
        let ly = (py as f32 + 0.5) / self.scale - y;
        let t = if len2 > 0.0 { ((lx * w + ly * h) / len2).clamp(0.0, 1.0) } else { 0.0 };
        self.blend(px, py, lerp(from, to, t), 1.0);
      }
    }
  }

  pub fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, rgb: Rgb, alpha: f32) {
    self.each_in_circle(cx, cy, r, |canvas, px, py, coverage| {
      canvas.blend(px, py, rgb, alpha * coverage);
    });
  }

  pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, width: f32, rgb: Rgb, alpha: f32) {
    let s = self.scale;
    let (rd, half) = (r * s, width * s / 2.0);
    let reach = r + width;
    let (x0, y0, x1, y1) = self.device_span(cx - reach, cy - reach, cx + reach, cy + reach);
    for py in y0..y1 {
      for px in x0..x1 {
        let d = distance(px, py, cx * s, cy * s);
        let coverage = ((half - (d - rd).abs()) + 0.5).clamp(0.0, 1.0);
        self.blend(px, py, rgb, alpha * coverage);
      }
    }
  }

  /// Draw `src` scaled to cover the circle's bounding square and clipped to
  /// the circle.
  pub fn image_in_circle(&mut self, cx: f32, cy: f32, r: f32, src: &RgbaImage) {
    let side = (2.0 * r * self.scale).round().max(1.0) as u32;
    let cover = image::DynamicImage::ImageRgba8(src.clone())
      .resize_to_fill(side, side, FilterType::Triangle)
      .into_rgba8();
    let left = ((cx - r) * self.scale).round() as i64;
    let top = ((cy - r) * self.scale).round() as i64;

    self.each_in_circle(cx, cy, r, |canvas, px, py, coverage| {
      let (sx, sy) = (px - left, py - top);
      if sx < 0 || sy < 0 || sx >= i64::from(side) || sy >= i64::from(side) {
        return;
      }
      let Rgba([r, g, b, a]) = *cover.get_pixel(sx as u32, sy as u32);
      canvas.blend(px, py, [r, g, b], coverage * f32::from(a) / 255.0);
    });
  }

  fn each_in_circle(
    &mut self,
    cx: f32,
    cy: f32,
    r: f32,
    mut f: impl FnMut(&mut Self, i64, i64, f32),
  ) {
    let s = self.scale;
    let (x0, y0, x1, y1) = self.device_span(cx - r, cy - r, cx + r, cy + r);
    for py in y0..y1 {
      for px in x0..x1 {
        let d = distance(px, py, cx * s, cy * s);
        let coverage = (r * s - d + 0.5).clamp(0.0, 1.0);
        if coverage > 0.0 {
          f(self, px, py, coverage);
        }
      }
    }
  }

  // ─── Text ──────────────────────────────────────────────────────────────────

  /// Logical advance width of `text` at `size`.
  pub fn measure(font: &Font, size: f32, text: &str) -> f32 {
    text.chars().filter(|c| !c.is_control()).map(|c| font.metrics(c, size).advance_width).sum()
  }

  /// Draw one line of text with its baseline at `y`. With [`Align::Center`]
  /// `x` is the horizontal centre.
  #[allow(clippy::too_many_arguments)]
  pub fn text(
    &mut self,
    font: &Font,
    size: f32,
    x: f32,
    y: f32,
    align: Align,
    rgb: Rgb,
    alpha: f32,
    text: &str,
  ) {
    let s = self.scale;
    let px_size = size * s;
    let start = match align {
      Align::Left => x,
      Align::Center => x - Self::measure(font, size, text) / 2.0,
    };
    let mut pen = start * s;
    let baseline = (y * s).round() as i64;

    for ch in text.chars().filter(|c| !c.is_control()) {
      let (metrics, bitmap) = font.rasterize(ch, px_size);
      let left = (pen.round() as i64) + i64::from(metrics.xmin);
      let top = baseline - metrics.height as i64 - i64::from(metrics.ymin);
      for row in 0..metrics.height {
        for col in 0..metrics.width {
          let coverage = f32::from(bitmap[row * metrics.width + col]) / 255.0;
          self.blend(left + col as i64, top + row as i64, rgb, alpha * coverage);
        }
      }
      pen += metrics.advance_width;
    }
  }

  #[cfg(test)]
  pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> { *self.img.get_pixel(x, y) }
}

fn distance(px: i64, py: i64, cx: f32, cy: f32) -> f32 {
  let dx = px as f32 + 0.5 - cx;
  let dy = py as f32 + 0.5 - cy;
  (dx * dx + dy * dy).sqrt()
}

fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
  let mut out = [0; 3];
  for i in 0..3 {
    out[i] = (f32::from(from[i]) + (f32::from(to[i]) - f32::from(from[i])) * t).round() as u8;
  }
  out
}
