//! Software canvas
//!
//! A [`Renderer`] over an RGBA pixel buffer. Glyphs are rasterized with
//! fontdue, shapes are anti-aliased with the distance helpers from
//! [`crate::drawing::geometry`], and everything is composited with
//! straight-alpha "source over".

use anyhow::{Context, Result};
use fontdue::Font;
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{Color, Paint, Rect, Renderer, Stroke, StrokeCap};
use crate::constants::{AA_WIDTH_SOLID, ALPHA_THRESHOLD};
use crate::drawing::geometry::{
    aa_alpha_from_distance, disc_distance, distance_to_segment, segment_param,
};
use crate::font::atlas::FallbackImage;
use crate::text::bounds::FontMetrics;

/// Ascent used when no font is loaded, relative to text size
const FALLBACK_ASCENT_SCALE: f32 = 0.8;
/// Descent used when no font is loaded, relative to text size
const FALLBACK_DESCENT_SCALE: f32 = 0.2;

/// Encode an RGBA image as PNG
pub fn encode_png<W: Write>(writer: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(writer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()
}

/// RGBA pixel buffer with an optional font
///
/// Without a font, text runs measure as zero width and draw nothing;
/// shapes and images still render.
pub struct RasterCanvas {
    pixels: RgbaImage,
    font: Option<Font>,
}

impl RasterCanvas {
    /// Canvas filled with `background`
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(background.to_array())),
            font: None,
        }
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    /// Load a TTF/OTF file for text runs
    pub fn load_font<P: AsRef<Path>>(path: P) -> Result<Font> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        let font = Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to load font {}: {}", path.display(), e))?;
        info!("Font loaded: {}", path.display());
        Ok(font)
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Write the canvas as PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        encode_png(BufWriter::new(file), &self.pixels)
            .with_context(|| format!("Failed to encode {}", path.display()))?;
        info!("Saved {}x{} image: {}", self.width(), self.height(), path.display());
        Ok(())
    }

    /// Composite `color` at (x, y) scaled by `coverage`
    fn blend(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.pixels.width() || y as u32 >= self.pixels.height() {
            return;
        }
        let sa = color.a as f32 / 255.0 * coverage;
        if sa < ALPHA_THRESHOLD {
            return;
        }

        let dst = self.pixels.get_pixel_mut(x as u32, y as u32);
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(color.r, dst[0]),
            mix(color.g, dst[1]),
            mix(color.b, dst[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Pixel bounds covering [x0, x1] x [y0, y1], clipped to the canvas
    fn pixel_span(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> (i32, i32, i32, i32) {
        let w = self.pixels.width() as i32;
        let h = self.pixels.height() as i32;
        (
            (x0.floor() as i32).max(0),
            (y0.floor() as i32).max(0),
            (x1.ceil() as i32).min(w),
            (y1.ceil() as i32).min(h),
        )
    }
}

impl Renderer for RasterCanvas {
    fn font_metrics(&self, paint: &Paint) -> FontMetrics {
        match self
            .font
            .as_ref()
            .and_then(|f| f.horizontal_line_metrics(paint.text_size))
        {
            // fontdue reports ascent up-positive and descent negative
            Some(m) => FontMetrics::new(-m.ascent, -m.descent),
            None => FontMetrics::new(
                -paint.text_size * FALLBACK_ASCENT_SCALE,
                paint.text_size * FALLBACK_DESCENT_SCALE,
            ),
        }
    }

    fn measure_text(&self, text: &[u16], paint: &Paint) -> f32 {
        let Some(font) = self.font.as_ref() else {
            return 0.0;
        };
        char::decode_utf16(text.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .map(|ch| font.metrics(ch, paint.text_size).advance_width)
            .sum()
    }

    fn draw_text_run(&mut self, text: &[u16], x: f32, y: f32, paint: &Paint) {
        let Some(font) = self.font.take() else {
            debug!("RasterCanvas: no font, skipping text run");
            return;
        };

        let mut pen = x;
        for ch in char::decode_utf16(text.iter().copied())
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        {
            let (m, bitmap) = font.rasterize(ch, paint.text_size);
            let gx = (pen + m.xmin as f32).round() as i32;
            // ymin is the bitmap bottom relative to the baseline (up-positive)
            let gy = (y - m.height as f32 - m.ymin as f32).round() as i32;
            for row in 0..m.height {
                for col in 0..m.width {
                    let coverage = bitmap[row * m.width + col] as f32 / 255.0;
                    self.blend(gx + col as i32, gy + row as i32, paint.color, coverage);
                }
            }
            pen += m.advance_width;
        }

        self.font = Some(font);
    }

    fn draw_image_region(&mut self, image: &FallbackImage, dst: Rect, paint: &Paint) {
        let w = dst.width().round() as u32;
        let h = dst.height().round() as u32;
        if w == 0 || h == 0 || image.width() == 0 || image.height() == 0 {
            return;
        }

        let scaled;
        let src = if image.dimensions() == (w, h) {
            image
        } else {
            scaled = image::imageops::resize(image, w, h, FilterType::Lanczos3);
            &scaled
        };

        let ox = dst.left.round() as i32;
        let oy = dst.top.round() as i32;
        let alpha = paint.alpha() as f32 / 255.0;
        for (px, py, pixel) in src.enumerate_pixels() {
            let [r, g, b, a] = pixel.0;
            self.blend(
                ox + px as i32,
                oy + py as i32,
                Color::rgba(r, g, b, a),
                alpha,
            );
        }
    }

    fn draw_filled_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        let reach = radius + AA_WIDTH_SOLID;
        let (x0, y0, x1, y1) = self.pixel_span(cx - reach, cy - reach, cx + reach, cy + reach);
        for py in y0..y1 {
            for px in x0..x1 {
                let d = disc_distance(px as f32 + 0.5, py as f32 + 0.5, cx, cy, radius);
                let coverage = aa_alpha_from_distance(d, AA_WIDTH_SOLID);
                self.blend(px, py, color, coverage);
            }
        }
    }

    fn draw_stroked_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, stroke: &Stroke) {
        let half = stroke.width / 2.0;
        let reach = half + AA_WIDTH_SOLID;
        let (bx0, by0, bx1, by1) = self.pixel_span(
            x0.min(x1) - reach,
            y0.min(y1) - reach,
            x0.max(x1) + reach,
            y0.max(y1) + reach,
        );
        for py in by0..by1 {
            for px in bx0..bx1 {
                let (fx, fy) = (px as f32 + 0.5, py as f32 + 0.5);
                if stroke.cap == StrokeCap::Butt {
                    let t = segment_param(fx, fy, x0, y0, x1, y1);
                    if !(0.0..=1.0).contains(&t) {
                        continue;
                    }
                }
                let d = distance_to_segment(fx, fy, x0, y0, x1, y1);
                let coverage = aa_alpha_from_distance(half - d, AA_WIDTH_SOLID);
                self.blend(px, py, stroke.color, coverage);
            }
        }
    }
}
