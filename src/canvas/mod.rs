//! Host drawing capability
//!
//! The text driver orchestrates draw calls but never touches pixels itself.
//! Everything it needs from the host 2D canvas is expressed by [`Renderer`]:
//! - Font metrics and native run measurement
//! - Left-aligned text runs
//! - Scaled image blits
//! - Filled circles and stroked lines
//!
//! [`raster::RasterCanvas`] is a software implementation used by the CLI.

pub mod raster;

use crate::font::atlas::FallbackImage;
use crate::text::bounds::{FontMetrics, HorizontalAlign};

pub use raster::RasterCanvas;

/// Straight (non-premultiplied) RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build from a packed 0xAARRGGBB value
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into 0xAARRGGBB
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Axis-aligned rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square of edge `size` with its top-left corner at (x, y)
    pub fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, x + size, y + size)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Line end style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    /// Ends exactly at the endpoints
    Butt,
    /// Semicircle of half the stroke width past each endpoint
    Round,
}

/// Stroke parameters for [`Renderer::draw_stroked_line`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub cap: StrokeCap,
}

/// Caller-owned text style
///
/// Mirrors what a host paint object carries. The driver only ever writes
/// `text_align`, and always restores it before returning.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub text_size: f32,
    pub text_align: HorizontalAlign,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            text_size: 16.0,
            text_align: HorizontalAlign::Left,
        }
    }
}

impl Paint {
    pub fn new(color: Color, text_size: f32) -> Self {
        Self {
            color,
            text_size,
            ..Self::default()
        }
    }

    pub fn alpha(&self) -> u8 {
        self.color.a
    }
}

/// Host 2D canvas primitives
///
/// Text is passed as UTF-16 code units, already sliced to the run to
/// draw or measure.
pub trait Renderer {
    /// Ascent (negative, above baseline) and descent for the paint's font
    fn font_metrics(&self, paint: &Paint) -> FontMetrics;

    /// Native advance width of a run
    fn measure_text(&self, text: &[u16], paint: &Paint) -> f32;

    /// Draw a run left-aligned at `x` with its baseline at `y`
    fn draw_text_run(&mut self, text: &[u16], x: f32, y: f32, paint: &Paint);

    /// Scale `image` into `dst`, modulated by the paint alpha
    fn draw_image_region(&mut self, image: &FallbackImage, dst: Rect, paint: &Paint);

    fn draw_filled_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color);

    fn draw_stroked_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, stroke: &Stroke);
}
