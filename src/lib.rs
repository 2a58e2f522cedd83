//! emotext - text runs with emoji fallback images and boolean icons
//!
//! Measures and draws UTF-16 text through a host [`Renderer`], replacing
//! selected codepoints with cells from a fallback atlas image and two
//! reserved sentinels with procedurally drawn check/cross icons.

pub mod canvas;
pub mod config;
pub mod constants;
pub mod drawing;
pub mod font;
pub mod text;
pub mod utils;

pub use canvas::{Color, Paint, RasterCanvas, Rect, Renderer, Stroke, StrokeCap};
pub use config::Config;
pub use font::atlas::{AtlasError, AtlasLayout, FallbackAtlas, FallbackImage, ImageSource};
pub use text::{
    Classifier, FallbackPolicy, FontMetrics, HorizontalAlign, LayoutRect, Segment, TextRenderer,
    VerticalAlign,
};
