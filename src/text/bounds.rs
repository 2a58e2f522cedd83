//! Alignment and layout bounds
//!
//! Bounds are computed relative to the anchor point without drawing.
//! The same offsets drive the anchor adjustment in the draw path, so a
//! rectangle returned here always encloses what `draw_text` produces.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Horizontal placement of a run relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of a run relative to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Center,
    #[default]
    Baseline,
    Bottom,
}

impl FromStr for HorizontalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            other => Err(format!("unknown horizontal alignment: {}", other)),
        }
    }
}

impl FromStr for VerticalAlign {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" => Ok(Self::Center),
            "baseline" => Ok(Self::Baseline),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown vertical alignment: {}", other)),
        }
    }
}

/// Font metrics for one paint
///
/// `ascent` follows the host convention of being negative above the
/// baseline. Both values are consumed as absolute distances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontMetrics {
    pub ascent: f32,
    pub descent: f32,
}

impl FontMetrics {
    pub fn new(ascent: f32, descent: f32) -> Self {
        Self { ascent, descent }
    }

    /// Distance from the top of the line box to the baseline
    #[inline]
    pub fn ascent_abs(&self) -> f32 {
        self.ascent.abs()
    }

    #[inline]
    pub fn descent_abs(&self) -> f32 {
        self.descent.abs()
    }

    /// Edge length of the square box used for substituted codepoints
    #[inline]
    pub fn special_size(&self) -> f32 {
        self.ascent_abs() + self.descent_abs()
    }
}

/// Rectangle relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl LayoutRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Horizontal span `(left, right)` of a run of `width`
pub fn horizontal_span(width: f32, align: HorizontalAlign) -> (f32, f32) {
    match align {
        HorizontalAlign::Left => (0.0, width),
        HorizontalAlign::Right => (-width, 0.0),
        HorizontalAlign::Center => (-width / 2.0, width / 2.0),
    }
}

/// Vertical span `(top, bottom)` of the line box
pub fn vertical_span(metrics: &FontMetrics, align: VerticalAlign) -> (f32, f32) {
    let ascent = metrics.ascent_abs();
    let descent = metrics.descent_abs();
    let size = metrics.special_size();
    match align {
        VerticalAlign::Top => (0.0, size),
        VerticalAlign::Baseline => (-ascent, descent),
        VerticalAlign::Center => (-size / 2.0, size / 2.0),
        VerticalAlign::Bottom => (-size, 0.0),
    }
}

/// Bounds of a run of already-measured `width`
pub fn text_bounds(
    metrics: &FontMetrics,
    width: f32,
    horizontal: HorizontalAlign,
    vertical: VerticalAlign,
) -> LayoutRect {
    let (left, right) = horizontal_span(width, horizontal);
    let (top, bottom) = vertical_span(metrics, vertical);
    LayoutRect {
        left,
        top,
        right,
        bottom,
    }
}
