//! Run width measurement
//!
//! Plain segments are measured by the host, special codepoints take a
//! fixed square of `|ascent| + |descent|`. With no special codepoints in
//! range the result is exactly the host's own measurement.

use crate::canvas::{Paint, Renderer};
use crate::text::bounds::FontMetrics;
use crate::text::scanner::{Classifier, Segment};

/// Advance of a single segment
#[inline]
pub(crate) fn segment_width<R: Renderer + ?Sized>(
    host: &R,
    paint: &Paint,
    metrics: &FontMetrics,
    text: &[u16],
    segment: &Segment,
) -> f32 {
    match *segment {
        Segment::Plain { start, end } if start < end => host.measure_text(&text[start..end], paint),
        Segment::Plain { .. } => 0.0,
        Segment::Special { .. } => metrics.special_size(),
    }
}

/// Total advance width of `text[start..end]`
///
/// `metrics` must come from the same paint used for drawing, otherwise
/// the width silently disagrees with what gets drawn.
pub fn measure_text<R: Renderer + ?Sized>(
    host: &R,
    paint: &Paint,
    metrics: &FontMetrics,
    classifier: &Classifier,
    text: &[u16],
    start: usize,
    end: usize,
) -> f32 {
    classifier
        .scan(text, start, end)
        .map(|segment| segment_width(host, paint, metrics, text, &segment))
        .sum()
}
