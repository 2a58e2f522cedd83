//! Text drawing driver
//!
//! Walks the scanner's segments and turns them into host draw calls:
//! plain runs go to the host text primitive, boolean sentinels to the
//! procedural icon, everything else special to an atlas blit.
//!
//! The cursor advances by exactly the per-segment widths that
//! [`measure_text`](crate::text::measure::measure_text) sums, so the drawn
//! run always matches its measured width.

use log::{debug, trace};
use std::ops::Deref;
use std::sync::Arc;

use crate::canvas::{Paint, Rect, Renderer};
use crate::drawing::boolean_icon::{draw_boolean, BooleanPalette};
use crate::font::atlas::{AtlasError, FallbackAtlas, FallbackImage};
use crate::text::bounds::{
    horizontal_span, text_bounds, vertical_span, HorizontalAlign, LayoutRect, VerticalAlign,
};
use crate::text::measure::{measure_text, segment_width};
use crate::text::scanner::{Classifier, Segment, SpecialKind};

/// Overrides a paint's horizontal alignment until dropped
///
/// Restoration happens on every exit path, including `?` returns.
struct AlignGuard<'a> {
    paint: &'a mut Paint,
    saved: HorizontalAlign,
}

impl<'a> AlignGuard<'a> {
    fn force(paint: &'a mut Paint, align: HorizontalAlign) -> Self {
        let saved = paint.text_align;
        paint.text_align = align;
        Self { paint, saved }
    }
}

impl Deref for AlignGuard<'_> {
    type Target = Paint;

    fn deref(&self) -> &Paint {
        self.paint
    }
}

impl Drop for AlignGuard<'_> {
    fn drop(&mut self) {
        self.paint.text_align = self.saved;
    }
}

/// Text renderer with emoji fallback and boolean icons
///
/// Owns the classification rule and shares the atlas, which may be used
/// by several renderers (and threads) at once.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    classifier: Classifier,
    atlas: Arc<FallbackAtlas>,
    palette: BooleanPalette,
}

impl TextRenderer {
    pub fn new(classifier: Classifier, atlas: Arc<FallbackAtlas>) -> Self {
        Self {
            classifier,
            atlas,
            palette: BooleanPalette::default(),
        }
    }

    pub fn with_palette(mut self, palette: BooleanPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn atlas(&self) -> &Arc<FallbackAtlas> {
        &self.atlas
    }

    pub fn palette(&self) -> &BooleanPalette {
        &self.palette
    }

    /// Advance width of `text[start..end]` with `paint`
    pub fn measure_text<R: Renderer + ?Sized>(
        &self,
        host: &R,
        paint: &Paint,
        text: &[u16],
        start: usize,
        end: usize,
    ) -> f32 {
        let metrics = host.font_metrics(paint);
        measure_text(host, paint, &metrics, &self.classifier, text, start, end)
    }

    /// Bounds of `text[start..end]` relative to the anchor, without drawing
    #[allow(clippy::too_many_arguments)]
    pub fn get_text_bounds<R: Renderer + ?Sized>(
        &self,
        host: &R,
        paint: &Paint,
        text: &[u16],
        start: usize,
        end: usize,
        horizontal: HorizontalAlign,
        vertical: VerticalAlign,
    ) -> LayoutRect {
        let metrics = host.font_metrics(paint);
        let width = measure_text(host, paint, &metrics, &self.classifier, text, start, end);
        text_bounds(&metrics, width, horizontal, vertical)
    }

    /// Raw atlas image for `codepoint`
    pub fn fallback_bitmap(&self, codepoint: u32) -> Result<Option<Arc<FallbackImage>>, AtlasError> {
        self.atlas.image_for(codepoint)
    }

    /// Boolean icon with this renderer's palette
    pub fn draw_boolean<R: Renderer + ?Sized>(
        &self,
        host: &mut R,
        value: bool,
        cx: f32,
        cy: f32,
        radius: f32,
        paint: Option<&Paint>,
    ) {
        draw_boolean(host, &self.palette, value, cx, cy, radius, paint);
    }

    /// Draw the whole buffer with its baseline at `y`
    pub fn draw_text<R: Renderer + ?Sized>(
        &self,
        host: &mut R,
        text: &[u16],
        x: f32,
        y: f32,
        paint: &mut Paint,
    ) -> Result<f32, AtlasError> {
        self.draw_text_range_aligned(host, text, 0, text.len(), x, y, paint, VerticalAlign::Baseline)
    }

    /// Draw the whole buffer with the given vertical alignment
    pub fn draw_text_aligned<R: Renderer + ?Sized>(
        &self,
        host: &mut R,
        text: &[u16],
        x: f32,
        y: f32,
        paint: &mut Paint,
        vertical: VerticalAlign,
    ) -> Result<f32, AtlasError> {
        self.draw_text_range_aligned(host, text, 0, text.len(), x, y, paint, vertical)
    }

    /// Draw `text[start..end]` with its baseline at `y`
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_range<R: Renderer + ?Sized>(
        &self,
        host: &mut R,
        text: &[u16],
        start: usize,
        end: usize,
        x: f32,
        y: f32,
        paint: &mut Paint,
    ) -> Result<f32, AtlasError> {
        self.draw_text_range_aligned(host, text, start, end, x, y, paint, VerticalAlign::Baseline)
    }

    /// Draw `text[start..end]` anchored at (x, y)
    ///
    /// Horizontal placement follows `paint.text_align`, vertical placement
    /// follows `vertical`. The host always receives left-aligned runs; the
    /// paint's alignment is restored before returning, on success or error.
    ///
    /// Returns the total cursor advance, equal to the measured width.
    /// An atlas cell missing from the asset leaves its box empty but still
    /// advances the cursor. A failure to load the atlas is returned as-is.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_text_range_aligned<R: Renderer + ?Sized>(
        &self,
        host: &mut R,
        text: &[u16],
        start: usize,
        end: usize,
        x: f32,
        y: f32,
        paint: &mut Paint,
        vertical: VerticalAlign,
    ) -> Result<f32, AtlasError> {
        let metrics = host.font_metrics(paint);
        let size = metrics.special_size();

        let mut x = x;
        if paint.text_align != HorizontalAlign::Left {
            let width = measure_text(&*host, paint, &metrics, &self.classifier, text, start, end);
            x += horizontal_span(width, paint.text_align).0;
        }
        // Top of the line box
        let y = y + vertical_span(&metrics, vertical).0;
        let baseline = y + metrics.ascent_abs();

        let paint = AlignGuard::force(paint, HorizontalAlign::Left);
        let mut cursor = x;
        // Summed in the same order as `measure_text`
        let mut total = 0.0;

        for segment in self.classifier.scan(text, start, end) {
            let advance = segment_width(&*host, &paint, &metrics, text, &segment);
            match segment {
                Segment::Plain { start, end } => {
                    if start < end {
                        trace!("plain {}..{} at x={:.1}", start, end, cursor);
                        host.draw_text_run(&text[start..end], cursor, baseline, &paint);
                    }
                }
                Segment::Special {
                    codepoint,
                    kind: SpecialKind::Boolean(value),
                    ..
                } => {
                    trace!("boolean U+{:04X} at x={:.1}", codepoint, cursor);
                    let half = size / 2.0;
                    draw_boolean(
                        host,
                        &self.palette,
                        value,
                        cursor + half,
                        y + half,
                        half,
                        Some(&*paint),
                    );
                }
                Segment::Special {
                    codepoint,
                    kind: SpecialKind::Fallback,
                    ..
                } => match self.atlas.image_for(codepoint)? {
                    Some(image) => {
                        trace!("fallback U+{:05X} at x={:.1}", codepoint, cursor);
                        host.draw_image_region(&image, Rect::square(cursor, y, size), &paint);
                    }
                    None => {
                        debug!("no fallback image for U+{:05X}, leaving box empty", codepoint);
                    }
                },
            }
            cursor += advance;
            total += advance;
        }

        Ok(total)
    }
}
