//! Procedural boolean icons
//!
//! Two reserved codepoints render as a colored disc with a white check
//! mark (true) or cross (false). Nothing here touches text or the atlas.

use crate::canvas::{Color, Paint, Renderer, Stroke, StrokeCap};
use crate::constants::{BOOLEAN_FALSE_COLOR, BOOLEAN_STROKE_SCALE, BOOLEAN_TRUE_COLOR};

/// Disc colors for the two states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanPalette {
    pub true_color: Color,
    pub false_color: Color,
}

impl Default for BooleanPalette {
    fn default() -> Self {
        Self {
            true_color: Color::from_argb(BOOLEAN_TRUE_COLOR),
            false_color: Color::from_argb(BOOLEAN_FALSE_COLOR),
        }
    }
}

impl BooleanPalette {
    pub fn color_for(&self, value: bool) -> Color {
        if value {
            self.true_color
        } else {
            self.false_color
        }
    }
}

/// Draw a boolean icon centered on (cx, cy)
///
/// The disc takes the alpha of `paint` when one is given. The mark is
/// stroked in white at the disc's alpha, `radius / 4` wide.
pub fn draw_boolean<R: Renderer + ?Sized>(
    host: &mut R,
    palette: &BooleanPalette,
    value: bool,
    cx: f32,
    cy: f32,
    radius: f32,
    paint: Option<&Paint>,
) {
    let mut disc = palette.color_for(value);
    if let Some(paint) = paint {
        disc = disc.with_alpha(paint.alpha());
    }
    host.draw_filled_circle(cx, cy, radius, disc);

    let stroke = Stroke {
        color: Color::WHITE.with_alpha(disc.a),
        width: radius * BOOLEAN_STROKE_SCALE,
        cap: if value {
            StrokeCap::Round
        } else {
            StrokeCap::Butt
        },
    };
    let d = radius / 2.0;
    if value {
        host.draw_stroked_line(cx - d, cy, cx - d / 4.0, cy + d, &stroke);
        host.draw_stroked_line(cx - d / 4.0, cy + d, cx + d, cy - d, &stroke);
    } else {
        host.draw_stroked_line(cx - d, cy - d, cx + d, cy + d, &stroke);
        host.draw_stroked_line(cx - d, cy + d, cx + d, cy - d, &stroke);
    }
}
