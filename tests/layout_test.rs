//! Layout and drawing tests against a recording renderer
//!
//! The renderer measures every code unit as 5px and records each primitive,
//! so expected positions can be computed by hand.

use std::sync::Arc;

use emotext::canvas::raster::encode_png;
use emotext::canvas::{Color, Paint, Rect, Renderer, Stroke, StrokeCap};
use emotext::drawing::BooleanPalette;
use emotext::font::atlas::{AtlasLayout, FallbackAtlas, FallbackImage, MemoryImageSource};
use emotext::text::{
    Classifier, FallbackPolicy, FontMetrics, HorizontalAlign, LayoutRect, Segment, TextRenderer,
    VerticalAlign,
};
use image::{Rgba, RgbaImage};

const UNIT: f32 = 5.0;
const ASCENT: f32 = -10.0;
const DESCENT: f32 = 4.0;
const SPECIAL: f32 = 14.0;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Text(String, f32, f32),
    Image(u32, Rect, u8),
    Circle(f32, f32, f32, Color),
    Line(f32, f32, f32, f32, Stroke),
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Recorder {
    fn images(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Image(..)))
            .collect()
    }

    fn circles(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Circle(..)))
            .collect()
    }
}

impl Renderer for Recorder {
    fn font_metrics(&self, _paint: &Paint) -> FontMetrics {
        FontMetrics::new(ASCENT, DESCENT)
    }

    fn measure_text(&self, text: &[u16], _paint: &Paint) -> f32 {
        text.len() as f32 * UNIT
    }

    fn draw_text_run(&mut self, text: &[u16], x: f32, y: f32, paint: &Paint) {
        assert_eq!(paint.text_align, HorizontalAlign::Left);
        self.calls
            .push(Call::Text(String::from_utf16_lossy(text), x, y));
    }

    fn draw_image_region(&mut self, image: &FallbackImage, dest: Rect, paint: &Paint) {
        // Cells are tagged with their index in the red channel
        self.calls
            .push(Call::Image(image.get_pixel(0, 0)[0] as u32, dest, paint.alpha()));
    }

    fn draw_filled_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        self.calls.push(Call::Circle(cx, cy, radius, color));
    }

    fn draw_stroked_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, stroke: &Stroke) {
        self.calls.push(Call::Line(x0, y0, x1, y1, *stroke));
    }
}

/// Atlas covering the first two rows of the default layout; cell i is filled with red = i
fn two_row_atlas() -> Arc<FallbackAtlas> {
    let layout = AtlasLayout::default();
    let cell = layout.cell_size;
    let per_row = layout.chars_per_line;
    let img = RgbaImage::from_fn(per_row * cell, 2 * cell, |x, y| {
        let i = (y / cell) * per_row + x / cell;
        Rgba([i as u8, 0, 0, 255])
    });
    let mut png = Vec::new();
    encode_png(&mut png, &img).unwrap();
    Arc::new(FallbackAtlas::new(layout, MemoryImageSource::new(png)))
}

fn renderer(policy: FallbackPolicy) -> TextRenderer {
    TextRenderer::new(Classifier::new(policy), two_row_atlas())
}

fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

const POLICIES: [FallbackPolicy; 3] = [
    FallbackPolicy::None,
    FallbackPolicy::IconsOnly,
    FallbackPolicy::FullRange,
];

#[test]
fn test_draw_advance_matches_measure() {
    let samples = [
        "",
        "plain ascii",
        "\u{F889}",
        "ok \u{F889} fail \u{F888}",
        "hearts \u{1F499}\u{1F49A}\u{1F49B}\u{1F49C} end",
        "\u{1F300}\u{1F301}\u{1F312}",
        "mixed \u{1F600} e\u{301} \u{F888}\u{1F49A}",
    ];
    for policy in POLICIES {
        let r = renderer(policy);
        for s in samples {
            let text = utf16(s);
            let mut host = Recorder::default();
            let mut paint = Paint::default();
            let measured = r.measure_text(&host, &paint, &text, 0, text.len());
            let drawn = r.draw_text(&mut host, &text, 0.0, 0.0, &mut paint).unwrap();
            assert_eq!(measured, drawn, "{:?} under {:?}", s, policy);
        }
    }
}

#[test]
fn test_sub_range_measure() {
    let r = renderer(FallbackPolicy::FullRange);
    let host = Recorder::default();
    let paint = Paint::default();
    let text = utf16("ab\u{1F300}cd");
    // "b" + the emoji (2 code units) + "c"
    assert_eq!(r.measure_text(&host, &paint, &text, 1, 5), UNIT + SPECIAL + UNIT);
    // Empty and reversed ranges
    assert_eq!(r.measure_text(&host, &paint, &text, 3, 3), 0.0);
    assert_eq!(r.measure_text(&host, &paint, &text, 4, 2), 0.0);
    // Range end past the buffer is clamped
    assert_eq!(r.measure_text(&host, &paint, &text, 4, 100), 2.0 * UNIT);
}

#[test]
fn test_segments_cover_range_in_order() {
    // Lone high surrogate before "d"
    let mut text = utf16("a\u{F888}\u{1F300}bc");
    text.extend([0xD800, u16::from(b'd')]);
    for policy in POLICIES {
        let classifier = Classifier::new(policy);
        let segments: Vec<Segment> = classifier.scan(&text, 0, text.len()).collect();
        let mut pos = 0;
        for seg in &segments {
            assert_eq!(seg.range().start, pos);
            pos = seg.range().end;
        }
        assert_eq!(pos, text.len());
        assert!(matches!(segments.last(), Some(Segment::Plain { .. })));
    }
}

#[test]
fn test_bounds_scenarios() {
    let r = renderer(FallbackPolicy::None);
    let host = Recorder::default();
    let paint = Paint::default();
    let text = utf16("0123456789");

    let b = r.get_text_bounds(
        &host,
        &paint,
        &text,
        0,
        text.len(),
        HorizontalAlign::Right,
        VerticalAlign::Bottom,
    );
    assert_eq!(
        b,
        LayoutRect {
            left: -50.0,
            top: -14.0,
            right: 0.0,
            bottom: 0.0
        }
    );

    let b = r.get_text_bounds(
        &host,
        &paint,
        &text,
        0,
        text.len(),
        HorizontalAlign::Center,
        VerticalAlign::Baseline,
    );
    assert_eq!(
        b,
        LayoutRect {
            left: -25.0,
            top: -10.0,
            right: 25.0,
            bottom: 4.0
        }
    );
}

#[test]
fn test_drawn_positions_follow_bounds() {
    let r = renderer(FallbackPolicy::FullRange);
    let text = utf16("ab\u{1F301}c");
    for h in [
        HorizontalAlign::Left,
        HorizontalAlign::Center,
        HorizontalAlign::Right,
    ] {
        for v in [
            VerticalAlign::Top,
            VerticalAlign::Center,
            VerticalAlign::Baseline,
            VerticalAlign::Bottom,
        ] {
            let mut host = Recorder::default();
            let mut paint = Paint {
                text_align: h,
                ..Paint::default()
            };
            let bounds = r.get_text_bounds(&host, &paint, &text, 0, text.len(), h, v);
            r.draw_text_aligned(&mut host, &text, 100.0, 200.0, &mut paint, v)
                .unwrap();
            assert_eq!(paint.text_align, h);

            // First run starts at the left edge, baseline sits |ascent| below the top
            let Call::Text(ref s, x, y) = host.calls[0] else {
                panic!("expected a text run first");
            };
            assert_eq!(s, "ab");
            assert_eq!(x, 100.0 + bounds.left);
            assert_eq!(y, 200.0 + bounds.top - ASCENT);

            // The atlas cell fills the line box square
            let Call::Image(1, rect, _) = host.calls[1] else {
                panic!("expected cell 1 second");
            };
            assert_eq!(rect, Rect::square(100.0 + bounds.left + 2.0 * UNIT, 200.0 + bounds.top, SPECIAL));
        }
    }
}

#[test]
fn test_policy_controls_substitution() {
    let text = utf16("\u{1F49A}\u{1F300}");

    let mut host = Recorder::default();
    renderer(FallbackPolicy::None)
        .draw_text(&mut host, &text, 0.0, 0.0, &mut Paint::default())
        .unwrap();
    assert!(host.images().is_empty());
    assert_eq!(host.calls.len(), 1);

    let mut host = Recorder::default();
    renderer(FallbackPolicy::IconsOnly)
        .draw_text(&mut host, &text, 0.0, 0.0, &mut Paint::default())
        .unwrap();
    // U+1F49A is cell 0x19A, past the two rows in the asset
    assert!(host.images().is_empty());
    assert_eq!(host.calls.len(), 1);
    assert!(matches!(&host.calls[0], Call::Text(s, x, _) if s == "\u{1F300}" && *x == SPECIAL));

    let mut host = Recorder::default();
    renderer(FallbackPolicy::FullRange)
        .draw_text(&mut host, &text, 0.0, 0.0, &mut Paint::default())
        .unwrap();
    assert_eq!(host.images().len(), 1);
    assert!(!host.calls.iter().any(|c| matches!(c, Call::Text(..))));
}

#[test]
fn test_missing_cell_still_advances() {
    let r = renderer(FallbackPolicy::FullRange);
    let mut host = Recorder::default();
    let text = utf16("\u{1F4FF}x");
    let advance = r
        .draw_text(&mut host, &text, 0.0, 0.0, &mut Paint::default())
        .unwrap();
    assert_eq!(advance, SPECIAL + UNIT);
    assert_eq!(host.calls, vec![Call::Text("x".to_string(), SPECIAL, 0.0)]);
}

#[test]
fn test_atlas_decoded_once_across_draws() {
    let r = renderer(FallbackPolicy::FullRange);
    let text = utf16("\u{1F300}\u{1F300}\u{1F313}");
    for _ in 0..3 {
        let mut host = Recorder::default();
        r.draw_text(&mut host, &text, 0.0, 0.0, &mut Paint::default())
            .unwrap();
        let tags: Vec<u32> = host
            .images()
            .iter()
            .map(|c| match c {
                Call::Image(tag, ..) => *tag,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(tags, vec![0, 0, 19]);
    }
    assert_eq!(r.atlas().open_count(), 1);
    assert_eq!(r.atlas().decode_count(), 2);

    let bitmap = r.fallback_bitmap(0x1F313).unwrap().unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (64, 64));
    assert_eq!(bitmap.get_pixel(63, 63)[0], 19);
    assert!(r.fallback_bitmap(0x41).unwrap().is_none());
    assert_eq!(r.atlas().decode_count(), 2);
}

#[test]
fn test_image_alpha_follows_paint() {
    let r = renderer(FallbackPolicy::FullRange);
    let mut host = Recorder::default();
    let mut paint = Paint::new(Color::rgba(0, 0, 0, 128), 16.0);
    r.draw_text(&mut host, &utf16("\u{1F302}"), 0.0, 0.0, &mut paint)
        .unwrap();
    assert!(matches!(host.images()[..], [Call::Image(2, _, 128)]));
}

#[test]
fn test_boolean_icons() {
    let r = renderer(FallbackPolicy::None);
    let mut host = Recorder::default();
    let mut paint = Paint::new(Color::rgba(0, 0, 0, 200), 16.0);
    let text = utf16("\u{F889}\u{F888}");
    let advance = r.draw_text(&mut host, &text, 0.0, 50.0, &mut paint).unwrap();
    assert_eq!(advance, 2.0 * SPECIAL);

    let palette = BooleanPalette::default();
    let half = SPECIAL / 2.0;
    let top = 50.0 + ASCENT;
    assert_eq!(
        host.circles(),
        vec![
            &Call::Circle(half, top + half, half, palette.true_color.with_alpha(200)),
            &Call::Circle(SPECIAL + half, top + half, half, palette.false_color.with_alpha(200)),
        ]
    );
    assert_eq!(palette.true_color, Color::from_argb(0xFFBD_CF46));
    assert_eq!(palette.false_color, Color::from_argb(0xFFED_6C30));

    // Check mark strokes round, cross strokes butt, all white at the disc alpha
    let strokes: Vec<Stroke> = host
        .calls
        .iter()
        .filter_map(|c| match c {
            Call::Line(.., s) => Some(*s),
            _ => None,
        })
        .collect();
    assert_eq!(strokes.len(), 4);
    assert!(strokes[..2].iter().all(|s| s.cap == StrokeCap::Round));
    assert!(strokes[2..].iter().all(|s| s.cap == StrokeCap::Butt));
    assert!(strokes
        .iter()
        .all(|s| s.color == Color::WHITE.with_alpha(200) && s.width == half * 0.25));
}

#[test]
fn test_custom_palette() {
    let atlas = two_row_atlas();
    let palette = BooleanPalette {
        true_color: Color::rgba(0, 0, 255, 255),
        false_color: Color::rgba(255, 0, 0, 255),
    };
    let r = TextRenderer::new(Classifier::default(), atlas).with_palette(palette);
    let mut host = Recorder::default();
    r.draw_boolean(&mut host, false, 10.0, 10.0, 8.0, None);
    assert_eq!(host.circles(), vec![&Call::Circle(10.0, 10.0, 8.0, palette.false_color)]);
}

/// Host with fractional advances and metrics, drawing nothing
struct FractionalHost;

impl Renderer for FractionalHost {
    fn font_metrics(&self, _paint: &Paint) -> FontMetrics {
        FontMetrics::new(-10.3, 4.1)
    }

    fn measure_text(&self, text: &[u16], _paint: &Paint) -> f32 {
        text.len() as f32 * 0.7
    }

    fn draw_text_run(&mut self, _: &[u16], _: f32, _: f32, _: &Paint) {}
    fn draw_image_region(&mut self, _: &FallbackImage, _: Rect, _: &Paint) {}
    fn draw_filled_circle(&mut self, _: f32, _: f32, _: f32, _: Color) {}
    fn draw_stroked_line(&mut self, _: f32, _: f32, _: f32, _: f32, _: &Stroke) {}
}

#[test]
fn test_advance_matches_measure_away_from_origin() {
    let text = utf16("abc\u{F889}defg\u{F888}hij");
    for policy in POLICIES {
        let r = renderer(policy);
        let mut host = FractionalHost;
        for x in [0.0, 1234.567, -98.76, 1.0e6] {
            for align in [
                HorizontalAlign::Left,
                HorizontalAlign::Center,
                HorizontalAlign::Right,
            ] {
                let mut paint = Paint {
                    text_align: align,
                    ..Paint::default()
                };
                let measured = r.measure_text(&host, &paint, &text, 0, text.len());
                let drawn = r
                    .draw_text(&mut host, &text, x, 37.25, &mut paint)
                    .unwrap();
                assert_eq!(measured, drawn, "x={} {:?} {:?}", x, align, policy);
            }
        }
    }
}
