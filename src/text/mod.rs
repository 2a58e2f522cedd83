//! Text layout with emoji fallback
//!
//! Handles:
//! - Codepoint scanning and classification (scanner)
//! - Width measurement (measure)
//! - Alignment bounds (bounds)
//! - Draw call orchestration (draw)

pub mod bounds;
pub mod draw;
pub mod measure;
pub mod scanner;

pub use bounds::{FontMetrics, HorizontalAlign, LayoutRect, VerticalAlign};
pub use draw::TextRenderer;
pub use measure::measure_text;
pub use scanner::{Classifier, FallbackPolicy, RunScanner, Segment, SpecialKind};
