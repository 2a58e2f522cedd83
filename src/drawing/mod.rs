//! Procedural drawing for substituted codepoints
//!
//! This module provides:
//! - Boolean icons (check / cross discs) for the reserved sentinels
//! - Anti-aliasing geometry used by the software canvas

pub mod boolean_icon;
pub mod geometry;

pub use boolean_icon::{draw_boolean, BooleanPalette};
pub use geometry::{aa_alpha_from_distance, disc_distance, distance_to_segment, segment_param};
