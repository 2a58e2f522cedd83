//! Utility functions shared across emotext
//!
//! Common helpers that don't fit in specialized modules.

pub mod color;

pub use color::{parse_hex_color, parse_hex_color_or};
