//! Color parsing utilities
//!
//! Turns the hex strings used in config files into canvas colors.

use crate::canvas::Color;

/// Parse 6-digit hex color (e.g., "ff0000" -> (255, 0, 0))
/// Also supports 3-digit short format (e.g., "f00" -> (255, 0, 0))
/// Returns None on invalid input.
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            // Short format: expand F -> FF
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some((r, g, b))
        }
        _ => None,
    }
}

/// Parse hex color to an opaque [`Color`], or `fallback` on invalid input.
pub fn parse_hex_color_or(hex: &str, fallback: Color) -> Color {
    match parse_hex_color(hex) {
        Some((r, g, b)) => Color::rgba(r, g, b, 255),
        None => fallback,
    }
}
