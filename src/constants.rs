//! Global constants for emotext
//!
//! Consolidates the fallback range, atlas geometry and reserved codepoints
//! so that config defaults and tests agree on the same values.

// ============================================================================
// Fallback Atlas Geometry
// ============================================================================

/// First codepoint covered by the fallback atlas (Misc Symbols and Pictographs)
pub const FALLBACK_RANGE_START: u32 = 0x1F300;

/// One past the last codepoint covered by the fallback atlas
pub const FALLBACK_RANGE_END: u32 = 0x1FF00;

/// Edge length of one atlas cell in pixels
pub const FALLBACK_CELL_SIZE: u32 = 64;

/// Number of cells per atlas row
pub const FALLBACK_CHARS_PER_LINE: u32 = 18;

// ============================================================================
// Reserved Codepoints
// ============================================================================

/// Private-use sentinel drawn as a red "false" disc with a cross
pub const BOOLEAN_FALSE_SENTINEL: u32 = 0xF888;

/// Private-use sentinel drawn as a green "true" disc with a check mark
pub const BOOLEAN_TRUE_SENTINEL: u32 = 0xF889;

/// Colored heart variants (U+1F499 - U+1F49C, inclusive)
/// Substituted under the icons-only policy
pub const HEART_RANGE_START: u32 = 0x1F499;
pub const HEART_RANGE_END: u32 = 0x1F49C;

// ============================================================================
// Boolean Icon Colors (ARGB)
// ============================================================================

/// Disc color for `true`
pub const BOOLEAN_TRUE_COLOR: u32 = 0xFFBD_CF46;

/// Disc color for `false`
pub const BOOLEAN_FALSE_COLOR: u32 = 0xFFED_6C30;

/// Stroke width relative to the disc radius
pub const BOOLEAN_STROKE_SCALE: f32 = 0.25;

// ============================================================================
// Rendering Constants
// ============================================================================

/// Anti-aliasing width for filled shapes
pub const AA_WIDTH_SOLID: f32 = 1.0;

/// Alpha threshold for rendering pixels (below this = skip)
pub const ALPHA_THRESHOLD: f32 = 0.01;
