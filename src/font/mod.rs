//! Fallback image management
//!
//! Handles:
//! - Opening the fallback atlas asset (file or memory)
//! - Decoding it once with `image`
//! - Cropping and memoizing per-codepoint cells

pub mod atlas;

pub use atlas::{
    AtlasError, AtlasLayout, CellRegion, FallbackAtlas, FallbackImage, FileImageSource,
    ImageSource, MemoryImageSource,
};
