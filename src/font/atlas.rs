//! Fallback image atlas
//!
//! A single pre-built image laid out as a row-major grid of fixed-size
//! cells, one per codepoint of the fallback range.
//! The backing image is opened and decoded on first use, each cell is
//! cropped on first request and kept for the lifetime of the atlas.

use image::io::Reader as ImageReader;
use image::RgbaImage;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

use crate::constants::{
    FALLBACK_CELL_SIZE, FALLBACK_CHARS_PER_LINE, FALLBACK_RANGE_END, FALLBACK_RANGE_START,
};

/// Decoded RGBA image of one atlas cell
pub type FallbackImage = RgbaImage;

/// Fatal atlas initialization failure
///
/// Cloneable so that the memoized failure can be handed to every caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    #[error("cannot open fallback atlas: {0}")]
    Open(String),
    #[error("cannot decode fallback atlas: {0}")]
    Decode(String),
}

/// Supplier of the atlas asset bytes
pub trait ImageSource: Send + Sync {
    /// Open the encoded atlas image. Called at most once per atlas.
    fn open_fallback_atlas(&self) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Atlas asset read from a file
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ImageSource for FileImageSource {
    fn open_fallback_atlas(&self) -> std::io::Result<Box<dyn Read + Send>> {
        info!("FallbackAtlas: opening {:?}", self.path);
        Ok(Box::new(BufReader::new(File::open(&self.path)?)))
    }
}

/// Atlas asset held in memory (embedded with `include_bytes!` or generated)
#[derive(Debug, Clone)]
pub struct MemoryImageSource {
    bytes: Arc<[u8]>,
}

impl MemoryImageSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl ImageSource for MemoryImageSource {
    fn open_fallback_atlas(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.bytes))))
    }
}

/// Pixel rectangle of one cell, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Grid geometry of the atlas asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasLayout {
    /// First covered codepoint
    pub range_start: u32,
    /// One past the last covered codepoint
    pub range_end: u32,
    /// Cell edge length in pixels
    pub cell_size: u32,
    /// Cells per row
    pub chars_per_line: u32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            range_start: FALLBACK_RANGE_START,
            range_end: FALLBACK_RANGE_END,
            cell_size: FALLBACK_CELL_SIZE,
            chars_per_line: FALLBACK_CHARS_PER_LINE,
        }
    }
}

impl AtlasLayout {
    /// Number of cells addressable by codepoint
    pub fn len(&self) -> usize {
        self.range_end.saturating_sub(self.range_start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell index of `codepoint`, or `None` outside the range
    pub fn index(&self, codepoint: u32) -> Option<u32> {
        (self.range_start..self.range_end)
            .contains(&codepoint)
            .then(|| codepoint - self.range_start)
    }

    /// Pixel region of cell `index`, or `None` if it overflows `u32`
    pub fn cell_region(&self, index: u32) -> Option<CellRegion> {
        let per_line = self.chars_per_line.max(1);
        let left = (index % per_line).checked_mul(self.cell_size)?;
        let top = (index / per_line).checked_mul(self.cell_size)?;
        Some(CellRegion {
            left,
            top,
            right: left.checked_add(self.cell_size)?,
            bottom: top.checked_add(self.cell_size)?,
        })
    }

    /// Pixel size `(width, height)` of a grid holding every cell
    ///
    /// `None` if any cell coordinate would overflow `u32`.
    pub fn grid_size(&self) -> Option<(u32, u32)> {
        let per_line = self.chars_per_line.max(1);
        let width = per_line.checked_mul(self.cell_size)?;
        let last = u32::try_from(self.len().saturating_sub(1)).ok()?;
        let height = (last / per_line)
            .checked_mul(self.cell_size)?
            .checked_add(self.cell_size)?;
        Some((width, height))
    }
}

/// Lazily decoded, memoizing fallback atlas
///
/// Safe to share between threads: the backing image is decoded exactly
/// once, and each cell is cropped exactly once. Entries are never evicted.
///
/// The decoded image stays in memory as uncompressed RGBA for the life of
/// the atlas, on top of the cropped cells. At the default geometry
/// (18 x 171 cells of 64px) that is about 50 MB.
pub struct FallbackAtlas {
    layout: AtlasLayout,
    source: Box<dyn ImageSource>,
    /// Decoded backing image, or the fatal error from the first attempt
    decoder: OnceLock<Result<RgbaImage, AtlasError>>,
    /// Index -> cropped cell (`None` = cell missing from the asset)
    cells: Vec<OnceLock<Option<Arc<FallbackImage>>>>,
    opens: AtomicUsize,
    decodes: AtomicUsize,
}

impl std::fmt::Debug for FallbackAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackAtlas")
            .field("layout", &self.layout)
            .field("loaded", &self.is_loaded())
            .field("decodes", &self.decode_count())
            .finish()
    }
}

impl FallbackAtlas {
    pub fn new<S: ImageSource + 'static>(layout: AtlasLayout, source: S) -> Self {
        let cells = (0..layout.len()).map(|_| OnceLock::new()).collect();
        Self {
            layout,
            source: Box::new(source),
            decoder: OnceLock::new(),
            cells,
            opens: AtomicUsize::new(0),
            decodes: AtomicUsize::new(0),
        }
    }

    /// Atlas backed by an image file
    pub fn from_path<P: AsRef<Path>>(layout: AtlasLayout, path: P) -> Self {
        Self::new(layout, FileImageSource::new(path))
    }

    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    /// Image for `codepoint`
    ///
    /// `Ok(None)` for codepoints outside the range (the normal case for
    /// anything that is not a fallback glyph) and for cells the asset
    /// does not contain. `Err` only if the asset cannot be opened or
    /// decoded; that failure is permanent.
    pub fn image_for(&self, codepoint: u32) -> Result<Option<Arc<FallbackImage>>, AtlasError> {
        let Some(index) = self.layout.index(codepoint) else {
            return Ok(None);
        };
        let cell = &self.cells[index as usize];
        if let Some(image) = cell.get() {
            return Ok(image.clone());
        }

        let atlas = self.decoder()?;
        Ok(cell.get_or_init(|| self.crop_cell(atlas, index)).clone())
    }

    /// Whether the backing image has been opened (successfully or not)
    pub fn is_loaded(&self) -> bool {
        self.decoder.get().is_some()
    }

    /// Number of times the image source was opened
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }

    /// Number of cells cropped from the backing image
    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }

    fn decoder(&self) -> Result<&RgbaImage, AtlasError> {
        self.decoder
            .get_or_init(|| self.load())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn load(&self) -> Result<RgbaImage, AtlasError> {
        self.opens.fetch_add(1, Ordering::Relaxed);

        let mut stream = self
            .source
            .open_fallback_atlas()
            .map_err(|e| AtlasError::Open(e.to_string()))?;
        let mut data = Vec::new();
        stream
            .read_to_end(&mut data)
            .map_err(|e| AtlasError::Open(e.to_string()))?;
        info!("FallbackAtlas: {} bytes read", data.len());

        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| AtlasError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| AtlasError::Decode(e.to_string()))?
            .to_rgba8();

        info!(
            "FallbackAtlas: decoded {}x{} ({} cells of {}px per row)",
            image.width(),
            image.height(),
            self.layout.chars_per_line,
            self.layout.cell_size
        );
        Ok(image)
    }

    fn crop_cell(&self, atlas: &RgbaImage, index: u32) -> Option<Arc<FallbackImage>> {
        let Some(region) = self.layout.cell_region(index) else {
            warn!("FallbackAtlas: cell {} lies outside the addressable grid", index);
            return None;
        };
        if region.right > atlas.width() || region.bottom > atlas.height() {
            warn!(
                "FallbackAtlas: cell {} ({:?}) outside {}x{} asset",
                index,
                region,
                atlas.width(),
                atlas.height()
            );
            return None;
        }

        let cell = image::imageops::crop_imm(
            atlas,
            region.left,
            region.top,
            self.layout.cell_size,
            self.layout.cell_size,
        )
        .to_image();
        self.decodes.fetch_add(1, Ordering::Relaxed);
        debug!(
            "FallbackAtlas: decoded U+{:05X} at {:?}",
            self.layout.range_start + index,
            region
        );
        Some(Arc::new(cell))
    }
}
