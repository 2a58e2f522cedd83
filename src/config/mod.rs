//! Configuration file management
//!
//! Loads TOML configuration files and turns them into the values the
//! text core consumes (classifier, atlas layout, icon palette).
//! Default config path: ~/.config/emotext/config.toml

use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::canvas::Color;
use crate::constants::{
    BOOLEAN_FALSE_SENTINEL, BOOLEAN_TRUE_SENTINEL, FALLBACK_CELL_SIZE, FALLBACK_CHARS_PER_LINE,
    FALLBACK_RANGE_END, FALLBACK_RANGE_START, HEART_RANGE_END, HEART_RANGE_START,
};
use crate::drawing::boolean_icon::BooleanPalette;
use crate::font::atlas::AtlasLayout;
use crate::text::bounds::{HorizontalAlign, VerticalAlign};
use crate::text::scanner::{Classifier, FallbackPolicy};
use crate::utils::color::parse_hex_color_or;

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "EMOTEXT_CONFIG";

/// One past the last Unicode scalar value
const MAX_CODEPOINT_END: u32 = 0x11_0000;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fallback policy, ranges and atlas asset
    pub fallback: FallbackConfig,
    /// Boolean icon colors
    pub icons: IconConfig,
    /// CLI rendering defaults
    pub render: RenderConfig,
}

/// Fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// "none" | "icons_only" | "full_range"
    pub policy: FallbackPolicy,
    /// First codepoint covered by the atlas
    pub range_start: u32,
    /// One past the last codepoint covered by the atlas
    pub range_end: u32,
    /// First heart variant (icons_only policy)
    pub heart_start: u32,
    /// Last heart variant, inclusive
    pub heart_end: u32,
    /// Codepoint drawn as the "false" icon
    pub false_sentinel: u32,
    /// Codepoint drawn as the "true" icon
    pub true_sentinel: u32,
    /// Atlas image path (required unless policy is "none")
    pub atlas: String,
    /// Atlas cell size in pixels
    pub cell_size: u32,
    /// Atlas cells per row
    pub chars_per_line: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            policy: FallbackPolicy::None,
            range_start: FALLBACK_RANGE_START,
            range_end: FALLBACK_RANGE_END,
            heart_start: HEART_RANGE_START,
            heart_end: HEART_RANGE_END,
            false_sentinel: BOOLEAN_FALSE_SENTINEL,
            true_sentinel: BOOLEAN_TRUE_SENTINEL,
            atlas: String::new(),
            cell_size: FALLBACK_CELL_SIZE,
            chars_per_line: FALLBACK_CHARS_PER_LINE,
        }
    }
}

/// Boolean icon colors (RRGGBB)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub true_color: String,
    pub false_color: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            true_color: "bdcf46".to_string(),
            false_color: "ed6c30".to_string(),
        }
    }
}

/// CLI rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Font file path (searches common system paths if empty)
    pub font: String,
    /// Text size in pixels
    pub size: f32,
    /// Text color (RRGGBB)
    pub foreground: String,
    /// Background color (RRGGBB)
    pub background: String,
    /// Margin around the text in pixels
    pub padding: u32,
    /// "left" | "center" | "right"
    pub align: HorizontalAlign,
    /// "top" | "center" | "baseline" | "bottom"
    pub valign: VerticalAlign,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font: String::new(),
            size: 32.0,
            foreground: "000000".to_string(),
            background: "ffffff".to_string(),
            padding: 8,
            align: HorizontalAlign::Left,
            valign: VerticalAlign::Baseline,
        }
    }
}

impl RenderConfig {
    pub fn foreground_color(&self) -> Color {
        parse_hex_color_or(&self.foreground, Color::BLACK)
    }

    pub fn background_color(&self) -> Color {
        parse_hex_color_or(&self.background, Color::WHITE)
    }

    /// Configured font, or the first common system font that exists
    pub fn resolve_font(&self) -> Option<PathBuf> {
        if !self.font.is_empty() {
            return Some(PathBuf::from(&self.font));
        }
        let found = FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .map(Path::to_path_buf);
        if let Some(ref path) = found {
            info!("Detected font: {}", path.display());
        }
        found
    }
}

/// Common font locations on Linux and macOS
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// Commented template written by `--init-config`
const CONFIG_TEMPLATE: &str = r#"# emotext configuration
# Location: ~/.config/emotext/config.toml (or $EMOTEXT_CONFIG)

[fallback]
# Which codepoints are replaced by atlas images:
#   "none"       - only the boolean sentinels (U+F888 / U+F889)
#   "icons_only" - sentinels plus the colored hearts (U+1F499 - U+1F49C)
#   "full_range" - sentinels plus every codepoint in [range_start, range_end)
policy = "none"
range_start = 0x1F300
range_end = 0x1FF00
heart_start = 0x1F499
heart_end = 0x1F49C
false_sentinel = 0xF888
true_sentinel = 0xF889
# Atlas image: a grid of cell_size x cell_size images, chars_per_line per row
# (required unless policy is "none")
atlas = ""
cell_size = 64
chars_per_line = 18

[icons]
true_color = "bdcf46"
false_color = "ed6c30"

[render]
# Font file (empty = search common system locations)
font = ""
size = 32.0
foreground = "000000"
background = "ffffff"
padding = 8
align = "left"
valign = "baseline"
"#;

impl Config {
    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. EMOTEXT_CONFIG environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("{} points to missing file: {}", CONFIG_ENV_VAR, path);
        }

        // 2. User config: ~/.config/emotext/config.toml
        default_config_path().filter(|p| p.exists())
    }

    /// Load configuration with priority:
    /// 1. EMOTEXT_CONFIG environment variable
    /// 2. ~/.config/emotext/config.toml (user config)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load and validate settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the atlas and classifier cannot work with
    pub fn validate(&self) -> Result<()> {
        let f = &self.fallback;
        if f.range_end <= f.range_start {
            bail!(
                "fallback.range_end (0x{:X}) must be greater than range_start (0x{:X})",
                f.range_end,
                f.range_start
            );
        }
        if f.range_end > MAX_CODEPOINT_END {
            bail!(
                "fallback.range_end (0x{:X}) must not exceed 0x{:X}",
                f.range_end,
                MAX_CODEPOINT_END
            );
        }
        if f.heart_end < f.heart_start {
            bail!("fallback.heart_end must not be below heart_start");
        }
        if f.cell_size == 0 || f.chars_per_line == 0 {
            bail!("fallback.cell_size and fallback.chars_per_line must be non-zero");
        }
        if self.atlas_layout().grid_size().is_none() {
            bail!(
                "fallback atlas grid ({} cells of {}px, {} per row) exceeds u32 pixel coordinates",
                f.range_end - f.range_start,
                f.cell_size,
                f.chars_per_line
            );
        }
        if f.false_sentinel == f.true_sentinel {
            bail!("fallback.false_sentinel and true_sentinel must differ");
        }
        if self.render.size <= 0.0 {
            bail!("render.size must be positive");
        }
        Ok(())
    }

    /// Classification rule for the configured policy and ranges
    pub fn classifier(&self) -> Classifier {
        let f = &self.fallback;
        Classifier {
            policy: f.policy,
            fallback_range: f.range_start..f.range_end,
            heart_range: f.heart_start..=f.heart_end,
            false_sentinel: f.false_sentinel,
            true_sentinel: f.true_sentinel,
        }
    }

    /// Atlas grid geometry
    pub fn atlas_layout(&self) -> AtlasLayout {
        let f = &self.fallback;
        AtlasLayout {
            range_start: f.range_start,
            range_end: f.range_end,
            cell_size: f.cell_size,
            chars_per_line: f.chars_per_line,
        }
    }

    /// Boolean icon colors, falling back to the built-in ones
    pub fn palette(&self) -> BooleanPalette {
        let defaults = BooleanPalette::default();
        BooleanPalette {
            true_color: parse_hex_color_or(&self.icons.true_color, defaults.true_color),
            false_color: parse_hex_color_or(&self.icons.false_color, defaults.false_color),
        }
    }

    /// Write the commented template to the default location
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn write_default_config(force: bool) -> Result<PathBuf> {
        let path =
            default_config_path().ok_or_else(|| anyhow::anyhow!("Config directory not found"))?;
        Self::write_template(&path, force)?;
        Ok(path)
    }

    /// Write the commented template to `path`
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!("Config file already exists: {}", path.display());
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(path, CONFIG_TEMPLATE)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Config written: {}", path.display());
        Ok(())
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("emotext").join("config.toml"))
}
