//! emotext - render a line of text to PNG
//!
//! Loads the config, applies command line overrides, sizes a canvas to the
//! text bounds and draws the run with fallback images and boolean icons.

use anyhow::{bail, Context, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use emotext::canvas::{Paint, RasterCanvas};
use emotext::config::{self, Config};
use emotext::font::atlas::FallbackAtlas;
use emotext::text::{FallbackPolicy, HorizontalAlign, TextRenderer, VerticalAlign};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    text: Option<String>,
    out: Option<PathBuf>,
    font: Option<String>,
    size: Option<f32>,
    align: Option<HorizontalAlign>,
    valign: Option<VerticalAlign>,
    policy: Option<FallbackPolicy>,
    atlas: Option<String>,
    bounds: bool,
}

/// Print help message
fn print_help() {
    println!(
        r#"emotext {} - render text with emoji fallback images and boolean icons

USAGE:
    emotext [OPTIONS] <TEXT>
    emotext [OPTIONS] -- <TEXT>     (TEXT may start with '-')

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information
    -o, --out <PATH>        Output PNG (default: emotext_<timestamp>.png)
    --font <PATH>           Font file (TTF/OTF)
    --size <PX>             Text size in pixels
    --align <ALIGN>         left | center | right
    --valign <ALIGN>        top | center | baseline | bottom
    --policy <POLICY>       none | icons_only | full_range
    --atlas <PATH>          Fallback atlas image
    --bounds                Print the text bounds instead of rendering
    --init-config           Generate config file
    -f, --force             Overwrite config file

RESERVED CODEPOINTS:
    U+F888  false icon (cross)
    U+F889  true icon (check)

EXAMPLES:
    emotext $'tests \uf889  lint \uf888'
    emotext --policy full_range --atlas emoji.png "hello 🌟"
    emotext --init-config

CONFIG FILE:
    ~/.config/emotext/config.toml (override with EMOTEXT_CONFIG)
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Value following `flag`, or an error if it is missing
fn take_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a String> {
    iter.next()
        .with_context(|| format!("{} requires a value", flag))
}

/// Value following `flag`, parsed
fn parse_value<'a, T>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = take_value(iter, flag)?;
    value
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", flag, e))
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter().skip(1);
    let mut options_done = false;
    while let Some(arg) = iter.next() {
        if options_done {
            set_text(&mut opts, arg)?;
            continue;
        }
        match arg.as_str() {
            "--" => options_done = true,
            "-o" | "--out" => opts.out = Some(PathBuf::from(take_value(&mut iter, arg)?)),
            "--font" => opts.font = Some(take_value(&mut iter, arg)?.clone()),
            "--size" => opts.size = Some(parse_value(&mut iter, arg)?),
            "--align" => opts.align = Some(parse_value(&mut iter, arg)?),
            "--valign" => opts.valign = Some(parse_value(&mut iter, arg)?),
            "--policy" => opts.policy = Some(parse_value(&mut iter, arg)?),
            "--atlas" => opts.atlas = Some(take_value(&mut iter, arg)?.clone()),
            "--bounds" => opts.bounds = true,
            "-f" | "--force" | "--init-config" => {}
            other if other.starts_with('-') && other.len() > 1 => {
                bail!("Unknown option: {} (see --help)", other)
            }
            _ => set_text(&mut opts, arg)?,
        }
    }
    Ok(opts)
}

fn set_text(opts: &mut Options, arg: &str) -> Result<()> {
    if opts.text.is_some() {
        bail!("Only one TEXT argument is accepted");
    }
    opts.text = Some(arg.to_string());
    Ok(())
}

fn default_output_path() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("emotext_{}.png", timestamp))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    // Flags are only looked for before "--"
    let flags = &args[..args.iter().position(|a| a == "--").unwrap_or(args.len())];

    // --help
    if flags.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // --version
    if flags.iter().any(|a| a == "--version" || a == "-V") {
        println!("emotext {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Config file generation mode
    if flags.iter().any(|a| a == "--init-config") {
        let force = flags.iter().any(|a| a == "--force" || a == "-f");
        return match Config::write_default_config(force) {
            Ok(path) => {
                println!("Config file generated: {}", path.display());
                Ok(())
            }
            Err(e) => {
                eprintln!("Failed to generate config: {:#}", e);
                if !force {
                    eprintln!("Use --force to overwrite.");
                }
                Err(e)
            }
        };
    }

    let opts = parse_args(&args)?;
    let Some(text) = opts.text.as_deref() else {
        print_help();
        bail!("Missing TEXT argument");
    };

    // Config file, then command line overrides
    let mut cfg = Config::load();
    if let Some(policy) = opts.policy {
        cfg.fallback.policy = policy;
    }
    if let Some(atlas) = opts.atlas {
        cfg.fallback.atlas = atlas;
    }
    if let Some(font) = opts.font {
        cfg.render.font = font;
    }
    if let Some(size) = opts.size {
        cfg.render.size = size;
    }
    if let Some(align) = opts.align {
        cfg.render.align = align;
    }
    if let Some(valign) = opts.valign {
        cfg.render.valign = valign;
    }
    cfg.validate().context("Invalid settings")?;

    if cfg.fallback.policy != FallbackPolicy::None && cfg.fallback.atlas.is_empty() {
        bail!(
            "Fallback policy {:?} needs an atlas image (--atlas or fallback.atlas in {})",
            cfg.fallback.policy,
            config::default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.toml".to_string())
        );
    }

    let atlas = Arc::new(FallbackAtlas::from_path(
        cfg.atlas_layout(),
        &cfg.fallback.atlas,
    ));
    let renderer = TextRenderer::new(cfg.classifier(), atlas).with_palette(cfg.palette());

    let font = match cfg.render.resolve_font() {
        Some(path) => Some(RasterCanvas::load_font(&path)?),
        None => {
            warn!("No font found; plain text will not be drawn (use --font)");
            None
        }
    };

    let mut paint = Paint::new(cfg.render.foreground_color(), cfg.render.size);
    paint.text_align = cfg.render.align;
    let units: Vec<u16> = text.encode_utf16().collect();

    // Measure on a scratch canvas sharing the font
    let mut scratch = RasterCanvas::new(1, 1, cfg.render.background_color());
    if let Some(ref font) = font {
        scratch = scratch.with_font(font.clone());
    }
    let bounds = renderer.get_text_bounds(
        &scratch,
        &paint,
        &units,
        0,
        units.len(),
        cfg.render.align,
        cfg.render.valign,
    );

    if opts.bounds {
        println!(
            "left={:.2} top={:.2} right={:.2} bottom={:.2} width={:.2} height={:.2}",
            bounds.left,
            bounds.top,
            bounds.right,
            bounds.bottom,
            bounds.width(),
            bounds.height()
        );
        return Ok(());
    }

    let pad = cfg.render.padding as f32;
    let width = (bounds.width() + 2.0 * pad).ceil().max(1.0) as u32;
    let height = (bounds.height() + 2.0 * pad).ceil().max(1.0) as u32;
    let mut canvas = RasterCanvas::new(width, height, cfg.render.background_color());
    if let Some(font) = font {
        canvas = canvas.with_font(font);
    }

    let advance = renderer
        .draw_text_aligned(
            &mut canvas,
            &units,
            pad - bounds.left,
            pad - bounds.top,
            &mut paint,
            cfg.render.valign,
        )
        .context("Failed to draw text")?;
    info!("Drew {} code units, advance {:.1}px", units.len(), advance);

    let out = opts.out.unwrap_or_else(default_output_path);
    canvas.save_png(&out)?;
    println!("{}", out.display());
    Ok(())
}
