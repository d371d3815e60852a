//! tilecat CLI - categorical map tile tools

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tilecat_colormap::{
    add_opaque_background, composite_to_rgba, drop_alpha, stack_bands, Color, ColorAssignment,
    CompositeOrder,
};
use tilecat_core::io::{read_png, write_png};
use tilecat_core::raster::RGBA_BANDS;
use tilecat_core::tile::{tile_index_range, ShiftVector, TileAddress};
use tilecat_parallel::{num_threads, run_batch, ProcessingMode};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "tilecat")]
#[command(author, version, about = "Categorical map tile tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for tile batches (1 = sequential, default = all cores)
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a tile image
    Info {
        /// Input image file
        input: PathBuf,
    },
    /// Merge per-category tiles into one categorical tile per name
    SplitCat {
        /// Directory holding one sub-directory per category
        #[arg(short, long)]
        input_directory: PathBuf,
        /// Output directory (created if missing)
        #[arg(short, long)]
        output_directory: PathBuf,
        /// Category sub-directories, in band order
        #[arg(short, long, num_args = 1.., required = true)]
        types: Vec<String>,
        /// Band to take from each category's image
        #[arg(short = 'x', long = "channels", num_args = 1.., required = true)]
        channels: Vec<usize>,
    },
    /// Render categorical tiles as viewable images
    CatRgb {
        /// Directory of categorical tiles
        #[arg(short, long)]
        input_directory: PathBuf,
        /// Output directory (created if missing)
        #[arg(short, long)]
        output_directory: PathBuf,
        /// One "r,g,b" color per category (components in 0..1)
        #[arg(short, long, num_args = 1..)]
        colors: Vec<String>,
        /// JSON palette file: an array of [r, g, b] triples. Overrides --colors
        #[arg(short, long)]
        palette: Option<PathBuf>,
        /// Composite category 0 last, so it is drawn on top
        #[arg(short, long)]
        reverse: bool,
        /// What to do with the composite's alpha band
        #[arg(long, value_enum, default_value_t = AlphaMode::Blend)]
        alpha: AlphaMode,
        /// Background color as "r,g,b"
        #[arg(short, long, default_value = "0,0,0")]
        background: String,
    },
    /// List the neighbor tiles needed to render a shifted tile
    ShiftIndices {
        /// Shift along columns, in tiles
        #[arg(long, allow_hyphen_values = true)]
        col: f64,
        /// Shift along rows, in tiles
        #[arg(long, allow_hyphen_values = true)]
        row: f64,
        /// Tile file name such as 15_15972_11340.png, to print neighbor names
        #[arg(long)]
        tile: Option<String>,
    },
}

/// Alpha handling for rendered tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlphaMode {
    /// Flatten onto the background color (RGB)
    Blend,
    /// Discard alpha and keep the straight colors (RGB)
    Drop,
    /// Write the composite as is (RGBA)
    Keep,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn progress(len: usize) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tiles ({percent}%)")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

/// File names of every regular file in `dir`, sorted
fn list_tiles(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Palette file, then explicit colors, then the standard four colors
fn resolve_colors(palette: Option<&Path>, colors: &[String]) -> Result<ColorAssignment> {
    if let Some(path) = palette {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read palette {}", path.display()))?;
        let colors: ColorAssignment = serde_json::from_str(&text)
            .with_context(|| format!("Invalid palette {}", path.display()))?;
        return Ok(colors);
    }
    if colors.is_empty() {
        return Ok(ColorAssignment::standard());
    }
    ColorAssignment::parse_list(colors).context("Invalid --colors")
}

/// One band to take from each category, and no more categories than an image holds
fn check_split_args(types: &[String], channels: &[usize]) -> Result<()> {
    if types.len() != channels.len() {
        anyhow::bail!(
            "Need the same number of channel definitions as types ({} types, {} channels)",
            types.len(),
            channels.len()
        );
    }
    if types.len() > RGBA_BANDS {
        anyhow::bail!(
            "At most {} categories fit in an image, got {}",
            RGBA_BANDS,
            types.len()
        );
    }
    Ok(())
}

/// Run `job` over every tile name with a progress bar, failing if any tile failed
fn run_tiles<F>(names: &[String], mode: ProcessingMode, what: &str, job: F) -> Result<()>
where
    F: Fn(&str) -> Result<()> + Sync + Send,
{
    let pb = progress(names.len())?;
    let start = Instant::now();

    let report = run_batch(names, mode, |name| {
        let result = job(name).with_context(|| format!("tile {name}"));
        pb.inc(1);
        result
    })?;
    pb.finish_and_clear();

    for (_, err) in &report.failed {
        warn!("{:#}", err);
    }
    info!(
        "{}: {} of {} tiles written in {:.2?} on {} thread(s)",
        what,
        report.succeeded.len(),
        report.total(),
        start.elapsed(),
        mode.worker_count()
    );

    if !report.is_success() {
        anyhow::bail!("{} of {} tiles failed", report.failed.len(), report.total());
    }
    Ok(())
}

fn split_cat_tile(
    name: &str,
    input_directory: &Path,
    output_directory: &Path,
    types: &[String],
    channels: &[usize],
) -> Result<()> {
    let sources = types
        .iter()
        .map(|t| {
            let path = input_directory.join(t).join(name);
            read_png(&path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let picks: Vec<_> = sources.iter().zip(channels.iter().copied()).collect();
    let stacked = stack_bands(&picks)?;

    let dest = output_directory.join(name);
    write_png(&stacked, &dest).with_context(|| format!("Failed to write {}", dest.display()))?;
    debug!("{} -> {}", name, dest.display());
    Ok(())
}

struct DisplayOptions {
    colors: ColorAssignment,
    order: CompositeOrder,
    background: Color,
    alpha: AlphaMode,
}

fn cat_rgb_tile(
    name: &str,
    input_directory: &Path,
    output_directory: &Path,
    options: &DisplayOptions,
) -> Result<()> {
    let path = input_directory.join(name);
    let categories = read_png(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?
        .to_unit();

    let rgba = composite_to_rgba(&categories, &options.colors, options.order)?;
    let rendered = match options.alpha {
        AlphaMode::Blend => add_opaque_background(&rgba, options.background)?,
        AlphaMode::Drop => drop_alpha(&rgba)?,
        AlphaMode::Keep => rgba,
    };

    let dest = output_directory.join(name);
    write_png(&rendered.to_u8(), &dest)
        .with_context(|| format!("Failed to write {}", dest.display()))?;
    debug!("{} -> {}", name, dest.display());
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let mode = ProcessingMode::from_threads(cli.threads);
    debug!("{:?} mode, {} thread(s) in the global pool", mode, num_threads());

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let raster = read_png(&input).context("Failed to read image")?;
            let (rows, cols, bands) = raster.shape();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} band(s))", cols, rows, bands);
            if let Some(name) = input.file_name().and_then(|n| n.to_str()) {
                if let Ok(address) = TileAddress::parse(name) {
                    println!("Tile: zoom {} x {} y {}", address.zoom, address.x, address.y);
                }
            }
            println!("\nBands:");
            for b in 0..bands {
                let band = raster.band(b)?;
                let min = band.iter().copied().min().unwrap_or(0);
                let max = band.iter().copied().max().unwrap_or(0);
                let mean = band.iter().map(|&v| v as f64).sum::<f64>() / band.len().max(1) as f64;
                println!("  {}: min {} max {} mean {:.2}", b, min, max, mean);
            }
        }

        // ── Split per-category tiles into categorical tiles ─────────
        Commands::SplitCat {
            input_directory,
            output_directory,
            types,
            channels,
        } => {
            check_split_args(&types, &channels)?;
            std::fs::create_dir_all(&output_directory).with_context(|| {
                format!("Failed to create {}", output_directory.display())
            })?;

            // All category directories are expected to hold the same file names
            let names = list_tiles(&input_directory.join(&types[0]))?;
            info!("Merging {} categories for {} tiles", types.len(), names.len());

            run_tiles(&names, mode, "split-cat", |name| {
                split_cat_tile(name, &input_directory, &output_directory, &types, &channels)
            })?;
        }

        // ── Render categorical tiles ────────────────────────────────
        Commands::CatRgb {
            input_directory,
            output_directory,
            colors,
            palette,
            reverse,
            alpha,
            background,
        } => {
            let options = DisplayOptions {
                colors: resolve_colors(palette.as_deref(), &colors)?,
                order: CompositeOrder::from_reverse(reverse),
                background: background.parse().context("Invalid --background")?,
                alpha,
            };
            std::fs::create_dir_all(&output_directory).with_context(|| {
                format!("Failed to create {}", output_directory.display())
            })?;

            let names = list_tiles(&input_directory)?;
            info!(
                "Rendering {} tiles with {} colors, {} order",
                names.len(),
                options.colors.len(),
                options.order
            );

            run_tiles(&names, mode, "cat-rgb", |name| {
                cat_rgb_tile(name, &input_directory, &output_directory, &options)
            })?;
        }

        // ── Tile geometry ───────────────────────────────────────────
        Commands::ShiftIndices { col, row, tile } => {
            let grid = tile_index_range(ShiftVector::new(col, row))
                .context("Invalid shift")?;
            let address = tile
                .as_deref()
                .map(TileAddress::parse)
                .transpose()
                .context("Invalid --tile")?;

            let (n_rows, n_cols) = grid.shape();
            println!("Shift ({}, {}) needs {} x {} tiles:", col, row, n_cols, n_rows);
            for grid_row in grid.rows() {
                let cells: Vec<String> = grid_row
                    .iter()
                    .map(|i| match &address {
                        Some(a) => a
                            .offset(*i)
                            .map(|n| n.file_name("png"))
                            .unwrap_or_else(|| "-".to_string()),
                        None => format!("({}, {})", i.col, i.row),
                    })
                    .collect();
                println!("  {}", cells.join("  "));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecat_core::Raster;

    #[test]
    fn colors_fall_back_to_standard() {
        assert_eq!(resolve_colors(None, &[]).unwrap(), ColorAssignment::standard());
        let explicit = resolve_colors(None, &["1,0,0".to_string()]).unwrap();
        assert_eq!(explicit.as_slice(), &[Color::RED]);
        assert!(resolve_colors(None, &["1,0".to_string()]).is_err());
    }

    #[test]
    fn palette_file_overrides_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palette.json");
        std::fs::write(&path, "[[0, 1, 0], [1, 1, 1]]").unwrap();

        let colors = resolve_colors(Some(path.as_path()), &["1,0,0".to_string()]).unwrap();
        assert_eq!(colors.as_slice(), &[Color::GREEN, Color::WHITE]);
    }

    #[test]
    fn split_then_render_tiles() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let merged = root.path().join("merged");
        let rendered = root.path().join("rendered");
        for dir in [&merged, &rendered] {
            std::fs::create_dir_all(dir).unwrap();
        }

        // Water in the blue band of its RGB tiles, roads in a grayscale tile
        let types = vec!["water".to_string(), "roads".to_string()];
        std::fs::create_dir_all(input.join("water")).unwrap();
        std::fs::create_dir_all(input.join("roads")).unwrap();
        let water = Raster::from_vec(vec![0u8, 0, 255, 0, 0, 0], 1, 2, 3).unwrap();
        let roads = Raster::from_vec(vec![0u8, 255], 1, 2, 1).unwrap();
        write_png(&water, input.join("water").join("3_1_1.png")).unwrap();
        write_png(&roads, input.join("roads").join("3_1_1.png")).unwrap();

        let names = list_tiles(&input.join("water")).unwrap();
        assert_eq!(names, vec!["3_1_1.png".to_string()]);

        split_cat_tile(&names[0], &input, &merged, &types, &[2, 0]).unwrap();
        let categorical = read_png(merged.join("3_1_1.png")).unwrap();
        assert_eq!(categorical.pixel(0, 0).unwrap().to_vec(), vec![255, 0]);
        assert_eq!(categorical.pixel(0, 1).unwrap().to_vec(), vec![0, 255]);

        let options = DisplayOptions {
            colors: ColorAssignment::new(vec![Color::BLUE, Color::WHITE]),
            order: CompositeOrder::Forward,
            background: Color::BLACK,
            alpha: AlphaMode::Blend,
        };
        cat_rgb_tile(&names[0], &merged, &rendered, &options).unwrap();
        let rgb = read_png(rendered.join("3_1_1.png")).unwrap();
        assert_eq!(rgb.pixel(0, 0).unwrap().to_vec(), vec![0, 0, 255]);
        assert_eq!(rgb.pixel(0, 1).unwrap().to_vec(), vec![255, 255, 255]);
    }

    #[test]
    fn render_reports_palette_mismatch() {
        let root = tempfile::tempdir().unwrap();
        let tile = Raster::from_vec(vec![10u8, 20, 30], 1, 1, 3).unwrap();
        write_png(&tile, root.path().join("t.png")).unwrap();

        let options = DisplayOptions {
            colors: ColorAssignment::standard(),
            order: CompositeOrder::Forward,
            background: Color::BLACK,
            alpha: AlphaMode::Keep,
        };
        let err = cat_rgb_tile("t.png", root.path(), root.path(), &options).unwrap_err();
        assert!(format!("{err:#}").contains("3 channel(s)"));
    }

    #[test]
    fn split_args_must_pair_up() {
        let types: Vec<String> = ["water", "roads"].iter().map(|t| t.to_string()).collect();
        assert!(check_split_args(&types, &[2, 0]).is_ok());

        let err = check_split_args(&types, &[2]).unwrap_err();
        assert!(err.to_string().contains("2 types, 1 channels"));

        let five: Vec<String> = (0..5).map(|i| format!("cat{i}")).collect();
        let err = check_split_args(&five, &[0; 5]).unwrap_err();
        assert!(err.to_string().contains("At most 4 categories"));
    }

    #[test]
    fn failing_tile_does_not_stop_the_batch() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        let output = root.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::create_dir_all(&output).unwrap();

        let tile = Raster::from_vec(vec![255u8], 1, 1, 1).unwrap();
        write_png(&tile, input.join("1_0_0.png")).unwrap();
        std::fs::write(input.join("1_0_1.png"), b"not a png").unwrap();

        let options = DisplayOptions {
            colors: ColorAssignment::new(vec![Color::RED]),
            order: CompositeOrder::Forward,
            background: Color::BLACK,
            alpha: AlphaMode::Blend,
        };
        let names = list_tiles(&input).unwrap();
        let result = run_tiles(&names, ProcessingMode::Sequential, "cat-rgb", |name| {
            cat_rgb_tile(name, &input, &output, &options)
        });

        let err = result.unwrap_err();
        assert!(err.to_string().contains("1 of 2 tiles failed"));
        let good = read_png(output.join("1_0_0.png")).unwrap();
        assert_eq!(good.pixel(0, 0).unwrap().to_vec(), vec![255, 0, 0]);
        assert!(!output.join("1_0_1.png").exists());
    }

    #[test]
    fn drop_alpha_keeps_straight_colors() {
        let root = tempfile::tempdir().unwrap();
        let blended = root.path().join("blend");
        let dropped = root.path().join("drop");
        let kept = root.path().join("keep");
        for dir in [&blended, &dropped, &kept] {
            std::fs::create_dir_all(dir).unwrap();
        }
        // Half-present category
        let tile = Raster::from_vec(vec![128u8], 1, 1, 1).unwrap();
        write_png(&tile, root.path().join("t.png")).unwrap();

        let render = |alpha, dest: &Path| {
            let options = DisplayOptions {
                colors: ColorAssignment::new(vec![Color::RED]),
                order: CompositeOrder::Forward,
                background: Color::BLACK,
                alpha,
            };
            cat_rgb_tile("t.png", root.path(), dest, &options).unwrap();
            read_png(dest.join("t.png")).unwrap()
        };

        let drop = render(AlphaMode::Drop, dropped.as_path());
        assert_eq!(drop.shape(), (1, 1, 3));
        assert_eq!(drop.pixel(0, 0).unwrap().to_vec(), vec![128, 0, 0]);

        let blend = render(AlphaMode::Blend, blended.as_path());
        assert_eq!(blend.pixel(0, 0).unwrap().to_vec(), vec![64, 0, 0]);

        let keep = render(AlphaMode::Keep, kept.as_path());
        assert_eq!(keep.pixel(0, 0).unwrap().to_vec(), vec![128, 0, 0, 128]);
    }

    #[test]
    fn alpha_flag_parses_modes() {
        let cli = Cli::try_parse_from([
            "tilecat", "cat-rgb", "-i", "in", "-o", "out", "--alpha", "drop",
        ])
        .unwrap();
        match cli.command {
            Commands::CatRgb { alpha, .. } => assert_eq!(alpha, AlphaMode::Drop),
            _ => panic!("expected cat-rgb"),
        }
        let bad = ["tilecat", "cat-rgb", "-i", "in", "-o", "out", "--alpha", "x"];
        assert!(Cli::try_parse_from(bad).is_err());
    }
}
