use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gridcut::config::DEFAULT_SHORTLIST_LEN;
use gridcut::{DetectionConfig, GridDetector, GridResult, TilingPolicy};
use image::RgbaImage;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Detect the grid layout of contact-sheet images and split them into cells.
#[derive(Parser, Debug)]
#[command(name = "gridcut", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of top geometric candidates that get edge evaluation
    #[arg(long, global = true, default_value_t = DEFAULT_SHORTLIST_LEN)]
    shortlist: usize,

    /// Compute edge profiles on a single thread
    #[arg(long, global = true)]
    sequential: bool,

    /// How cell rectangles are rounded to pixels
    #[arg(long, global = true, value_enum, default_value_t = Tiling::Exact)]
    tiling: Tiling,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected grid and the ranked alternatives
    Detect {
        image: PathBuf,

        /// Write a copy of the image with the grid drawn on it
        #[cfg(feature = "debug")]
        #[arg(long)]
        overlay: Option<PathBuf>,
    },
    /// Write every cell of the image as a PNG file
    Split {
        image: PathBuf,

        /// Output directory
        #[arg(long, short)]
        out: PathBuf,

        /// Number of rows; skips detection when given with --cols
        #[arg(long, requires = "cols")]
        rows: Option<u32>,

        /// Number of columns; skips detection when given with --rows
        #[arg(long, requires = "rows")]
        cols: Option<u32>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Tiling {
    Exact,
    Rounded,
}

impl From<Tiling> for TilingPolicy {
    fn from(tiling: Tiling) -> Self {
        match tiling {
            Tiling::Exact => TilingPolicy::Exact,
            Tiling::Rounded => TilingPolicy::Rounded,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DetectionConfig::new(cli.shortlist, cli.tiling.into(), !cli.sequential);
    let detector = GridDetector::new(config);

    match cli.command {
        #[cfg(feature = "debug")]
        Command::Detect { image, overlay } => {
            let rgba = load_rgba(&image)?;
            let grid = detect_and_report(&detector, &rgba)?;
            if let Some(path) = overlay {
                let dynamic = image::DynamicImage::ImageRgba8(rgba);
                gridcut::debug::save_image_with_grid(
                    &dynamic,
                    &grid,
                    &path,
                    &gridcut::drawing::GridDrawingConfig::default(),
                )
                .with_context(|| format!("Failed to write overlay {}", path.display()))?;
            }
        }
        #[cfg(not(feature = "debug"))]
        Command::Detect { image } => {
            let rgba = load_rgba(&image)?;
            detect_and_report(&detector, &rgba)?;
        }
        Command::Split {
            image,
            out,
            rows,
            cols,
        } => {
            let rgba = load_rgba(&image)?;
            let grid = match (rows, cols) {
                (Some(rows), Some(cols)) => detector.split_manual(&rgba, rows, cols)?,
                _ => detector.detect(&rgba)?,
            };
            let written = write_cells(&out, &grid, &rgba)?;
            println!(
                "{}x{} grid (confidence {:.3}): wrote {} cells to {}",
                grid.rows,
                grid.cols,
                grid.confidence,
                written.len(),
                out.display()
            );
        }
    }

    Ok(())
}

/// Decodes an image file into an RGBA buffer.
fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    let rgba = img.to_rgba8();
    info!("Loaded {} ({}x{})", path.display(), rgba.width(), rgba.height());
    Ok(rgba)
}

/// Detects the grid of `rgba` and prints it with the ranked shortlist.
fn detect_and_report(detector: &GridDetector, rgba: &RgbaImage) -> Result<GridResult> {
    let (grid, ranked) = detector.detect_ranked(rgba)?;
    println!(
        "{}x{} grid, confidence {:.3}",
        grid.rows, grid.cols, grid.confidence
    );
    for (rank, scored) in ranked.iter().enumerate() {
        println!(
            "{:>2}. {}x{}  combined {:.3}  geometric {:.3}  edge {:.3}",
            rank + 1,
            scored.candidate.rows,
            scored.candidate.cols,
            scored.combined_score,
            scored.candidate.geometric_score,
            scored.edge_score
        );
    }
    Ok(grid)
}

/// Crops every cell of `grid` out of `rgba` and saves them as `cell_<row>_<col>.png`.
fn write_cells(dir: &Path, grid: &GridResult, rgba: &RgbaImage) -> Result<Vec<PathBuf>> {
    let cells = grid.slice(rgba)?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(cells.len());
    for (index, cell) in cells.iter().enumerate() {
        let row = index as u32 / grid.cols;
        let col = index as u32 % grid.cols;
        let path = dir.join(format!("cell_{row}_{col}.png"));
        cell.save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
