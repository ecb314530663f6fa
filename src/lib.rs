//! This crate detects the row/column layout of "contact sheet" images (a uniform grid of
//! sub-images, as produced by batch image generation) and slices them into their cells.
//!
//! Detection combines two independent pieces of evidence:
//! - how plausible each `(rows, cols)` split is on geometry alone ([`candidates`]),
//! - how strongly the image's gradient profiles show seams where that split puts its
//!   division lines ([`profile`], [`selector`]).
//!
//! The core never touches files: it takes an RGBA buffer and returns a [`GridResult`]
//! and cropped cell buffers. Decoding and encoding are left to the caller.
//!
//! # Example
//! ```
//! use gridcut::{GridDetector, DetectionConfig};
//! use image::{Rgba, RgbaImage};
//!
//! // Two solid halves side by side.
//! let img = RgbaImage::from_fn(400, 200, |x, _y| {
//!     if x < 200 { Rgba([255, 0, 0, 255]) } else { Rgba([0, 0, 255, 255]) }
//! });
//! let detector = GridDetector::new(DetectionConfig::default());
//! let grid = detector.detect(&img).unwrap();
//! assert_eq!((grid.rows, grid.cols), (1, 2));
//!
//! let cells = grid.slice(&img).unwrap();
//! assert_eq!(cells.len(), 2);
//! ```

/// Geometric candidate generation and scoring.
///
/// Every `(rows, cols)` pair in `[1, 6]²` except `(1, 1)` is scored from the image
/// dimensions alone: how close the resulting cell shape is to a common photo/video
/// aspect ratio, how well the grid shape follows the image shape, and mild preferences
/// for finer and squarer grids.
pub mod candidates;
/// Configuration for detection and slicing.
pub mod config;
/// Debug helpers for writing an image with the detected grid drawn on it. Feature-gated
/// under `debug`.
///
/// # Example
/// ```no_run
/// use gridcut::{*, drawing::*};
///
/// let img = image::open("sheet.png").unwrap();
/// let grid = GridResult::try_from(&img).unwrap();
///
/// gridcut::debug::save_image_with_grid(&img, &grid, "output.png", &GridDrawingConfig::default())
///     .unwrap();
/// ```
#[cfg(feature = "debug")]
pub mod debug;
/// Drawing cell outlines and division lines on images, for visual inspection of a
/// detected grid. Feature-gated under `drawing`.
#[cfg(feature = "drawing")]
pub mod drawing;
/// The detection pipeline and its result type.
pub mod grid;
/// One-dimensional gradient profiles used as seam evidence.
pub mod profile;
/// Merging geometric scores with edge evidence and picking a grid.
pub mod selector;
/// Cell rectangles and cropping.
pub mod slicer;

use image::RgbaImage;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::*;

pub use candidates::{
    aspect_ratio_score, cell_count_score, generate_candidates, layout_score, symmetry_score,
    GridCandidate,
};
pub use config::{DetectionConfig, TilingPolicy};
pub use grid::{GridDetector, GridResult};
pub use profile::{compute_profiles, Axis, EdgeProfile};
pub use selector::{edge_score, rank_candidates, search_window, select, ScoredCandidate};
pub use slicer::{compute_cells, crop_cell, slice_cells, split_manual, Cell};

/// Largest number of rows or columns a grid can have.
pub const MAX_GRID_DIM: u32 = 6;

/// Number of `(rows, cols)` pairs enumerated per detection: `[1, 6]²` without `(1, 1)`.
pub const CANDIDATE_COUNT: usize = (MAX_GRID_DIM * MAX_GRID_DIM) as usize - 1;

/// Upper bound on cells in a grid.
const MAX_CELLS: usize = (MAX_GRID_DIM * MAX_GRID_DIM) as usize;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    #[error("Invalid image dimensions: width={width}, height={height}")]
    InvalidInput { width: u32, height: u32 },

    #[error("Pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("No grid candidate available for selection")]
    NoCandidateFound,

    #[error("Grid {rows}x{cols} would produce empty cells on a {width}x{height} image")]
    DegenerateGrid {
        rows: u32,
        cols: u32,
        width: u32,
        height: u32,
    },

    #[error("Unsupported grid {rows}x{cols}: rows and columns must be in 1..=6 and not both 1")]
    UnsupportedGrid { rows: u32, cols: u32 },

    #[error("Cell at ({x}, {y}) of size {width}x{height} lies outside the {image_width}x{image_height} image")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Invalid detection config: {0}")]
    InvalidConfig(String),
}

/// A SmallVec sized to hold every candidate of one detection call without spilling.
///
/// Inline capacity is `MAX_CELLS` rather than `CANDIDATE_COUNT`: smallvec only implements
/// its `Array` trait for a fixed set of lengths, and 35 is not one of them.
pub type CandidateVec<T> = SmallVec<[T; MAX_CELLS]>;

/// A SmallVec sized to hold the cells of the largest supported grid.
pub type CellVec = SmallVec<[Cell; MAX_CELLS]>;

/// Checks that an image has a non-zero area.
///
/// # Example
/// ```
/// use gridcut::{validate_dimensions, GridError};
///
/// assert!(validate_dimensions(10, 10).is_ok());
/// assert_eq!(
///     validate_dimensions(0, 10),
///     Err(GridError::InvalidInput { width: 0, height: 10 })
/// );
/// ```
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), GridError> {
    if width == 0 || height == 0 {
        error!(
            "Invalid image dimensions: width={}, height={}",
            width, height
        );
        return Err(GridError::InvalidInput { width, height });
    }
    Ok(())
}

/// Wraps a raw, row-major RGBA byte buffer handed over by an external decoder.
///
/// # Example
/// ```
/// use gridcut::rgba_from_raw;
///
/// let img = rgba_from_raw(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap();
/// assert_eq!(img.dimensions(), (2, 1));
/// assert!(rgba_from_raw(2, 2, vec![0; 4]).is_err());
/// ```
pub fn rgba_from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<RgbaImage, GridError> {
    validate_dimensions(width, height)?;
    let expected = width as usize * height as usize * 4;
    let actual = bytes.len();
    if actual != expected {
        return Err(GridError::BufferSizeMismatch {
            width,
            height,
            expected,
            actual,
        });
    }
    RgbaImage::from_raw(width, height, bytes).ok_or(GridError::BufferSizeMismatch {
        width,
        height,
        expected,
        actual,
    })
}
