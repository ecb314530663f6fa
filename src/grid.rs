use image::DynamicImage;

use super::*;

/// A grid partition of an image.
///
/// # Example
/// ```
/// use gridcut::{GridResult, TilingPolicy};
///
/// let grid = GridResult::manual(300, 200, 2, 3, TilingPolicy::Exact).unwrap();
/// assert_eq!(grid.cells.len(), 6);
/// assert_eq!(grid.cell(1, 2).unwrap().x, 200);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridResult {
    pub rows: u32,
    pub cols: u32,
    /// Cells in row-major order.
    pub cells: CellVec,
    /// Plausibility of the partition in `[0, 1]`; 1 for manually specified grids.
    pub confidence: f64,
}

impl GridResult {
    /// Builds a grid from caller-supplied `rows` and `cols`. See [`split_manual`].
    pub fn manual(
        width: u32,
        height: u32,
        rows: u32,
        cols: u32,
        policy: TilingPolicy,
    ) -> Result<Self, GridError> {
        split_manual(width, height, rows, cols, policy)
    }

    /// Returns the cell at `(row, col)`, if it exists.
    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get((row * self.cols + col) as usize)
    }

    /// Returns an iterator over the cells of one row, left to right.
    pub fn row_cells(&self, row: u32) -> impl Iterator<Item = &Cell> {
        let cols = self.cols as usize;
        let start = (row as usize * cols).min(self.cells.len());
        let end = (start + cols).min(self.cells.len());
        self.cells[start..end].iter()
    }

    /// Returns an iterator over the cells of one column, top to bottom.
    pub fn column_cells(&self, col: u32) -> impl Iterator<Item = &Cell> {
        let skip = if col < self.cols {
            col as usize
        } else {
            self.cells.len()
        };
        self.cells
            .iter()
            .skip(skip)
            .step_by(self.cols.max(1) as usize)
    }

    /// Crops every cell out of `image`, in row-major order.
    ///
    /// # Errors
    /// Returns [`GridError::CellOutOfBounds`] if `image` is smaller than the image the
    /// grid was computed for.
    pub fn slice(&self, image: &RgbaImage) -> Result<Vec<RgbaImage>, GridError> {
        slice_cells(image, &self.cells)
    }
}

/// Detects grids with a fixed configuration.
///
/// Holds no state between calls, so one detector can be shared across threads.
///
/// # Example
/// ```
/// use gridcut::{GridDetector, DetectionConfig};
/// use image::{Rgba, RgbaImage};
///
/// let img = RgbaImage::from_fn(300, 300, |x, y| {
///     let k = y / 100 * 3 + x / 100;
///     Rgba([(k * 53 % 256) as u8, ((k * 97 + 40) % 256) as u8, ((k * 151 + 80) % 256) as u8, 255])
/// });
/// let grid = GridDetector::default().detect(&img).unwrap();
/// assert_eq!((grid.rows, grid.cols), (3, 3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridDetector {
    config: DetectionConfig,
}

impl GridDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Scores the shortlist of candidates for `image`, best first.
    ///
    /// Useful for offering alternatives to the detected grid.
    ///
    /// # Errors
    /// - [`GridError::InvalidConfig`] if the configuration does not validate.
    /// - [`GridError::InvalidInput`] if the image has a zero dimension.
    pub fn rank(&self, image: &RgbaImage) -> Result<CandidateVec<ScoredCandidate>, GridError> {
        trace!("Ranking candidates with config: {:?}", self.config);
        self.config.validate()?;
        let (width, height) = image.dimensions();
        let candidates = generate_candidates(width, height, &self.config)?;
        let (vertical, horizontal) = compute_profiles(image, self.config.enable_parallel)?;
        rank_candidates(&candidates, &vertical, &horizontal, &self.config)
    }

    /// Detects the most plausible grid of `image`.
    ///
    /// # Errors
    /// - [`GridError::InvalidConfig`] if the configuration does not validate.
    /// - [`GridError::InvalidInput`] if the image has a zero dimension.
    /// - [`GridError::DegenerateGrid`] if the selected grid has more rows or columns than
    ///   the image has pixels.
    pub fn detect(&self, image: &RgbaImage) -> Result<GridResult, GridError> {
        trace!("Detecting grid with config: {:?}", self.config);
        self.config.validate()?;
        let (width, height) = image.dimensions();
        let candidates = generate_candidates(width, height, &self.config)?;
        let (vertical, horizontal) = compute_profiles(image, self.config.enable_parallel)?;
        let best = select(&candidates, &vertical, &horizontal, &self.config)?;

        let GridCandidate { rows, cols, .. } = best.candidate;
        let cells = compute_cells(width, height, rows, cols, self.config.tiling)?;
        Ok(GridResult {
            rows,
            cols,
            cells,
            confidence: best.combined_score,
        })
    }

    /// Detects the grid of `image` and returns it together with the ranked shortlist it
    /// was picked from. Profiles and candidates are computed once for both.
    ///
    /// # Errors
    /// Same as [`GridDetector::detect`].
    pub fn detect_ranked(
        &self,
        image: &RgbaImage,
    ) -> Result<(GridResult, CandidateVec<ScoredCandidate>), GridError> {
        let ranked = self.rank(image)?;
        let best = ranked.first().ok_or(GridError::NoCandidateFound)?;
        let GridCandidate { rows, cols, .. } = best.candidate;
        let (width, height) = image.dimensions();
        let cells = compute_cells(width, height, rows, cols, self.config.tiling)?;
        let grid = GridResult {
            rows,
            cols,
            cells,
            confidence: best.combined_score,
        };
        Ok((grid, ranked))
    }

    /// Builds a grid for `image` from caller-supplied `rows` and `cols`, skipping detection.
    pub fn split_manual(
        &self,
        image: &RgbaImage,
        rows: u32,
        cols: u32,
    ) -> Result<GridResult, GridError> {
        let (width, height) = image.dimensions();
        split_manual(width, height, rows, cols, self.config.tiling)
    }

    /// Detects the grid of `image` and crops its cells.
    pub fn detect_and_slice(
        &self,
        image: &RgbaImage,
    ) -> Result<(GridResult, Vec<RgbaImage>), GridError> {
        let grid = self.detect(image)?;
        let cells = grid.slice(image)?;
        Ok((grid, cells))
    }
}

impl TryFrom<&RgbaImage> for GridResult {
    type Error = GridError;

    fn try_from(image: &RgbaImage) -> Result<Self, Self::Error> {
        GridDetector::default().detect(image)
    }
}

impl TryFrom<DynamicImage> for GridResult {
    type Error = GridError;

    fn try_from(image: DynamicImage) -> Result<Self, Self::Error> {
        // Delegate to the &DynamicImage implementation
        TryFrom::try_from(&image)
    }
}

impl TryFrom<&DynamicImage> for GridResult {
    type Error = GridError;

    fn try_from(image: &DynamicImage) -> Result<Self, Self::Error> {
        GridDetector::default().detect(&image.to_rgba8())
    }
}
