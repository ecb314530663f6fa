use image::imageops::crop_imm;
use imageproc::rect::Rect;
use smallvec::SmallVec;

use super::*;

/// A rectangular region of the image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Cell {
    /// Creates a new `Cell` at `(x, y)` with the given size.
    ///
    /// # Example
    /// ```
    /// use gridcut::Cell;
    ///
    /// let cell = Cell::new(10, 20, 30, 40);
    /// assert_eq!(cell.right(), 40);
    /// assert_eq!(cell.bottom(), 60);
    /// ```
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last column covered by the cell, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row covered by the cell, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Whether the cell covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the cell lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x.checked_add(self.width).is_some_and(|right| right <= width)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= height)
    }
}

/// Converts a cell to an `imageproc` rectangle.
///
/// Origins beyond `i32::MAX` saturate. Panics on an empty cell, as `Rect::of_size` does;
/// check [`Cell::is_empty`] first.
impl From<&Cell> for Rect {
    fn from(cell: &Cell) -> Self {
        let x = i32::try_from(cell.x).unwrap_or(i32::MAX);
        let y = i32::try_from(cell.y).unwrap_or(i32::MAX);
        Rect::at(x, y).of_size(cell.width, cell.height)
    }
}

/// Rounded positions of the `parts + 1` division lines along an axis of length `extent`:
/// `round(i * extent / parts)`, so the first is 0 and the last is `extent`.
fn division_lines(extent: u32, parts: u32) -> SmallVec<[u32; MAX_GRID_DIM as usize + 1]> {
    (0..=parts)
        .map(|i| ((i as u64 * extent as u64) as f64 / parts as f64).round() as u32)
        .collect()
}

/// Fails with [`GridError::DegenerateGrid`] if the split would produce an empty cell.
fn check_not_degenerate(width: u32, height: u32, rows: u32, cols: u32) -> Result<(), GridError> {
    if rows == 0 || cols == 0 || rows > height || cols > width {
        error!(
            "Degenerate grid {}x{} for a {}x{} image",
            rows, cols, width, height
        );
        return Err(GridError::DegenerateGrid {
            rows,
            cols,
            width,
            height,
        });
    }
    Ok(())
}

/// Computes the cell rectangles of a `rows` x `cols` split, in row-major order.
///
/// # Errors
/// - [`GridError::InvalidInput`] if the image has a zero dimension.
/// - [`GridError::DegenerateGrid`] if `rows` or `cols` is zero or exceeds the image size.
///
/// # Example
/// ```
/// use gridcut::{compute_cells, Cell, TilingPolicy};
///
/// let cells = compute_cells(10, 4, 1, 4, TilingPolicy::Exact).unwrap();
/// let widths: Vec<u32> = cells.iter().map(|c| c.width).collect();
/// assert_eq!(widths, vec![3, 2, 3, 2]);
///
/// let cells = compute_cells(10, 4, 1, 4, TilingPolicy::Rounded).unwrap();
/// let widths: Vec<u32> = cells.iter().map(|c| c.width).collect();
/// assert_eq!(widths, vec![3, 3, 3, 2]);
/// ```
pub fn compute_cells(
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
    policy: TilingPolicy,
) -> Result<CellVec, GridError> {
    validate_dimensions(width, height)?;
    check_not_degenerate(width, height, rows, cols)?;
    trace!(
        "Computing {}x{} cells for {}x{} with {:?}",
        rows,
        cols,
        width,
        height,
        policy
    );

    let xs = division_lines(width, cols);
    let ys = division_lines(height, rows);
    let nominal_width = (width as f64 / cols as f64).round() as u32;
    let nominal_height = (height as f64 / rows as f64).round() as u32;

    let mut cells = CellVec::new();
    for row in 0..rows as usize {
        for col in 0..cols as usize {
            let (x, y) = (xs[col], ys[row]);
            let cell = match policy {
                TilingPolicy::Exact => Cell::new(x, y, xs[col + 1] - x, ys[row + 1] - y),
                TilingPolicy::Rounded => Cell::new(
                    x,
                    y,
                    nominal_width.min(width - x),
                    nominal_height.min(height - y),
                ),
            };
            cells.push(cell);
        }
    }
    Ok(cells)
}

/// Builds a grid from caller-supplied `rows` and `cols`, bypassing detection.
///
/// The caller is authoritative, so the confidence is always 1.
///
/// # Errors
/// - [`GridError::InvalidInput`] if the image has a zero dimension.
/// - [`GridError::UnsupportedGrid`] if `rows` or `cols` exceeds 6, or both are 1.
/// - [`GridError::DegenerateGrid`] if `rows` or `cols` is zero or exceeds the image size.
///
/// # Example
/// ```
/// use gridcut::{split_manual, TilingPolicy};
///
/// let grid = split_manual(900, 600, 3, 4, TilingPolicy::Exact).unwrap();
/// assert_eq!(grid.cells.len(), 12);
/// assert_eq!(grid.confidence, 1.0);
/// assert!(grid.cells.iter().all(|c| c.width == 225 && c.height == 200));
/// ```
pub fn split_manual(
    width: u32,
    height: u32,
    rows: u32,
    cols: u32,
    policy: TilingPolicy,
) -> Result<GridResult, GridError> {
    validate_dimensions(width, height)?;
    if rows > MAX_GRID_DIM || cols > MAX_GRID_DIM || (rows == 1 && cols == 1) {
        return Err(GridError::UnsupportedGrid { rows, cols });
    }
    debug!("Manual split {}x{} of {}x{}", rows, cols, width, height);
    let cells = compute_cells(width, height, rows, cols, policy)?;
    Ok(GridResult {
        rows,
        cols,
        cells,
        confidence: 1.0,
    })
}

/// Copies one cell of an image into a new buffer.
///
/// # Errors
/// Returns [`GridError::CellOutOfBounds`] if the cell does not fit the image.
pub fn crop_cell(image: &RgbaImage, cell: &Cell) -> Result<RgbaImage, GridError> {
    let (image_width, image_height) = image.dimensions();
    if !cell.fits_within(image_width, image_height) {
        return Err(GridError::CellOutOfBounds {
            x: cell.x,
            y: cell.y,
            width: cell.width,
            height: cell.height,
            image_width,
            image_height,
        });
    }
    Ok(crop_imm(image, cell.x, cell.y, cell.width, cell.height).to_image())
}

/// Crops every cell out of an image, keeping the order of `cells`.
///
/// Either every cell is cropped or none is: the first out-of-bounds cell fails the call.
pub fn slice_cells(image: &RgbaImage, cells: &[Cell]) -> Result<Vec<RgbaImage>, GridError> {
    debug!("Slicing {} cells", cells.len());
    cells.iter().map(|cell| crop_cell(image, cell)).collect()
}
