//! Drawing detected grids on images, for checking a detection by eye.
//! Feature-gated under `drawing`.
//!
//! # Examples
//!
//! ```rust
//! use gridcut::{drawing::*, GridResult, TilingPolicy};
//! use image::{Rgba, RgbaImage};
//!
//! let mut img = RgbaImage::from_pixel(60, 40, Rgba([255, 255, 255, 255]));
//! let grid = GridResult::manual(60, 40, 2, 3, TilingPolicy::Exact).unwrap();
//!
//! let drawing_config = GridDrawingConfig {
//!     padding: 1,
//!     line_color: Rgba([255, 0, 0, 255]), // Red division lines
//!     cell_outline_color: Rgba([0, 0, 255, 255]), // Blue cell outlines
//!     cell_color_provider: None, // Use uniform outline color
//!     line_thickness: 2,
//! };
//! grid.draw(&mut img, &drawing_config).unwrap();
//! assert_eq!(img.get_pixel(20, 10), &Rgba([255, 0, 0, 255]));
//! ```

use std::fmt;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::{Cell, GridError, GridResult};

/// Configuration for drawing cells and division lines.
///
/// # Examples
///
/// ```
/// use gridcut::drawing::GridDrawingConfig;
/// use image::Rgba;
///
/// let config = GridDrawingConfig {
///     cell_color_provider: Some(Box::new(|i| Rgba([0, (i * 40) as u8, 0, 255]))),
///     ..GridDrawingConfig::default()
/// };
/// assert_eq!(config.line_thickness, 2);
/// ```
pub struct GridDrawingConfig {
    /// Inset of each cell outline from the cell edge.
    pub padding: u32,
    /// Color of the division lines between cells.
    pub line_color: Rgba<u8>,
    /// Default color of cell outlines.
    pub cell_outline_color: Rgba<u8>,
    /// Optional function giving each cell (by row-major index) its own outline color.
    pub cell_color_provider: Option<Box<dyn Fn(usize) -> Rgba<u8>>>,
    /// Thickness of division lines.
    pub line_thickness: u32,
}

impl fmt::Debug for GridDrawingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridDrawingConfig")
            .field("padding", &self.padding)
            .field("line_color", &self.line_color)
            .field("cell_outline_color", &self.cell_outline_color)
            .field("cell_color_provider", &"<function>")
            .field("line_thickness", &self.line_thickness)
            .finish()
    }
}

impl Default for GridDrawingConfig {
    fn default() -> Self {
        GridDrawingConfig {
            padding: 2,
            line_color: Rgba([255, 0, 0, 255]),         // Red
            cell_outline_color: Rgba([0, 0, 255, 255]), // Blue
            cell_color_provider: None,
            line_thickness: 2,
        }
    }
}

/// Types that can be drawn on an image.
pub trait Drawable {
    /// Draws the object on `image`.
    ///
    /// # Errors
    /// Returns [`GridError::CellOutOfBounds`] if the object does not fit the image.
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError>;
}

fn ensure_fits(cell: &Cell, image: &RgbaImage) -> Result<(), GridError> {
    let (image_width, image_height) = image.dimensions();
    if cell.fits_within(image_width, image_height) {
        Ok(())
    } else {
        Err(GridError::CellOutOfBounds {
            x: cell.x,
            y: cell.y,
            width: cell.width,
            height: cell.height,
            image_width,
            image_height,
        })
    }
}

/// Draws the outline of one cell, inset by the padding, in `color`.
fn draw_cell_outline(
    cell: &Cell,
    image: &mut RgbaImage,
    padding: u32,
    color: Rgba<u8>,
) -> Result<(), GridError> {
    ensure_fits(cell, image)?;
    if cell.is_empty() {
        return Ok(());
    }
    let rect = Rect::from(cell);

    // Skip cells too small to hold an outline inside the padding
    let inset_width = rect.width().saturating_sub(2 * padding);
    let inset_height = rect.height().saturating_sub(2 * padding);
    if inset_width > 0 && inset_height > 0 {
        let outline = Rect::at(rect.left() + padding as i32, rect.top() + padding as i32)
            .of_size(inset_width, inset_height);
        draw_hollow_rect_mut(image, outline, color);
    }
    Ok(())
}

impl Drawable for Cell {
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError> {
        draw_cell_outline(self, image, config.padding, config.cell_outline_color)
    }
}

impl Drawable for GridResult {
    fn draw(&self, image: &mut RgbaImage, config: &GridDrawingConfig) -> Result<(), GridError> {
        for (index, cell) in self.cells.iter().enumerate() {
            let color = match config.cell_color_provider {
                Some(ref provider) => provider(index),
                None => config.cell_outline_color,
            };
            draw_cell_outline(cell, image, config.padding, color)?;
        }

        let (width, height) = image.dimensions();
        let thickness = config.line_thickness.max(1);
        let half = (thickness / 2) as i32;

        // Vertical division lines at the left edge of every column but the first
        for cell in self.row_cells(0).skip(1) {
            let line = Rect::at(cell.x as i32 - half, 0).of_size(thickness, height);
            draw_filled_rect_mut(image, line, config.line_color);
        }

        // Horizontal division lines at the top edge of every row but the first
        for cell in self.column_cells(0).skip(1) {
            let line = Rect::at(0, cell.y as i32 - half).of_size(width, thickness);
            draw_filled_rect_mut(image, line, config.line_color);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TilingPolicy;
    use pretty_assertions::assert_eq;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_draw_division_lines() {
        let mut img = RgbaImage::from_pixel(40, 20, WHITE);
        let grid = GridResult::manual(40, 20, 1, 2, TilingPolicy::Exact).unwrap();
        grid.draw(&mut img, &GridDrawingConfig::default()).unwrap();

        // Thickness 2 covers x = 19 and x = 20.
        assert_eq!(img.get_pixel(19, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(20, 10), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(10, 10), &WHITE);
    }

    #[test]
    fn test_draw_cell_outline_with_padding() {
        let mut img = RgbaImage::from_pixel(20, 20, WHITE);
        let cell = Cell::new(0, 0, 10, 10);
        cell.draw(&mut img, &GridDrawingConfig::default()).unwrap();

        assert_eq!(img.get_pixel(2, 2), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(0, 0), &WHITE);
        assert_eq!(img.get_pixel(5, 5), &WHITE);
    }

    #[test]
    fn test_draw_color_provider() {
        let mut img = RgbaImage::from_pixel(40, 20, WHITE);
        let grid = GridResult::manual(40, 20, 1, 2, TilingPolicy::Exact).unwrap();
        let config = GridDrawingConfig {
            cell_color_provider: Some(Box::new(|i| Rgba([0, (i * 100) as u8, 0, 255]))),
            ..GridDrawingConfig::default()
        };
        grid.draw(&mut img, &config).unwrap();
        assert_eq!(img.get_pixel(2, 2), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(22, 2), &Rgba([0, 100, 0, 255]));
    }

    #[test]
    fn test_draw_empty_cell_is_a_no_op() {
        let mut img = RgbaImage::from_pixel(20, 20, WHITE);
        let config = GridDrawingConfig {
            padding: 0,
            ..GridDrawingConfig::default()
        };
        Cell::new(5, 5, 0, 4).draw(&mut img, &config).unwrap();
        Cell::new(5, 5, 4, 0).draw(&mut img, &config).unwrap();
        assert!(img.pixels().all(|p| p == &WHITE));
    }

    #[test]
    fn test_draw_on_smaller_image_fails() {
        let mut img = RgbaImage::from_pixel(10, 10, WHITE);
        let grid = GridResult::manual(40, 20, 1, 2, TilingPolicy::Exact).unwrap();
        assert!(matches!(
            grid.draw(&mut img, &GridDrawingConfig::default()),
            Err(GridError::CellOutOfBounds { .. })
        ));
    }
}
