use std::path::Path;

use crate::drawing::*;
use image::DynamicImage;

use super::*;

/// Errors from writing a debug overlay.
#[derive(Error, Debug)]
pub enum DebugError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("Failed to save overlay: {0}")]
    Image(#[from] image::ImageError),
}

/// Saves the image with the grid drawn on it.
///
/// This function draws the cell outlines and division lines on a copy of the provided
/// image and saves the result to the specified path. The format follows the extension.
///
/// # Arguments
/// * `image` - The input image.
/// * `grid` - The grid to draw.
/// * `output_path` - The path to save the output image.
/// * `config` - The drawing configuration.
///
/// # Errors
/// Returns [`DebugError`] if drawing or saving fails.
///
/// # Examples
///
/// ```rust,no_run
/// use gridcut::{*, drawing::*};
/// use image::open;
///
/// let img = open("sheet.png").unwrap();
/// let grid = GridResult::try_from(&img).unwrap();
///
/// let drawing_config = GridDrawingConfig::default();
/// debug::save_image_with_grid(&img, &grid, "output_with_grid.png", &drawing_config).unwrap();
/// ```
pub fn save_image_with_grid(
    image: &DynamicImage,
    grid: &GridResult,
    output_path: impl AsRef<Path>,
    config: &GridDrawingConfig,
) -> Result<(), DebugError> {
    let mut rgba_img = image.to_rgba8();
    grid.draw(&mut rgba_img, config)?;
    debug!("Saving grid overlay to {}", output_path.as_ref().display());
    rgba_img.save(output_path)?;
    Ok(())
}
