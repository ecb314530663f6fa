//! Gradient profiles along each image axis.
//!
//! The vertical profile has one entry per column `x` and measures how strongly the image
//! changes from `x - 1` to `x + 1`, averaged over all rows. A vertical seam between two
//! cells shows up as a peak. The horizontal profile is the same with the axes swapped.
//!
//! Channel differences are summed as integers and divided once at the end, so the
//! result does not depend on summation order or on which thread computed it.
//!
//! Complexity: O(W·H) per call for both profiles together.
use super::*;

/// Which seams a profile detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Axis {
    /// Indexed by `x`; peaks at vertical division lines.
    Vertical,
    /// Indexed by `y`; peaks at horizontal division lines.
    Horizontal,
}

/// Per-coordinate mean gradient magnitude along one axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EdgeProfile {
    pub axis: Axis,
    pub values: Vec<f64>,
}

impl EdgeProfile {
    /// Wraps precomputed profile values.
    pub fn from_values(axis: Axis, values: Vec<f64>) -> Self {
        Self { axis, values }
    }

    /// Converts per-coordinate integer sums of R+G+B differences into means over the
    /// three channels and the `span` pixels crossed by each coordinate.
    fn from_sums(axis: Axis, sums: &[u64], span: u32) -> Self {
        let divisor = 3.0 * span as f64;
        let values = sums.iter().map(|&s| s as f64 / divisor).collect();
        Self { axis, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the whole profile, boundaries included. Zero for an empty profile.
    pub fn baseline(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Largest value within `±window` of `center`, restricted to the interior
    /// `[1, len - 2]`. Zero when the profile has no interior.
    ///
    /// # Example
    /// ```
    /// use gridcut::{Axis, EdgeProfile};
    ///
    /// let profile = EdgeProfile::from_values(Axis::Vertical, vec![9.0, 1.0, 5.0, 2.0, 1.0, 9.0]);
    /// assert_eq!(profile.peak_near(3, 1), 5.0);
    /// assert_eq!(profile.peak_near(1, 1), 5.0);
    /// assert_eq!(profile.peak_near(0, 1), 1.0);
    /// assert_eq!(profile.peak_near(5, 1), 1.0);
    /// ```
    pub fn peak_near(&self, center: i64, window: u32) -> f64 {
        let len = self.values.len() as i64;
        if len < 3 {
            return 0.0;
        }
        let lo = (center - window as i64).max(1);
        let hi = (center + window as i64).min(len - 2);
        if lo > hi {
            return 0.0;
        }
        self.values[lo as usize..=hi as usize]
            .iter()
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Sum of absolute R, G and B differences between two RGBA pixels.
#[inline]
fn rgb_diff(a: &[u8], b: &[u8]) -> u64 {
    a[..3]
        .iter()
        .zip(&b[..3])
        .map(|(&p, &q)| p.abs_diff(q) as u64)
        .sum()
}

/// Computes the vertical-seam profile (one value per column).
pub fn vertical_profile(image: &RgbaImage) -> EdgeProfile {
    trace!("Computing vertical profile");
    let (width, height) = image.dimensions();
    let w = width as usize;
    let mut sums = vec![0u64; w];
    if w >= 3 {
        for row in image.as_raw().chunks_exact(w * 4) {
            for x in 1..w - 1 {
                sums[x] += rgb_diff(&row[(x - 1) * 4..], &row[(x + 1) * 4..]);
            }
        }
    }
    EdgeProfile::from_sums(Axis::Vertical, &sums, height)
}

/// Computes the horizontal-seam profile (one value per row).
pub fn horizontal_profile(image: &RgbaImage) -> EdgeProfile {
    trace!("Computing horizontal profile");
    let (width, height) = image.dimensions();
    let h = height as usize;
    let stride = width as usize * 4;
    let raw = image.as_raw();
    let mut sums = vec![0u64; h];
    for y in 1..h.saturating_sub(1) {
        let above = &raw[(y - 1) * stride..y * stride];
        let below = &raw[(y + 1) * stride..(y + 2) * stride];
        sums[y] = above
            .chunks_exact(4)
            .zip(below.chunks_exact(4))
            .map(|(a, b)| rgb_diff(a, b))
            .sum();
    }
    EdgeProfile::from_sums(Axis::Horizontal, &sums, width)
}

/// Computes both profiles of an image, `(vertical, horizontal)`.
///
/// With `parallel` set the two run on separate rayon tasks; the output is identical
/// either way.
///
/// # Errors
/// Returns [`GridError::InvalidInput`] for an image with a zero dimension.
///
/// # Example
/// ```
/// use gridcut::compute_profiles;
/// use image::{Rgba, RgbaImage};
///
/// let img = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
/// let (vertical, horizontal) = compute_profiles(&img, true).unwrap();
/// assert_eq!(vertical.len(), 8);
/// assert_eq!(horizontal.len(), 4);
/// assert_eq!(vertical.baseline(), 0.0);
/// ```
pub fn compute_profiles(
    image: &RgbaImage,
    parallel: bool,
) -> Result<(EdgeProfile, EdgeProfile), GridError> {
    let (width, height) = image.dimensions();
    validate_dimensions(width, height)?;
    debug!(
        "Computing edge profiles for {}x{} (parallel={})",
        width, height, parallel
    );

    if parallel {
        Ok(rayon::join(
            || vertical_profile(image),
            || horizontal_profile(image),
        ))
    } else {
        Ok((vertical_profile(image), horizontal_profile(image)))
    }
}
