use std::cmp::Ordering;

use super::*;

/// A `(rows, cols)` split of an image, scored on geometry alone.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GridCandidate {
    pub rows: u32,
    pub cols: u32,
    pub cell_width: f64,
    pub cell_height: f64,
    pub cell_aspect_ratio: f64,
    pub geometric_score: f64,
}

impl GridCandidate {
    /// Scores a `(rows, cols)` split of a `width` x `height` image.
    ///
    /// # Example
    /// ```
    /// use gridcut::{DetectionConfig, GridCandidate};
    ///
    /// let candidate = GridCandidate::new(1200, 800, 2, 3, &DetectionConfig::default());
    /// assert_eq!(candidate.cell_width, 400.0);
    /// assert_eq!(candidate.cell_aspect_ratio, 1.0);
    /// assert!(candidate.geometric_score > 0.9);
    /// ```
    pub fn new(width: u32, height: u32, rows: u32, cols: u32, config: &DetectionConfig) -> Self {
        let cell_width = width as f64 / cols as f64;
        let cell_height = height as f64 / rows as f64;
        let cell_aspect_ratio = cell_width / cell_height;

        let image_ratio = width as f64 / height as f64;
        let geometric_score = config.aspect_weight
            * aspect_ratio_score(cell_aspect_ratio, &config.reference_ratios, config.aspect_decay)
            + config.layout_weight
                * layout_score(image_ratio, rows, cols, config.layout_decay)
            + config.cell_count_weight
                * cell_count_score(rows, cols, config.cell_count_saturation)
            + config.symmetry_weight * symmetry_score(rows, cols);

        Self {
            rows,
            cols,
            cell_width,
            cell_height,
            cell_aspect_ratio,
            geometric_score: geometric_score.clamp(0.0, 1.0),
        }
    }

    /// Number of cells this split produces.
    pub fn cell_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Ranking order: higher geometric score first, then fewer cells, then fewer rows.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .geometric_score
            .total_cmp(&self.geometric_score)
            .then_with(|| self.cell_count().cmp(&other.cell_count()))
            .then_with(|| self.rows.cmp(&other.rows))
    }
}

/// `max(a, b) / min(a, b) - 1`: how far apart two positive ratios are, independent of
/// which one is larger.
fn relative_distance(a: f64, b: f64) -> f64 {
    a.max(b) / a.min(b) - 1.0
}

/// Scores how close a cell aspect ratio is to the nearest reference ratio.
///
/// Returns `exp(-decay * d)` where `d` is the smallest relative distance to any reference,
/// so an exact match scores 1 and the score falls off smoothly with distance.
///
/// # Example
/// ```
/// use gridcut::aspect_ratio_score;
/// use gridcut::config::DEFAULT_REFERENCE_RATIOS;
///
/// assert_eq!(aspect_ratio_score(4.0 / 3.0, &DEFAULT_REFERENCE_RATIOS, 3.0), 1.0);
/// assert!(aspect_ratio_score(5.0, &DEFAULT_REFERENCE_RATIOS, 3.0) < 0.1);
/// ```
pub fn aspect_ratio_score(aspect_ratio: f64, references: &[f64], decay: f64) -> f64 {
    let min_distance = references
        .iter()
        .map(|&r| relative_distance(aspect_ratio, r))
        .fold(f64::INFINITY, f64::min);
    (-decay * min_distance).exp()
}

/// Scores how well the grid shape `cols / rows` follows the image shape.
pub fn layout_score(image_ratio: f64, rows: u32, cols: u32, decay: f64) -> f64 {
    let grid_ratio = cols as f64 / rows as f64;
    (-decay * relative_distance(image_ratio, grid_ratio)).exp()
}

/// Mild preference for finer grids, saturating at `saturation` cells.
pub fn cell_count_score(rows: u32, cols: u32, saturation: f64) -> f64 {
    ((rows * cols) as f64 / saturation).min(1.0)
}

/// Preference for near-square grids: 1 when `rows == cols`.
pub fn symmetry_score(rows: u32, cols: u32) -> f64 {
    1.0 - rows.abs_diff(cols) as f64 / rows.max(cols) as f64
}

/// Enumerates and ranks every `(rows, cols)` split of a `width` x `height` image.
///
/// All pairs in `[1, 6]²` except `(1, 1)` are returned, best first.
///
/// # Errors
/// Returns [`GridError::InvalidInput`] if either dimension is zero.
///
/// # Example
/// ```
/// use gridcut::{generate_candidates, DetectionConfig, CANDIDATE_COUNT};
///
/// let candidates = generate_candidates(1200, 800, &DetectionConfig::default()).unwrap();
/// assert_eq!(candidates.len(), CANDIDATE_COUNT);
/// assert_eq!((candidates[0].rows, candidates[0].cols), (2, 3));
/// ```
pub fn generate_candidates(
    width: u32,
    height: u32,
    config: &DetectionConfig,
) -> Result<CandidateVec<GridCandidate>, GridError> {
    trace!("Generating candidates for {}x{}", width, height);
    validate_dimensions(width, height)?;

    let mut candidates: CandidateVec<GridCandidate> = (1..=MAX_GRID_DIM)
        .flat_map(|rows| (1..=MAX_GRID_DIM).map(move |cols| (rows, cols)))
        .filter(|&(rows, cols)| !(rows == 1 && cols == 1))
        .map(|(rows, cols)| GridCandidate::new(width, height, rows, cols, config))
        .collect();
    candidates.sort_by(GridCandidate::rank_cmp);

    debug!(
        "Best geometric candidate: {}x{} ({:.4})",
        candidates[0].rows, candidates[0].cols, candidates[0].geometric_score
    );
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REFERENCE_RATIOS;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(16.0 / 9.0 ; "widescreen")]
    #[test_case(4.0 / 3.0 ; "standard")]
    #[test_case(3.0 / 2.0 ; "photo")]
    #[test_case(1.85 ; "flat")]
    #[test_case(2.39 ; "scope")]
    #[test_case(1.0 ; "square")]
    #[test_case(9.0 / 16.0 ; "portrait widescreen")]
    #[test_case(3.0 / 4.0 ; "portrait standard")]
    #[test_case(2.0 / 3.0 ; "portrait photo")]
    fn test_aspect_ratio_score_exact_reference(ratio: f64) {
        assert_eq!(aspect_ratio_score(ratio, &DEFAULT_REFERENCE_RATIOS, 3.0), 1.0);
    }

    #[test_case(1.1)]
    #[test_case(1.6)]
    #[test_case(0.5)]
    #[test_case(3.0)]
    #[test_case(2.0)]
    fn test_aspect_ratio_score_off_reference(ratio: f64) {
        let score = aspect_ratio_score(ratio, &DEFAULT_REFERENCE_RATIOS, 3.0);
        assert!(score < 1.0 && score > 0.0, "score {score} for {ratio}");
    }

    #[test]
    fn test_aspect_ratio_score_is_symmetric() {
        // 2.0 is 1/3 away from 3/2 whichever side the division goes.
        let expected = (-3.0f64 * (2.0 / 1.5 - 1.0)).exp();
        assert_eq!(aspect_ratio_score(2.0, &[1.5], 3.0), expected);
        assert_eq!(
            aspect_ratio_score(0.75, &[1.0], 3.0),
            aspect_ratio_score(1.0 / 0.75, &[1.0], 3.0)
        );
    }

    #[test_case(1, 2, 2.0 / 6.0)]
    #[test_case(2, 3, 1.0)]
    #[test_case(6, 6, 1.0)]
    fn test_cell_count_score(rows: u32, cols: u32, expected: f64) {
        assert_eq!(cell_count_score(rows, cols, 6.0), expected);
    }

    #[test_case(3, 3, 1.0)]
    #[test_case(2, 4, 0.5)]
    #[test_case(1, 6, 1.0 / 6.0)]
    fn test_symmetry_score(rows: u32, cols: u32, expected: f64) {
        assert!((symmetry_score(rows, cols) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_layout_score_prefers_matching_shape() {
        // A 2:1 image split into 1 row and 2 columns matches exactly.
        assert_eq!(layout_score(2.0, 1, 2, 2.0), 1.0);
        assert!(layout_score(2.0, 2, 1, 2.0) < layout_score(2.0, 1, 2, 2.0));
    }

    #[test]
    fn test_generate_candidates_enumeration() {
        let candidates = generate_candidates(640, 480, &DetectionConfig::default()).unwrap();
        assert_eq!(candidates.len(), CANDIDATE_COUNT);
        assert!(!candidates.spilled());
        assert!(!candidates.iter().any(|c| c.rows == 1 && c.cols == 1));
        for rows in 1..=MAX_GRID_DIM {
            for cols in 1..=MAX_GRID_DIM {
                let count = candidates
                    .iter()
                    .filter(|c| c.rows == rows && c.cols == cols)
                    .count();
                assert_eq!(count, usize::from(!(rows == 1 && cols == 1)));
            }
        }
    }

    #[test]
    fn test_generate_candidates_tie_break() {
        // On a 3:2 image, 2x3 and 4x6 both produce square cells and score the same;
        // the split with fewer cells comes first.
        let candidates = generate_candidates(1200, 800, &DetectionConfig::default()).unwrap();
        assert_eq!((candidates[0].rows, candidates[0].cols), (2, 3));
        assert_eq!((candidates[1].rows, candidates[1].cols), (4, 6));
        assert_eq!(candidates[0].geometric_score, candidates[1].geometric_score);

        // 3x3, 4x4, 5x5 and 6x6 tie next and come out in order of size.
        let next: Vec<(u32, u32)> = candidates[2..6].iter().map(|c| (c.rows, c.cols)).collect();
        assert_eq!(next, vec![(3, 3), (4, 4), (5, 5), (6, 6)]);
    }

    #[test]
    fn test_generate_candidates_rejects_empty_image() {
        let config = DetectionConfig::default();
        assert_eq!(
            generate_candidates(0, 10, &config).unwrap_err(),
            GridError::InvalidInput { width: 0, height: 10 }
        );
        assert!(generate_candidates(10, 0, &config).is_err());
    }

    proptest! {
        #[test]
        fn test_geometric_score_in_unit_range(width in 1..5000u32, height in 1..5000u32) {
            let config = DetectionConfig::default();
            let candidates = generate_candidates(width, height, &config).unwrap();
            for c in candidates.iter() {
                prop_assert!((0.0..=1.0).contains(&c.geometric_score));
            }
        }

        #[test]
        fn test_candidates_sorted(width in 1..5000u32, height in 1..5000u32) {
            let config = DetectionConfig::default();
            let candidates = generate_candidates(width, height, &config).unwrap();
            for pair in candidates.windows(2) {
                prop_assert_ne!(pair[0].rank_cmp(&pair[1]), Ordering::Greater);
            }
        }
    }
}
