use smallvec::SmallVec;

use super::*;

/// Room for the division lines of the largest grid: 5 vertical plus 5 horizontal.
type RatioVec = SmallVec<[f64; 2 * (MAX_GRID_DIM as usize - 1)]>;

/// A shortlisted candidate after edge evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScoredCandidate {
    pub candidate: GridCandidate,
    pub edge_score: f64,
    pub combined_score: f64,
}

/// Half-width of the seam search around an expected division line.
///
/// Grows with the smaller cell side so larger cells tolerate larger misplacement.
///
/// # Example
/// ```
/// use gridcut::{search_window, DetectionConfig};
///
/// let config = DetectionConfig::default();
/// assert_eq!(search_window(600.0, 400.0, &config), 12);
/// assert_eq!(search_window(40.0, 40.0, &config), 3);
/// ```
pub fn search_window(cell_width: f64, cell_height: f64, config: &DetectionConfig) -> u32 {
    let scaled = (config.search_window_fraction * cell_width.min(cell_height)).floor();
    (scaled as u32).max(config.min_search_window)
}

/// Peak-to-baseline ratio at each interior division line of one axis.
fn push_line_ratios(
    profile: &EdgeProfile,
    divisions: u32,
    cell_size: f64,
    window: u32,
    max_ratio: f64,
    ratios: &mut RatioVec,
) {
    let baseline = profile.baseline();
    for i in 1..divisions {
        if baseline == 0.0 {
            ratios.push(1.0);
            continue;
        }
        let expected = (cell_size * i as f64).round() as i64;
        let peak = profile.peak_near(expected, window);
        ratios.push((peak / baseline).min(max_ratio));
    }
}

/// Scores how well the profiles show seams at a candidate's division lines.
///
/// Each interior division line contributes the ratio of the strongest profile value near
/// it to the profile's mean (capped at `max_edge_ratio`). The mean ratio maps to `[0, 1]`:
/// 0 when lines are no stronger than the baseline, 1 when they all reach the cap.
/// A single-row candidate only looks at vertical lines and vice versa.
///
/// # Example
/// ```
/// use gridcut::{edge_score, Axis, DetectionConfig, EdgeProfile, GridCandidate};
///
/// let config = DetectionConfig::default();
/// let candidate = GridCandidate::new(100, 100, 1, 2, &config);
/// let flat = EdgeProfile::from_values(Axis::Vertical, vec![4.0; 100]);
/// let other = EdgeProfile::from_values(Axis::Horizontal, vec![0.0; 100]);
/// assert_eq!(edge_score(&candidate, &flat, &other, &config), 0.0);
/// ```
pub fn edge_score(
    candidate: &GridCandidate,
    vertical: &EdgeProfile,
    horizontal: &EdgeProfile,
    config: &DetectionConfig,
) -> f64 {
    let window = search_window(candidate.cell_width, candidate.cell_height, config);
    let mut ratios = RatioVec::new();
    push_line_ratios(
        vertical,
        candidate.cols,
        candidate.cell_width,
        window,
        config.max_edge_ratio,
        &mut ratios,
    );
    push_line_ratios(
        horizontal,
        candidate.rows,
        candidate.cell_height,
        window,
        config.max_edge_ratio,
        &mut ratios,
    );
    if ratios.is_empty() {
        return 0.0;
    }

    let avg_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;
    trace!(
        "Edge ratios for {}x{}: {:?} (avg {:.3})",
        candidate.rows,
        candidate.cols,
        ratios,
        avg_ratio
    );
    ((avg_ratio - 1.0) / (config.max_edge_ratio - 1.0)).clamp(0.0, 1.0)
}

/// Edge-evaluates the shortlist and orders it by combined score.
///
/// `candidates` must already be in geometric rank order; only the first
/// `config.shortlist_len` are evaluated. The sort is stable, so equal combined scores
/// keep their geometric order.
///
/// # Errors
/// Returns [`GridError::NoCandidateFound`] if `candidates` is empty.
pub fn rank_candidates(
    candidates: &[GridCandidate],
    vertical: &EdgeProfile,
    horizontal: &EdgeProfile,
    config: &DetectionConfig,
) -> Result<CandidateVec<ScoredCandidate>, GridError> {
    if candidates.is_empty() {
        error!("No grid candidates to evaluate");
        return Err(GridError::NoCandidateFound);
    }

    let mut scored: CandidateVec<ScoredCandidate> = candidates
        .iter()
        .take(config.shortlist_len)
        .map(|candidate| {
            let edge_score = edge_score(candidate, vertical, horizontal, config);
            let combined_score = (candidate.geometric_score * config.geometric_blend
                + edge_score * config.edge_blend)
                .clamp(0.0, 1.0);
            ScoredCandidate {
                candidate: *candidate,
                edge_score,
                combined_score,
            }
        })
        .collect();
    scored.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    Ok(scored)
}

/// Picks the candidate with the highest combined score.
///
/// # Errors
/// Returns [`GridError::NoCandidateFound`] if `candidates` is empty.
pub fn select(
    candidates: &[GridCandidate],
    vertical: &EdgeProfile,
    horizontal: &EdgeProfile,
    config: &DetectionConfig,
) -> Result<ScoredCandidate, GridError> {
    let ranked = rank_candidates(candidates, vertical, horizontal, config)?;
    let best = ranked.first().copied().ok_or(GridError::NoCandidateFound)?;
    debug!(
        "Selected {}x{} (geometric {:.4}, edge {:.4}, combined {:.4})",
        best.candidate.rows,
        best.candidate.cols,
        best.candidate.geometric_score,
        best.edge_score,
        best.combined_score
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn flat(axis: Axis, len: usize, value: f64) -> EdgeProfile {
        EdgeProfile::from_values(axis, vec![value; len])
    }

    /// A profile of ones with spikes at the given positions.
    fn spiked(axis: Axis, len: usize, spikes: &[usize], height: f64) -> EdgeProfile {
        let mut values = vec![1.0; len];
        for &s in spikes {
            values[s] = height;
        }
        EdgeProfile::from_values(axis, values)
    }

    #[test_case(2, 3)]
    #[test_case(1, 2)]
    #[test_case(6, 1)]
    #[test_case(6, 6)]
    fn test_flat_profile_scores_zero(rows: u32, cols: u32) {
        let config = DetectionConfig::default();
        let candidate = GridCandidate::new(600, 600, rows, cols, &config);
        let vertical = flat(Axis::Vertical, 600, 4.0);
        let horizontal = flat(Axis::Horizontal, 600, 4.0);
        assert_eq!(edge_score(&candidate, &vertical, &horizontal, &config), 0.0);
    }

    #[test]
    fn test_zero_baseline_scores_zero() {
        let config = DetectionConfig::default();
        let candidate = GridCandidate::new(300, 300, 3, 3, &config);
        let vertical = flat(Axis::Vertical, 300, 0.0);
        let horizontal = flat(Axis::Horizontal, 300, 0.0);
        assert_eq!(edge_score(&candidate, &vertical, &horizontal, &config), 0.0);
    }

    #[test]
    fn test_strong_seams_score_one() {
        let config = DetectionConfig::default();
        let candidate = GridCandidate::new(300, 300, 3, 3, &config);
        let vertical = spiked(Axis::Vertical, 300, &[100, 200], 1000.0);
        let horizontal = spiked(Axis::Horizontal, 300, &[101, 198], 1000.0);
        assert_eq!(edge_score(&candidate, &vertical, &horizontal, &config), 1.0);
    }

    #[test]
    fn test_seam_outside_window_is_missed() {
        let config = DetectionConfig::default();
        // Cells are 100px, window is max(3, floor(3.0)) = 3.
        let candidate = GridCandidate::new(200, 100, 1, 2, &config);
        let near = spiked(Axis::Vertical, 200, &[103], 1000.0);
        let far = spiked(Axis::Vertical, 200, &[104], 1000.0);
        let horizontal = flat(Axis::Horizontal, 100, 1.0);
        assert_eq!(edge_score(&candidate, &near, &horizontal, &config), 1.0);
        assert_eq!(edge_score(&candidate, &far, &horizontal, &config), 0.0);
    }

    #[test]
    fn test_single_row_ignores_horizontal_profile() {
        let config = DetectionConfig::default();
        let candidate = GridCandidate::new(200, 100, 1, 2, &config);
        let vertical = flat(Axis::Vertical, 200, 1.0);
        let horizontal = spiked(Axis::Horizontal, 100, &[50], 1000.0);
        assert_eq!(edge_score(&candidate, &vertical, &horizontal, &config), 0.0);
    }

    #[test]
    fn test_partial_seams_average() {
        let config = DetectionConfig::default();
        // One of two vertical lines has a capped seam: mean ratio (3 + 1) / 2 = 2.
        let candidate = GridCandidate::new(300, 100, 1, 3, &config);
        let vertical = spiked(Axis::Vertical, 300, &[100], 1000.0);
        let horizontal = flat(Axis::Horizontal, 100, 1.0);
        let baseline = vertical.baseline();
        let second = 1.0 / baseline;
        let expected = ((3.0 + second) / 2.0 - 1.0) / 2.0;
        assert_eq!(edge_score(&candidate, &vertical, &horizontal, &config), expected);
    }

    #[test_case(1200.0, 800.0, 24)]
    #[test_case(600.0, 400.0, 12)]
    #[test_case(99.0, 1000.0, 3)]
    #[test_case(0.5, 0.5, 3)]
    fn test_search_window(cell_width: f64, cell_height: f64, expected: u32) {
        assert_eq!(
            search_window(cell_width, cell_height, &DetectionConfig::default()),
            expected
        );
    }

    #[test]
    fn test_select_empty_candidates() {
        let config = DetectionConfig::default();
        let vertical = flat(Axis::Vertical, 10, 1.0);
        let horizontal = flat(Axis::Horizontal, 10, 1.0);
        assert_eq!(
            select(&[], &vertical, &horizontal, &config).unwrap_err(),
            GridError::NoCandidateFound
        );
    }

    #[test]
    fn test_select_keeps_geometric_order_on_ties() {
        let config = DetectionConfig::default();
        let candidates = generate_candidates(1200, 800, &config).unwrap();
        let vertical = flat(Axis::Vertical, 1200, 1.0);
        let horizontal = flat(Axis::Horizontal, 800, 1.0);
        // No seams anywhere: 2x3 and 4x6 tie on every score.
        let best = select(&candidates, &vertical, &horizontal, &config).unwrap();
        assert_eq!((best.candidate.rows, best.candidate.cols), (2, 3));
        assert_eq!(best.edge_score, 0.0);
        assert_eq!(best.combined_score, 0.95 * 0.7);
    }

    #[test]
    fn test_shortlist_limits_evaluation() {
        let mut config = DetectionConfig::default();
        config.shortlist_len = 3;
        let candidates = generate_candidates(1200, 800, &config).unwrap();
        let vertical = flat(Axis::Vertical, 1200, 1.0);
        let horizontal = flat(Axis::Horizontal, 800, 1.0);
        let ranked = rank_candidates(&candidates, &vertical, &horizontal, &config).unwrap();
        assert_eq!(ranked.len(), 3);
        assert!(ranked
            .iter()
            .zip(candidates.iter())
            .all(|(r, c)| r.candidate == *c));
    }

    #[test]
    fn test_edge_evidence_reorders_candidates() {
        let config = DetectionConfig::default();
        let candidates = generate_candidates(1200, 800, &config).unwrap();
        // Seams at x=600 and y=400 favour 2x2 over the geometric favourite 2x3.
        let vertical = spiked(Axis::Vertical, 1200, &[599, 600], 500.0);
        let horizontal = spiked(Axis::Horizontal, 800, &[399, 400], 500.0);
        let best = select(&candidates, &vertical, &horizontal, &config).unwrap();
        assert_eq!((best.candidate.rows, best.candidate.cols), (2, 2));
        assert_eq!(best.edge_score, 1.0);
    }
}
