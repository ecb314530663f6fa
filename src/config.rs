use super::*;

/// Reference aspect ratios of common photo and video frames.
pub const DEFAULT_REFERENCE_RATIOS: [f64; 9] = [
    16.0 / 9.0,
    4.0 / 3.0,
    3.0 / 2.0,
    1.85,
    2.39,
    1.0,
    9.0 / 16.0,
    3.0 / 4.0,
    2.0 / 3.0,
];

// Empirical tuning values, picked by visual inspection rather than measurement.
pub const DEFAULT_ASPECT_WEIGHT: f64 = 0.45;
pub const DEFAULT_LAYOUT_WEIGHT: f64 = 0.25;
pub const DEFAULT_CELL_COUNT_WEIGHT: f64 = 0.15;
pub const DEFAULT_SYMMETRY_WEIGHT: f64 = 0.15;
pub const DEFAULT_ASPECT_DECAY: f64 = 3.0;
pub const DEFAULT_LAYOUT_DECAY: f64 = 2.0;
pub const DEFAULT_CELL_COUNT_SATURATION: f64 = 6.0;
pub const DEFAULT_GEOMETRIC_BLEND: f64 = 0.7;
pub const DEFAULT_EDGE_BLEND: f64 = 0.3;
pub const DEFAULT_MAX_EDGE_RATIO: f64 = 3.0;
pub const DEFAULT_SEARCH_WINDOW_FRACTION: f64 = 0.03;
pub const DEFAULT_MIN_SEARCH_WINDOW: u32 = 3;
/// Candidates that receive edge evaluation. A 2x2 split of a 3:2 image ranks tenth on
/// geometry alone, so the shortlist has to reach past that.
pub const DEFAULT_SHORTLIST_LEN: usize = 12;

/// How cell rectangles are rounded to whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TilingPolicy {
    /// Each cell runs from its rounded origin to the next cell's rounded origin, the last
    /// one to the image edge. Cells tile the image with no gaps or overlap.
    #[default]
    Exact,
    /// Origin and size are rounded independently (`round(width / cols)` for every
    /// cell). Cells may drift by a pixel; the right and bottom cells are clipped to the
    /// image.
    Rounded,
}

/// Configuration for grid detection.
///
/// # Example
/// ```
/// use gridcut::DetectionConfig;
///
/// let config = DetectionConfig::default();
/// assert_eq!(config.shortlist_len, 12);
/// assert_eq!(config.geometric_blend, 0.7);
/// assert_eq!(config.enable_parallel, true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionConfig {
    /// Aspect ratios a cell is expected to resemble.
    pub reference_ratios: Vec<f64>,
    /// Weight of the cell aspect ratio score (default: 0.45)
    pub aspect_weight: f64,
    /// Weight of the grid layout score (default: 0.25)
    pub layout_weight: f64,
    /// Weight of the cell count score (default: 0.15)
    pub cell_count_weight: f64,
    /// Weight of the symmetry score (default: 0.15)
    pub symmetry_weight: f64,
    /// Exponential decay of the aspect ratio score (default: 3)
    pub aspect_decay: f64,
    /// Exponential decay of the layout score (default: 2)
    pub layout_decay: f64,
    /// Cell count at which the cell count score saturates (default: 6)
    pub cell_count_saturation: f64,
    /// Weight of the geometric score in the combined score (default: 0.7)
    pub geometric_blend: f64,
    /// Weight of the edge score in the combined score (default: 0.3)
    pub edge_blend: f64,
    /// Number of top geometric candidates that get edge evaluation (default: 12)
    pub shortlist_len: usize,
    /// Cap on a division line's peak-to-baseline ratio (default: 3)
    pub max_edge_ratio: f64,
    /// Seam search half-width as a fraction of the smaller cell side (default: 0.03)
    pub search_window_fraction: f64,
    /// Smallest seam search half-width in pixels (default: 3)
    pub min_search_window: u32,
    /// Rounding policy for cell rectangles (default: exact tiling)
    pub tiling: TilingPolicy,
    /// Compute the two edge profiles in parallel (default: true)
    pub enable_parallel: bool,
}

impl DetectionConfig {
    /// Creates a default configuration with the given shortlist length, tiling policy
    /// and parallelism.
    ///
    /// # Example
    /// ```
    /// use gridcut::{DetectionConfig, TilingPolicy};
    ///
    /// let config = DetectionConfig::new(8, TilingPolicy::Rounded, false);
    /// assert_eq!(config.shortlist_len, 8);
    /// assert_eq!(config.tiling, TilingPolicy::Rounded);
    /// assert_eq!(config.enable_parallel, false);
    /// ```
    pub fn new(shortlist_len: usize, tiling: TilingPolicy, enable_parallel: bool) -> Self {
        Self {
            reference_ratios: DEFAULT_REFERENCE_RATIOS.to_vec(),
            aspect_weight: DEFAULT_ASPECT_WEIGHT,
            layout_weight: DEFAULT_LAYOUT_WEIGHT,
            cell_count_weight: DEFAULT_CELL_COUNT_WEIGHT,
            symmetry_weight: DEFAULT_SYMMETRY_WEIGHT,
            aspect_decay: DEFAULT_ASPECT_DECAY,
            layout_decay: DEFAULT_LAYOUT_DECAY,
            cell_count_saturation: DEFAULT_CELL_COUNT_SATURATION,
            geometric_blend: DEFAULT_GEOMETRIC_BLEND,
            edge_blend: DEFAULT_EDGE_BLEND,
            shortlist_len: shortlist_len.max(1), // At least one candidate
            max_edge_ratio: DEFAULT_MAX_EDGE_RATIO,
            search_window_fraction: DEFAULT_SEARCH_WINDOW_FRACTION,
            min_search_window: DEFAULT_MIN_SEARCH_WINDOW,
            tiling,
            enable_parallel,
        }
    }

    /// Checks that every weight and constant is usable.
    ///
    /// Score weights must be finite and non-negative, each weight group must sum to 1 so
    /// scores stay in `[0, 1]`, and the reference ratio set must be non-empty and positive.
    ///
    /// # Example
    /// ```
    /// use gridcut::DetectionConfig;
    ///
    /// let mut config = DetectionConfig::default();
    /// config.edge_blend = 0.5;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), GridError> {
        let weights = [
            ("aspect_weight", self.aspect_weight),
            ("layout_weight", self.layout_weight),
            ("cell_count_weight", self.cell_count_weight),
            ("symmetry_weight", self.symmetry_weight),
            ("geometric_blend", self.geometric_blend),
            ("edge_blend", self.edge_blend),
            ("aspect_decay", self.aspect_decay),
            ("layout_decay", self.layout_decay),
            ("search_window_fraction", self.search_window_fraction),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(GridError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        let geometric_sum =
            self.aspect_weight + self.layout_weight + self.cell_count_weight + self.symmetry_weight;
        if (geometric_sum - 1.0).abs() > 1e-9 {
            return Err(GridError::InvalidConfig(format!(
                "geometric weights must sum to 1, got {geometric_sum}"
            )));
        }
        let blend_sum = self.geometric_blend + self.edge_blend;
        if (blend_sum - 1.0).abs() > 1e-9 {
            return Err(GridError::InvalidConfig(format!(
                "geometric_blend and edge_blend must sum to 1, got {blend_sum}"
            )));
        }

        if self.reference_ratios.is_empty() {
            return Err(GridError::InvalidConfig(
                "reference_ratios must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .reference_ratios
            .iter()
            .find(|r| !r.is_finite() || **r <= 0.0)
        {
            return Err(GridError::InvalidConfig(format!(
                "reference ratio {bad} must be finite and positive"
            )));
        }

        if !(self.cell_count_saturation.is_finite() && self.cell_count_saturation > 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "cell_count_saturation must be positive, got {}",
                self.cell_count_saturation
            )));
        }
        if !(self.max_edge_ratio.is_finite() && self.max_edge_ratio > 1.0) {
            return Err(GridError::InvalidConfig(format!(
                "max_edge_ratio must be greater than 1, got {}",
                self.max_edge_ratio
            )));
        }
        if self.shortlist_len == 0 {
            return Err(GridError::InvalidConfig(
                "shortlist_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig::new(DEFAULT_SHORTLIST_LEN, TilingPolicy::default(), true)
    }
}
