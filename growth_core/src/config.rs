//! Configuration types for the analysis engine.
//!
//! These are the runtime configuration structs used by the normalizer, detector
//! and optimizer. They are separate from the TOML-deserialized config in
//! `growth_config`.

use serde::Serialize;

use crate::types::Metric;

/// Noise filtering and minimum data for a well.
#[derive(Debug, Clone)]
pub struct NormalizerCfg {
    /// Readings with OD at or below this value are dropped.
    pub noise_floor_od: f64,
    /// Fewer surviving readings than this is "insufficient data".
    pub min_points: usize,
}

impl Default for NormalizerCfg {
    fn default() -> Self {
        Self {
            noise_floor_od: 0.1,
            min_points: 10,
        }
    }
}

/// Growth-phase detector thresholds.
///
/// Earlier analyses disagreed on the R² cutoff (0.6 / 0.7 / 0.8) and on the
/// density band ([0.2, 0.6] vs [0.2, 0.8]); both are plain configuration here.
#[derive(Debug, Clone)]
pub struct DetectorCfg {
    /// Candidate window durations in hours, scanned in order.
    pub window_hours: Vec<f64>,
    /// Inclusive window-average OD band `(min, max)`.
    pub density_band: (f64, f64),
    /// Required last/first OD ratio.
    pub min_increase_ratio: f64,
    /// Fits must have R² strictly above this.
    pub min_r_squared: f64,
    /// Center of the density-efficiency term.
    pub target_od: f64,
    /// Floor for the number of points in a window.
    pub min_window_points: usize,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            window_hours: vec![2.0, 4.0, 6.0, 8.0, 12.0],
            density_band: (0.2, 0.6),
            min_increase_ratio: 1.15,
            min_r_squared: 0.6,
            target_od: 0.4,
            min_window_points: 5,
        }
    }
}

impl DetectorCfg {
    /// Stricter thresholds used by the simplified single-window analyses.
    pub fn strict() -> Self {
        Self {
            density_band: (0.2, 0.8),
            min_r_squared: 0.7,
            ..Self::default()
        }
    }
}

/// Metric the optimizer maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    GrowthScore,
    Slope,
}

impl Objective {
    pub fn metric(self) -> Metric {
        match self {
            Objective::GrowthScore => Metric::GrowthScore,
            Objective::Slope => Metric::Slope,
        }
    }
}

/// Grid resolution per parameter for model-based grid search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSteps {
    pub mix_cycles: usize,
    pub mix_volume: usize,
    pub mix_height: usize,
}

impl Default for GridSteps {
    fn default() -> Self {
        Self {
            mix_cycles: 10,
            mix_volume: 10,
            mix_height: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizerCfg {
    pub objective: Objective,
    pub top_k: usize,
    /// Rows in the report's best-wells table.
    pub best_wells: usize,
    /// Run the model-based grid search in addition to the observed strategies.
    pub model_grid: bool,
    pub grid_steps: GridSteps,
    /// Well reported with its rank regardless of where it placed.
    pub reference_well: Option<String>,
}

impl Default for OptimizerCfg {
    fn default() -> Self {
        Self {
            objective: Objective::GrowthScore,
            top_k: 5,
            best_wells: 5,
            model_grid: true,
            grid_steps: GridSteps::default(),
            reference_well: None,
        }
    }
}

/// Closed interval for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

/// Bounds used for any grid search and echoed in the report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterRanges {
    pub mix_cycles: Range,
    pub mix_volume: Range,
    pub mix_height: Range,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            mix_cycles: Range { min: 1.0, max: 10.0 },
            mix_volume: Range {
                min: 50.0,
                max: 150.0,
            },
            mix_height: Range { min: 1.0, max: 4.0 },
        }
    }
}

/// Everything one plate analysis needs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisCfg {
    pub normalizer: NormalizerCfg,
    pub detector: DetectorCfg,
    pub optimizer: OptimizerCfg,
    pub ranges: ParameterRanges,
}
