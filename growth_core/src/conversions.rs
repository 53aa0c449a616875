//! `From` implementations bridging `growth_config` types to `growth_core` types.
//!
//! The CLI loads TOML and CSV through `growth_config` and converts here once.

use crate::config::{
    AnalysisCfg, DetectorCfg, GridSteps, NormalizerCfg, Objective, OptimizerCfg, ParameterRanges,
    Range,
};
use crate::mapper::ParameterRecord;
use crate::types::RawReading;

// ── NormalizerCfg ────────────────────────────────────────────────────────────

impl From<&growth_config::NormalizerCfg> for NormalizerCfg {
    fn from(c: &growth_config::NormalizerCfg) -> Self {
        Self {
            noise_floor_od: c.noise_floor_od,
            min_points: c.min_points,
        }
    }
}

// ── DetectorCfg ──────────────────────────────────────────────────────────────

impl From<&growth_config::DetectorCfg> for DetectorCfg {
    fn from(c: &growth_config::DetectorCfg) -> Self {
        let base = match c.preset {
            growth_config::DetectorPreset::Lenient => DetectorCfg::default(),
            growth_config::DetectorPreset::Strict => DetectorCfg::strict(),
        };
        Self {
            window_hours: c.window_hours.clone(),
            density_band: c.density_band.unwrap_or(base.density_band),
            min_increase_ratio: c.min_increase_ratio,
            min_r_squared: c.min_r_squared.unwrap_or(base.min_r_squared),
            target_od: c.target_od,
            min_window_points: c.min_window_points,
        }
    }
}

// ── OptimizerCfg ─────────────────────────────────────────────────────────────

impl From<growth_config::Objective> for Objective {
    fn from(o: growth_config::Objective) -> Self {
        match o {
            growth_config::Objective::GrowthScore => Objective::GrowthScore,
            growth_config::Objective::Slope => Objective::Slope,
        }
    }
}

impl From<&growth_config::GridSteps> for GridSteps {
    fn from(c: &growth_config::GridSteps) -> Self {
        Self {
            mix_cycles: c.mix_cycles,
            mix_volume: c.mix_volume,
            mix_height: c.mix_height,
        }
    }
}

impl From<&growth_config::OptimizerCfg> for OptimizerCfg {
    fn from(c: &growth_config::OptimizerCfg) -> Self {
        Self {
            objective: c.objective.into(),
            top_k: c.top_k,
            best_wells: c.best_wells,
            model_grid: c.model_grid,
            grid_steps: (&c.grid_steps).into(),
            reference_well: c.reference_well.as_deref().map(|w| w.trim().to_string()),
        }
    }
}

// ── ParameterRanges ──────────────────────────────────────────────────────────

impl From<&growth_config::RangeCfg> for Range {
    fn from(c: &growth_config::RangeCfg) -> Self {
        Self {
            min: c.min,
            max: c.max,
        }
    }
}

impl From<&growth_config::ParameterRangesCfg> for ParameterRanges {
    fn from(c: &growth_config::ParameterRangesCfg) -> Self {
        Self {
            mix_cycles: (&c.mix_cycles).into(),
            mix_volume: (&c.mix_volume).into(),
            mix_height: (&c.mix_height).into(),
        }
    }
}

// ── AnalysisCfg ──────────────────────────────────────────────────────────────

impl From<&growth_config::Config> for AnalysisCfg {
    fn from(c: &growth_config::Config) -> Self {
        Self {
            normalizer: (&c.normalizer).into(),
            detector: (&c.detector).into(),
            optimizer: (&c.optimizer).into(),
            ranges: (&c.parameter_ranges).into(),
        }
    }
}

// ── CSV rows ─────────────────────────────────────────────────────────────────

impl From<growth_config::ObservationRow> for RawReading {
    fn from(r: growth_config::ObservationRow) -> Self {
        Self {
            timestamp: r.timestamp,
            absorbance: r.absorbance_od600,
        }
    }
}

impl From<growth_config::ParameterRow> for ParameterRecord {
    fn from(r: growth_config::ParameterRow) -> Self {
        Self {
            destination_well: r.destination_well.trim().to_string(),
            mix_cycles: r.mix_reps,
            mix_volume: r.mix_volume_ul,
            mix_height: r.mix_height_mm,
        }
    }
}
