#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and tabular input loaders for the growth analysis.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Well absorbance CSVs are read leniently (bad rows are skipped and counted);
//!   parameter CSVs are strict about headers, and rows with bad values are
//!   skipped and reported by line number.
use serde::Deserialize;
use serde::de::Deserializer;
use std::path::{Path, PathBuf};

pub mod tables;

pub use tables::{
    ObservationRow, ParameterCsv, ParameterRow, SkippedRow, WellCsv, WellFile, discover_well_files,
    load_parameter_csv, load_well_csv,
};

/// One experiment batch of passaging parameters.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BatchSource {
    pub id: u32,
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DataCfg {
    /// Directory holding `well_<ID>_absorbance.csv` files.
    pub wells_dir: Option<PathBuf>,
    pub batches: Vec<BatchSource>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NormalizerCfg {
    /// Readings at or below this OD are treated as noise. The permissive variant uses 0.05.
    pub noise_floor_od: f64,
    /// Minimum surviving readings for a well to be analyzed.
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

/// Named threshold sets for the detector.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectorPreset {
    /// Band [0.2, 0.6], R² > 0.6.
    #[default]
    Lenient,
    /// Band [0.2, 0.8], R² > 0.7.
    Strict,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DetectorCfg {
    /// Base thresholds; `density_band` and `min_r_squared` override it when set.
    pub preset: DetectorPreset,
    /// Candidate window durations in hours, scanned in order.
    pub window_hours: Vec<f64>,
    /// Accepted window-average OD. Accepts either:
    /// - a tuple: [0.2, 0.6]
    /// - a table: { min = 0.2, max = 0.6 }
    #[serde(deserialize_with = "de_density_band")]
    pub density_band: Option<(f64, f64)>,
    /// last/first OD must reach at least this ratio.
    pub min_increase_ratio: f64,
    /// Windows must fit strictly better than this R².
    pub min_r_squared: Option<f64>,
    /// OD the density-efficiency term is centered on.
    pub target_od: f64,
    /// Floor for the number of points in a window.
    pub min_window_points: usize,
}

impl Default for DetectorCfg {
    fn default() -> Self {
        Self {
            preset: DetectorPreset::Lenient,
            window_hours: vec![2.0, 4.0, 6.0, 8.0, 12.0],
            density_band: None,
            min_increase_ratio: 1.15,
            min_r_squared: None,
            target_od: 0.4,
            min_window_points: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BandToml {
    Tuple((f64, f64)),
    Table { min: f64, max: f64 },
}

fn de_density_band<'de, D>(deserializer: D) -> Result<Option<(f64, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match BandToml::deserialize(deserializer)? {
        BandToml::Tuple(pair) => pair,
        BandToml::Table { min, max } => (min, max),
    }))
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapperCfg {
    /// Height substituted when a batch has no `mix_height_mm` column.
    pub default_mix_height_mm: f64,
}

impl Default for MapperCfg {
    fn default() -> Self {
        Self {
            default_mix_height_mm: 3.0,
        }
    }
}

/// Performance metric the optimizer ranks wells by.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    #[default]
    GrowthScore,
    Slope,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OptimizerCfg {
    pub objective: Objective,
    /// Wells averaged by the top-K strategy.
    pub top_k: usize,
    /// Wells listed in the report's best-wells table.
    pub best_wells: usize,
    /// Fit a linear model and grid-search its predictions.
    pub model_grid: bool,
    pub grid_steps: GridSteps,
    /// Well whose rank and metrics are echoed in the report, e.g. "B2".
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

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RangeCfg {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ParameterRangesCfg {
    pub mix_cycles: RangeCfg,
    pub mix_volume: RangeCfg,
    pub mix_height: RangeCfg,
}

impl Default for ParameterRangesCfg {
    fn default() -> Self {
        Self {
            mix_cycles: RangeCfg { min: 1.0, max: 10.0 },
            mix_volume: RangeCfg {
                min: 50.0,
                max: 150.0,
            },
            mix_height: RangeCfg { min: 1.0, max: 4.0 },
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub data: DataCfg,
    pub normalizer: NormalizerCfg,
    pub detector: DetectorCfg,
    pub mapper: MapperCfg,
    pub optimizer: OptimizerCfg,
    pub parameter_ranges: ParameterRangesCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a TOML config file. Relative batch paths stay relative to the
/// process working directory.
pub fn load_config_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {:?}: {}", path, e))
}

fn check_range(name: &str, r: RangeCfg) -> eyre::Result<()> {
    if !(r.min.is_finite() && r.max.is_finite()) {
        eyre::bail!("parameter_ranges.{name} bounds must be finite");
    }
    if r.min <= 0.0 {
        eyre::bail!("parameter_ranges.{name}.min must be > 0");
    }
    if r.max < r.min {
        eyre::bail!("parameter_ranges.{name}.max must be >= min");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Normalizer
        if !(self.normalizer.noise_floor_od >= 0.0 && self.normalizer.noise_floor_od.is_finite()) {
            eyre::bail!("normalizer.noise_floor_od must be >= 0");
        }
        if self.normalizer.min_points < 2 {
            eyre::bail!("normalizer.min_points must be >= 2");
        }

        // Detector
        let d = &self.detector;
        if d.window_hours.is_empty() {
            eyre::bail!("detector.window_hours must not be empty");
        }
        if d.window_hours.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            eyre::bail!("detector.window_hours entries must be > 0");
        }
        if let Some((lo, hi)) = d.density_band
            && (!(lo.is_finite() && hi.is_finite()) || lo < 0.0 || hi < lo)
        {
            eyre::bail!("detector.density_band must satisfy 0 <= min <= max");
        }
        if !(d.min_increase_ratio.is_finite() && d.min_increase_ratio >= 1.0) {
            eyre::bail!("detector.min_increase_ratio must be >= 1.0");
        }
        if let Some(r2) = d.min_r_squared
            && !(0.0..1.0).contains(&r2)
        {
            eyre::bail!("detector.min_r_squared must be in [0.0, 1.0)");
        }
        if !(d.target_od.is_finite() && d.target_od > 0.0) {
            eyre::bail!("detector.target_od must be > 0");
        }
        if d.min_window_points < 3 {
            eyre::bail!("detector.min_window_points must be >= 3");
        }

        // Mapper
        if !(self.mapper.default_mix_height_mm.is_finite() && self.mapper.default_mix_height_mm > 0.0)
        {
            eyre::bail!("mapper.default_mix_height_mm must be > 0");
        }

        // Optimizer
        if self.optimizer.top_k == 0 {
            eyre::bail!("optimizer.top_k must be >= 1");
        }
        let g = self.optimizer.grid_steps;
        if g.mix_cycles == 0 || g.mix_volume == 0 || g.mix_height == 0 {
            eyre::bail!("optimizer.grid_steps entries must be >= 1");
        }
        if self
            .optimizer
            .reference_well
            .as_deref()
            .is_some_and(|w| w.trim().is_empty())
        {
            eyre::bail!("optimizer.reference_well must not be empty");
        }

        // Ranges
        check_range("mix_cycles", self.parameter_ranges.mix_cycles)?;
        check_range("mix_volume", self.parameter_ranges.mix_volume)?;
        check_range("mix_height", self.parameter_ranges.mix_height)?;

        // Data
        let mut ids: Vec<u32> = self.data.batches.iter().map(|b| b.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            eyre::bail!("data.batches ids must be unique");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
