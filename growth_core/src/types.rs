//! Shared data model: readings, normalized series, growth windows and the
//! per-well parameter/performance records consumed by the optimizer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An unparsed reading as it arrives from the plate-reader export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReading {
    pub timestamp: String,
    pub absorbance: String,
}

impl RawReading {
    pub fn new(timestamp: impl Into<String>, absorbance: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            absorbance: absorbance.into(),
        }
    }
}

/// A parsed absorbance observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub optical_density: f64,
}

/// One point of a normalized series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    pub elapsed_hours: f64,
    pub optical_density: f64,
}

/// Time-zeroed, ascending, noise-filtered series for one well.
///
/// Only the normalizer constructs these, so `points()[0].elapsed_hours == 0.0`
/// and times never decrease.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSeries {
    points: Vec<SamplePoint>,
}

impl NormalizedSeries {
    pub(crate) fn from_sorted(points: Vec<SamplePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].elapsed_hours <= w[1].elapsed_hours));
        Self { points }
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total time covered by the series in hours.
    pub fn span_hours(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.elapsed_hours)
    }
}

/// The retained exponential-growth window of one well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthWindow {
    pub start_hour: f64,
    pub end_hour: f64,
    /// Specific growth rate: slope of ln(OD) per hour.
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub min_od: f64,
    pub max_od: f64,
    pub avg_od: f64,
    /// last OD / first OD within the window.
    pub increase_ratio: f64,
    /// ln(2) / slope, in hours.
    pub doubling_time: f64,
    pub density_efficiency: f64,
    /// slope × R² × density efficiency.
    pub score: f64,
    pub points: usize,
    /// Hours actually spanned, `end_hour - start_hour`.
    pub window_hours: f64,
    /// Candidate duration that produced this window. Larger than
    /// `window_hours` when the window was capped at half the series.
    pub requested_hours: f64,
}

impl GrowthWindow {
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::GrowthScore => self.score,
            Metric::Slope => self.slope,
            Metric::DoublingTime => self.doubling_time,
            Metric::DensityEfficiency => self.density_efficiency,
        }
    }

    /// "start-end" hour range with one decimal, e.g. "3.5-9.0h".
    pub fn time_range(&self) -> String {
        format!("{:.1}-{:.1}h", self.start_hour, self.end_hour)
    }
}

/// Mixing parameters that produced one well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WellParameters {
    pub mix_cycles: u32,
    /// µL
    pub mix_volume: f64,
    /// mm
    pub mix_height: f64,
    pub experiment_batch: u32,
}

impl WellParameters {
    pub fn value(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::MixCycles => f64::from(self.mix_cycles),
            Parameter::MixVolume => self.mix_volume,
            Parameter::MixHeight => self.mix_height,
        }
    }
}

/// A well with both resolved parameters and a detected growth phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellPerformanceRecord {
    pub well_id: String,
    pub parameters: WellParameters,
    pub growth: GrowthWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    MixCycles,
    MixVolume,
    MixHeight,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [
        Parameter::MixCycles,
        Parameter::MixVolume,
        Parameter::MixHeight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    GrowthScore,
    Slope,
    DoublingTime,
    DensityEfficiency,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::GrowthScore,
        Metric::Slope,
        Metric::DoublingTime,
        Metric::DensityEfficiency,
    ];
}
