//! Plate-level orchestration: normalize and detect every well, join with the
//! parameter map, then run correlation and every optimizer strategy.

use serde::Serialize;

use crate::config::{AnalysisCfg, Objective};
use crate::correlation::CorrelationMatrix;
use crate::detector::GrowthPhaseDetector;
use crate::error::AnalysisError;
use crate::mapper::ParameterMap;
use crate::model::{GrowthModel, LinearGrowthModel};
use crate::normalize::normalize_readings;
use crate::optimizer::{
    OptimalParameterEstimate, group_search, model_grid_search, rank_records, top_k_average,
};
use crate::types::{GrowthWindow, RawReading, WellPerformanceRecord};

/// Raw readings of one well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellSeries {
    pub well_id: String,
    pub readings: Vec<RawReading>,
}

impl WellSeries {
    pub fn new(well_id: impl Into<String>, readings: Vec<RawReading>) -> Self {
        Self {
            well_id: well_id.into(),
            readings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WellOutcome {
    Detected(GrowthWindow),
    /// Enough data, but no window passed every filter.
    NoGrowthPhase { points: usize },
    InsufficientData { needed: usize, got: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WellAnalysis {
    pub well_id: String,
    #[serde(flatten)]
    pub outcome: WellOutcome,
}

impl WellAnalysis {
    pub fn growth(&self) -> Option<&GrowthWindow> {
        match &self.outcome {
            WellOutcome::Detected(w) => Some(w),
            _ => None,
        }
    }
}

/// Everything learned from one plate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateAnalysis {
    pub objective: Objective,
    /// Sorted by well id.
    pub wells: Vec<WellAnalysis>,
    /// Wells with parameters and a growth phase, best objective first.
    pub records: Vec<WellPerformanceRecord>,
    /// Detected wells missing from the parameter map.
    pub unresolved: Vec<String>,
    pub correlations: CorrelationMatrix,
    pub top_k: Option<OptimalParameterEstimate>,
    pub group: Option<OptimalParameterEstimate>,
    pub model: Option<OptimalParameterEstimate>,
}

impl PlateAnalysis {
    pub fn wells_with_growth_phase(&self) -> usize {
        self.wells.iter().filter(|w| w.growth().is_some()).count()
    }
}

/// Normalize and detect a single well.
pub fn analyze_well(series: &WellSeries, cfg: &AnalysisCfg) -> WellAnalysis {
    let outcome = match normalize_readings(&series.readings, &cfg.normalizer) {
        Ok(normalized) => match GrowthPhaseDetector::new(cfg.detector.clone()).detect(&normalized) {
            Some(window) => WellOutcome::Detected(window),
            None => WellOutcome::NoGrowthPhase {
                points: normalized.len(),
            },
        },
        Err(AnalysisError::InsufficientData { needed, got, .. }) => {
            WellOutcome::InsufficientData { needed, got }
        }
        Err(other) => {
            tracing::warn!(well = %series.well_id, error = %other, "normalization failed");
            WellOutcome::InsufficientData {
                needed: cfg.normalizer.min_points,
                got: 0,
            }
        }
    };

    match &outcome {
        WellOutcome::Detected(w) => tracing::info!(
            well = %series.well_id,
            slope = w.slope,
            r_squared = w.r_squared,
            doubling_time_h = w.doubling_time,
            time_range = %w.time_range(),
            "growth phase detected"
        ),
        WellOutcome::NoGrowthPhase { points } => {
            tracing::warn!(well = %series.well_id, points, "no growth phase")
        }
        WellOutcome::InsufficientData { needed, got } => {
            tracing::warn!(well = %series.well_id, needed, got, "insufficient data")
        }
    }

    WellAnalysis {
        well_id: series.well_id.clone(),
        outcome,
    }
}

#[cfg(feature = "parallel")]
fn analyze_wells(wells: &[WellSeries], cfg: &AnalysisCfg) -> Vec<WellAnalysis> {
    use rayon::prelude::*;
    wells.par_iter().map(|w| analyze_well(w, cfg)).collect()
}

#[cfg(not(feature = "parallel"))]
fn analyze_wells(wells: &[WellSeries], cfg: &AnalysisCfg) -> Vec<WellAnalysis> {
    wells.iter().map(|w| analyze_well(w, cfg)).collect()
}

/// Analyze a whole plate.
///
/// Optimizer failures do not abort the run: the affected estimate is `None`
/// and a warning is logged.
pub fn analyze_plate(wells: &[WellSeries], params: &ParameterMap, cfg: &AnalysisCfg) -> PlateAnalysis {
    let mut analyses = analyze_wells(wells, cfg);
    analyses.sort_by(|a, b| a.well_id.cmp(&b.well_id));

    let mut records = Vec::new();
    let mut unresolved = Vec::new();
    for a in &analyses {
        let Some(growth) = a.growth() else { continue };
        match params.resolve(&a.well_id) {
            Ok(p) => records.push(WellPerformanceRecord {
                well_id: a.well_id.clone(),
                parameters: *p,
                growth: *growth,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "well excluded from optimization");
                unresolved.push(a.well_id.clone());
            }
        }
    }

    let objective = cfg.optimizer.objective;
    let records: Vec<WellPerformanceRecord> = rank_records(&records, objective)
        .into_iter()
        .cloned()
        .collect();
    let correlations = CorrelationMatrix::from_records(&records);

    let top_k = settle("top-k", top_k_average(&records, objective, cfg.optimizer.top_k));
    let group = settle("group search", group_search(&records, objective));
    let model = if cfg.optimizer.model_grid {
        let mut m = LinearGrowthModel::default();
        let est = settle(
            "model grid search",
            model_grid_search(
                &records,
                objective,
                &cfg.ranges,
                cfg.optimizer.grid_steps,
                &mut m,
            ),
        );
        if est.is_some() {
            tracing::debug!(
                coefficients = ?m.coefficients(),
                r_squared = m.r_squared(),
                "linear model fitted"
            );
        }
        est
    } else {
        None
    };

    tracing::info!(
        wells = analyses.len(),
        with_growth = analyses.iter().filter(|w| w.growth().is_some()).count(),
        optimized = records.len(),
        unresolved = unresolved.len(),
        "plate analysis complete"
    );

    PlateAnalysis {
        objective,
        wells: analyses,
        records,
        unresolved,
        correlations,
        top_k,
        group,
        model,
    }
}

fn settle(
    strategy: &str,
    result: Result<OptimalParameterEstimate, AnalysisError>,
) -> Option<OptimalParameterEstimate> {
    match result {
        Ok(est) => {
            tracing::info!(
                strategy,
                mix_cycles = est.mix_cycles,
                mix_volume = est.mix_volume,
                mix_height = est.mix_height,
                predicted = est.predicted,
                confidence = est.confidence,
                "optimal parameters"
            );
            Some(est)
        }
        Err(e) => {
            tracing::warn!(strategy, error = %e, "optimizer produced no estimate");
            None
        }
    }
}
