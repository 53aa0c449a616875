//! Optimal mixing-parameter search over well performance records.
//!
//! Three strategies share one result type:
//! - top-K averaging of the best observed wells,
//! - exact-tuple group search over observed wells,
//! - grid search over a fitted [`GrowthModel`]'s predictions.
//!
//! None of these is Bayesian optimization; the model strategy is labeled
//! [`EstimateBasis::ModelPrediction`] so callers can tell it apart from
//! observed data.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::f64::consts::LN_2;

use serde::Serialize;

use crate::config::{GridSteps, Objective, ParameterRanges};
use crate::error::AnalysisError;
use crate::model::{GrowthModel, features};
use crate::types::{Metric, WellPerformanceRecord};
use crate::util::{linspace, mean};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    TopKAverage,
    GroupSearch,
    ModelGrid,
}

/// Whether an estimate comes from measured wells or from a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateBasis {
    Observed,
    ModelPrediction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalParameterEstimate {
    pub strategy: Strategy,
    pub basis: EstimateBasis,
    pub objective: Metric,
    pub mix_cycles: f64,
    pub mix_volume: f64,
    pub mix_height: f64,
    /// Top-K: fraction of wells used. Group: group size. Model: training R².
    pub confidence: f64,
    /// Expected objective value at the proposed parameters.
    pub predicted: f64,
    /// ln 2 / predicted, only when optimizing the slope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_doubling_time_h: Option<f64>,
    pub wells_considered: usize,
}

fn doubling_time_for(objective: Objective, predicted: f64) -> Option<f64> {
    (objective == Objective::Slope && predicted > 0.0).then(|| LN_2 / predicted)
}

fn ensure_records(records: &[WellPerformanceRecord]) -> Result<(), AnalysisError> {
    if records.is_empty() {
        Err(AnalysisError::NoOptimization(
            "no wells with both parameters and a growth phase".into(),
        ))
    } else {
        Ok(())
    }
}

/// Records ordered by objective descending, ties by well id ascending.
pub fn rank_records(
    records: &[WellPerformanceRecord],
    objective: Objective,
) -> Vec<&WellPerformanceRecord> {
    let metric = objective.metric();
    let mut ranked: Vec<&WellPerformanceRecord> = records.iter().collect();
    ranked.sort_by(|a, b| {
        b.growth
            .metric(metric)
            .total_cmp(&a.growth.metric(metric))
            .then_with(|| a.well_id.cmp(&b.well_id))
    });
    ranked
}

/// Average the parameters of the `k` best wells.
pub fn top_k_average(
    records: &[WellPerformanceRecord],
    objective: Objective,
    k: usize,
) -> Result<OptimalParameterEstimate, AnalysisError> {
    ensure_records(records)?;
    if k == 0 {
        return Err(AnalysisError::Config("optimizer.top_k must be >= 1".into()));
    }
    let metric = objective.metric();
    let ranked = rank_records(records, objective);
    let top = &ranked[..k.min(ranked.len())];
    let n = top.len() as f64;

    let avg = |f: &dyn Fn(&WellPerformanceRecord) -> f64| top.iter().map(|r| f(r)).sum::<f64>() / n;
    let predicted = avg(&|r| r.growth.metric(metric));

    Ok(OptimalParameterEstimate {
        strategy: Strategy::TopKAverage,
        basis: EstimateBasis::Observed,
        objective: metric,
        mix_cycles: avg(&|r| f64::from(r.parameters.mix_cycles)),
        mix_volume: avg(&|r| r.parameters.mix_volume),
        mix_height: avg(&|r| r.parameters.mix_height),
        confidence: top.len() as f64 / records.len() as f64,
        predicted,
        predicted_doubling_time_h: doubling_time_for(objective, predicted),
        wells_considered: top.len(),
    })
}

/// Exact parameter tuple, used as an ordered group key.
/// Bit patterns of positive floats sort like the floats themselves.
type GroupKey = (u32, u64, u64);

/// Group wells by identical parameters and pick the best mean objective.
///
/// Ties keep the first group in ascending parameter order.
pub fn group_search(
    records: &[WellPerformanceRecord],
    objective: Objective,
) -> Result<OptimalParameterEstimate, AnalysisError> {
    ensure_records(records)?;
    let metric = objective.metric();

    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for r in records {
        let p = &r.parameters;
        groups
            .entry((p.mix_cycles, p.mix_volume.to_bits(), p.mix_height.to_bits()))
            .or_default()
            .push(r.growth.metric(metric));
    }

    let mut best: Option<(GroupKey, f64, usize)> = None;
    for (key, values) in &groups {
        let Some(avg) = mean(values) else { continue };
        let replace = match best {
            None => true,
            Some((_, b, _)) => avg.total_cmp(&b) == Ordering::Greater,
        };
        if replace {
            best = Some((*key, avg, values.len()));
        }
    }
    let Some(((cycles, volume, height), predicted, size)) = best else {
        return Err(AnalysisError::NoOptimization("no parameter groups".into()));
    };

    Ok(OptimalParameterEstimate {
        strategy: Strategy::GroupSearch,
        basis: EstimateBasis::Observed,
        objective: metric,
        mix_cycles: f64::from(cycles),
        mix_volume: f64::from_bits(volume),
        mix_height: f64::from_bits(height),
        confidence: size as f64,
        predicted,
        predicted_doubling_time_h: doubling_time_for(objective, predicted),
        wells_considered: size,
    })
}

/// Fit `model` on the records, then evaluate it on a grid over `ranges`.
///
/// Returns the grid point with the highest prediction; earlier points in
/// cycles → volume → height iteration order win ties.
pub fn model_grid_search<M: GrowthModel + ?Sized>(
    records: &[WellPerformanceRecord],
    objective: Objective,
    ranges: &ParameterRanges,
    steps: GridSteps,
    model: &mut M,
) -> Result<OptimalParameterEstimate, AnalysisError> {
    ensure_records(records)?;
    let metric = objective.metric();
    let x: Vec<_> = records.iter().map(|r| features(&r.parameters)).collect();
    let y: Vec<f64> = records.iter().map(|r| r.growth.metric(metric)).collect();
    model.fit(&x, &y)?;

    let cycles = linspace(ranges.mix_cycles.min, ranges.mix_cycles.max, steps.mix_cycles);
    let volumes = linspace(ranges.mix_volume.min, ranges.mix_volume.max, steps.mix_volume);
    let heights = linspace(ranges.mix_height.min, ranges.mix_height.max, steps.mix_height);

    let mut best: Option<([f64; 3], f64)> = None;
    for &c in &cycles {
        for &v in &volumes {
            for &h in &heights {
                let point = [c, v, h];
                let pred = model.predict(&point);
                if !pred.is_finite() {
                    continue;
                }
                if best.is_none_or(|(_, b)| pred > b) {
                    best = Some((point, pred));
                }
            }
        }
    }
    let Some(([c, v, h], predicted)) = best else {
        return Err(AnalysisError::NoOptimization("empty parameter grid".into()));
    };

    Ok(OptimalParameterEstimate {
        strategy: Strategy::ModelGrid,
        basis: EstimateBasis::ModelPrediction,
        objective: metric,
        mix_cycles: c,
        mix_volume: v,
        mix_height: h,
        confidence: model.r_squared().clamp(0.0, 1.0),
        predicted,
        predicted_doubling_time_h: doubling_time_for(objective, predicted),
        wells_considered: records.len(),
    })
}
