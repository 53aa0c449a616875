//! JSON export of a plate analysis.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use eyre::WrapErr;
use serde::Serialize;

use crate::atomic::write_atomic;
use crate::config::{AnalysisCfg, Objective, ParameterRanges};
use crate::correlation::CorrelationMatrix;
use crate::error::AnalysisError;
use crate::optimizer::OptimalParameterEstimate;
use crate::pipeline::{PlateAnalysis, WellAnalysis};
use crate::types::{WellParameters, WellPerformanceRecord};

/// One row of the best-wells table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWell {
    pub rank: usize,
    pub well_id: String,
    pub parameters: WellParameters,
    pub growth_score: f64,
    pub slope: f64,
    pub r_squared: f64,
    pub doubling_time_h: f64,
    pub density_efficiency: f64,
    pub avg_od: f64,
    /// e.g. "3.5-9.0h"
    pub time_range: String,
}

impl BestWell {
    fn from_record(rank: usize, r: &WellPerformanceRecord) -> Self {
        Self {
            rank,
            well_id: r.well_id.clone(),
            parameters: r.parameters,
            growth_score: r.growth.score,
            slope: r.growth.slope,
            r_squared: r.growth.r_squared,
            doubling_time_h: r.growth.doubling_time,
            density_efficiency: r.growth.density_efficiency,
            avg_od: r.growth.avg_od,
            time_range: r.growth.time_range(),
        }
    }
}

/// Where a chosen reference well placed among the optimized wells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceWell {
    pub well_id: String,
    /// The well had a growth phase and resolved parameters.
    pub found: bool,
    /// 1-based position in the objective ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<BestWell>,
}

impl ReferenceWell {
    fn locate(well_id: &str, analysis: &PlateAnalysis) -> Self {
        let hit = analysis
            .records
            .iter()
            .enumerate()
            .find(|(_, r)| r.well_id == well_id);
        match hit {
            Some((i, r)) => Self {
                well_id: well_id.to_string(),
                found: true,
                rank: Some(i + 1),
                performance: Some(BestWell::from_record(i + 1, r)),
            },
            None => Self {
                well_id: well_id.to_string(),
                found: false,
                rank: None,
                performance: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// RFC 3339
    pub generated_at: String,
    pub objective: Objective,
    pub wells_analyzed: usize,
    pub wells_with_growth_phase: usize,
    pub unresolved_wells: Vec<String>,
    pub best_wells: Vec<BestWell>,
    pub well_outcomes: Vec<WellAnalysis>,
    pub correlations: CorrelationMatrix,
    pub optimal_parameters: Option<OptimalParameterEstimate>,
    pub group_optimum: Option<OptimalParameterEstimate>,
    pub model_optimum: Option<OptimalParameterEstimate>,
    pub parameter_ranges: ParameterRanges,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_well: Option<ReferenceWell>,
}

impl AnalysisReport {
    pub fn from_analysis(analysis: &PlateAnalysis, cfg: &AnalysisCfg, generated_at: DateTime<Utc>) -> Self {
        let best_wells = analysis
            .records
            .iter()
            .take(cfg.optimizer.best_wells)
            .enumerate()
            .map(|(i, r)| BestWell::from_record(i + 1, r))
            .collect();
        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            objective: analysis.objective,
            wells_analyzed: analysis.wells.len(),
            wells_with_growth_phase: analysis.wells_with_growth_phase(),
            unresolved_wells: analysis.unresolved.clone(),
            best_wells,
            well_outcomes: analysis.wells.clone(),
            correlations: analysis.correlations.clone(),
            optimal_parameters: analysis.top_k.clone(),
            group_optimum: analysis.group.clone(),
            model_optimum: analysis.model.clone(),
            parameter_ranges: cfg.ranges,
            reference_well: cfg
                .optimizer
                .reference_well
                .as_deref()
                .map(|id| ReferenceWell::locate(id, analysis)),
        }
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).wrap_err("serialize analysis report")
    }
}

/// Write `report` as pretty JSON, replacing `path` atomically.
pub fn write_report(path: &Path, report: &AnalysisReport) -> crate::Result<()> {
    let mut json = report.to_json_pretty()?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
        .map_err(|e| AnalysisError::Io(format!("write report {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}
