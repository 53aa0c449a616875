#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Growth-curve analysis engine.
//!
//! Turns per-well OD600 absorbance series into growth-phase estimates and
//! relates them to the mixing parameters each well was passaged with.
//!
//! ## Architecture
//!
//! - **Normalization**: parse, noise-filter and time-zero readings (`normalize`)
//! - **Detection**: multi-scale log-linear window scan (`detector`)
//! - **Mapping**: batched parameter sheets to per-well parameters (`mapper`)
//! - **Optimization**: Pearson matrix, top-K, group and model grid search
//!   (`correlation`, `optimizer`, `model`)
//! - **Pipeline/Report**: plate orchestration and JSON export (`pipeline`, `report`)
//! - **Scheduling**: monitoring workflows through `growth_traits::WorkflowScheduler`
//!
//! Normalization, detection and optimization are pure functions of their
//! inputs; only `report::write_report` touches the filesystem.

pub mod atomic;
pub mod config;
pub mod conversions;
pub mod correlation;
pub mod detector;
pub mod error;
pub mod mapper;
pub mod mocks;
pub mod model;
pub mod normalize;
pub mod optimizer;
pub mod pipeline;
pub mod regression;
pub mod report;
pub mod scheduling;
pub mod types;
pub mod util;

pub use config::{
    AnalysisCfg, DetectorCfg, GridSteps, NormalizerCfg, Objective, OptimizerCfg, ParameterRanges,
    Range,
};
pub use correlation::{CorrelationMatrix, pearson};
pub use detector::{GrowthPhaseDetector, detect_growth_phase};
pub use error::{AnalysisError, Report, Result, Stage};
pub use mapper::{ParameterMap, ParameterRecord, ParameterTable};
pub use model::{GrowthModel, LinearGrowthModel};
pub use normalize::{normalize, normalize_readings};
pub use optimizer::{
    EstimateBasis, OptimalParameterEstimate, Strategy, group_search, model_grid_search,
    rank_records, top_k_average,
};
pub use pipeline::{PlateAnalysis, WellAnalysis, WellOutcome, WellSeries, analyze_plate, analyze_well};
pub use report::{AnalysisReport, BestWell, ReferenceWell, write_report};
pub use scheduling::{MonitoringPlan, schedule_monitoring};
pub use types::{
    GrowthWindow, Metric, NormalizedSeries, Observation, Parameter, RawReading, SamplePoint,
    WellParameters, WellPerformanceRecord,
};
