//! Subcommand implementations: input loading, plate analysis, single-well
//! detection and dry-run scheduling.

use std::path::{Path, PathBuf};

use eyre::WrapErr;
use growth_config::{BatchSource, Config};
use growth_core::mocks::DryRunScheduler;
use growth_core::{
    AnalysisCfg, AnalysisReport, MonitoringPlan, ParameterMap, ParameterRecord, ParameterTable,
    PlateAnalysis, RawReading, WellAnalysis, WellOutcome, WellSeries, analyze_plate, analyze_well,
    schedule_monitoring, write_report,
};

use crate::error_fmt::{ConfigFailure, DataFailure};

/// Load one well export into a [`WellSeries`].
pub fn load_well(well_id: &str, path: &Path) -> eyre::Result<WellSeries> {
    let csv = growth_config::load_well_csv(path)
        .wrap_err_with(|| DataFailure(format!("load well {well_id} from {}", path.display())))?;
    if csv.skipped > 0 {
        tracing::warn!(well = well_id, skipped = csv.skipped, "undecodable CSV rows skipped");
    }
    let readings: Vec<RawReading> = csv.rows.into_iter().map(RawReading::from).collect();
    Ok(WellSeries::new(well_id, readings))
}

/// Load every `well_<ID>_absorbance.csv` in `dir`. Unreadable files are
/// logged and skipped.
pub fn load_plate(dir: &Path) -> eyre::Result<Vec<WellSeries>> {
    let files = growth_config::discover_well_files(dir)
        .wrap_err_with(|| DataFailure(format!("scan wells directory {}", dir.display())))?;
    if files.is_empty() {
        return Err(eyre::eyre!(DataFailure(format!(
            "no well_<ID>_absorbance.csv files in {}",
            dir.display()
        ))));
    }
    let mut wells = Vec::with_capacity(files.len());
    for f in files {
        match load_well(&f.well_id, &f.path) {
            Ok(w) => wells.push(w),
            Err(e) => tracing::warn!(well = %f.well_id, error = %e.root_cause(), "well skipped"),
        }
    }
    tracing::info!(wells = wells.len(), dir = %dir.display(), "plate loaded");
    Ok(wells)
}

/// Read every batch sheet into a table keyed by batch id. Bad rows are
/// logged and left out; an unreadable sheet or missing headers fail the run.
pub fn load_parameter_table(batches: &[BatchSource]) -> eyre::Result<ParameterTable> {
    let mut table = ParameterTable::new();
    for b in batches {
        let sheet = growth_config::load_parameter_csv(&b.path).wrap_err_with(|| {
            DataFailure(format!("load batch {} from {}", b.id, b.path.display()))
        })?;
        for s in &sheet.skipped {
            tracing::warn!(
                batch = b.id,
                file = %b.path.display(),
                row = s.line,
                reason = %s.reason,
                "parameter row skipped"
            );
        }
        tracing::debug!(
            batch = b.id,
            rows = sheet.rows.len(),
            skipped = sheet.skipped.len(),
            "parameter batch loaded"
        );
        table
            .entry(b.id)
            .or_default()
            .extend(sheet.rows.into_iter().map(ParameterRecord::from));
    }
    Ok(table)
}

pub fn run_analyze(
    cfg: &Config,
    wells_dir: Option<PathBuf>,
    batches: Vec<(u32, PathBuf)>,
    output: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let wells_dir = wells_dir.or_else(|| cfg.data.wells_dir.clone()).ok_or_else(|| {
        eyre::eyre!(ConfigFailure(
            "no wells directory: pass --wells-dir or set data.wells_dir".into()
        ))
    })?;
    let batches: Vec<BatchSource> = if batches.is_empty() {
        cfg.data.batches.clone()
    } else {
        batches
            .into_iter()
            .map(|(id, path)| BatchSource { id, path })
            .collect()
    };
    if batches.is_empty() {
        tracing::warn!("no parameter batches configured; optimization will be skipped");
    }

    let wells = load_plate(&wells_dir)?;
    let table = load_parameter_table(&batches)?;
    let params = ParameterMap::build(&table, cfg.mapper.default_mix_height_mm)?;
    tracing::info!(wells = params.len(), batches = batches.len(), "parameters resolved");

    let analysis_cfg = AnalysisCfg::from(cfg);
    let analysis = analyze_plate(&wells, &params, &analysis_cfg);
    let report = AnalysisReport::from_analysis(&analysis, &analysis_cfg, chrono::Utc::now());

    match output {
        Some(path) => {
            write_report(path, &report)
                .wrap_err_with(|| DataFailure(format!("write report {}", path.display())))?;
            if json {
                println!("{}", serde_json::json!({ "report": path.display().to_string() }));
            } else {
                print_summary(&analysis, &report);
                println!("Report written to {}", path.display());
            }
        }
        None => println!("{}", report.to_json_pretty()?),
    }
    Ok(())
}

fn print_summary(analysis: &PlateAnalysis, report: &AnalysisReport) {
    println!(
        "{} wells analyzed, {} with a growth phase, {} used for optimization",
        report.wells_analyzed,
        report.wells_with_growth_phase,
        analysis.records.len()
    );
    for w in &report.best_wells {
        println!(
            "  #{} {:<4} slope {:.4}/h  R² {:.3}  doubling {:.2} h  {}  (cycles {}, {:.0} µL, {:.1} mm)",
            w.rank,
            w.well_id,
            w.slope,
            w.r_squared,
            w.doubling_time_h,
            w.time_range,
            w.parameters.mix_cycles,
            w.parameters.mix_volume,
            w.parameters.mix_height
        );
    }
    let strategies = [
        ("top-k average", &report.optimal_parameters),
        ("group search", &report.group_optimum),
        ("model grid", &report.model_optimum),
    ];
    for (name, est) in strategies {
        match est {
            Some(e) => println!(
                "  {name}: cycles {:.1}, volume {:.1} µL, height {:.2} mm (predicted {:.4}, confidence {:.2})",
                e.mix_cycles, e.mix_volume, e.mix_height, e.predicted, e.confidence
            ),
            None => println!("  {name}: no estimate"),
        }
    }
    if let Some(r) = &report.reference_well {
        match r.rank {
            Some(rank) => println!(
                "  reference {}: rank {rank} of {}",
                r.well_id,
                analysis.records.len()
            ),
            None => println!("  reference {}: not among optimized wells", r.well_id),
        }
    }
}

fn well_id_for(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    growth_config::tables::well_id_from_file_name(name)
        .map(str::to_string)
        .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
        .unwrap_or_else(|| "well".to_string())
}

pub fn run_detect(cfg: &Config, well: &Path, json: bool) -> eyre::Result<()> {
    let id = well_id_for(well);
    let series = load_well(&id, well)?;
    let analysis: WellAnalysis = analyze_well(&series, &AnalysisCfg::from(cfg));
    if json {
        println!("{}", serde_json::to_string(&analysis)?);
        return Ok(());
    }
    match &analysis.outcome {
        WellOutcome::Detected(w) => println!(
            "{id}: growth phase {} slope {:.4}/h, R² {:.3}, doubling time {:.2} h, OD {:.3}-{:.3}",
            w.time_range(),
            w.slope,
            w.r_squared,
            w.doubling_time,
            w.min_od,
            w.max_od
        ),
        WellOutcome::NoGrowthPhase { points } => {
            println!("{id}: no growth phase ({points} readings)");
        }
        WellOutcome::InsufficientData { needed, got } => {
            println!("{id}: insufficient data (need {needed} readings above the noise floor, got {got})");
        }
    }
    Ok(())
}

pub fn run_schedule(
    plate: &str,
    definition_id: u32,
    start_after_minutes: u32,
    json: bool,
) -> eyre::Result<()> {
    let plan = MonitoringPlan::absorbance(plate)
        .with_definition(definition_id)
        .starting_after(start_after_minutes);
    let mut scheduler = DryRunScheduler::new();
    let ticket = schedule_monitoring(&mut scheduler, &plan)?;
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ticket": ticket.id,
                "status": ticket.status,
                "requires_approval": ticket.requires_approval,
                "definition_id": plan.definition_id,
                "plate": plan.plate_barcode,
            })
        );
    } else {
        println!("Scheduled workflow {ticket} for plate {}", plan.plate_barcode);
        if ticket.requires_approval {
            println!("Operator approval is required before the workflow runs.");
        }
    }
    Ok(())
}
