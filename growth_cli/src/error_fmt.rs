//! Human-readable error descriptions, exit codes and structured JSON errors.

use std::fmt;

use growth_core::AnalysisError;

/// Context marking a configuration failure (exit code 3).
#[derive(Debug)]
pub struct ConfigFailure(pub String);

impl fmt::Display for ConfigFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context marking an input-data or filesystem failure (exit code 4).
#[derive(Debug)]
pub struct DataFailure(pub String);

impl fmt::Display for DataFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const EXIT_GENERIC: i32 = 1;
pub const EXIT_CONFIG: i32 = 3;
pub const EXIT_DATA: i32 = 4;

fn analysis_error(err: &eyre::Report) -> Option<&AnalysisError> {
    err.chain().find_map(|e| e.downcast_ref::<AnalysisError>())
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ae) = analysis_error(err) {
        return match ae {
            AnalysisError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nHow to fix: Edit the config file or command-line arguments, then rerun."
            ),
            AnalysisError::PlateUnavailable { barcode, reason } => format!(
                "What happened: Plate {barcode} is not available ({reason}).\nHow to fix: Check the plate location on the workcell, then schedule again."
            ),
            AnalysisError::Scheduler(msg) => format!(
                "What happened: The workflow backend rejected the request ({msg}).\nHow to fix: Re-run with --log-level=debug for details."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: Missing or malformed input data.\nHow to fix: Check the well and parameter CSVs."
            ),
        };
    }

    let msg = err.to_string();
    if err.downcast_ref::<ConfigFailure>().is_some() {
        let cause = err.root_cause().to_string();
        return if cause == msg {
            format!("What happened: Configuration is invalid.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again.")
        } else {
            format!(
                "What happened: Configuration is invalid ({msg}).\nDetails: {cause}\nHow to fix: Edit the TOML config and try again."
            )
        };
    }

    // CSV header special-case
    let lower = msg.to_ascii_lowercase();
    let root = err.root_cause().to_string();
    if root.contains("CSV must have headers") {
        return format!("Invalid headers in CSV: {root}");
    }

    if err.downcast_ref::<DataFailure>().is_some() {
        return format!("What happened: Could not read input data ({msg}).\nDetails: {root}\nHow to fix: Check the paths and file contents.");
    }

    if lower.contains("invalid configuration") {
        return format!("What happened: Configuration is invalid.\nDetails: {msg}\nHow to fix: Edit the TOML config and try again.");
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 configuration, 4 data/IO, 1 anything else.
/// Usage errors exit with 2 from clap before any of this runs.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<ConfigFailure>().is_some() {
        return EXIT_CONFIG;
    }
    if let Some(ae) = analysis_error(err) {
        return match ae {
            AnalysisError::Config(_) => EXIT_CONFIG,
            AnalysisError::InsufficientData { .. }
            | AnalysisError::UnresolvedWell(_)
            | AnalysisError::NoOptimization(_)
            | AnalysisError::Io(_) => EXIT_DATA,
            AnalysisError::PlateUnavailable { .. } | AnalysisError::Scheduler(_) => EXIT_GENERIC,
        };
    }
    if err.downcast_ref::<DataFailure>().is_some() {
        return EXIT_DATA;
    }
    EXIT_GENERIC
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<ConfigFailure>().is_some() {
        return "Config";
    }
    match analysis_error(err) {
        Some(AnalysisError::Config(_)) => "Config",
        Some(AnalysisError::InsufficientData { .. }) => "InsufficientData",
        Some(AnalysisError::UnresolvedWell(_)) => "UnresolvedWell",
        Some(AnalysisError::NoOptimization(_)) => "NoOptimization",
        Some(AnalysisError::PlateUnavailable { .. }) => "PlateUnavailable",
        Some(AnalysisError::Scheduler(_)) => "Scheduler",
        Some(AnalysisError::Io(_)) => "Io",
        None if err.downcast_ref::<DataFailure>().is_some() => "Data",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    });
    if let Some(AnalysisError::PlateUnavailable { barcode, reason }) = analysis_error(err) {
        obj["details"] = json!({ "barcode": barcode, "reason": reason });
    }
    obj.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn config_context_maps_to_exit_3() {
        let err: eyre::Report = Err::<(), _>(eyre::eyre!("detector.window_hours must not be empty"))
            .wrap_err(ConfigFailure("validate config".into()))
            .unwrap_err();
        assert_eq!(exit_code_for_error(&err), 3);
        assert!(humanize(&err).contains("window_hours"));
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Config");
        assert_eq!(v["exit_code"], 3);
    }

    #[test]
    fn data_context_maps_to_exit_4() {
        let err: eyre::Report = Err::<(), _>(eyre::eyre!("well CSV must have headers 'timestamp,absorbance_od600', missing: timestamp"))
            .wrap_err(DataFailure("load well".into()))
            .unwrap_err();
        assert_eq!(exit_code_for_error(&err), 4);
        assert!(humanize(&err).starts_with("Invalid headers in CSV"));
    }

    #[test]
    fn typed_analysis_errors() {
        let err = eyre::Report::new(AnalysisError::PlateUnavailable {
            barcode: "P1".into(),
            reason: "in incubator".into(),
        });
        assert_eq!(exit_code_for_error(&err), 1);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["details"]["barcode"], "P1");

        let err = eyre::Report::new(AnalysisError::NoOptimization("no wells".into()));
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn generic_errors_exit_1() {
        let err = eyre::eyre!("boom");
        assert_eq!(exit_code_for_error(&err), 1);
        assert!(humanize(&err).contains("boom"));
    }
}
