mod common;

use assert_cmd::Command;
use serde_json::Value;

use common::{BATCH_1, BATCH_2, write_file, write_plate};

fn run_report() -> Value {
    run_report_with("[optimizer]\nbest_wells = 1\n")
}

fn run_report_with(config: &str) -> Value {
    let tmp = tempfile::tempdir().unwrap();
    let wells = tmp.path().join("wells");
    std::fs::create_dir(&wells).unwrap();
    write_plate(&wells);
    let b1 = write_file(tmp.path(), "params_batch1.csv", BATCH_1);
    let b2 = write_file(tmp.path(), "params_batch2.csv", BATCH_2);
    let cfg = write_file(tmp.path(), "growth.toml", config);
    let report = tmp.path().join("report.json");

    Command::cargo_bin("growth")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .arg("analyze")
        .arg("--wells-dir")
        .arg(&wells)
        .arg("--batch")
        .arg(format!("1={}", b1.display()))
        .arg("--batch")
        .arg(format!("2={}", b2.display()))
        .arg("--output")
        .arg(&report)
        .assert()
        .success();

    let text = std::fs::read_to_string(&report).unwrap();
    assert!(text.ends_with('\n'));
    serde_json::from_str(&text).unwrap()
}

#[test]
fn report_top_level_fields() {
    let v = run_report();
    for key in [
        "generated_at",
        "objective",
        "wells_analyzed",
        "wells_with_growth_phase",
        "unresolved_wells",
        "best_wells",
        "well_outcomes",
        "correlations",
        "optimal_parameters",
        "group_optimum",
        "model_optimum",
        "parameter_ranges",
    ] {
        assert!(v.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(v["objective"], "growth_score");
    assert!(v["generated_at"].as_str().unwrap().ends_with('Z'));
    assert_eq!(v["unresolved_wells"], serde_json::json!(["C1"]));
    assert_eq!(v["parameter_ranges"]["mix_volume"]["max"], 150.0);
}

#[test]
fn well_outcomes_are_tagged_and_sorted() {
    let v = run_report();
    let outcomes = v["well_outcomes"].as_array().unwrap();
    let ids: Vec<&str> = outcomes
        .iter()
        .map(|o| o["well_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["A1", "A2", "B1", "C1"]);
    assert_eq!(outcomes[0]["outcome"], "detected");
    assert_eq!(outcomes[2]["outcome"], "no_growth_phase");
    assert_eq!(outcomes[2]["points"], 60);
}

#[test]
fn best_wells_respect_limit_and_later_batches_win() {
    let v = run_report();
    let best = v["best_wells"].as_array().unwrap();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0]["rank"], 1);
    // A1 grows fastest; its parameters come from batch 2.
    assert_eq!(best[0]["well_id"], "A1");
    assert_eq!(best[0]["parameters"]["mix_cycles"], 6);
    assert_eq!(best[0]["parameters"]["mix_volume"], 120.0);
    assert_eq!(best[0]["parameters"]["mix_height"], 3.0);
    assert!(best[0]["time_range"].as_str().unwrap().ends_with('h'));
}

#[test]
fn top_k_estimate_uses_resolved_wells() {
    let v = run_report();
    let est = &v["optimal_parameters"];
    assert_eq!(est["strategy"], "top_k_average");
    assert_eq!(est["wells_considered"], 2);
    // Two records with constant height: too few for the linear model.
    assert!(v["model_optimum"].is_null());
}

#[test]
fn reference_well_is_echoed_with_rank() {
    let v = run_report_with("[optimizer]\nbest_wells = 1\nreference_well = \"A2\"\n");
    let r = &v["reference_well"];
    assert_eq!(r["well_id"], "A2");
    assert_eq!(r["found"], true);
    assert_eq!(r["rank"], 2);
    assert_eq!(r["performance"]["parameters"]["mix_cycles"], 5);
    assert_eq!(r["performance"]["parameters"]["mix_height"], 3.0);

    let v = run_report_with("[optimizer]\nreference_well = \"C1\"\n");
    assert_eq!(v["reference_well"]["found"], false);
    assert!(v["reference_well"].get("rank").is_none());
}
