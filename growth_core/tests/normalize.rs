mod common;

use common::*;
use growth_core::{
    AnalysisError, NormalizerCfg, Observation, RawReading, Stage, normalize, normalize_readings,
};

#[test]
fn sorts_and_zeroes_time() {
    let mut obs = exponential(0.15, 0.3, 12, 0.25);
    obs.reverse();
    let s = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let pts = s.points();
    assert_eq!(pts.len(), 12);
    assert_eq!(pts[0].elapsed_hours, 0.0);
    assert!(pts.windows(2).all(|w| w[0].elapsed_hours <= w[1].elapsed_hours));
    assert!((pts[11].elapsed_hours - 2.75).abs() < 1e-9);
    assert!((s.span_hours() - 2.75).abs() < 1e-9);
}

#[test]
fn noise_floor_is_exclusive() {
    let mut obs = constant(0.3, 10, 0.1);
    obs.push(Observation {
        timestamp: at_hours(-1.0),
        optical_density: 0.1,
    });
    obs.push(Observation {
        timestamp: at_hours(-2.0),
        optical_density: 0.02,
    });
    let s = normalize(&obs, &NormalizerCfg::default()).unwrap();
    assert_eq!(s.len(), 10);
    assert!(s.points().iter().all(|p| p.optical_density > 0.1));
    // time zero is the first surviving reading
    assert_eq!(s.points()[0].elapsed_hours, 0.0);
}

#[test]
fn permissive_floor_keeps_low_readings() {
    let obs = constant(0.08, 10, 0.1);
    let cfg = NormalizerCfg {
        noise_floor_od: 0.05,
        ..NormalizerCfg::default()
    };
    assert_eq!(normalize(&obs, &cfg).unwrap().len(), 10);
}

#[test]
fn too_few_points_is_insufficient() {
    let obs = constant(0.3, 9, 0.1);
    let err = normalize(&obs, &NormalizerCfg::default()).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InsufficientData {
            stage: Stage::Normalize,
            needed: 10,
            got: 9
        }
    );
}

#[test]
fn empty_input_is_insufficient() {
    assert!(matches!(
        normalize(&[], &NormalizerCfg::default()),
        Err(AnalysisError::InsufficientData { got: 0, .. })
    ));
}

#[test]
fn duplicate_timestamps_keep_input_order() {
    let mut obs = constant(0.3, 10, 0.1);
    obs.push(Observation {
        timestamp: at_hours(0.5),
        optical_density: 0.31,
    });
    obs.push(Observation {
        timestamp: at_hours(0.5),
        optical_density: 0.32,
    });
    let s = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let at_half: Vec<f64> = s
        .points()
        .iter()
        .filter(|p| (p.elapsed_hours - 0.5).abs() < 1e-9)
        .map(|p| p.optical_density)
        .collect();
    assert_eq!(at_half, vec![0.3, 0.31, 0.32]);
}

#[test]
fn unparseable_readings_are_dropped() {
    let mut readings = raw(&constant(0.3, 10, 0.1));
    readings.push(RawReading::new("not a time", "0.4"));
    readings.push(RawReading::new("2024-05-01T09:00:00Z", "overflow"));
    readings.push(RawReading::new("2024-05-01 09:30:00", "NaN"));
    let s = normalize_readings(&readings, &NormalizerCfg::default()).unwrap();
    assert_eq!(s.len(), 10);
}

#[test]
fn mixed_timestamp_layouts_share_one_clock() {
    let readings: Vec<RawReading> = [
        ("2024-05-01T08:00:00Z", "0.2"),
        ("2024-05-01 08:30:00", "0.2"),
        ("2024-05-01T10:00:00+01:00", "0.2"),
        ("2024-05-01T09:30:00.000", "0.2"),
    ]
    .iter()
    .map(|(t, od)| RawReading::new(*t, *od))
    .collect();
    let cfg = NormalizerCfg {
        min_points: 4,
        ..NormalizerCfg::default()
    };
    let s = normalize_readings(&readings, &cfg).unwrap();
    let hours: Vec<f64> = s.points().iter().map(|p| p.elapsed_hours).collect();
    assert_eq!(hours, vec![0.0, 0.5, 1.0, 1.5]);
}
