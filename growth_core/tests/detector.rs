mod common;

use common::*;
use growth_core::detector::median_sample_interval;
use growth_core::{
    DetectorCfg, GrowthPhaseDetector, NormalizerCfg, detect_growth_phase, normalize,
};
use rstest::rstest;
use std::f64::consts::LN_2;

fn assert_passes_filters(w: &growth_core::GrowthWindow, cfg: &DetectorCfg) {
    assert!(w.avg_od >= cfg.density_band.0 && w.avg_od <= cfg.density_band.1);
    assert!(w.increase_ratio >= cfg.min_increase_ratio);
    assert!(w.slope > 0.0);
    assert!(w.r_squared > cfg.min_r_squared);
    assert!(w.score > 0.0);
    assert!(w.points >= 5);
    assert!(w.start_hour < w.end_hour);
    assert!(w.min_od <= w.avg_od && w.avg_od <= w.max_od);
}

/// 20 samples rising 0.1 → 0.5 as a pure exponential over `span_h` hours.
#[rstest]
#[case::five_minute_spacing(19.0 * 5.0 / 60.0)]
#[case::six_hours(6.0)]
fn pure_exponential_recovers_rate(#[case] span_h: f64) {
    let k = 5.0_f64.ln() / span_h;
    let obs = exponential(0.1, k, 20, span_h / 19.0);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let cfg = DetectorCfg::default();

    let w = detect_growth_phase(&series, &cfg).expect("growth phase");
    assert!((w.slope - k).abs() / k < 0.05, "slope {} vs k {k}", w.slope);
    assert!(w.r_squared > 0.99);
    assert_passes_filters(&w, &cfg);
}

#[test]
fn flat_series_has_no_growth_phase() {
    let series = normalize(&constant(0.3, 20, 5.0 / 60.0), &NormalizerCfg::default()).unwrap();
    assert!(GrowthPhaseDetector::default().detect(&series).is_none());
}

#[test]
fn declining_series_has_no_growth_phase() {
    let obs = exponential(0.55, -0.3, 30, 0.2);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    assert!(GrowthPhaseDetector::default().detect(&series).is_none());
}

#[test]
fn saturated_series_outside_band_has_no_growth_phase() {
    // Growing, but every window averages above 0.6.
    let obs = exponential(0.9, 0.2, 30, 0.1);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    assert!(GrowthPhaseDetector::default().detect(&series).is_none());

    let loose = DetectorCfg {
        density_band: (0.2, 2.0),
        target_od: 1.2,
        ..DetectorCfg::default()
    };
    assert!(detect_growth_phase(&series, &loose).is_some());
}

#[test]
fn capped_window_reports_scanned_span() {
    // 10 h at 5 min; only the 8 h candidate is offered and it is capped at 60 points.
    let obs = exponential(0.12, 0.15, 121, 5.0 / 60.0);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let cfg = DetectorCfg {
        window_hours: vec![8.0],
        ..DetectorCfg::default()
    };
    let w = detect_growth_phase(&series, &cfg).expect("growth phase");
    assert_eq!(w.points, 60);
    assert_eq!(w.requested_hours, 8.0);
    assert!((w.window_hours - 59.0 * 5.0 / 60.0).abs() < 1e-9);
    assert!((w.window_hours - (w.end_hour - w.start_hour)).abs() < 1e-12);
}

#[test]
fn strict_thresholds_accept_denser_cultures() {
    // Windows average about 0.68: above the default band, inside the strict one.
    let obs = exponential(0.62, 0.1, 40, 0.1);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    assert!(GrowthPhaseDetector::default().detect(&series).is_none());

    let strict = DetectorCfg::strict();
    let w = detect_growth_phase(&series, &strict).expect("growth phase");
    assert!(w.avg_od > 0.6);
    assert_passes_filters(&w, &strict);
}

#[test]
fn doubling_time_is_ln2_over_slope() {
    let obs = exponential(0.12, 0.35, 60, 0.1);
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let w = GrowthPhaseDetector::default().detect(&series).unwrap();
    assert!((w.doubling_time - LN_2 / w.slope).abs() < 1e-12);
    assert!((w.slope - 0.35).abs() < 1e-6);
}

#[test]
fn picks_exponential_segment_of_a_growth_curve() {
    // lag at 0.12, exponential from 2 h to 6 h, then a plateau at the reached OD.
    let step = 5.0 / 60.0;
    let k = 0.4;
    let obs: Vec<_> = (0..121)
        .map(|i| {
            let t = i as f64 * step;
            let od = 0.12 * (k * (t - 2.0).clamp(0.0, 4.0)).exp();
            growth_core::Observation {
                timestamp: at_hours(t),
                optical_density: od,
            }
        })
        .collect();
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let cfg = DetectorCfg::default();
    let w = detect_growth_phase(&series, &cfg).unwrap();
    assert_passes_filters(&w, &cfg);
    assert!(w.start_hour >= 2.0 - 1e-9 && w.end_hour <= 6.0 + 1e-9, "{}", w.time_range());
    assert!((w.slope - k).abs() < 1e-6);
}

#[test]
fn noisy_windows_respect_configured_r_squared() {
    // Alternating jitter on top of slow growth.
    let obs: Vec<_> = exponential(0.25, 0.05, 40, 0.1)
        .into_iter()
        .enumerate()
        .map(|(i, mut o)| {
            o.optical_density *= if i % 2 == 0 { 1.15 } else { 0.87 };
            o
        })
        .collect();
    let series = normalize(&obs, &NormalizerCfg::default()).unwrap();
    let cfg = DetectorCfg {
        min_r_squared: 0.95,
        ..DetectorCfg::default()
    };
    if let Some(w) = detect_growth_phase(&series, &cfg) {
        assert_passes_filters(&w, &cfg);
    }
}

#[test]
fn median_interval_matches_sampling() {
    let series = normalize(&constant(0.3, 13, 0.25), &NormalizerCfg::default()).unwrap();
    let m = median_sample_interval(&series).unwrap();
    assert!((m - 0.25).abs() < 1e-9);
}
