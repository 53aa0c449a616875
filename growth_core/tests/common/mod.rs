#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use growth_core::{GrowthWindow, Observation, RawReading, WellParameters, WellPerformanceRecord};

pub fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn at_hours(h: f64) -> DateTime<Utc> {
    t0() + Duration::milliseconds((h * 3_600_000.0).round() as i64)
}

/// `n` points of `od0·e^(k·t)` spaced `step_h` apart.
pub fn exponential(od0: f64, k: f64, n: usize, step_h: f64) -> Vec<Observation> {
    (0..n)
        .map(|i| {
            let t = i as f64 * step_h;
            Observation {
                timestamp: at_hours(t),
                optical_density: od0 * (k * t).exp(),
            }
        })
        .collect()
}

pub fn constant(od: f64, n: usize, step_h: f64) -> Vec<Observation> {
    (0..n)
        .map(|i| Observation {
            timestamp: at_hours(i as f64 * step_h),
            optical_density: od,
        })
        .collect()
}

pub fn raw(obs: &[Observation]) -> Vec<RawReading> {
    obs.iter()
        .map(|o| RawReading::new(o.timestamp.to_rfc3339(), o.optical_density.to_string()))
        .collect()
}

pub fn window(slope: f64, score: f64) -> GrowthWindow {
    GrowthWindow {
        start_hour: 1.0,
        end_hour: 3.0,
        slope,
        intercept: -2.0,
        r_squared: 0.98,
        min_od: 0.2,
        max_od: 0.5,
        avg_od: 0.35,
        increase_ratio: 2.5,
        doubling_time: std::f64::consts::LN_2 / slope,
        density_efficiency: 0.875,
        score,
        points: 12,
        window_hours: 2.0,
        requested_hours: 2.0,
    }
}

pub fn params(cycles: u32, volume: f64, height: f64) -> WellParameters {
    WellParameters {
        mix_cycles: cycles,
        mix_volume: volume,
        mix_height: height,
        experiment_batch: 1,
    }
}

pub fn record(well: &str, p: WellParameters, slope: f64) -> WellPerformanceRecord {
    WellPerformanceRecord {
        well_id: well.to_string(),
        parameters: p,
        growth: window(slope, slope * 0.9),
    }
}
