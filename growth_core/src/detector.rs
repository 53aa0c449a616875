//! Exponential growth-phase detection.
//!
//! The detector slides windows of several candidate durations over a
//! normalized series, fits `ln(od)` against time in each one, and keeps the
//! single window with the best `slope × R² × density_efficiency` score.
//!
//! A window is only scored when all of these hold:
//! - its average OD lies inside the density band,
//! - the last OD exceeds the first by at least `min_increase_ratio`,
//! - the log-linear fit has a positive slope and R² above `min_r_squared`.
//!
//! Returning `None` means "no growth phase", which is a normal outcome for
//! wells that never left lag phase or were already saturated.

use std::collections::BTreeSet;

use crate::config::DetectorCfg;
use crate::regression::least_squares;
use crate::types::{GrowthWindow, NormalizedSeries, SamplePoint};
use crate::util::median;

/// A log-linear fit needs this many points with positive density.
pub const MIN_LOG_POINTS: usize = 5;

/// Median of the positive gaps between consecutive samples, in hours.
pub fn median_sample_interval(series: &NormalizedSeries) -> Option<f64> {
    let gaps: Vec<f64> = series
        .points()
        .windows(2)
        .map(|w| w[1].elapsed_hours - w[0].elapsed_hours)
        .filter(|d| *d > 0.0)
        .collect();
    median(&gaps)
}

#[derive(Debug, Clone)]
pub struct GrowthPhaseDetector {
    cfg: DetectorCfg,
}

impl Default for GrowthPhaseDetector {
    fn default() -> Self {
        Self::new(DetectorCfg::default())
    }
}

impl GrowthPhaseDetector {
    pub fn new(cfg: DetectorCfg) -> Self {
        Self { cfg }
    }

    /// Points spanned by a window of `duration_h` for a series of `len`
    /// samples spaced `interval_h` apart.
    ///
    /// Floored at `min_window_points`, capped at half the series (but never
    /// below the floor) and at the series length.
    pub fn window_points(&self, duration_h: f64, interval_h: f64, len: usize) -> usize {
        let floor = self.cfg.min_window_points;
        let raw = if interval_h > 0.0 && duration_h.is_finite() {
            (duration_h / interval_h).round().max(0.0) as usize
        } else {
            floor
        };
        let cap = (len / 2).max(floor);
        raw.max(floor).min(cap).min(len)
    }

    /// Best-scoring growth window, or `None` when no window passes every filter.
    pub fn detect(&self, series: &NormalizedSeries) -> Option<GrowthWindow> {
        let points = series.points();
        let interval = median_sample_interval(series)?;

        let mut scanned = BTreeSet::new();
        let mut best: Option<GrowthWindow> = None;

        for &duration in &self.cfg.window_hours {
            let size = self.window_points(duration, interval, points.len());
            if size < MIN_LOG_POINTS || !scanned.insert(size) {
                continue;
            }
            for window in points.windows(size) {
                let Some(candidate) = self.evaluate(window, duration) else {
                    continue;
                };
                let better = match &best {
                    None => true,
                    Some(b) => {
                        candidate.score > b.score
                            || (candidate.score == b.score && candidate.start_hour < b.start_hour)
                    }
                };
                if better {
                    best = Some(candidate);
                }
            }
        }

        if let Some(w) = &best {
            tracing::debug!(
                start_h = w.start_hour,
                end_h = w.end_hour,
                slope = w.slope,
                r_squared = w.r_squared,
                score = w.score,
                "growth window selected"
            );
        }
        best
    }

    /// Apply every filter to one window and score it.
    fn evaluate(&self, window: &[SamplePoint], duration: f64) -> Option<GrowthWindow> {
        let (first, last) = (window.first()?, window.last()?);
        let cfg = &self.cfg;

        let ods = window.iter().map(|p| p.optical_density);
        let min_od = ods.clone().fold(f64::INFINITY, f64::min);
        let max_od = ods.clone().fold(f64::NEG_INFINITY, f64::max);
        let avg_od = ods.sum::<f64>() / window.len() as f64;

        let (band_lo, band_hi) = cfg.density_band;
        if !(band_lo..=band_hi).contains(&avg_od) {
            return None;
        }
        if last.optical_density <= first.optical_density || first.optical_density <= 0.0 {
            return None;
        }
        let increase_ratio = last.optical_density / first.optical_density;
        if increase_ratio < cfg.min_increase_ratio {
            return None;
        }

        let (x, y): (Vec<f64>, Vec<f64>) = window
            .iter()
            .filter(|p| p.optical_density > 0.0)
            .map(|p| (p.elapsed_hours, p.optical_density.ln()))
            .unzip();
        if x.len() < MIN_LOG_POINTS {
            return None;
        }
        let fit = least_squares(&x, &y)?;
        if fit.slope <= 0.0 || fit.r_squared <= cfg.min_r_squared {
            return None;
        }

        let density_efficiency = 1.0 - (avg_od - cfg.target_od).abs() / cfg.target_od;
        let score = fit.slope * fit.r_squared * density_efficiency;
        if !score.is_finite() || score <= 0.0 {
            return None;
        }

        Some(GrowthWindow {
            start_hour: first.elapsed_hours,
            end_hour: last.elapsed_hours,
            slope: fit.slope,
            intercept: fit.intercept,
            r_squared: fit.r_squared,
            min_od,
            max_od,
            avg_od,
            increase_ratio,
            doubling_time: std::f64::consts::LN_2 / fit.slope,
            density_efficiency,
            score,
            points: window.len(),
            window_hours: last.elapsed_hours - first.elapsed_hours,
            requested_hours: duration,
        })
    }
}

/// Convenience wrapper around [`GrowthPhaseDetector::detect`].
pub fn detect_growth_phase(series: &NormalizedSeries, cfg: &DetectorCfg) -> Option<GrowthWindow> {
    GrowthPhaseDetector::new(cfg.clone()).detect(series)
}
