//! Pearson correlation between mixing parameters and growth metrics.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{Metric, Parameter, WellPerformanceRecord};

/// Pearson correlation coefficient.
///
/// Pairs where either value is non-finite are dropped. Fewer than two clean
/// pairs, mismatched lengths or zero variance on either side give exactly 0.
/// The result is clamped to [-1, 1].
///
/// r = Σ[(xi - x̄)(yi - ȳ)] / sqrt(Σ(xi - x̄)² × Σ(yi - ȳ)²)
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() {
        return 0.0;
    }
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .collect();
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let (dx, dy) = (a - mean_x, b - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    (sxy / denominator).clamp(-1.0, 1.0)
}

/// Parameter × metric correlation table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CorrelationMatrix {
    cells: BTreeMap<Parameter, BTreeMap<Metric, f64>>,
}

impl CorrelationMatrix {
    /// Correlate every parameter with every metric over `records`.
    pub fn from_records(records: &[WellPerformanceRecord]) -> Self {
        let mut cells = BTreeMap::new();
        for parameter in Parameter::ALL {
            let xs: Vec<f64> = records.iter().map(|r| r.parameters.value(parameter)).collect();
            let row: BTreeMap<Metric, f64> = Metric::ALL
                .into_iter()
                .map(|metric| {
                    let ys: Vec<f64> = records.iter().map(|r| r.growth.metric(metric)).collect();
                    (metric, pearson(&xs, &ys))
                })
                .collect();
            cells.insert(parameter, row);
        }
        Self { cells }
    }

    /// Coefficient for one cell; 0 if the matrix was built from nothing.
    pub fn get(&self, parameter: Parameter, metric: Metric) -> f64 {
        self.cells
            .get(&parameter)
            .and_then(|row| row.get(&metric))
            .copied()
            .unwrap_or(0.0)
    }

    /// Parameter with the strongest absolute correlation to `metric`.
    /// Earlier parameters win ties; all-zero rows give `None`.
    pub fn strongest(&self, metric: Metric) -> Option<(Parameter, f64)> {
        Parameter::ALL
            .into_iter()
            .map(|p| (p, self.get(p, metric)))
            .filter(|(_, r)| *r != 0.0)
            .fold(None, |best, cur| match best {
                Some(b) if b.1.abs() >= cur.1.abs() => Some(b),
                _ => Some(cur),
            })
    }
}
