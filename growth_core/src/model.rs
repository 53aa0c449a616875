//! Surrogate models for predicting growth from mixing parameters.
//!
//! The optimizer's grid search evaluates a [`GrowthModel`] instead of the
//! observed wells. [`LinearGrowthModel`] fits
//! `objective ~ 1 + cycles + volume + height` by least squares.

use crate::error::AnalysisError;
use crate::types::{Parameter, WellParameters};

/// Feature vector in [`Parameter::ALL`] order.
pub type Features = [f64; 3];

pub fn features(p: &WellParameters) -> Features {
    Parameter::ALL.map(|param| p.value(param))
}

pub trait GrowthModel {
    /// Fit on paired feature rows and targets.
    fn fit(&mut self, x: &[Features], y: &[f64]) -> Result<(), AnalysisError>;

    /// Predicted objective at `x`. Meaningless before a successful `fit`.
    fn predict(&self, x: &Features) -> f64;

    /// Goodness of fit on the training data.
    fn r_squared(&self) -> f64;
}

/// Multivariate linear least squares on centered features.
///
/// Features that never vary in the training data get a zero coefficient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearGrowthModel {
    means: Features,
    coefficients: Features,
    intercept: f64,
    r_squared: f64,
}

const PIVOT_EPS: f64 = 1e-12;

impl LinearGrowthModel {
    pub fn coefficients(&self) -> Features {
        self.coefficients
    }
}

impl GrowthModel for LinearGrowthModel {
    fn fit(&mut self, x: &[Features], y: &[f64]) -> Result<(), AnalysisError> {
        let n = x.len();
        if n != y.len() {
            return Err(AnalysisError::NoOptimization(format!(
                "model fit: {n} feature rows but {} targets",
                y.len()
            )));
        }
        if n == 0 {
            return Err(AnalysisError::NoOptimization("model fit: no records".into()));
        }
        let nf = n as f64;

        let mut means = [0.0; 3];
        for row in x {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v / nf;
            }
        }
        let y_mean = y.iter().sum::<f64>() / nf;

        let active: Vec<usize> = (0..3)
            .filter(|&j| {
                let var = x.iter().map(|r| (r[j] - means[j]).powi(2)).sum::<f64>() / nf;
                var > PIVOT_EPS * (1.0 + means[j] * means[j])
            })
            .collect();
        let k = active.len();
        if k == 0 {
            return Err(AnalysisError::NoOptimization(
                "model fit: every parameter is constant across wells".into(),
            ));
        }
        if n < k + 2 {
            return Err(AnalysisError::NoOptimization(format!(
                "model fit: need at least {} wells for {k} varying parameters, got {n}",
                k + 2
            )));
        }

        // Normal equations on the centered active features.
        let mut a = vec![vec![0.0; k + 1]; k];
        for (row, &target) in x.iter().zip(y) {
            let z: Vec<f64> = active.iter().map(|&j| row[j] - means[j]).collect();
            let dy = target - y_mean;
            for i in 0..k {
                for j in 0..k {
                    a[i][j] += z[i] * z[j];
                }
                a[i][k] += z[i] * dy;
            }
        }
        let solved = solve(a).ok_or_else(|| {
            AnalysisError::NoOptimization("model fit: parameters are collinear".into())
        })?;

        let mut coefficients = [0.0; 3];
        for (&j, c) in active.iter().zip(solved) {
            coefficients[j] = c;
        }
        self.means = means;
        self.coefficients = coefficients;
        self.intercept = y_mean;

        let (mut ss_res, mut ss_tot) = (0.0, 0.0);
        for (row, &target) in x.iter().zip(y) {
            let r = target - self.predict(row);
            ss_res += r * r;
            ss_tot += (target - y_mean).powi(2);
        }
        self.r_squared = if ss_tot == 0.0 {
            0.0
        } else {
            1.0 - ss_res / ss_tot
        };
        Ok(())
    }

    fn predict(&self, x: &Features) -> f64 {
        self.intercept
            + (0..3)
                .map(|j| self.coefficients[j] * (x[j] - self.means[j]))
                .sum::<f64>()
    }

    fn r_squared(&self) -> f64 {
        self.r_squared
    }
}

/// Gaussian elimination with partial pivoting on an augmented `k × (k+1)`
/// matrix. `None` when a pivot vanishes.
fn solve(mut a: Vec<Vec<f64>>) -> Option<Vec<f64>> {
    let k = a.len();
    let scale = a
        .iter()
        .flat_map(|r| r[..k].iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }
    for col in 0..k {
        let pivot = (col..k).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() <= PIVOT_EPS * scale {
            return None;
        }
        a.swap(col, pivot);
        for row in col + 1..k {
            let f = a[row][col] / a[col][col];
            for c in col..=k {
                a[row][c] -= f * a[col][c];
            }
        }
    }
    let mut out = vec![0.0; k];
    for row in (0..k).rev() {
        let tail: f64 = (row + 1..k).map(|c| a[row][c] * out[c]).sum();
        out[row] = (a[row][k] - tail) / a[row][row];
    }
    Some(out)
}
