//! Ordinary least squares for a single predictor.

/// Result of a simple linear fit `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// 1 − SS_res/SS_tot, or 0 when `y` has no variance.
    pub r_squared: f64,
    pub n: usize,
}

/// Fit `y` on `x` by closed-form OLS.
///
/// Returns `None` for mismatched or too-short inputs and when
/// `nΣx² − (Σx)²` is zero (all `x` equal).
pub fn least_squares(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 2 || n != y.len() {
        return None;
    }
    let nf = n as f64;
    let (mut sx, mut sy, mut sxy, mut sxx) = (0.0, 0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        sx += xi;
        sy += yi;
        sxy += xi * yi;
        sxx += xi * xi;
    }
    let denom = nf * sxx - sx * sx;
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    let slope = (nf * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / nf;

    let y_mean = sy / nf;
    let (mut ss_res, mut ss_tot) = (0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let r = yi - (slope * xi + intercept);
        ss_res += r * r;
        let d = yi - y_mean;
        ss_tot += d * d;
    }
    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}
