//! Trend Module
//! First-degree least-squares trend line over an indexed series.

use statrs::statistics::Statistics;

/// Fewest non-missing points a trend is fitted to.
pub const MIN_TREND_POINTS: usize = 3;

/// Fitted line `value = slope * index + intercept`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    /// Line evaluated at every index of the input series.
    pub fitted: Vec<f64>,
}

/// Fit a line to `values` at indices `0..n`, skipping missing entries.
///
/// Returns `None` with fewer than three non-missing points.
pub fn linear_trend(values: &[Option<f64>]) -> Option<LinearTrend> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (i as f64, v)))
        .unzip();

    if xs.len() < MIN_TREND_POINTS {
        return None;
    }

    let x_var = Statistics::variance(&xs);
    if x_var == 0.0 || !x_var.is_finite() {
        return None;
    }
    let slope = Statistics::covariance(&xs, &ys) / x_var;
    let intercept = Statistics::mean(&ys) - slope * Statistics::mean(&xs);

    let fitted = (0..values.len())
        .map(|i| slope * i as f64 + intercept)
        .collect();
    Some(LinearTrend {
        slope,
        intercept,
        fitted,
    })
}
