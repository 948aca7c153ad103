//! Drift engine.
//!
//! Smooths every analysis metric with a trailing rolling mean, then measures
//! each sample against the baseline: a z-score per metric and one
//! Mahalanobis distance for the whole metric vector. The output has exactly
//! one entry per input sample.

use tracing::{debug, info};

use crate::baseline::BaselineModel;
use crate::config::AnalysisConfig;
use crate::error::{FatigueError, Result};
use crate::rolling::rolling_mean;
use crate::series::TimeSeries;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-sample drift measures, aligned positionally with the input series.
///
/// Per-metric vectors are indexed `[metric][sample]` in the order of
/// [`DriftSeries::metric_names`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriftSeries {
    /// Analysis metric names.
    pub metric_names: Vec<String>,
    /// Rolling window length used, in samples.
    pub window: usize,
    /// Rolling mean of each metric.
    pub rolling: Vec<Vec<f64>>,
    /// Rolling-mean z-score of each metric. NaN where the baseline has no
    /// spread for the metric or the rolling mean is undefined.
    pub z_scores: Vec<Vec<f64>>,
    /// Mahalanobis distance of the rolling-mean vector from the baseline
    /// centroid. `0.0` where the vector is incomplete.
    pub distances: Vec<f64>,
}

impl DriftSeries {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Whether the series is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Number of analysis metrics.
    #[must_use]
    pub fn n_metrics(&self) -> usize {
        self.metric_names.len()
    }

    /// Z-score series of a metric by name.
    #[must_use]
    pub fn z_score(&self, metric: &str) -> Option<&[f64]> {
        let idx = self.metric_names.iter().position(|n| n == metric)?;
        Some(&self.z_scores[idx])
    }

    /// Z-scores of every metric at one sample.
    #[must_use]
    pub fn z_row(&self, row: usize) -> Vec<f64> {
        self.z_scores.iter().map(|col| col[row]).collect()
    }
}

/// Z-score of `value` against a baseline `(mean, std)`.
///
/// NaN when `std` is zero or undefined.
#[must_use]
#[inline]
pub fn z_score(value: f64, mean: f64, std: f64) -> f64 {
    if std.is_finite() && std > 0.0 {
        (value - mean) / std
    } else {
        f64::NAN
    }
}

/// Compute the drift series of `series` against `baseline`.
///
/// # Errors
///
/// Returns [`FatigueError::InvalidSeries`] if the series' metric columns are
/// not the ones the baseline was calibrated on.
pub fn compute_drift(
    series: &TimeSeries,
    baseline: &BaselineModel,
    config: &AnalysisConfig,
) -> Result<DriftSeries> {
    if series.column_names() != baseline.metric_names() {
        return Err(FatigueError::invalid_series(
            "series metrics differ from the calibrated baseline",
        ));
    }

    let n = series.len();
    let window = config.rolling_frames();

    let rolling: Vec<Vec<f64>> = (0..baseline.n_metrics())
        .map(|j| {
            let values: Vec<f64> = series.column_at(j).iter().map(|r| r.to_f64()).collect();
            rolling_mean(&values, window)
        })
        .collect();

    let z_scores: Vec<Vec<f64>> = rolling
        .iter()
        .enumerate()
        .map(|(j, col)| {
            let (mean, std) = (baseline.mean()[j], baseline.std()[j]);
            col.iter().map(|&v| z_score(v, mean, std)).collect()
        })
        .collect();

    let mut incomplete = 0usize;
    let mut point = vec![0.0; baseline.n_metrics()];
    let distances: Vec<f64> = (0..n)
        .map(|row| {
            for (slot, col) in point.iter_mut().zip(&rolling) {
                *slot = col[row];
            }
            let d = baseline.distance(&point);
            if d.is_finite() {
                d
            } else {
                incomplete += 1;
                0.0
            }
        })
        .collect();

    if incomplete > 0 {
        debug!(samples = incomplete, "incomplete rolling vectors, distance set to 0");
    }
    info!(samples = n, window, metrics = baseline.n_metrics(), "drift computed");

    Ok(DriftSeries {
        metric_names: baseline.metric_names().to_vec(),
        window,
        rolling,
        z_scores,
        distances,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::calibrate;
    use approx::assert_relative_eq;

    fn config() -> AnalysisConfig {
        AnalysisConfig::default()
            .with_fps(1.0)
            .with_baseline_minutes(0.1)
            .with_rolling_window_seconds(3.0)
    }

    fn series(a: &[f64], b: &[f64]) -> TimeSeries {
        TimeSeries::new((0..a.len()).map(|i| i as f64).collect(), None)
            .unwrap()
            .with_values("a", a)
            .unwrap()
            .with_values("b", b)
            .unwrap()
    }

    #[test]
    fn test_z_score() {
        assert_relative_eq!(z_score(12.0, 10.0, 2.0), 1.0);
        assert!(z_score(12.0, 10.0, 0.0).is_nan());
        assert!(z_score(12.0, 10.0, f64::NAN).is_nan());
    }

    #[test]
    fn test_output_aligned_with_input() {
        let a: Vec<f64> = (0..20).map(|i| (i % 3) as f64).collect();
        let b: Vec<f64> = (0..20).map(|i| (i % 4) as f64 * 0.5).collect();
        let s = series(&a, &b);
        let model = calibrate(&s, &config()).unwrap();
        let drift = compute_drift(&s, &model, &config()).unwrap();

        assert_eq!(drift.len(), 20);
        assert_eq!(drift.window, 3);
        assert_eq!(drift.z_scores.len(), 2);
        assert!(drift.z_scores.iter().all(|col| col.len() == 20));
        assert!(drift.distances.iter().all(|d| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn test_stationary_signal_stays_near_baseline() {
        // Constant metrics: rolling mean equals the baseline mean exactly.
        let s = series(&[4.0; 12], &[7.5; 12]);
        let model = calibrate(&s, &config()).unwrap();
        let drift = compute_drift(&s, &model, &config()).unwrap();
        assert!(drift.distances.iter().all(|&d| d == 0.0));
        // No spread, so z-scores are undefined.
        assert!(drift.z_score("a").unwrap().iter().all(|z| z.is_nan()));
    }

    #[test]
    fn test_shift_after_baseline_is_detected() {
        let a: Vec<f64> = (0..30)
            .map(|i| if i < 10 { (i % 2) as f64 } else { 10.0 })
            .collect();
        let b: Vec<f64> = (0..30).map(|i| ((i * 7) % 5) as f64).collect();
        let s = series(&a, &b);
        let cfg = config().with_baseline_minutes(10.0 / 60.0);
        let model = calibrate(&s, &cfg).unwrap();
        let drift = compute_drift(&s, &model, &cfg).unwrap();

        assert!(drift.distances[29] > drift.distances[5]);
        assert!(drift.z_score("a").unwrap()[29] > 3.0);
    }

    #[test]
    fn test_incomplete_vector_gives_zero_distance() {
        let mut a = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0];
        a[0] = f64::NAN;
        let s = series(&a, &[5.0, 6.0, 5.5, 6.5, 5.0, 6.0]);
        let cfg = config().with_baseline_minutes(0.1);
        let model = calibrate(&s, &cfg).unwrap();
        let drift = compute_drift(&s, &model, &cfg).unwrap();

        assert_eq!(drift.distances[0], 0.0);
        assert!(drift.z_scores[0][0].is_nan());
    }

    #[test]
    fn test_metric_absent_from_baseline_keeps_distance_signal() {
        let a: Vec<f64> = (0..40)
            .map(|i| if i < 20 { (i % 2) as f64 } else { 20.0 })
            .collect();
        let b: Vec<f64> = (0..40)
            .map(|i| if i < 20 { f64::NAN } else { (i % 3) as f64 })
            .collect();
        let s = series(&a, &b);
        let cfg = config().with_baseline_minutes(10.0 / 60.0);
        let model = calibrate(&s, &cfg).unwrap();
        let drift = compute_drift(&s, &model, &cfg).unwrap();

        assert_eq!(model.distance_metrics(), &[0]);
        assert!(drift.distances[5] < 3.0);
        assert!(drift.distances[39] > 10.0);
    }

    #[test]
    fn test_metric_mismatch_is_error() {
        let s = series(&[1.0, 2.0], &[3.0, 4.0]);
        let model = calibrate(&s, &config()).unwrap();
        let other = TimeSeries::new(vec![0.0, 1.0], None)
            .unwrap()
            .with_values("a", &[1.0, 2.0])
            .unwrap();
        assert!(compute_drift(&other, &model, &config()).is_err());
    }
}
