//! Baseline calibration.
//!
//! Fits the univariate (mean, std) and multivariate (mean vector, covariance,
//! pseudo-inverse) statistics of every analysis metric over the opening
//! calibration window of a session.
//!
//! A metric with no valid reading in the window has no centroid coordinate
//! and is left out of the Mahalanobis quadratic form; the remaining metrics
//! still produce a distance.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::distance::mahalanobis;
use crate::error::{FatigueError, Result};
use crate::math::linalg::{pseudo_inverse, sample_covariance};
use crate::math::stats::{nan_mean, nan_std};
use crate::series::TimeSeries;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Baseline statistics of the analysis metrics.
///
/// Immutable once calibrated. All per-metric vectors are in the order of
/// [`BaselineModel::metric_names`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaselineModel {
    metric_names: Vec<String>,
    mean: DVector<f64>,
    /// NaN where fewer than two valid samples were available.
    std: Vec<f64>,
    covariance: DMatrix<f64>,
    inv_covariance: DMatrix<f64>,
    calibration_samples: usize,
    complete_rows: usize,
    /// Metrics with a defined baseline mean, in model order.
    distance_metrics: Vec<usize>,
    distance_centroid: DVector<f64>,
    distance_inv_covariance: DMatrix<f64>,
}

impl BaselineModel {
    /// Names of the analysis metrics.
    #[must_use]
    pub fn metric_names(&self) -> &[String] {
        &self.metric_names
    }

    /// Number of analysis metrics.
    #[must_use]
    pub fn n_metrics(&self) -> usize {
        self.metric_names.len()
    }

    /// Position of a metric in the model.
    #[must_use]
    pub fn metric_index(&self, name: &str) -> Option<usize> {
        self.metric_names.iter().position(|n| n == name)
    }

    /// Baseline mean vector (centroid).
    #[must_use]
    pub const fn mean(&self) -> &DVector<f64> {
        &self.mean
    }

    /// Baseline sample standard deviation per metric.
    #[must_use]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Baseline covariance matrix.
    ///
    /// Rows and columns of metrics excluded from the distance are zero.
    #[must_use]
    pub const fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    /// Moore-Penrose pseudo-inverse of the covariance.
    #[must_use]
    pub const fn inv_covariance(&self) -> &DMatrix<f64> {
        &self.inv_covariance
    }

    /// Samples in the calibration window.
    #[must_use]
    pub const fn calibration_samples(&self) -> usize {
        self.calibration_samples
    }

    /// Calibration rows with every metric present, i.e. those that entered
    /// the covariance.
    #[must_use]
    pub const fn complete_rows(&self) -> usize {
        self.complete_rows
    }

    /// Indices of the metrics that enter the Mahalanobis distance.
    #[must_use]
    pub fn distance_metrics(&self) -> &[usize] {
        &self.distance_metrics
    }

    /// Mahalanobis distance of a full metric vector from the baseline.
    ///
    /// Only [`BaselineModel::distance_metrics`] are read from `point`. NaN if
    /// any of them is not finite.
    ///
    /// # Panics
    ///
    /// Panics if `point` is shorter than the number of metrics.
    #[must_use]
    pub fn distance(&self, point: &[f64]) -> f64 {
        assert_eq!(point.len(), self.n_metrics(), "point dimension");
        let sub: Vec<f64> = self.distance_metrics.iter().map(|&j| point[j]).collect();
        mahalanobis(&sub, &self.distance_centroid, &self.distance_inv_covariance)
    }
}

/// Calibration window length for a series of `n` samples.
///
/// `baseline_frames` when the series is long enough, otherwise half the
/// series rounded up. The switch is a step: one sample short of
/// `baseline_frames` calibrates on about half as many samples.
#[must_use]
pub const fn calibration_len(baseline_frames: usize, n: usize) -> usize {
    if baseline_frames > n {
        n.div_ceil(2)
    } else {
        baseline_frames
    }
}

/// Fit the baseline model on the opening window of `series`.
///
/// Every named column is an analysis metric. Means and standard deviations
/// skip missing readings per metric. The covariance is computed over the rows
/// where every metric with a defined mean is present; with fewer than two
/// such rows it falls back to the diagonal of per-metric variances.
///
/// # Errors
///
/// Returns [`FatigueError::InsufficientData`] if the calibration window is
/// empty, or a linear algebra error if the pseudo-inverse fails.
pub fn calibrate(series: &TimeSeries, config: &AnalysisConfig) -> Result<BaselineModel> {
    let n = series.len();
    let requested = config.baseline_frames();
    let len = calibration_len(requested, n);
    if len == 0 {
        return Err(FatigueError::insufficient_data("baseline calibration", 1, n));
    }
    if len < requested {
        warn!(
            requested,
            used = len,
            samples = n,
            "series shorter than calibration window, using first half"
        );
    }

    let metric_names = series.column_names().to_vec();
    let m = metric_names.len();

    let window: Vec<Vec<f64>> = (0..m)
        .map(|j| series.column_at(j)[..len].iter().map(|r| r.to_f64()).collect())
        .collect();

    let mut mean = DVector::zeros(m);
    let mut std = Vec::with_capacity(m);
    for (j, values) in window.iter().enumerate() {
        mean[j] = nan_mean(values).unwrap_or(f64::NAN);
        let s = nan_std(values).unwrap_or(f64::NAN);
        if !s.is_finite() || s <= 0.0 {
            debug!(metric = %metric_names[j], "metric has no baseline spread");
        }
        std.push(s);
    }

    let distance_metrics: Vec<usize> = (0..m).filter(|&j| mean[j].is_finite()).collect();
    if distance_metrics.len() < m {
        let excluded: Vec<&str> = (0..m)
            .filter(|&j| !mean[j].is_finite())
            .map(|j| metric_names[j].as_str())
            .collect();
        warn!(
            metrics = ?excluded,
            "no baseline readings, metrics excluded from distance"
        );
    }
    let k = distance_metrics.len();

    let complete: Vec<usize> = (0..len)
        .filter(|&row| distance_metrics.iter().all(|&j| window[j][row].is_finite()))
        .collect();
    let sub_covariance = if complete.len() >= 2 {
        let data = DMatrix::from_fn(complete.len(), k, |i, c| {
            window[distance_metrics[c]][complete[i]]
        });
        sample_covariance(&data)
    } else {
        warn!(
            complete_rows = complete.len(),
            "too few complete calibration rows, using per-metric variances"
        );
        DMatrix::from_fn(k, k, |a, b| {
            let s = std[distance_metrics[a]];
            if a == b && s.is_finite() {
                s * s
            } else {
                0.0
            }
        })
    };
    let sub_inverse = pseudo_inverse(&sub_covariance, config.pinv_rcond)?;

    let covariance = embed(&sub_covariance, &distance_metrics, m);
    let inv_covariance = embed(&sub_inverse, &distance_metrics, m);
    let distance_centroid =
        DVector::from_iterator(k, distance_metrics.iter().map(|&j| mean[j]));

    info!(
        metrics = m,
        calibration_samples = len,
        complete_rows = complete.len(),
        "baseline calibrated"
    );

    Ok(BaselineModel {
        metric_names,
        mean,
        std,
        covariance,
        inv_covariance,
        calibration_samples: len,
        complete_rows: complete.len(),
        distance_metrics,
        distance_centroid,
        distance_inv_covariance: sub_inverse,
    })
}

/// Place a `k x k` matrix over `indices` into an `m x m` zero matrix.
fn embed(sub: &DMatrix<f64>, indices: &[usize], m: usize) -> DMatrix<f64> {
    let mut full = DMatrix::zeros(m, m);
    for (a, &i) in indices.iter().enumerate() {
        for (b, &j) in indices.iter().enumerate() {
            full[(i, j)] = sub[(a, b)];
        }
    }
    full
}
