//! Composite instability index and session summaries.
//!
//! Combines the drift distance and the per-metric z-scores into the Fatigue
//! Instability Index (FII), aggregates it per minute, detects the onset
//! minute and fits linear trends. Descriptive statistics and time
//! downsampling for display layers live here too.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::drift::DriftSeries;
use crate::error::{FatigueError, Result};
use crate::math::stats::{fit_linear, nan_mean, nan_median, nan_min_max, nan_std};
use crate::series::TimeSeries;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slope key under which the Mahalanobis distance trend is reported.
pub const MAHALANOBIS_KEY: &str = "mahalanobis_dist";

/// Suffix appended to a metric name for its per-minute z-score column.
pub const ZSCORE_SUFFIX: &str = "_zscore";

/// One-based minute bucket of a timestamp in seconds.
///
/// `[0, 60)` is minute 1, `[60, 120)` minute 2, and so on.
#[must_use]
#[inline]
pub fn minute_bucket(timestamp: f64) -> i64 {
    (timestamp / 60.0).floor() as i64 + 1
}

/// Mean absolute value of the defined z-scores; `0.0` when none is defined.
#[must_use]
pub fn mean_abs_z(z_row: &[f64]) -> f64 {
    let abs: Vec<f64> = z_row.iter().map(|z| z.abs()).collect();
    nan_mean(&abs).unwrap_or(0.0)
}

/// FII of one sample: distance normalised by the number of metrics, plus the
/// mean absolute z-score.
#[must_use]
#[inline]
pub fn fatigue_instability_index(distance: f64, n_metrics: usize, mean_abs_z: f64) -> f64 {
    normalized_distance(distance, n_metrics) + mean_abs_z
}

#[inline]
fn normalized_distance(distance: f64, n_metrics: usize) -> f64 {
    if n_metrics == 0 {
        0.0
    } else {
        distance / n_metrics as f64
    }
}

/// Per-sample composite index and its components.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InstabilitySeries {
    /// Mean absolute z-score per sample.
    pub mean_abs_z: Vec<f64>,
    /// Mahalanobis distance divided by the number of metrics.
    pub normalized_distance: Vec<f64>,
    /// Fatigue Instability Index per sample.
    pub fii: Vec<f64>,
}

/// Compute the FII series of a drift series.
#[must_use]
pub fn instability_series(drift: &DriftSeries) -> InstabilitySeries {
    let m = drift.n_metrics();
    let mut out = InstabilitySeries::default();

    for (row, &distance) in drift.distances.iter().enumerate() {
        let maz = mean_abs_z(&drift.z_row(row));
        out.mean_abs_z.push(maz);
        out.normalized_distance.push(normalized_distance(distance, m));
        out.fii.push(fatigue_instability_index(distance, m, maz));
    }

    out
}

/// Per-minute aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MinuteSummary {
    /// One-based minute index.
    pub minute: i64,
    /// Samples in this minute.
    pub samples: usize,
    /// Mean FII.
    pub fii: f64,
    /// Mean Mahalanobis distance.
    pub mahalanobis: f64,
    /// Mean of each extra requested series, keyed by name.
    pub extras: BTreeMap<String, f64>,
}

/// Aggregate per-sample series into minute buckets.
///
/// Each `extras` entry is a named series aligned with `timestamps`. Means
/// skip undefined values; a bucket with none is NaN. Buckets are returned in
/// ascending minute order.
///
/// # Errors
///
/// Returns [`FatigueError::LengthMismatch`] if any series is not aligned
/// with `timestamps`.
pub fn summarize_minutes(
    timestamps: &[f64],
    fii: &[f64],
    mahalanobis: &[f64],
    extras: &[(String, &[f64])],
) -> Result<Vec<MinuteSummary>> {
    let n = timestamps.len();
    for len in [fii.len(), mahalanobis.len()]
        .into_iter()
        .chain(extras.iter().map(|(_, v)| v.len()))
    {
        if len != n {
            return Err(FatigueError::length_mismatch(n, len));
        }
    }

    let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, &ts) in timestamps.iter().enumerate() {
        buckets.entry(minute_bucket(ts)).or_default().push(row);
    }

    let bucket_mean = |values: &[f64], rows: &[usize]| {
        let picked: Vec<f64> = rows.iter().map(|&r| values[r]).collect();
        nan_mean(&picked).unwrap_or(f64::NAN)
    };

    let minutes = buckets
        .into_iter()
        .map(|(minute, rows)| MinuteSummary {
            minute,
            samples: rows.len(),
            fii: bucket_mean(fii, &rows),
            mahalanobis: bucket_mean(mahalanobis, &rows),
            extras: extras
                .iter()
                .map(|(name, values)| (name.clone(), bucket_mean(values, &rows)))
                .collect(),
        })
        .collect();

    Ok(minutes)
}

/// First minute whose mean FII exceeds `threshold`, if any.
#[must_use]
pub fn detect_onset(minutes: &[MinuteSummary], threshold: f64) -> Option<i64> {
    minutes
        .iter()
        .filter(|m| m.fii > threshold)
        .map(|m| m.minute)
        .min()
}

/// Linear trend of a series against elapsed seconds, in units per minute.
///
/// `0.0` with fewer than two usable samples.
#[must_use]
pub fn trend_per_minute(timestamps: &[f64], values: &[f64]) -> f64 {
    let Some(&t0) = timestamps.first() else {
        return 0.0;
    };
    let elapsed: Vec<f64> = timestamps.iter().map(|t| t - t0).collect();
    fit_linear(&elapsed, values).map_or(0.0, |(_, slope)| slope * 60.0)
}

/// Trend slope per minute of every named series.
///
/// # Errors
///
/// Returns [`FatigueError::LengthMismatch`] if a series is not aligned with
/// `timestamps`.
pub fn trend_slopes<'a, I>(timestamps: &[f64], series: I) -> Result<BTreeMap<String, f64>>
where
    I: IntoIterator<Item = (&'a str, &'a [f64])>,
{
    series
        .into_iter()
        .map(|(name, values)| {
            if values.len() != timestamps.len() {
                return Err(FatigueError::length_mismatch(timestamps.len(), values.len()));
            }
            Ok((name.to_string(), trend_per_minute(timestamps, values)))
        })
        .collect()
}

/// Minute-level outputs of one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Summary {
    /// Per-sample composite index.
    pub instability: InstabilitySeries,
    /// Per-minute aggregates.
    pub minutes: Vec<MinuteSummary>,
    /// First minute whose mean FII exceeds the onset threshold.
    pub onset_minute: Option<i64>,
    /// Trend per minute of every analysis metric and of
    /// [`MAHALANOBIS_KEY`].
    pub slopes: BTreeMap<String, f64>,
}

/// Build the session summary from a series and its drift.
///
/// Metrics listed in [`AnalysisConfig::summary_metrics`] have their z-score
/// aggregated per minute under `"{metric}_zscore"`.
///
/// # Errors
///
/// Returns [`FatigueError::UnknownMetric`] for a requested summary metric
/// that is not an analysis metric, or a length mismatch if `drift` is not
/// aligned with `series`.
pub fn summarize(
    series: &TimeSeries,
    drift: &DriftSeries,
    config: &AnalysisConfig,
) -> Result<Summary> {
    if drift.len() != series.len() {
        return Err(FatigueError::length_mismatch(series.len(), drift.len()));
    }
    let timestamps = series.timestamps();
    let instability = instability_series(drift);

    let extras = config
        .summary_metrics
        .iter()
        .map(|name| {
            drift
                .z_score(name)
                .map(|z| (format!("{name}{ZSCORE_SUFFIX}"), z))
                .ok_or_else(|| FatigueError::unknown_metric(name.as_str()))
        })
        .collect::<Result<Vec<_>>>()?;

    let minutes = summarize_minutes(timestamps, &instability.fii, &drift.distances, &extras)?;
    let onset_minute = detect_onset(&minutes, config.onset_threshold);

    let values: Vec<(String, Vec<f64>)> = series
        .columns()
        .map(|(name, col)| (name.to_string(), col.iter().map(|r| r.to_f64()).collect()))
        .collect();
    let slopes = trend_slopes(
        timestamps,
        values
            .iter()
            .map(|(name, v)| (name.as_str(), v.as_slice()))
            .chain(std::iter::once((MAHALANOBIS_KEY, drift.distances.as_slice()))),
    )?;

    match onset_minute {
        Some(minute) => info!(minute, threshold = config.onset_threshold, "fatigue onset detected"),
        None => debug!(threshold = config.onset_threshold, "no fatigue onset"),
    }
    info!(minutes = minutes.len(), "summary complete");

    Ok(Summary {
        instability,
        minutes,
        onset_minute,
        slopes,
    })
}

/// Descriptive statistics of one metric over its valid readings.
///
/// Undefined statistics (no valid readings, or one reading for `std`) are
/// NaN.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricStats {
    /// Metric name.
    pub name: String,
    /// Number of valid readings.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

impl MetricStats {
    /// Statistics of `values`, skipping undefined entries.
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        let (min, max) = nan_min_max(values).unwrap_or((f64::NAN, f64::NAN));
        Self {
            name: name.into(),
            count: values.iter().filter(|v| v.is_finite()).count(),
            mean: nan_mean(values).unwrap_or(f64::NAN),
            std: nan_std(values).unwrap_or(f64::NAN),
            min,
            max,
            median: nan_median(values).unwrap_or(f64::NAN),
        }
    }
}

/// Descriptive statistics of every column of `series`, in column order.
#[must_use]
pub fn describe(series: &TimeSeries) -> Vec<MetricStats> {
    series
        .columns()
        .map(|(name, col)| {
            let values: Vec<f64> = col.iter().map(|r| r.to_f64()).collect();
            MetricStats::from_values(name, &values)
        })
        .collect()
}

/// Fixed-width text table of descriptive statistics and trends.
///
/// Metrics without a slope entry show a trend of `0.0`.
#[derive(Debug, Clone)]
pub struct MetricsTable<'a> {
    title: Option<String>,
    stats: &'a [MetricStats],
    slopes: &'a BTreeMap<String, f64>,
}

impl<'a> MetricsTable<'a> {
    const RULE_WIDTH: usize = 78;

    /// Table over `stats`, looking trends up in `slopes` by metric name.
    #[must_use]
    pub const fn new(stats: &'a [MetricStats], slopes: &'a BTreeMap<String, f64>) -> Self {
        Self {
            title: None,
            stats,
            slopes,
        }
    }

    /// Add a subtitle line under the header (e.g. subject and activity).
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl fmt::Display for MetricsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(Self::RULE_WIDTH);
        writeln!(f, "METRICS SUMMARY")?;
        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<14} | {:>7} | {:>7} | {:>7} | {:>7} | {:>7} | {:>9}",
            "METRIC", "MEAN", "STD", "MIN", "MAX", "MEDIAN", "TREND/MIN"
        )?;
        writeln!(f, "{}", "-".repeat(Self::RULE_WIDTH))?;
        for s in self.stats {
            let trend = self.slopes.get(&s.name).copied().unwrap_or(0.0);
            writeln!(
                f,
                "{:<14} | {:>7.2} | {:>7.2} | {:>7.2} | {:>7.2} | {:>7.2} | {:>+9.3}",
                s.name, s.mean, s.std, s.min, s.max, s.median, trend
            )?;
        }
        writeln!(f, "{rule}")
    }
}

/// Time resolution for [`downsample`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeGrouping {
    /// One bucket per sample (no aggregation).
    #[default]
    Frames,
    /// Whole seconds since the clock origin.
    Seconds,
    /// Whole minutes since the clock origin (zero-based).
    Minutes,
}

impl TimeGrouping {
    /// Bucket of a sample.
    #[must_use]
    pub fn bucket(self, row: usize, timestamp: f64) -> i64 {
        match self {
            Self::Frames => row as i64,
            Self::Seconds => timestamp.trunc() as i64,
            Self::Minutes => (timestamp / 60.0).trunc() as i64,
        }
    }
}

/// A series averaged per time bucket.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Downsampled {
    /// Bucket keys in ascending order.
    pub buckets: Vec<i64>,
    /// Mean of the valid values in each bucket (NaN if none).
    pub values: Vec<f64>,
}

/// Average `values` per bucket of `grouping`.
///
/// # Errors
///
/// Returns [`FatigueError::LengthMismatch`] if `values` is not aligned with
/// `timestamps`.
pub fn downsample(timestamps: &[f64], values: &[f64], grouping: TimeGrouping) -> Result<Downsampled> {
    if values.len() != timestamps.len() {
        return Err(FatigueError::length_mismatch(timestamps.len(), values.len()));
    }

    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for (row, (&ts, &v)) in timestamps.iter().zip(values).enumerate() {
        groups.entry(grouping.bucket(row, ts)).or_default().push(v);
    }

    let mut out = Downsampled::default();
    for (bucket, vs) in groups {
        out.buckets.push(bucket);
        out.values.push(nan_mean(&vs).unwrap_or(f64::NAN));
    }
    Ok(out)
}
