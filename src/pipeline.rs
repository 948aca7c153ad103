//! Stage composition.
//!
//! Each stage is a pure function over an owned copy of the series. This
//! module chains them in the canonical order:
//!
//! 1. Resolve joint-coordinate columns
//! 2. Scan integrity (read-only)
//! 3. Remove teleportation
//! 4. Repair gaps
//! 5. Smooth coordinates
//! 6. Calibrate the baseline
//! 7. Compute drift
//! 8. Summarize
//!
//! Steps 1-5 are [`clean`], steps 6-8 are [`analyze`], and [`run`] does
//! both.

use std::collections::BTreeMap;

use tracing::info;

use crate::baseline::{calibrate, BaselineModel};
use crate::config::{AnalysisConfig, CleaningConfig, PipelineConfig};
use crate::drift::{compute_drift, DriftSeries};
use crate::error::Result;
use crate::landmarks::LandmarkTable;
use crate::repair::{repair, RepairReport};
use crate::schema::{resolve_series, JointColumns};
use crate::series::TimeSeries;
use crate::smoothing::{smooth, SmoothingReport};
use crate::summary::{describe, summarize, MetricStats, MetricsTable, Summary};
use crate::teleport::{remove_teleportation, TeleportReport};
use crate::validation::{validate_integrity, IntegrityReport};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Output of the cleaning stages.
///
/// Stage reports are `None` for stages disabled in the configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CleaningOutcome {
    /// The cleaned series.
    pub series: TimeSeries,
    /// Resolved joint-coordinate columns.
    pub joints: Vec<JointColumns>,
    /// Integrity of the input, scanned before any stage ran.
    pub integrity: IntegrityReport,
    pub teleport: Option<TeleportReport>,
    pub repair: Option<RepairReport>,
    pub smoothing: Option<SmoothingReport>,
}

/// Clean `series` using the standard 33-landmark table.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no joint-coordinate
/// columns can be resolved.
pub fn clean(series: &TimeSeries, config: &CleaningConfig) -> Result<CleaningOutcome> {
    clean_with_landmarks(series, config, LandmarkTable::blazepose())
}

/// Clean `series`, resolving joints against `landmarks`.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or no joint-coordinate
/// columns can be resolved.
pub fn clean_with_landmarks(
    series: &TimeSeries,
    config: &CleaningConfig,
    landmarks: &LandmarkTable,
) -> Result<CleaningOutcome> {
    config.validate()?;

    let joints = resolve_series(series, landmarks)?;
    let integrity = validate_integrity(series, &joints);

    let mut current = series.clone();

    let teleport = if config.remove_teleportation {
        let (filtered, report) = remove_teleportation(
            &current,
            &joints,
            config.teleport_threshold,
            config.zero_is_missing,
        );
        current = filtered;
        Some(report)
    } else {
        None
    };

    let repair = if config.repair {
        let (repaired, report) = repair(
            &current,
            &joints,
            config.interpolation_limit,
            config.zero_is_missing,
        );
        current = repaired;
        Some(report)
    } else {
        None
    };

    let smoothing = if config.smooth {
        let (smoothed, report) = smooth(
            &current,
            &joints,
            config.smoothing_window,
            config.smoothing_poly,
        )?;
        current = smoothed;
        Some(report)
    } else {
        None
    };

    info!(
        samples = current.len(),
        joints = joints.len(),
        teleport_nulled = teleport.as_ref().map_or(0, |r| r.nulled),
        zero_filled = repair.as_ref().map_or(0, |r| r.zero_filled),
        "cleaning complete"
    );

    Ok(CleaningOutcome {
        series: current,
        joints,
        integrity,
        teleport,
        repair,
        smoothing,
    })
}

/// Every derived output of one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FatigueAssessment {
    /// Cleaning results, when the run started from raw data.
    pub cleaning: Option<CleaningOutcome>,
    /// Calibrated baseline.
    pub baseline: BaselineModel,
    /// Per-sample drift.
    pub drift: DriftSeries,
    /// Per-minute summary, onset and trends.
    pub summary: Summary,
    /// Descriptive statistics of every analysis metric.
    pub statistics: Vec<MetricStats>,
}

impl FatigueAssessment {
    /// First minute whose mean FII exceeds the onset threshold.
    #[must_use]
    pub const fn onset_minute(&self) -> Option<i64> {
        self.summary.onset_minute
    }

    /// Trend slopes per minute, keyed by metric.
    #[must_use]
    pub const fn slopes(&self) -> &BTreeMap<String, f64> {
        &self.summary.slopes
    }

    /// Text table of the descriptive statistics and trends.
    #[must_use]
    pub fn metrics_table(&self) -> MetricsTable<'_> {
        MetricsTable::new(&self.statistics, &self.summary.slopes)
    }
}

/// Run baseline calibration, drift and summary on an already-clean series.
///
/// Every named column of `series` is an analysis metric.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the series is empty,
/// or a requested summary metric does not exist.
pub fn analyze(series: &TimeSeries, config: &AnalysisConfig) -> Result<FatigueAssessment> {
    config.validate()?;

    let baseline = calibrate(series, config)?;
    let drift = compute_drift(series, &baseline, config)?;
    let summary = summarize(series, &drift, config)?;
    let statistics = describe(series);

    info!(
        samples = series.len(),
        metrics = baseline.n_metrics(),
        onset_minute = ?summary.onset_minute,
        "analysis complete"
    );

    Ok(FatigueAssessment {
        cleaning: None,
        baseline,
        drift,
        summary,
        statistics,
    })
}

/// Clean `series` and analyze the result.
///
/// # Errors
///
/// Returns the first error raised by [`clean`] or [`analyze`].
pub fn run(series: &TimeSeries, config: &PipelineConfig) -> Result<FatigueAssessment> {
    config.validate()?;

    let cleaning = clean(series, &config.cleaning)?;
    let mut assessment = analyze(&cleaning.series, &config.analysis)?;
    assessment.cleaning = Some(cleaning);
    Ok(assessment)
}
