//! Fatigue Drift Library
//!
//! Skeletal time-series cleaning and baseline-relative postural drift
//! assessment.
//!
//! This library takes per-frame 3D joint trajectories from a completed
//! motion-capture session, repairs tracking artifacts, and measures how far
//! the subject's posture drifts from their own opening baseline.
//!
//! # Features
//!
//! - **Schema tolerant**: accepts `j{n}_x` and `joint_{n}_x` column layouts
//! - **Explicit missing data**: coordinates are `Valid(f64)` or `Missing`
//! - **Artifact repair**: teleportation filter, bounded interpolation,
//!   Savitzky-Golay smoothing
//! - **Multivariate drift**: Mahalanobis distance under a pseudo-inverted
//!   baseline covariance, safe for collinear metrics
//! - **Composite index**: per-minute Fatigue Instability Index with onset
//!   detection and trend slopes
//!
//! # Quick Start
//!
//! ```
//! use fatigue_drift::{run, AnalysisConfig, PipelineConfig, TimeSeries};
//!
//! let n = 240;
//! let timestamps: Vec<f64> = (0..n).map(|i| i as f64).collect();
//! let x: Vec<f64> = (0..n).map(|i| 0.2 + (i as f64 * 0.1).sin() * 0.01).collect();
//! let y: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 0.001).collect();
//! let z = vec![2.5; n];
//!
//! let series = TimeSeries::new(timestamps, None)?
//!     .with_values("j25_x", &x)?
//!     .with_values("j25_y", &y)?
//!     .with_values("j25_z", &z)?;
//!
//! let config = PipelineConfig::new().with_analysis(
//!     AnalysisConfig::default()
//!         .with_fps(1.0)
//!         .with_baseline_minutes(1.0),
//! );
//! let assessment = run(&series, &config)?;
//!
//! assert_eq!(assessment.summary.minutes.len(), 4);
//! println!("{}", assessment.metrics_table());
//! # Ok::<(), fatigue_drift::FatigueError>(())
//! ```
//!
//! # Stages
//!
//! | Stage | Function | Report |
//! |-------|----------|--------|
//! | Schema | [`resolve_series`] | `Vec<JointColumns>` |
//! | Integrity | [`validate_integrity`] | [`IntegrityReport`] |
//! | Teleportation | [`remove_teleportation`] | [`TeleportReport`] |
//! | Repair | [`repair()`] | [`RepairReport`] |
//! | Smoothing | [`smooth`] | [`SmoothingReport`] |
//! | Baseline | [`calibrate`] | [`BaselineModel`] |
//! | Drift | [`compute_drift`] | [`DriftSeries`] |
//! | Summary | [`summarize`] | [`Summary`] |
//!
//! # Presets
//!
//! ```
//! use fatigue_drift::PipelineConfig;
//!
//! let depth_camera = PipelineConfig::realsense();
//! let high_rate = PipelineConfig::high_rate();
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod baseline;
pub mod config;
pub mod distance;
pub mod drift;
pub mod error;
pub mod landmarks;
pub mod math;
pub mod pipeline;
pub mod repair;
pub mod rolling;
pub mod schema;
pub mod series;
pub mod smoothing;
pub mod summary;
pub mod teleport;
pub mod validation;

// Re-exports for convenient access
pub use baseline::{calibrate, BaselineModel};
pub use config::{AnalysisConfig, CleaningConfig, PipelineConfig};
pub use distance::{euclidean3, mahalanobis};
pub use drift::{compute_drift, DriftSeries};
pub use error::{FatigueError, Result};
pub use landmarks::{LandmarkTable, LANDMARK_COUNT};
pub use pipeline::{analyze, clean, clean_with_landmarks, run, CleaningOutcome, FatigueAssessment};
pub use repair::{repair, RepairReport};
pub use schema::{resolve_joint_columns, resolve_series, JointColumns, SchemaVariant};
pub use series::{Reading, Sample, TimeSeries};
pub use smoothing::{smooth, SmoothingReport};
pub use summary::{
    describe, detect_onset, downsample, minute_bucket, summarize, summarize_minutes, trend_slopes,
    MetricStats, MetricsTable, MinuteSummary, Summary, TimeGrouping,
};
pub use teleport::{remove_teleportation, TeleportReport};
pub use validation::{validate_integrity, IntegrityReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default minute-level FII above which fatigue onset is reported.
pub const DEFAULT_ONSET_THRESHOLD: f64 = 2.0;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn walking_series(minutes: usize, fps: f64) -> TimeSeries {
        let n = (minutes as f64 * 60.0 * fps) as usize;
        let t: Vec<f64> = (0..n).map(|i| i as f64 / fps).collect();
        let mut builder = TimeSeries::new(t.clone(), Some((0..n as i64).collect())).unwrap();
        for (joint, base) in [(23, 0.9), (25, 0.5), (27, 0.1)] {
            let x: Vec<f64> = t.iter().map(|s| 0.2 + (s * 1.5).sin() * 0.05).collect();
            let y: Vec<f64> = t.iter().map(|s| base + (s * 1.5).cos() * 0.02).collect();
            let z: Vec<f64> = t.iter().map(|s| 2.0 + (s * 0.7).sin() * 0.03).collect();
            builder = builder
                .with_values(format!("j{joint}_x"), &x)
                .unwrap()
                .with_values(format!("j{joint}_y"), &y)
                .unwrap()
                .with_values(format!("j{joint}_z"), &z)
                .unwrap();
        }
        builder
    }

    #[test]
    fn test_full_pipeline() {
        let series = walking_series(4, 5.0);
        let config = PipelineConfig::new().with_analysis(
            AnalysisConfig::default()
                .with_fps(5.0)
                .with_baseline_minutes(1.0)
                .with_rolling_window_seconds(10.0),
        );

        let assessment = run(&series, &config).unwrap();
        let cleaning = assessment.cleaning.as_ref().unwrap();

        assert!(!cleaning.integrity.needs_repair);
        assert_eq!(cleaning.joints.len(), 3);
        assert_eq!(assessment.baseline.n_metrics(), 9);
        assert_eq!(assessment.drift.len(), series.len());
        assert_eq!(assessment.summary.minutes.len(), 4);
        assert!(assessment.summary.instability.fii.iter().all(|v| v.is_finite()));
        assert_eq!(assessment.slopes().len(), 10);
    }

    #[test]
    fn test_stationary_session_has_no_onset() {
        let series = walking_series(3, 5.0);
        let analysis = AnalysisConfig::default()
            .with_fps(5.0)
            .with_baseline_minutes(3.0)
            .with_rolling_window_seconds(1.0);
        let assessment = analyze(&series, &analysis).unwrap();
        assert_eq!(assessment.onset_minute(), None);
    }

    #[test]
    fn test_cleaning_is_non_destructive() {
        let series = walking_series(1, 5.0);
        let before = series.clone();
        let _ = clean(&series, &CleaningConfig::default()).unwrap();
        assert_eq!(series, before);
    }

    #[test]
    fn test_default_threshold_matches_config() {
        assert_relative_eq!(
            AnalysisConfig::default().onset_threshold,
            DEFAULT_ONSET_THRESHOLD
        );
    }
}
