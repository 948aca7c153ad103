//! Configuration for cleaning and drift analysis.
//!
//! [`CleaningConfig`] tunes the repair stages that run on raw joint
//! coordinates, [`AnalysisConfig`] tunes the baseline/drift/summary stages,
//! and [`PipelineConfig`] bundles both with capture-rig presets.
//!
//! # Example
//!
//! ```
//! use fatigue_drift::{AnalysisConfig, PipelineConfig};
//!
//! let config = PipelineConfig::realsense();
//! assert!(config.validate().is_ok());
//!
//! let analysis = AnalysisConfig::default()
//!     .with_fps(30.0)
//!     .with_baseline_minutes(2.0);
//! assert_eq!(analysis.baseline_frames(), 3600);
//! ```

use crate::error::{FatigueError, Result};
use crate::smoothing::odd_window;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for the teleportation filter, repair and smoothing stages.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CleaningConfig {
    /// Maximum plausible frame-to-frame joint displacement, in coordinate
    /// units. Larger jumps are nulled as tracking artifacts.
    pub teleport_threshold: f64,

    /// Longest run of consecutive missing samples that interpolation fills.
    pub interpolation_limit: usize,

    /// Savitzky-Golay window length. Even values are bumped to the next odd.
    pub smoothing_window: usize,

    /// Savitzky-Golay polynomial order. Must be below the window length.
    pub smoothing_poly: usize,

    /// Treat a coordinate of exactly `0.0` as "not observed".
    ///
    /// Depth sensors report untracked joints at the origin. Disabling this
    /// keeps genuine zero measurements intact.
    pub zero_is_missing: bool,

    /// Run the teleportation filter.
    pub remove_teleportation: bool,

    /// Run the repair stage.
    pub repair: bool,

    /// Run the smoothing stage.
    pub smooth: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            teleport_threshold: 0.5,
            interpolation_limit: 30,
            smoothing_window: 5,
            smoothing_poly: 2,
            zero_is_missing: true,
            remove_teleportation: true,
            repair: true,
            smooth: true,
        }
    }
}

impl CleaningConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.teleport_threshold.is_finite() && self.teleport_threshold > 0.0) {
            return Err(FatigueError::invalid_config(
                "teleport_threshold must be positive and finite",
            ));
        }
        if self.smoothing_window < 1 {
            return Err(FatigueError::invalid_config(
                "smoothing_window must be at least 1",
            ));
        }
        if self.smoothing_poly >= self.effective_window() {
            return Err(FatigueError::invalid_config(format!(
                "smoothing_poly ({}) must be less than smoothing_window ({})",
                self.smoothing_poly,
                self.effective_window()
            )));
        }
        Ok(())
    }

    /// Window length actually used by the smoother (next odd integer).
    #[must_use]
    pub const fn effective_window(&self) -> usize {
        odd_window(self.smoothing_window)
    }

    /// Set the teleportation threshold.
    #[must_use]
    pub const fn with_teleport_threshold(mut self, threshold: f64) -> Self {
        self.teleport_threshold = threshold;
        self
    }

    /// Set the interpolation limit.
    #[must_use]
    pub const fn with_interpolation_limit(mut self, limit: usize) -> Self {
        self.interpolation_limit = limit;
        self
    }

    /// Set the smoothing window and polynomial order.
    #[must_use]
    pub const fn with_smoothing(mut self, window: usize, poly: usize) -> Self {
        self.smoothing_window = window;
        self.smoothing_poly = poly;
        self
    }

    /// Enable/disable the zero-means-missing sensor convention.
    #[must_use]
    pub const fn with_zero_is_missing(mut self, enabled: bool) -> Self {
        self.zero_is_missing = enabled;
        self
    }

    /// Toggle individual stages.
    #[must_use]
    pub const fn with_stages(mut self, teleport: bool, repair: bool, smooth: bool) -> Self {
        self.remove_teleportation = teleport;
        self.repair = repair;
        self.smooth = smooth;
        self
    }
}

/// Parameters for baseline calibration, drift and summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Capture rate in frames per second.
    pub fps: f64,

    /// Length of the calibration window at the start of the session.
    pub baseline_minutes: f64,

    /// Trailing rolling-mean window applied before drift is measured.
    pub rolling_window_seconds: f64,

    /// Minute-level FII above which fatigue onset is reported.
    pub onset_threshold: f64,

    /// Singular values below `pinv_rcond * max_singular_value` are treated
    /// as zero when pseudo-inverting the baseline covariance.
    pub pinv_rcond: f64,

    /// Extra metrics whose mean z-score is aggregated per minute.
    pub summary_metrics: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fps: 15.0,
            baseline_minutes: 5.0,
            rolling_window_seconds: 60.0,
            onset_threshold: crate::DEFAULT_ONSET_THRESHOLD,
            pinv_rcond: 1e-10,
            summary_metrics: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(FatigueError::invalid_config("fps must be positive"));
        }
        if !(self.baseline_minutes.is_finite() && self.baseline_minutes > 0.0) {
            return Err(FatigueError::invalid_config(
                "baseline_minutes must be positive",
            ));
        }
        if !(self.rolling_window_seconds.is_finite() && self.rolling_window_seconds > 0.0) {
            return Err(FatigueError::invalid_config(
                "rolling_window_seconds must be positive",
            ));
        }
        if !self.onset_threshold.is_finite() {
            return Err(FatigueError::invalid_config(
                "onset_threshold must be finite",
            ));
        }
        if !(self.pinv_rcond.is_finite() && self.pinv_rcond >= 0.0) {
            return Err(FatigueError::invalid_config(
                "pinv_rcond must be non-negative",
            ));
        }
        Ok(())
    }

    /// Number of samples in the calibration window, rounded to the nearest
    /// whole frame.
    #[must_use]
    pub fn baseline_frames(&self) -> usize {
        (self.baseline_minutes * 60.0 * self.fps).round() as usize
    }

    /// Number of samples in the rolling window (at least one).
    #[must_use]
    pub fn rolling_frames(&self) -> usize {
        ((self.rolling_window_seconds * self.fps).round() as usize).max(1)
    }

    /// Set the capture rate.
    #[must_use]
    pub fn with_fps(mut self, fps: f64) -> Self {
        self.fps = fps;
        self
    }

    /// Set the calibration window length.
    #[must_use]
    pub fn with_baseline_minutes(mut self, minutes: f64) -> Self {
        self.baseline_minutes = minutes;
        self
    }

    /// Set the rolling window length.
    #[must_use]
    pub fn with_rolling_window_seconds(mut self, seconds: f64) -> Self {
        self.rolling_window_seconds = seconds;
        self
    }

    /// Set the onset threshold.
    #[must_use]
    pub fn with_onset_threshold(mut self, threshold: f64) -> Self {
        self.onset_threshold = threshold;
        self
    }

    /// Request per-minute aggregation of additional metrics.
    #[must_use]
    pub fn with_summary_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.summary_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// Cleaning stage parameters.
    pub cleaning: CleaningConfig,
    /// Analysis stage parameters.
    pub analysis: AnalysisConfig,
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate both halves.
    ///
    /// # Errors
    ///
    /// Returns the first invalid parameter found.
    pub fn validate(&self) -> Result<()> {
        self.cleaning.validate()?;
        self.analysis.validate()
    }

    /// Preset for a depth camera recording at 15 fps.
    #[must_use]
    pub fn realsense() -> Self {
        Self::default()
    }

    /// Preset for 30 fps capture.
    ///
    /// The smoothing window is widened so it spans the same wall-clock time
    /// as the 15 fps default.
    #[must_use]
    pub fn high_rate() -> Self {
        Self {
            cleaning: CleaningConfig::default().with_smoothing(9, 2),
            analysis: AnalysisConfig::default().with_fps(30.0),
        }
    }

    /// Replace the cleaning parameters.
    #[must_use]
    pub fn with_cleaning(mut self, cleaning: CleaningConfig) -> Self {
        self.cleaning = cleaning;
        self
    }

    /// Replace the analysis parameters.
    #[must_use]
    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }
}
