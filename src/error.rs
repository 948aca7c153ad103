//! Error types for drift analysis operations.
//!
//! Only conditions that make a stage impossible to run are errors. Data
//! quality caveats (tracking loss, unfilled gaps, partial rolling windows)
//! are carried on stage reports instead.

use thiserror::Error;

/// Main error type for the cleaning and analysis pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FatigueError {
    /// No joint-coordinate columns could be resolved from the input.
    #[error("Schema error: {reason}")]
    Schema { reason: String },

    /// A stage needs more samples than the series provides.
    #[error("Insufficient data for {stage}: need at least {needed} samples, got {actual}")]
    InsufficientData {
        stage: &'static str,
        needed: usize,
        actual: usize,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The series could not be constructed as given.
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Parallel inputs have different lengths.
    #[error("Length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A requested metric is not part of the analysis set.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Linear algebra computation failed.
    #[error("Linear algebra error: {0}")]
    Linalg(String),
}

/// Result type alias for drift analysis operations.
pub type Result<T> = std::result::Result<T, FatigueError>;

impl FatigueError {
    /// Create a schema error.
    #[must_use]
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema {
            reason: reason.into(),
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub const fn insufficient_data(stage: &'static str, needed: usize, actual: usize) -> Self {
        Self::InsufficientData {
            stage,
            needed,
            actual,
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid series error.
    #[must_use]
    pub fn invalid_series(msg: impl Into<String>) -> Self {
        Self::InvalidSeries(msg.into())
    }

    /// Create a length mismatch error.
    #[must_use]
    pub const fn length_mismatch(expected: usize, actual: usize) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create an unknown metric error.
    #[must_use]
    pub fn unknown_metric(name: impl Into<String>) -> Self {
        Self::UnknownMetric(name.into())
    }

    /// Create a linear algebra error.
    #[must_use]
    pub fn linalg(msg: impl Into<String>) -> Self {
        Self::Linalg(msg.into())
    }

    /// Whether the input itself could not be interpreted, as opposed to a
    /// misconfigured call.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Schema { .. } | Self::InsufficientData { .. } | Self::InvalidSeries(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FatigueError::insufficient_data("calibration", 1, 0);
        let msg = err.to_string();
        assert!(msg.contains("calibration"));
        assert!(msg.contains('1'));
        assert!(msg.contains('0'));
    }

    #[test]
    fn test_input_error_classification() {
        assert!(FatigueError::schema("no joints").is_input_error());
        assert!(FatigueError::insufficient_data("calibration", 1, 0).is_input_error());
        assert!(!FatigueError::invalid_config("fps must be positive").is_input_error());
        assert!(!FatigueError::unknown_metric("lean_x").is_input_error());
    }

    #[test]
    fn test_error_constructors() {
        let _ = FatigueError::invalid_series("ragged columns");
        let _ = FatigueError::length_mismatch(10, 20);
        let _ = FatigueError::linalg("svd did not converge");
    }
}
