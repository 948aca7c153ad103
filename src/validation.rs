//! Data integrity diagnostics.
//!
//! [`validate_integrity`] scans the joint-coordinate columns of a series and
//! reports tracking loss, missing values and frame drops. It never modifies
//! the series; its report is meant for direct display.

use std::fmt;

use tracing::info;

use crate::schema::{joint_column_indices, JointColumns};
use crate::series::{Reading, TimeSeries};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integrity scan results.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IntegrityReport {
    /// Fraction of coordinate values equal to exactly `0.0`.
    pub tracking_loss_ratio: f64,

    /// Number of coordinate values equal to exactly `0.0`.
    pub tracking_loss_count: usize,

    /// Number of coordinate values marked missing.
    pub missing_count: usize,

    /// Number of successive frame-index gaps larger than one.
    pub frame_drop_count: usize,

    /// Total coordinate values scanned.
    pub total_values: usize,

    /// Whether any defect was found.
    pub needs_repair: bool,
}

impl IntegrityReport {
    /// Number of defect classes present.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        usize::from(self.tracking_loss_count > 0)
            + usize::from(self.missing_count > 0)
            + usize::from(self.frame_drop_count > 0)
    }
}

impl fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.needs_repair {
            return write!(f, "DATA INTEGRITY: PASS\nNo obvious tracking issues found.");
        }

        write!(f, "ISSUES FOUND ({}):", self.issue_count())?;
        if self.tracking_loss_count > 0 {
            write!(
                f,
                "\n- Tracking Loss: {:.1}% zeros detected.",
                self.tracking_loss_ratio * 100.0
            )?;
        }
        if self.missing_count > 0 {
            write!(f, "\n- Data Gaps: {} missing values.", self.missing_count)?;
        }
        if self.frame_drop_count > 0 {
            write!(
                f,
                "\n- Frame Drops: {} discontinuities detected.",
                self.frame_drop_count
            )?;
        }
        Ok(())
    }
}

/// Count successive frame-index gaps larger than one.
#[must_use]
pub fn count_frame_drops(frames: &[i64]) -> usize {
    frames.windows(2).filter(|w| w[1] - w[0] > 1).count()
}

/// Scan the joint-coordinate columns of `series`.
///
/// A coordinate of exactly `0.0` counts as tracking loss; a missing reading
/// counts as a gap. Frame drops are only counted when the series carries
/// frame indices.
#[must_use]
pub fn validate_integrity(series: &TimeSeries, joints: &[JointColumns]) -> IntegrityReport {
    let mut tracking_loss_count = 0usize;
    let mut missing_count = 0usize;
    let mut total_values = 0usize;

    for (_, axes) in joint_column_indices(series, joints) {
        for col in axes {
            for &reading in series.column_at(col) {
                total_values += 1;
                match reading {
                    Reading::Missing => missing_count += 1,
                    r if r.is_zero() => tracking_loss_count += 1,
                    Reading::Valid(_) => {}
                }
            }
        }
    }

    let frame_drop_count = series.frame_indices().map_or(0, count_frame_drops);

    let tracking_loss_ratio = if total_values > 0 {
        tracking_loss_count as f64 / total_values as f64
    } else {
        0.0
    };

    let needs_repair = tracking_loss_count > 0 || missing_count > 0 || frame_drop_count > 0;

    let report = IntegrityReport {
        tracking_loss_ratio,
        tracking_loss_count,
        missing_count,
        frame_drop_count,
        total_values,
        needs_repair,
    };

    info!(
        tracking_loss_ratio,
        missing_count, frame_drop_count, needs_repair, "integrity scan complete"
    );

    report
}
