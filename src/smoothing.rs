//! Coordinate smoothing.
//!
//! Applies a Savitzky-Golay filter to every joint-coordinate column, one
//! axis at a time.

use tracing::debug;

use crate::error::Result;
use crate::math::savgol::SavgolFilter;
use crate::schema::{joint_column_indices, JointColumns};
use crate::series::{Reading, TimeSeries};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Smoothing stage results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmoothingReport {
    /// Window length actually used.
    pub window: usize,
    /// Columns that were filtered.
    pub smoothed_columns: usize,
    /// Columns left unmodified (too short, or still containing gaps).
    pub skipped_columns: Vec<String>,
}

/// Coerce a window length to the next odd integer.
#[must_use]
pub const fn odd_window(window: usize) -> usize {
    if window % 2 == 0 {
        window + 1
    } else {
        window
    }
}

/// Smooth each joint-coordinate column of `series`.
///
/// Even `window` values are bumped to the next odd integer. A column with
/// fewer samples than the window, or with missing readings, is left
/// unmodified and listed in the report.
///
/// # Errors
///
/// Returns an error if `poly` is not below the (odd) window length.
pub fn smooth(
    series: &TimeSeries,
    joints: &[JointColumns],
    window: usize,
    poly: usize,
) -> Result<(TimeSeries, SmoothingReport)> {
    let window = odd_window(window.max(1));
    let filter = SavgolFilter::new(window, poly)?;

    let mut out = series.clone();
    let mut report = SmoothingReport {
        window,
        ..SmoothingReport::default()
    };

    for (_, axes) in joint_column_indices(series, joints) {
        for col in axes {
            let values: Option<Vec<f64>> =
                series.column_at(col).iter().map(|r| r.value()).collect();
            let smoothed = values.as_deref().and_then(|v| filter.apply(v));

            match smoothed {
                Some(smoothed) => {
                    for (slot, v) in out.column_at_mut(col).iter_mut().zip(smoothed) {
                        *slot = Reading::Valid(v);
                    }
                    report.smoothed_columns += 1;
                }
                None => {
                    let name = series.column_names()[col].clone();
                    debug!(column = %name, window, "smoothing skipped");
                    report.skipped_columns.push(name);
                }
            }
        }
    }

    Ok((out, report))
}
