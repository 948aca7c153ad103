//! Gap repair.
//!
//! Unifies the two "no data" representations (missing readings and, when
//! enabled, the zero sentinel), fills short gaps by linear interpolation and
//! zero-fills whatever is left.

use tracing::{debug, warn};

use crate::schema::{joint_column_indices, JointColumns};
use crate::series::{Reading, TimeSeries};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Repair stage results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RepairReport {
    /// Zero-sentinel values converted to missing before interpolation.
    pub zeros_converted: usize,
    /// Values filled by interpolation.
    pub interpolated: usize,
    /// Values still missing after interpolation and set to `0.0`.
    pub zero_filled: usize,
}

impl RepairReport {
    /// Whether the lossy zero-fill fallback fired.
    #[must_use]
    pub const fn has_unrepaired_gaps(&self) -> bool {
        self.zero_filled > 0
    }
}

/// Fill runs of missing readings no longer than `limit` by linear
/// interpolation between the valid neighbours on either side.
///
/// Longer runs, and runs touching either end of the column, are left
/// missing. Returns the number of readings filled.
pub fn interpolate_gaps(column: &mut [Reading], limit: usize) -> usize {
    let n = column.len();
    let mut filled = 0;
    let mut i = 0;

    while i < n {
        if !column[i].is_missing() {
            i += 1;
            continue;
        }
        let start = i;
        while i < n && column[i].is_missing() {
            i += 1;
        }
        let end = i; // exclusive
        let run = end - start;

        if start == 0 || end == n || run > limit {
            continue;
        }
        let (Some(left), Some(right)) = (column[start - 1].value(), column[end].value()) else {
            continue;
        };

        let span = (run + 1) as f64;
        for (k, slot) in column[start..end].iter_mut().enumerate() {
            let frac = (k + 1) as f64 / span;
            *slot = Reading::Valid(left + (right - left) * frac);
        }
        filled += run;
    }

    filled
}

/// Repair the joint-coordinate columns of `series`.
///
/// 1. With `zero_is_missing`, literal `0.0` coordinates become missing.
/// 2. Gaps of at most `limit` samples are linearly interpolated.
/// 3. Remaining missing coordinates are set to `0.0`.
///
/// Valid non-zero values are never altered. Non-joint columns are left as is.
#[must_use]
pub fn repair(
    series: &TimeSeries,
    joints: &[JointColumns],
    limit: usize,
    zero_is_missing: bool,
) -> (TimeSeries, RepairReport) {
    let mut out = series.clone();
    let mut report = RepairReport::default();

    for (_, axes) in joint_column_indices(series, joints) {
        for col in axes {
            let column = out.column_at_mut(col);

            if zero_is_missing {
                for slot in column.iter_mut().filter(|r| r.is_zero()) {
                    *slot = Reading::Missing;
                    report.zeros_converted += 1;
                }
            }

            report.interpolated += interpolate_gaps(column, limit);

            for slot in column.iter_mut().filter(|r| r.is_missing()) {
                *slot = Reading::Valid(0.0);
                report.zero_filled += 1;
            }
        }
    }

    if report.has_unrepaired_gaps() {
        warn!(
            zero_filled = report.zero_filled,
            limit, "gaps beyond interpolation limit were zero-filled"
        );
    }
    debug!(
        zeros_converted = report.zeros_converted,
        interpolated = report.interpolated,
        "repair complete"
    );

    (out, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::LandmarkTable;
    use crate::schema::resolve_series;
    use approx::assert_relative_eq;

    fn readings(values: &[f64]) -> Vec<Reading> {
        values.iter().map(|&v| Reading::from(v)).collect()
    }

    fn joint_series(xs: &[f64]) -> TimeSeries {
        let n = xs.len();
        TimeSeries::new((0..n).map(|i| i as f64).collect(), None)
            .unwrap()
            .with_values("j0_x", xs)
            .unwrap()
            .with_values("j0_y", &vec![2.0; n])
            .unwrap()
            .with_values("j0_z", &vec![3.0; n])
            .unwrap()
            .with_values("lean_x", &vec![0.0; n])
            .unwrap()
    }

    #[test]
    fn test_interpolate_interior_gap() {
        let mut col = readings(&[1.0, f64::NAN, f64::NAN, 4.0]);
        let filled = interpolate_gaps(&mut col, 30);
        assert_eq!(filled, 2);
        assert_relative_eq!(col[1].value().unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(col[2].value().unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_respects_limit() {
        let mut col = readings(&[1.0, f64::NAN, f64::NAN, f64::NAN, 5.0]);
        assert_eq!(interpolate_gaps(&mut col, 2), 0);
        assert!(col[1..4].iter().all(|r| r.is_missing()));

        assert_eq!(interpolate_gaps(&mut col, 3), 3);
        assert_relative_eq!(col[2].value().unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_leaves_edges() {
        let mut col = readings(&[f64::NAN, 1.0, 2.0, f64::NAN]);
        assert_eq!(interpolate_gaps(&mut col, 30), 0);
        assert!(col[0].is_missing());
        assert!(col[3].is_missing());
    }

    #[test]
    fn test_repair_converts_zeros_and_fills() {
        let series = joint_series(&[0.0, 1.0, 0.0, 3.0, f64::NAN]);
        let joints = resolve_series(&series, LandmarkTable::blazepose()).unwrap();
        let (out, report) = repair(&series, &joints, 30, true);

        assert_eq!(report.zeros_converted, 2);
        assert_eq!(report.interpolated, 1);
        // Leading zero and trailing missing have no neighbour on one side.
        assert_eq!(report.zero_filled, 2);
        assert!(report.has_unrepaired_gaps());

        let xs = out.column("j0_x").unwrap();
        assert_eq!(xs[0], Reading::Valid(0.0));
        assert_eq!(xs[1], Reading::Valid(1.0));
        assert_relative_eq!(xs[2].value().unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(xs[3], Reading::Valid(3.0));
        assert_eq!(xs[4], Reading::Valid(0.0));

        // Non-joint columns keep their zeros.
        assert!(out.column("lean_x").unwrap().iter().all(|r| r.is_zero()));
    }

    #[test]
    fn test_repair_keeps_true_zeros_when_disabled() {
        let series = joint_series(&[1.0, 0.0, 3.0]);
        let joints = resolve_series(&series, LandmarkTable::blazepose()).unwrap();
        let (out, report) = repair(&series, &joints, 30, false);
        assert_eq!(report, RepairReport::default());
        assert_eq!(out, series);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let series = joint_series(&[1.0, f64::NAN, 0.0, 4.0, 5.5]);
        let joints = resolve_series(&series, LandmarkTable::blazepose()).unwrap();
        let (once, _) = repair(&series, &joints, 30, true);
        let (twice, report) = repair(&once, &joints, 30, true);

        assert_eq!(report, RepairReport::default());
        for ((_, a), (_, b)) in once.columns().zip(twice.columns()) {
            for (ra, rb) in a.iter().zip(b.iter()) {
                assert_eq!(ra.value().map(f64::to_bits), rb.value().map(f64::to_bits));
            }
        }
    }
}
