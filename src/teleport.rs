//! Teleportation filter.
//!
//! A tracked joint that jumps further than a physical threshold between
//! consecutive observations is a tracking artifact (the estimator snapped to
//! a different limb or to background). The offending sample's coordinates
//! are nulled so the repair stage can interpolate across it.

use tracing::debug;

use crate::distance::euclidean3;
use crate::schema::{joint_column_indices, JointColumns};
use crate::series::{Reading, TimeSeries};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Teleportation filter results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TeleportReport {
    /// Total joint samples nulled.
    pub nulled: usize,
    /// `(joint index, nulled count)` for joints with at least one removal.
    pub per_joint: Vec<(usize, usize)>,
}

/// Null joint samples displaced more than `threshold` from the previous
/// accepted position of the same joint.
///
/// The first observed sample of each joint is always accepted. A rejected
/// sample leaves the reference position untouched; an accepted one becomes
/// the new reference. Samples that are not fully observed (any coordinate
/// missing, or the zero sentinel when `zero_is_missing` is set) are neither
/// filtered nor used as a reference.
///
/// The comparison is strict: a displacement of exactly `threshold` is kept.
#[must_use]
pub fn remove_teleportation(
    series: &TimeSeries,
    joints: &[JointColumns],
    threshold: f64,
    zero_is_missing: bool,
) -> (TimeSeries, TeleportReport) {
    let mut out = series.clone();
    let mut report = TeleportReport::default();

    for (joint, [cx, cy, cz]) in joint_column_indices(series, joints) {
        let xs = series.column_at(cx);
        let ys = series.column_at(cy);
        let zs = series.column_at(cz);

        let mut reference: Option<[f64; 3]> = None;
        let mut rejected = Vec::new();

        for row in 0..series.len() {
            let Some(pos) = observed_position(xs[row], ys[row], zs[row], zero_is_missing) else {
                continue;
            };
            match reference {
                Some(prev) if euclidean3(&prev, &pos) > threshold => rejected.push(row),
                _ => reference = Some(pos),
            }
        }

        if rejected.is_empty() {
            continue;
        }
        for col in [cx, cy, cz] {
            let column = out.column_at_mut(col);
            for &row in &rejected {
                column[row] = Reading::Missing;
            }
        }
        debug!(joint, nulled = rejected.len(), "teleportation removed");
        report.nulled += rejected.len();
        report.per_joint.push((joint, rejected.len()));
    }

    (out, report)
}

fn observed_position(x: Reading, y: Reading, z: Reading, zero_is_missing: bool) -> Option<[f64; 3]> {
    if !(x.is_observed(zero_is_missing)
        && y.is_observed(zero_is_missing)
        && z.is_observed(zero_is_missing))
    {
        return None;
    }
    Some([x.value()?, y.value()?, z.value()?])
}
