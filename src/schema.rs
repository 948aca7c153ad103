//! Joint-coordinate column resolution.
//!
//! Recordings name joint coordinates under one of two conventions:
//!
//! | Variant | Keys | Origin |
//! |---------|------|--------|
//! | [`SchemaVariant::Compact`] | `j{n}_x`, `j{n}_y`, `j{n}_z` | current recorder |
//! | [`SchemaVariant::Legacy`] | `joint_{n}_x`, `joint_{n}_y`, `joint_{n}_z` | older sessions |
//!
//! Both are resolved to the same [`JointColumns`] per joint index so that
//! downstream stages never look at key spellings again.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::error::{FatigueError, Result};
use crate::landmarks::LandmarkTable;
use crate::series::TimeSeries;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Naming convention of a joint's coordinate keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SchemaVariant {
    /// `j{n}_x`
    Compact,
    /// `joint_{n}_x`
    Legacy,
}

impl SchemaVariant {
    /// Key prefix for a joint under this convention.
    #[must_use]
    pub fn prefix(self, joint: usize) -> String {
        match self {
            Self::Compact => format!("j{joint}"),
            Self::Legacy => format!("joint_{joint}"),
        }
    }

    /// Parse a key prefix (the part before `_x`) into variant and joint.
    #[must_use]
    pub fn parse_prefix(prefix: &str) -> Option<(Self, usize)> {
        if let Some(digits) = prefix.strip_prefix("joint_") {
            return parse_index(digits).map(|n| (Self::Legacy, n));
        }
        if let Some(digits) = prefix.strip_prefix('j') {
            return parse_index(digits).map(|n| (Self::Compact, n));
        }
        None
    }
}

/// Canonical decimal index: digits only, no sign, no leading zeros.
fn parse_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

/// The three coordinate keys of one joint as they appear in a series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointColumns {
    /// Landmark index.
    pub joint: usize,
    /// Convention the keys were found under.
    pub variant: SchemaVariant,
    /// X coordinate key.
    pub x: String,
    /// Y coordinate key.
    pub y: String,
    /// Z coordinate key.
    pub z: String,
}

impl JointColumns {
    /// Keys for a joint under the given convention.
    #[must_use]
    pub fn new(joint: usize, variant: SchemaVariant) -> Self {
        let prefix = variant.prefix(joint);
        Self {
            joint,
            variant,
            x: format!("{prefix}_x"),
            y: format!("{prefix}_y"),
            z: format!("{prefix}_z"),
        }
    }

    /// Source keys in axis order.
    #[must_use]
    pub fn keys(&self) -> [&str; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// Convention-independent keys (`j{n}_x` spelling).
    #[must_use]
    pub fn canonical_keys(&self) -> [String; 3] {
        let c = Self::new(self.joint, SchemaVariant::Compact);
        [c.x, c.y, c.z]
    }

    /// Landmark name of this joint, if the table knows it.
    #[must_use]
    pub fn landmark_name(&self, table: &LandmarkTable) -> Option<&'static str> {
        table.name(self.joint)
    }
}

/// Resolve joint-coordinate triples from a metric key set.
///
/// Keys ending in `_x` are stripped to a prefix; prefixes that match either
/// convention and name a joint in `table` yield a triple when the matching
/// `_y` and `_z` keys are also present. If both conventions provide a full
/// triple for the same joint, the compact one is used.
///
/// # Returns
///
/// Triples sorted by joint index.
///
/// # Errors
///
/// Returns [`FatigueError::Schema`] if no triple can be resolved.
pub fn resolve_joint_columns<'a, I>(keys: I, table: &LandmarkTable) -> Result<Vec<JointColumns>>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: HashSet<&str> = keys.into_iter().collect();
    let mut resolved: BTreeMap<usize, JointColumns> = BTreeMap::new();

    for key in &keys {
        let Some(prefix) = key.strip_suffix("_x") else {
            continue;
        };
        let Some((variant, joint)) = SchemaVariant::parse_prefix(prefix) else {
            continue;
        };
        if !table.contains(joint) {
            continue;
        }

        let candidate = JointColumns::new(joint, variant);
        if !(keys.contains(candidate.y.as_str()) && keys.contains(candidate.z.as_str())) {
            continue;
        }

        match resolved.get(&joint) {
            Some(existing) if existing.variant == SchemaVariant::Compact => {
                debug!(joint, "ignoring legacy keys shadowed by compact keys");
            }
            Some(_) => {
                debug!(joint, "compact keys replace legacy keys");
                resolved.insert(joint, candidate);
            }
            None => {
                resolved.insert(joint, candidate);
            }
        }
    }

    if resolved.is_empty() {
        return Err(FatigueError::schema(
            "no joint data found (checked 'j{n}_x' and 'joint_{n}_x' keys)",
        ));
    }

    Ok(resolved.into_values().collect())
}

/// Resolve joint-coordinate triples from a series' columns.
///
/// # Errors
///
/// Returns [`FatigueError::Schema`] if no triple can be resolved.
pub fn resolve_series(series: &TimeSeries, table: &LandmarkTable) -> Result<Vec<JointColumns>> {
    resolve_joint_columns(series.column_names().iter().map(String::as_str), table)
}

/// Column positions of each joint's x/y/z keys in `series`.
///
/// Joints whose keys are not all present are skipped.
#[must_use]
pub(crate) fn joint_column_indices(
    series: &TimeSeries,
    joints: &[JointColumns],
) -> Vec<(usize, [usize; 3])> {
    let lookup = series.column_lookup();
    joints
        .iter()
        .filter_map(|j| {
            let [x, y, z] = j.keys();
            Some((j.joint, [*lookup.get(x)?, *lookup.get(y)?, *lookup.get(z)?]))
        })
        .collect()
}
