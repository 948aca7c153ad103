//! Pose landmark lookup table.
//!
//! The recorder emits one coordinate triple per landmark of the 33-point
//! BlazePose topology. [`LandmarkTable`] maps landmark indices to names and
//! bounds the joint indices the schema resolver accepts.

/// Number of landmarks in the BlazePose topology.
pub const LANDMARK_COUNT: usize = 33;

const BLAZEPOSE_NAMES: [&str; LANDMARK_COUNT] = [
    "nose",
    "left_eye_inner",
    "left_eye",
    "left_eye_outer",
    "right_eye_inner",
    "right_eye",
    "right_eye_outer",
    "left_ear",
    "right_ear",
    "mouth_left",
    "mouth_right",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_pinky",
    "right_pinky",
    "left_index",
    "right_index",
    "left_thumb",
    "right_thumb",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
    "left_heel",
    "right_heel",
    "left_foot_index",
    "right_foot_index",
];

/// Immutable landmark index/name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkTable {
    names: &'static [&'static str],
}

/// The BlazePose table, shared by reference.
pub const BLAZEPOSE: LandmarkTable = LandmarkTable {
    names: &BLAZEPOSE_NAMES,
};

impl LandmarkTable {
    /// Table whose landmark `i` is named `names[i]`.
    #[must_use]
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    /// The 33-landmark BlazePose table.
    #[must_use]
    pub const fn blazepose() -> &'static Self {
        &BLAZEPOSE
    }

    /// Number of landmarks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `index` names a landmark in this table.
    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        index < self.names.len()
    }

    /// Landmark name for an index.
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&'static str> {
        self.names.get(index).copied()
    }

    /// Landmark index for a name.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|&n| n == name)
    }
}
