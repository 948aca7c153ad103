//! Time-series data model.
//!
//! A [`TimeSeries`] stores one recording session column-wise: a timestamp
//! vector, an optional frame-index vector and a set of named metric columns
//! of [`Reading`]s. Every column has exactly one reading per sample; absent
//! data is an explicit [`Reading::Missing`], never an omitted entry.
//!
//! Row-wise [`Sample`]s are supported for construction and inspection.

use std::collections::{BTreeMap, HashMap};

use crate::error::{FatigueError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One metric value at one sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reading {
    /// A measured value.
    Valid(f64),
    /// No measurement available.
    #[default]
    Missing,
}

impl Reading {
    /// The measured value, if any.
    #[must_use]
    #[inline]
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Valid(v) => Some(v),
            Self::Missing => None,
        }
    }

    /// Whether this reading is [`Reading::Missing`].
    #[must_use]
    #[inline]
    pub const fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Whether this reading is a literal `0.0` measurement.
    #[must_use]
    #[inline]
    pub fn is_zero(self) -> bool {
        matches!(self, Self::Valid(v) if v == 0.0)
    }

    /// Whether the reading carries a real observation.
    ///
    /// With `zero_is_missing` set, the sensor's zero sentinel counts as
    /// unobserved.
    #[must_use]
    #[inline]
    pub fn is_observed(self, zero_is_missing: bool) -> bool {
        match self {
            Self::Valid(v) => !(zero_is_missing && v == 0.0),
            Self::Missing => false,
        }
    }

    /// The value, or NaN when missing.
    #[must_use]
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.value().unwrap_or(f64::NAN)
    }
}

impl From<f64> for Reading {
    /// Non-finite values become [`Reading::Missing`].
    fn from(v: f64) -> Self {
        if v.is_finite() {
            Self::Valid(v)
        } else {
            Self::Missing
        }
    }
}

impl From<Option<f64>> for Reading {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Missing, Self::from)
    }
}

/// One captured instant, row-wise.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Seconds since the start of the session.
    pub timestamp: f64,
    /// Capture frame counter, if the recorder provides one.
    pub frame_index: Option<i64>,
    /// Metric key to reading.
    pub values: BTreeMap<String, Reading>,
}

impl Sample {
    /// Create a sample with no metrics.
    #[must_use]
    pub fn new(timestamp: f64, frame_index: Option<i64>) -> Self {
        Self {
            timestamp,
            frame_index,
            values: BTreeMap::new(),
        }
    }

    /// Add a metric reading.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, reading: impl Into<Reading>) -> Self {
        self.values.insert(key.into(), reading.into());
        self
    }
}

/// A recording session stored column-wise.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeSeries {
    timestamps: Vec<f64>,
    frame_indices: Option<Vec<i64>>,
    names: Vec<String>,
    columns: Vec<Vec<Reading>>,
}

impl TimeSeries {
    /// Create a series with a time axis and no metric columns.
    ///
    /// # Errors
    ///
    /// Returns [`FatigueError::InvalidSeries`] if timestamps are not finite
    /// and non-decreasing, or if frame indices have a different length.
    pub fn new(timestamps: Vec<f64>, frame_indices: Option<Vec<i64>>) -> Result<Self> {
        if let Some(idx) = timestamps.iter().position(|t| !t.is_finite()) {
            return Err(FatigueError::invalid_series(format!(
                "timestamp at index {idx} is not finite"
            )));
        }
        if let Some(idx) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(FatigueError::invalid_series(format!(
                "timestamps decrease at index {}",
                idx + 1
            )));
        }
        if let Some(frames) = &frame_indices {
            if frames.len() != timestamps.len() {
                return Err(FatigueError::invalid_series(format!(
                    "{} frame indices for {} timestamps",
                    frames.len(),
                    timestamps.len()
                )));
            }
        }
        Ok(Self {
            timestamps,
            frame_indices,
            names: Vec::new(),
            columns: Vec::new(),
        })
    }

    /// Add a named column, builder style.
    ///
    /// # Errors
    ///
    /// See [`TimeSeries::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Reading>) -> Result<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    /// Add a column of plain floats; non-finite values become missing.
    ///
    /// # Errors
    ///
    /// See [`TimeSeries::push_column`].
    pub fn with_values(self, name: impl Into<String>, values: &[f64]) -> Result<Self> {
        self.with_column(name, values.iter().map(|&v| Reading::from(v)).collect())
    }

    /// Add a named column.
    ///
    /// # Errors
    ///
    /// Returns [`FatigueError::InvalidSeries`] if the name is already taken
    /// or the column length differs from the series length.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Reading>) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(FatigueError::invalid_series(format!(
                "duplicate column '{name}'"
            )));
        }
        if values.len() != self.timestamps.len() {
            return Err(FatigueError::invalid_series(format!(
                "column '{name}' has {} values, series has {} samples",
                values.len(),
                self.timestamps.len()
            )));
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Build a series from row-wise samples.
    ///
    /// Samples are ordered by frame index when every sample carries one and
    /// kept in the given order otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`FatigueError::InvalidSeries`] if samples disagree on their
    /// key set, only some carry a frame index, or timestamps decrease.
    pub fn from_samples(mut samples: Vec<Sample>) -> Result<Self> {
        let with_frames = samples.iter().filter(|s| s.frame_index.is_some()).count();
        if with_frames != 0 && with_frames != samples.len() {
            return Err(FatigueError::invalid_series(
                "frame_index present on some samples but not all",
            ));
        }
        if with_frames > 0 {
            samples.sort_by_key(|s| s.frame_index);
        }

        let names: Vec<String> = samples
            .first()
            .map(|s| s.values.keys().cloned().collect())
            .unwrap_or_default();

        let mut columns: Vec<Vec<Reading>> = vec![Vec::with_capacity(samples.len()); names.len()];
        for (row, sample) in samples.iter().enumerate() {
            if sample.values.len() != names.len()
                || !sample.values.keys().zip(names.iter()).all(|(a, b)| a == b)
            {
                return Err(FatigueError::invalid_series(format!(
                    "sample {row} has a different metric key set"
                )));
            }
            for (col, reading) in columns.iter_mut().zip(sample.values.values()) {
                col.push(*reading);
            }
        }

        let timestamps = samples.iter().map(|s| s.timestamp).collect();
        let frame_indices = (with_frames > 0)
            .then(|| samples.iter().filter_map(|s| s.frame_index).collect());

        let mut series = Self::new(timestamps, frame_indices)?;
        series.names = names;
        series.columns = columns;
        Ok(series)
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the series has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Sample timestamps in seconds.
    #[must_use]
    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Frame indices, if recorded.
    #[must_use]
    pub fn frame_indices(&self) -> Option<&[i64]> {
        self.frame_indices.as_deref()
    }

    /// Names of all metric columns, in insertion order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Number of metric columns.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.names.len()
    }

    /// Whether a column with this name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Position of a column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Readings of a named column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Reading]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    /// Readings of the column at `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> &[Reading] {
        &self.columns[index]
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> &mut [Reading] {
        &mut self.columns[index]
    }

    /// Iterate `(name, readings)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Reading])> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.as_str(), c.as_slice()))
    }

    /// Map from column name to position, for repeated lookups.
    #[must_use]
    pub fn column_lookup(&self) -> HashMap<&str, usize> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i))
            .collect()
    }

    /// Reconstruct the sample at `row`.
    #[must_use]
    pub fn sample(&self, row: usize) -> Option<Sample> {
        let timestamp = *self.timestamps.get(row)?;
        let frame_index = self.frame_indices.as_ref().map(|f| f[row]);
        let values = self
            .names
            .iter()
            .zip(self.columns.iter())
            .map(|(n, c)| (n.clone(), c[row]))
            .collect();
        Some(Sample {
            timestamp,
            frame_index,
            values,
        })
    }

    /// Elapsed time between the first and last sample.
    #[must_use]
    pub fn duration(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Keep only the first `n` samples.
    #[must_use]
    pub fn head(&self, n: usize) -> Self {
        let n = n.min(self.len());
        Self {
            timestamps: self.timestamps[..n].to_vec(),
            frame_indices: self.frame_indices.as_ref().map(|f| f[..n].to_vec()),
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c[..n].to_vec()).collect(),
        }
    }
}
