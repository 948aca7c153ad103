//! Trailing rolling mean.
//!
//! [`RollingMean`] keeps a fixed-length window of recent samples and reports
//! the mean of the valid ones. A partially filled window is still averaged
//! (minimum one valid sample), so the output is aligned with the input from
//! the very first sample.

use std::collections::VecDeque;

/// Streaming mean over the last `window` samples.
///
/// Missing samples (NaN) occupy a slot in the window but do not contribute
/// to the mean.
///
/// # Example
///
/// ```
/// use fatigue_drift::rolling::RollingMean;
///
/// let mut mean = RollingMean::new(2);
/// assert_eq!(mean.update(1.0), Some(1.0));
/// assert_eq!(mean.update(3.0), Some(2.0));
/// assert_eq!(mean.update(5.0), Some(4.0));
/// ```
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: usize,
    buffer: VecDeque<f64>,
    sum: f64,
    valid: usize,
}

impl RollingMean {
    /// Create a rolling mean over `window` samples (at least one).
    #[must_use]
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            buffer: VecDeque::with_capacity(window),
            sum: 0.0,
            valid: 0,
        }
    }

    /// Push a sample and return the mean of the valid samples in the window,
    /// or `None` if the window holds no valid sample.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        if self.buffer.len() == self.window {
            if let Some(old) = self.buffer.pop_front() {
                if old.is_finite() {
                    self.sum -= old;
                    self.valid -= 1;
                }
            }
        }

        self.buffer.push_back(value);
        if value.is_finite() {
            self.sum += value;
            self.valid += 1;
        }

        // Re-anchor the running sum when the window empties of valid data.
        if self.valid == 0 {
            self.sum = 0.0;
        }

        self.mean()
    }

    /// Mean of the valid samples currently in the window.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.valid > 0).then(|| self.sum / self.valid as f64)
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Samples currently buffered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been pushed since creation or the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the window.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
        self.valid = 0;
    }
}

/// Trailing rolling mean of `values` over `window` samples.
///
/// Output is aligned with the input; positions whose window holds no valid
/// sample are NaN.
#[must_use]
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut roll = RollingMean::new(window);
    values
        .iter()
        .map(|&v| roll.update(v).unwrap_or(f64::NAN))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_windows_are_averaged() {
        let out = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], 3.0);
        assert_relative_eq!(out[2], 4.0);
        assert_relative_eq!(out[3], 6.0);
    }

    #[test]
    fn test_missing_values_skipped() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, f64::NAN, f64::NAN], 2);
        assert_relative_eq!(out[0], 1.0);
        assert_relative_eq!(out[1], 1.0);
        assert_relative_eq!(out[2], 3.0);
        assert_relative_eq!(out[3], 3.0);
        assert!(out[4].is_nan());
    }

    #[test]
    fn test_leading_missing_is_nan() {
        let out = rolling_mean(&[f64::NAN, 5.0], 10);
        assert!(out[0].is_nan());
        assert_relative_eq!(out[1], 5.0);
    }

    #[test]
    fn test_constant_input_is_exact() {
        let values = vec![93.25; 500];
        let out = rolling_mean(&values, 60);
        assert!(out.iter().all(|&v| v == 93.25));
    }

    #[test]
    fn test_zero_window_behaves_as_one() {
        let out = rolling_mean(&[1.0, 2.0, 3.0], 0);
        assert_eq!(out, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_reset() {
        let mut roll = RollingMean::new(3);
        roll.update(10.0);
        roll.update(20.0);
        assert_eq!(roll.len(), 2);

        roll.reset();
        assert!(roll.is_empty());
        assert_eq!(roll.mean(), None);
        assert_eq!(roll.update(4.0), Some(4.0));
        assert_eq!(roll.window(), 3);
    }
}
