//! Savitzky-Golay smoothing.
//!
//! Each output sample is the value, at that sample, of a least-squares
//! polynomial fitted over a sliding window. Interior samples use the centred
//! window; the first and last `window / 2` samples are evaluated on the
//! polynomial fitted to the first and last full window respectively, so the
//! output has the same length as the input and no padding is invented.

use nalgebra::{DMatrix, RowDVector};

use crate::error::{FatigueError, Result};
use crate::math::linalg::pseudo_inverse;

/// Precomputed Savitzky-Golay convolution weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SavgolFilter {
    window: usize,
    poly: usize,
    /// `weights[k]` evaluates the window fit at offset `k` from its start.
    weights: Vec<Vec<f64>>,
}

impl SavgolFilter {
    /// Build a filter for an odd `window` and polynomial order `poly < window`.
    ///
    /// # Errors
    ///
    /// Returns an error if the window is even or zero, or the order is not
    /// below the window length.
    pub fn new(window: usize, poly: usize) -> Result<Self> {
        if window == 0 || window % 2 == 0 {
            return Err(FatigueError::invalid_config(format!(
                "savgol window must be odd and positive, got {window}"
            )));
        }
        if poly >= window {
            return Err(FatigueError::invalid_config(format!(
                "savgol order {poly} must be less than window {window}"
            )));
        }

        let half = (window / 2) as f64;
        let vander = DMatrix::from_fn(window, poly + 1, |i, p| (i as f64 - half).powi(p as i32));
        let fit = pseudo_inverse(&vander, 1e-12)?;

        let weights = (0..window)
            .map(|k| {
                let at = k as f64 - half;
                let basis = RowDVector::from_fn(poly + 1, |_, p| at.powi(p as i32));
                (basis * &fit).iter().copied().collect()
            })
            .collect();

        Ok(Self {
            window,
            poly,
            weights,
        })
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Polynomial order.
    #[must_use]
    pub const fn poly(&self) -> usize {
        self.poly
    }

    /// Weights of the centred window.
    #[must_use]
    pub fn center_weights(&self) -> &[f64] {
        &self.weights[self.window / 2]
    }

    /// Smooth `values`.
    ///
    /// Returns `None` when there are fewer samples than the window length.
    #[must_use]
    pub fn apply(&self, values: &[f64]) -> Option<Vec<f64>> {
        let n = values.len();
        if n < self.window {
            return None;
        }
        let half = self.window / 2;
        let tail_start = n - self.window;

        let out = (0..n)
            .map(|i| {
                let (start, offset) = if i < half {
                    (0, i)
                } else if i >= n - half {
                    (tail_start, i - tail_start)
                } else {
                    (i - half, half)
                };
                dot(&self.weights[offset], &values[start..start + self.window])
            })
            .collect();

        Some(out)
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
