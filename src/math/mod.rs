//! Mathematical utilities for drift analysis.
//!
//! This module provides:
//! - [`linalg`]: covariance and SVD pseudo-inverse
//! - [`stats`]: NaN-skipping univariate statistics and line fitting
//! - [`savgol`]: Savitzky-Golay smoothing weights

pub mod linalg;
pub mod savgol;
pub mod stats;

pub use linalg::{pseudo_inverse, sample_covariance};
pub use savgol::SavgolFilter;
pub use stats::{fit_linear, nan_mean, nan_median, nan_std};
