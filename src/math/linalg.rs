//! Linear algebra utilities.
//!
//! Covariance estimation and Moore-Penrose pseudo-inversion using nalgebra's
//! SVD, plus small fixed-size vector helpers.

use nalgebra::{DMatrix, DVector};

use crate::error::{FatigueError, Result};

/// Sample covariance of the rows of `data` (observations x variables).
///
/// Uses the `n - 1` denominator. Returns the zero matrix when fewer than two
/// observations are available.
#[must_use]
pub fn sample_covariance(data: &DMatrix<f64>) -> DMatrix<f64> {
    let (n, m) = data.shape();
    if n < 2 {
        return DMatrix::zeros(m, m);
    }

    let mean = column_means(data);
    let mut centered = data.clone();
    for (j, mut col) in centered.column_iter_mut().enumerate() {
        col.add_scalar_mut(-mean[j]);
    }

    let mut cov = centered.transpose() * &centered;
    cov /= (n - 1) as f64;

    // Enforce exact symmetry.
    (&cov + cov.transpose()) * 0.5
}

/// Mean of each column of `data`.
#[must_use]
pub fn column_means(data: &DMatrix<f64>) -> DVector<f64> {
    let (n, m) = data.shape();
    if n == 0 {
        return DVector::zeros(m);
    }
    DVector::from_iterator(m, data.column_iter().map(|c| c.sum() / n as f64))
}

/// Moore-Penrose pseudo-inverse.
///
/// Singular values at or below `rcond * max_singular_value` are treated as
/// zero, so rank-deficient (collinear) inputs yield a finite result.
///
/// # Errors
///
/// Returns an error if the matrix contains non-finite values or the SVD
/// cannot be inverted.
pub fn pseudo_inverse(matrix: &DMatrix<f64>, rcond: f64) -> Result<DMatrix<f64>> {
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(FatigueError::linalg(
            "cannot pseudo-invert a matrix with non-finite entries",
        ));
    }
    if matrix.is_empty() || matrix.iter().all(|&v| v == 0.0) {
        return Ok(DMatrix::zeros(matrix.ncols(), matrix.nrows()));
    }

    let svd = matrix.clone().svd(true, true);
    let max_sv = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = rcond * max_sv;

    svd.pseudo_inverse(cutoff).map_err(FatigueError::linalg)
}

/// Dot product of two 3D vectors.
#[must_use]
#[inline]
pub fn dot3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}
