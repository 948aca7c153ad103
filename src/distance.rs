//! Distance functions.
//!
//! Euclidean displacement between joint positions, and Mahalanobis distance
//! of a metric vector from a baseline centroid.

use nalgebra::{DMatrix, DVector};

use crate::math::linalg::dot3;

/// Euclidean distance between two 3D positions.
#[must_use]
#[inline]
pub fn euclidean3(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let d = [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    dot3(&d, &d).sqrt()
}

/// Mahalanobis distance of `point` from `centroid` under `inv_cov`.
///
/// `inv_cov` is typically a pseudo-inverse, so the quadratic form may come
/// out slightly negative from round-off; it is clamped at zero.
///
/// Returns NaN if `point` contains a non-finite value, or if the centroid
/// does and the quadratic form is undefined.
///
/// # Panics
///
/// Panics if the dimensions of `point`, `centroid` and `inv_cov` disagree.
#[must_use]
pub fn mahalanobis(point: &[f64], centroid: &DVector<f64>, inv_cov: &DMatrix<f64>) -> f64 {
    assert_eq!(point.len(), centroid.len(), "point/centroid dimension");
    assert_eq!(inv_cov.nrows(), centroid.len(), "inverse covariance rows");
    assert_eq!(inv_cov.ncols(), centroid.len(), "inverse covariance columns");

    if point.iter().any(|v| !v.is_finite()) {
        return f64::NAN;
    }

    let delta = DVector::from_iterator(
        point.len(),
        point.iter().zip(centroid.iter()).map(|(p, c)| p - c),
    );
    let q = delta.dot(&(inv_cov * &delta));
    if q.is_nan() {
        return f64::NAN;
    }
    q.max(0.0).sqrt()
}
