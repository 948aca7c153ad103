//! Univariate statistics over possibly incomplete data.
//!
//! All functions skip NaN entries, matching how missing readings are
//! carried through the analysis stages.

/// Mean of the finite values, or `None` if there are none.
#[must_use]
pub fn nan_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample standard deviation (`n - 1` denominator) of the finite values.
///
/// `None` with fewer than two finite values.
#[must_use]
pub fn nan_std(values: &[f64]) -> Option<f64> {
    let mean = nan_mean(values)?;
    let (ss, count) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, c), v| (s + (v - mean).powi(2), c + 1));
    (count > 1).then(|| (ss / (count - 1) as f64).sqrt())
}

/// Median of the finite values.
#[must_use]
pub fn nan_median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Minimum and maximum of the finite values.
#[must_use]
pub fn nan_min_max(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Least-squares line through `(t, y)` pairs with finite coordinates.
///
/// Returns `(intercept, slope)`, or `None` with fewer than two usable
/// points or a degenerate (constant) `t`.
#[must_use]
pub fn fit_linear(t: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let (m, sum_t, sum_y) = t
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .fold((0usize, 0.0, 0.0), |(m, st, sy), (a, b)| (m + 1, st + a, sy + b));
    if m < 2 {
        return None;
    }

    // Centered sums keep large timestamps from cancelling catastrophically.
    let mean_t = sum_t / m as f64;
    let mean_y = sum_y / m as f64;
    let (stt, sty) = t
        .iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .fold((0.0, 0.0), |(stt, sty), (a, b)| {
            let dt = a - mean_t;
            (stt + dt * dt, sty + dt * (b - mean_y))
        });

    if !stt.is_finite() || stt <= f64::EPSILON {
        return None;
    }
    let slope = sty / stt;
    Some((mean_y - slope * mean_t, slope))
}
