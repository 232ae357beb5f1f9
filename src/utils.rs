use ndarray::{Array1, ArrayView1};

use crate::F;

/// Circularly shifts `x` so index `0` moves to `len / 2`.
pub fn fftshift(x: ArrayView1<F>) -> Array1<F> {
    let n = x.len();
    let half = n / 2;
    Array1::from_shape_fn(n, |k| x[(k + n - half) % n])
}

/// Index of the largest absolute value, the first one on ties.
///
/// Returns `0` for an empty or all NaN input.
pub fn argmax_abs(x: ArrayView1<F>) -> usize {
    x.iter()
        .enumerate()
        .fold((0, F::NEG_INFINITY), |(max_i, max), (i, &v)| {
            if v.abs() > max {
                (i, v.abs())
            } else {
                (max_i, max)
            }
        })
        .0
}

pub fn max_abs(x: ArrayView1<F>) -> F {
    x.iter().map(|v| v.abs()).fold(0., F::max)
}

pub fn mean(iter: impl IntoIterator<Item = F>) -> Option<F> {
    let (sum, count) = iter
        .into_iter()
        .fold((0., 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as F)
}
