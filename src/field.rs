//! Small helpers over column vectors.

use faer_core::{Mat, MatRef};

use crate::SimpleFloat;

pub fn linspace<F: SimpleFloat>(a: F, size: usize, h: F) -> Mat<F> {
    Mat::from_fn(size, 1, |i, _| a.add(h.mul(F::from_f64(i as f64))))
}

pub fn apply_func<F: SimpleFloat>(m: MatRef<'_, F>, f: impl Fn(F) -> F) -> Mat<F> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| f(m[(i, j)]))
}

/// `max |a - b|` over the first column. A NaN anywhere wins, so blow-ups stay visible.
pub fn max_abs_diff<F: SimpleFloat>(a: MatRef<'_, F>, b: MatRef<'_, F>) -> F {
    assert!(a.nrows() == b.nrows());

    let err = (0..a.nrows()).fold(0.0f64, |acc, i| {
        let (x, y): (f64, f64) = (a[(i, 0)].into(), b[(i, 0)].into());
        let d = (x - y).abs();
        if acc.is_nan() || d.is_nan() {
            f64::NAN
        } else {
            acc.max(d)
        }
    });

    F::from_f64(err)
}

pub fn to_vec<F: SimpleFloat>(m: MatRef<'_, F>) -> Vec<F> {
    (0..m.nrows()).map(|i| m[(i, 0)]).collect()
}

pub fn from_slice<F: SimpleFloat>(values: &[F]) -> Mat<F> {
    Mat::from_fn(values.len(), 1, |i, _| values[i])
}
