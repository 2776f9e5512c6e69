use faer_core::{Mat, MatMut, MatRef};

use crate::{SimError, SimpleFloat};

/// Fills the ghost slots at both ends of a field.
///
/// Implementations overwrite rows `0..ghost_cells` and the last `ghost_cells`
/// rows of `u` and never touch the interior.
pub trait BoundaryCondition<F: SimpleFloat> {
    /// # Panics
    ///
    /// If `u` has fewer than `2 * ghost_cells` rows.
    fn apply(&self, u: MatMut<'_, F>, ghost_cells: usize, value: F);

    fn name(&self) -> &'static str;

    /// Same as [`BoundaryCondition::apply`] but on a fresh copy of `u`.
    fn applied(&self, u: MatRef<'_, F>, ghost_cells: usize, value: F) -> Result<Mat<F>, SimError> {
        let len = u.nrows();
        if len < 2 * ghost_cells {
            return Err(SimError::FieldTooShort { ghost_cells, len });
        }

        let mut out = u.to_owned();
        self.apply(out.as_mut(), ghost_cells, value);
        Ok(out)
    }
}

/// Wraps the rightmost interior cells into the left ghosts and the leftmost
/// into the right ones. `value` is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct Periodic;

impl<F: SimpleFloat> BoundaryCondition<F> for Periodic {
    fn apply(&self, mut u: MatMut<'_, F>, ghost_cells: usize, _value: F) {
        let len = u.nrows();
        assert!(len >= 2 * ghost_cells);

        for i in 0..ghost_cells {
            u[(i, 0)] = u[(len - 2 * ghost_cells + i, 0)];
            u[(len - 1 - i, 0)] = u[(2 * ghost_cells - 1 - i, 0)];
        }
    }

    fn name(&self) -> &'static str {
        "periodic"
    }
}

/// Writes `value` into every ghost slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Constant;

impl<F: SimpleFloat> BoundaryCondition<F> for Constant {
    fn apply(&self, mut u: MatMut<'_, F>, ghost_cells: usize, value: F) {
        let len = u.nrows();
        assert!(len >= 2 * ghost_cells);

        for i in 0..ghost_cells {
            u[(i, 0)] = value;
            u[(len - 1 - i, 0)] = value;
        }
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Boundary policy picked at run time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Boundary {
    #[default]
    Periodic,
    Constant,
}

impl<F: SimpleFloat> BoundaryCondition<F> for Boundary {
    fn apply(&self, u: MatMut<'_, F>, ghost_cells: usize, value: F) {
        match self {
            Boundary::Periodic => Periodic.apply(u, ghost_cells, value),
            Boundary::Constant => Constant.apply(u, ghost_cells, value),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Boundary::Periodic => BoundaryCondition::<F>::name(&Periodic),
            Boundary::Constant => BoundaryCondition::<F>::name(&Constant),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{from_slice, to_vec};

    fn ramp(len: usize) -> Mat<f64> {
        Mat::from_fn(len, 1, |i, _| 10.0 + i as f64)
    }

    #[test]
    fn periodic_wraps_interior() {
        // ghosts | 12 13 14 15 16 17 | ghosts
        let u = ramp(10);
        let v = to_vec(Periodic.applied(u.as_ref(), 2, 0.0).unwrap().as_ref());

        assert!(v == vec![16.0, 17.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 12.0, 13.0]);
    }

    #[test]
    fn periodic_single_ghost() {
        let u = from_slice(&[-1.0f64, 1.0, 2.0, 3.0, -1.0]);
        let v = to_vec(Periodic.applied(u.as_ref(), 1, 99.0).unwrap().as_ref());

        assert!(v == vec![3.0, 1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn periodic_is_idempotent() {
        for (len, ghost_cells) in [(5, 1), (12, 2), (9, 3), (4, 2)] {
            let u = Mat::from_fn(len, 1, |i, _| ((i * 7919) % 13) as f64 - 6.0);
            let once = Periodic.applied(u.as_ref(), ghost_cells, 0.0).unwrap();
            let twice = Periodic.applied(once.as_ref(), ghost_cells, 0.0).unwrap();

            assert!(to_vec(once.as_ref()) == to_vec(twice.as_ref()));
        }
    }

    #[test]
    fn constant_fills_every_ghost() {
        for ghost_cells in 0..4 {
            let u = ramp(12);
            let v = to_vec(Constant.applied(u.as_ref(), ghost_cells, -3.5).unwrap().as_ref());

            for i in 0..ghost_cells {
                assert!(v[i] == -3.5);
                assert!(v[11 - i] == -3.5);
            }
            for (i, x) in v.iter().enumerate().take(12 - ghost_cells).skip(ghost_cells) {
                assert!(*x == 10.0 + i as f64);
            }
        }
    }

    #[test]
    fn interior_is_untouched_and_input_is_copied() {
        let u = ramp(8);
        for bc in [Boundary::Periodic, Boundary::Constant] {
            let v = bc.applied(u.as_ref(), 2, 0.0).unwrap();
            for i in 2..6 {
                assert!(v[(i, 0)] == u[(i, 0)]);
            }
        }
        assert!(to_vec(u.as_ref()) == to_vec(ramp(8).as_ref()));
    }

    #[test]
    fn undersized_fields_are_rejected() {
        let u = ramp(3);
        for bc in [Boundary::Periodic, Boundary::Constant] {
            assert!(matches!(
                bc.applied(u.as_ref(), 2, 0.0),
                Err(SimError::FieldTooShort {
                    ghost_cells: 2,
                    len: 3
                })
            ));
        }
        assert!(Periodic.applied(ramp(0).as_ref(), 0, 0.0).unwrap().nrows() == 0);
    }

    #[test]
    fn selector_dispatches() {
        let u = ramp(6);
        let a = Boundary::Periodic.applied(u.as_ref(), 1, 7.0).unwrap();
        let b = Periodic.applied(u.as_ref(), 1, 7.0).unwrap();
        assert!(to_vec(a.as_ref()) == to_vec(b.as_ref()));

        let a = Boundary::Constant.applied(u.as_ref(), 1, 7.0).unwrap();
        let b = Constant.applied(u.as_ref(), 1, 7.0).unwrap();
        assert!(to_vec(a.as_ref()) == to_vec(b.as_ref()));
        assert!(BoundaryCondition::<f64>::name(&Boundary::Constant) == "constant");
    }
}
