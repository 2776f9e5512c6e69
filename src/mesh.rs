use std::ops::Range;

use faer_core::Mat;

use crate::{field::linspace, SimError, SimpleFloat};

/// Uniform cell-centered grid over `[lower, upper]`, padded with `ghost_cells`
/// cells on each side.
///
/// Storage row `k` holds cell index `k - ghost_cells`, so the interior occupies
/// rows `ghost_cells..steps + ghost_cells` and the first interior center sits at
/// `lower + delta / 2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid<F> {
    pub(crate) lower: F,
    pub(crate) upper: F,
    pub(crate) delta: F,
    pub(crate) steps: usize,
    pub(crate) ghost_cells: usize,
}

impl<F: SimpleFloat> Grid<F> {
    pub fn from_steps(lower: F, upper: F, steps: usize, ghost_cells: usize) -> Result<Self, SimError> {
        let (l, u): (f64, f64) = (lower.into(), upper.into());
        if !(l.is_finite() && u.is_finite() && l < u) {
            return Err(SimError::EmptyDomain { lower: l, upper: u });
        }
        if steps == 0 {
            return Err(SimError::NoPoints);
        }
        // periodic wrapping would read ghost slots as interior otherwise
        if steps < 2 * ghost_cells {
            return Err(SimError::TooManyGhostCells { ghost_cells, steps });
        }

        let delta = upper.sub(lower).div(F::from_f64(steps as f64));
        Ok(Self {
            lower,
            upper,
            delta,
            steps,
            ghost_cells,
        })
    }

    pub fn lower(&self) -> F {
        self.lower
    }

    pub fn upper(&self) -> F {
        self.upper
    }

    pub fn delta(&self) -> F {
        self.delta
    }

    /// Number of interior cells.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn ghost_cells(&self) -> usize {
        self.ghost_cells
    }

    /// Number of stored cells, ghosts included.
    pub fn len(&self) -> usize {
        self.steps + 2 * self.ghost_cells
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn interior(&self) -> Range<usize> {
        self.ghost_cells..self.steps + self.ghost_cells
    }

    /// Center of storage row `k`.
    pub fn center(&self, k: usize) -> F {
        let offset = k as f64 - self.ghost_cells as f64 + 0.5;
        self.lower.add(self.delta.mul(F::from_f64(offset)))
    }

    /// Cell centers of every stored cell, ghosts included.
    pub fn cell_centers(&self) -> Mat<F> {
        linspace(self.center(0), self.len(), self.delta)
    }

    /// Signed cell indices, from `-ghost_cells` to `steps + ghost_cells - 1`.
    pub fn indices(&self) -> Vec<isize> {
        let g = self.ghost_cells as isize;
        (-g..self.steps as isize + g).collect()
    }

    pub fn iter(self) -> impl Iterator<Item = F> {
        (0..self.len()).map(move |k| self.center(k))
    }
}

/// How a real-valued step count becomes a whole number of iterations.
///
/// Counts within a relative `1e-9` of an integer are snapped to it first, so
/// `200.00000000000003` is always `200`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepRounding {
    /// Iterate while the step index does not exceed the real count.
    #[default]
    Ceil,
    Floor,
    Nearest,
}

impl StepRounding {
    const SNAP_TOLERANCE: f64 = 1e-9;

    pub fn apply(self, exact: f64) -> usize {
        let nearest = exact.round();
        if (exact - nearest).abs() <= Self::SNAP_TOLERANCE * nearest.abs().max(1.0) {
            return nearest.max(0.0) as usize;
        }

        let rounded = match self {
            StepRounding::Ceil => exact.ceil(),
            StepRounding::Floor => exact.floor(),
            StepRounding::Nearest => nearest,
        };
        rounded.max(0.0) as usize
    }
}

/// Uniform time axis, `steps` steps of `delta` starting at `lower`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid<F> {
    pub(crate) lower: F,
    pub(crate) delta: F,
    pub(crate) steps: usize,
}

impl<F: SimpleFloat> TimeGrid<F> {
    pub fn new(lower: F, delta: F, steps: usize) -> Self {
        Self {
            lower,
            delta,
            steps,
        }
    }

    /// Time step `cfl * Δx / speed`, with as many steps as a signal moving at
    /// `speed` needs to cover `distance`.
    pub fn from_cfl(
        space: &Grid<F>,
        cfl: F,
        speed: F,
        distance: F,
        rounding: StepRounding,
    ) -> Result<Self, SimError> {
        let (cfl_, speed_): (f64, f64) = (cfl.into(), speed.into());
        if !(cfl_.is_finite() && cfl_ > 0.0) {
            return Err(SimError::InvalidCfl(cfl_));
        }
        if !(speed_.is_finite() && speed_ > 0.0) {
            return Err(SimError::InvalidSpeed(speed_));
        }

        let delta = cfl.mul(space.delta).div(speed);
        let exact: f64 = distance.div(speed.mul(delta)).into();
        // snapshot headers store the count as u32
        if !(exact.is_finite() && exact <= u32::MAX as f64) {
            return Err(SimError::TooManySteps(exact));
        }
        let steps = rounding.apply(exact);
        if steps as f64 != exact {
            tracing::event!(
                tracing::Level::DEBUG,
                "step count {} rounded to {} ({:?})",
                exact,
                steps,
                rounding
            );
        }

        Ok(Self::new(F::zero(), delta, steps))
    }

    pub fn lower(&self) -> F {
        self.lower
    }

    pub fn upper(&self) -> F {
        self.lower
            .add(self.delta.mul(F::from_f64(self.steps as f64)))
    }

    pub fn delta(&self) -> F {
        self.delta
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Times `t_0..=t_steps`.
    pub fn iter(self) -> impl Iterator<Item = F> {
        (0..=self.steps).map(move |n| self.lower.add(self.delta.mul(F::from_f64(n as f64))))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh<F> {
    pub(crate) time: TimeGrid<F>,
    pub(crate) space: Grid<F>,
}

impl<F: SimpleFloat> Mesh<F> {
    pub fn new(time: TimeGrid<F>, space: Grid<F>) -> Self {
        Self { time, space }
    }

    pub fn time(&self) -> TimeGrid<F> {
        self.time
    }

    pub fn space(&self) -> Grid<F> {
        self.space
    }
}
