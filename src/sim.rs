use std::fmt;

use faer_core::Mat;

use crate::{
    driver::{Driver, Logger},
    mesh::{Grid, Mesh, StepRounding, TimeGrid},
    method::Method,
    methods, Problem, Scheme, SimError, SimpleFloat,
};

/// Everything needed to plot a run or check its convergence.
#[derive(Debug, Clone)]
pub struct Outcome<F: SimpleFloat> {
    pub dx: F,
    pub dt: F,
    pub steps: usize,
    /// Cell centers, ghosts included.
    pub xi: Mat<F>,
    pub p0: Mat<F>,
    pub pend: Mat<F>,
    /// `max |pend - p0|` over every cell, ghosts included.
    pub abs_err: F,
}

#[derive(Debug, Clone)]
pub struct Simulation<F: SimpleFloat, M> {
    pub(crate) problem: Problem<F>,
    pub(crate) points: usize,
    pub(crate) ghost_cells: usize,
    pub(crate) cfl: F,
    pub(crate) transits: usize,
    pub(crate) rounding: StepRounding,
    pub(crate) method: M,
}

impl<F: SimpleFloat> Simulation<F, methods::LaxWendroff> {
    pub fn new(problem: Problem<F>) -> Self {
        Self {
            problem,
            points: 100,
            ghost_cells: 1,
            cfl: F::from_f64(0.5),
            transits: 1,
            rounding: StepRounding::default(),
            method: methods::LaxWendroff,
        }
    }
}

impl<F: SimpleFloat, M: Method<F>> Simulation<F, M> {
    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    pub fn with_ghost_cells(mut self, ghost_cells: usize) -> Self {
        self.ghost_cells = ghost_cells;
        self
    }

    pub fn with_cfl(mut self, cfl: F) -> Self {
        self.cfl = cfl;
        self
    }

    /// Number of times the wave crosses the whole domain.
    pub fn with_transits(mut self, transits: usize) -> Self {
        self.transits = transits;
        self
    }

    pub fn with_step_rounding(mut self, rounding: StepRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_boundary(mut self, boundary: crate::Boundary) -> Self {
        self.problem = self.problem.with_boundary(boundary);
        self
    }

    pub fn with_method<N: Method<F> + Default>(self) -> Simulation<F, N> {
        self.using(N::default())
    }

    pub fn using<N: Method<F>>(self, method: N) -> Simulation<F, N> {
        Simulation {
            problem: self.problem,
            points: self.points,
            ghost_cells: self.ghost_cells,
            cfl: self.cfl,
            transits: self.transits,
            rounding: self.rounding,
            method,
        }
    }

    pub fn problem(&self) -> &Problem<F> {
        &self.problem
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    /// Builds the grid and the time axis, checking every parameter.
    pub fn mesh(&self) -> Result<Mesh<F>, SimError> {
        let (lower, upper) = self.problem.domain;
        let space = Grid::from_steps(lower, upper, self.points, self.ghost_cells)?;

        let required = self.method.ghost_cells();
        if self.ghost_cells < required {
            return Err(SimError::NotEnoughGhostCells {
                method: self.method.name(),
                required,
                provided: self.ghost_cells,
            });
        }

        let cfl: f64 = self.cfl.into();
        if cfl > 1.0 {
            tracing::event!(
                tracing::Level::WARN,
                "Courant number {} is above 1, `{}` may not be stable",
                cfl,
                self.method.name()
            );
        }

        let distance = self
            .problem
            .length()
            .mul(F::from_f64(self.transits as f64));
        let time = TimeGrid::from_cfl(&space, self.cfl, self.problem.speed, distance, self.rounding)?;

        Ok(Mesh::new(time, space))
    }

    pub fn run(self) -> Result<Outcome<F>, SimError> {
        Driver::new(self).run()
    }
}

impl<F: SimpleFloat, M: Method<F>> fmt::Display for Simulation<F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "simulation of `{}` problem:\n\t- `{}` method\n\t- {} cells ({} ghost cells per side)\n\t- CFL = {:e}\n\t- {} transit(s)",
            self.problem.name,
            self.method.name(),
            self.points,
            self.ghost_cells,
            self.cfl,
            self.transits,
        )
    }
}

/// Advects one period of a sine wave once around `[0, 5]` with `scheme`.
pub fn cfd_app<F: SimpleFloat>(scheme: Scheme, cfl: F, npts: usize) -> Result<Outcome<F>, SimError> {
    let sim = Simulation::new(Problem::sine_wave())
        .with_points(npts)
        .with_cfl(cfl)
        .using(scheme);

    Driver::new(sim).with_observer(Logger).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::to_vec, Boundary, Centered, Upwind};

    #[test]
    fn upwind_unit_courant_returns_exactly() {
        let out = cfd_app::<f64>(Scheme::Upwind, 1.0, 10).unwrap();

        assert!(out.dx == 0.5);
        assert!(out.dt == 0.5);
        assert!(out.steps == 10);
        assert!(out.xi.nrows() == 12);
        assert!(out.p0.nrows() == 12 && out.pend.nrows() == 12);
        assert!(out.abs_err < 1e-10);
    }

    #[test]
    fn initial_condition_is_a_wrapped_sine() {
        let out = cfd_app::<f64>(Scheme::LaxWendroff, 0.5, 20).unwrap();
        let p0 = to_vec(out.p0.as_ref());
        let xi = to_vec(out.xi.as_ref());

        for i in 1..21 {
            let expected = (2.0 * std::f64::consts::PI * xi[i] / 5.0).sin();
            assert!((p0[i] - expected).abs() < 1e-15);
        }
        assert!(p0[0] == p0[20]);
        assert!(p0[21] == p0[1]);
    }

    #[test]
    fn upwind_converges_at_first_order() {
        let coarse = cfd_app::<f64>(Scheme::Upwind, 0.5, 100).unwrap();
        let fine = cfd_app::<f64>(Scheme::Upwind, 0.5, 200).unwrap();

        assert!(coarse.steps == 200 && fine.steps == 400);
        assert!(coarse.abs_err < 0.15);
        assert!(fine.abs_err < coarse.abs_err);

        let ratio = coarse.abs_err / fine.abs_err;
        assert!(ratio > 1.6 && ratio < 2.4, "ratio = {ratio}");
    }

    #[test]
    fn lax_wendroff_beats_upwind() {
        for npts in [50, 100, 200] {
            let upwind = cfd_app::<f64>(Scheme::Upwind, 0.5, npts).unwrap();
            let lw = cfd_app::<f64>(Scheme::LaxWendroff, 0.5, npts).unwrap();
            assert!(lw.abs_err < upwind.abs_err);
        }
    }

    #[test]
    fn centered_error_grows_with_time() {
        let errs: Vec<f64> = [1, 2, 4]
            .into_iter()
            .map(|transits| {
                Simulation::new(Problem::<f64>::sine_wave())
                    .with_cfl(0.5)
                    .with_transits(transits)
                    .with_method::<Centered>()
                    .run()
                    .unwrap()
                    .abs_err
            })
            .collect();

        assert!(errs[0] < errs[1] && errs[1] < errs[2]);

        let upwind = cfd_app::<f64>(Scheme::Upwind, 0.5, 100).unwrap();
        assert!(errs[2] > upwind.abs_err);
    }

    #[test]
    fn unstable_courant_is_reported_not_rejected() {
        let out = Simulation::new(Problem::<f64>::sine_wave())
            .with_points(50)
            .with_cfl(1.5)
            .with_transits(4)
            .with_method::<Upwind>()
            .run()
            .unwrap();
        assert!(out.abs_err.is_nan() || out.abs_err > 1e3);
    }

    #[test]
    fn invalid_parameters_fail_fast() {
        assert!(matches!(
            cfd_app::<f64>(Scheme::Upwind, 0.5, 0),
            Err(SimError::NoPoints)
        ));
        assert!(matches!(
            cfd_app::<f64>(Scheme::Upwind, 0.0, 10),
            Err(SimError::InvalidCfl(_))
        ));
        assert!(matches!(
            Simulation::new(Problem::<f64>::sine_wave())
                .with_ghost_cells(0)
                .with_method::<Upwind>()
                .run(),
            Err(SimError::NotEnoughGhostCells {
                required: 1,
                provided: 0,
                ..
            })
        ));
        assert!(matches!(
            Simulation::new(Problem::<f64>::sine_wave())
                .with_points(3)
                .with_ghost_cells(2)
                .run(),
            Err(SimError::TooManyGhostCells { .. })
        ));
    }

    #[test]
    fn wider_ghost_layers_do_not_change_the_answer() {
        let narrow = Simulation::new(Problem::<f64>::sine_wave()).run().unwrap();
        let wide = Simulation::new(Problem::<f64>::sine_wave())
            .with_ghost_cells(3)
            .run()
            .unwrap();

        let a = to_vec(narrow.pend.as_ref());
        let b = to_vec(wide.pend.as_ref());
        for i in 0..100 {
            assert!((a[i + 1] - b[i + 3]).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_boundary_drains_the_domain() {
        let out = Simulation::new(Problem::<f64>::sine_wave())
            .with_boundary(Boundary::Constant)
            .with_method::<Upwind>()
            .with_cfl(1.0)
            .run()
            .unwrap();

        // zero inflow replaces the whole wave after one transit
        let pend = to_vec(out.pend.as_ref());
        assert!(pend.iter().all(|x| x.abs() < 1e-12));
        assert!((out.abs_err - 1.0).abs() < 1e-3);
    }

    #[test]
    fn independent_runs_in_parallel() {
        let sequential: Vec<f64> = Scheme::ALL
            .iter()
            .map(|&s| cfd_app::<f64>(s, 0.5, 64).unwrap().abs_err)
            .collect();

        let parallel: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = Scheme::ALL
                .iter()
                .map(|&s| scope.spawn(move || cfd_app::<f64>(s, 0.5, 64).unwrap().abs_err))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(sequential == parallel);
    }

    #[test]
    fn single_precision_runs() {
        let out = cfd_app::<f32>(Scheme::Upwind, 1.0, 10).unwrap();
        assert!(out.abs_err < 1e-5);
    }

    #[test]
    fn display_summarizes_configuration() {
        let sim = Simulation::new(Problem::<f64>::sine_wave()).with_points(64);
        let s = sim.to_string();
        assert!(s.contains("sine_wave"));
        assert!(s.contains("Lax-Wendroff"));
        assert!(s.contains("64 cells"));
    }
}
