use std::io::Write;

use bytemuck::bytes_of;
use faer_core::{Mat, MatMut, MatRef};
use reborrow::*;

use crate::{
    bc::BoundaryCondition,
    field::{apply_func, max_abs_diff},
    mesh::Mesh,
    method::Method,
    problem::Problem,
    sim::{Outcome, Simulation},
    Ctx, SimError, SimpleFloat,
};

/// Advances `v` one step from `u` and refreshes its ghosts.
fn step<F, M, B>(ctx: Ctx<F>, method: &M, bc: &B, fill_value: F, u: MatRef<'_, F>, mut v: MatMut<'_, F>)
where
    F: SimpleFloat,
    M: Method<F> + ?Sized,
    B: BoundaryCondition<F> + ?Sized,
{
    method.apply(ctx, u, v.rb_mut());
    bc.apply(v, ctx.mesh.space.ghost_cells, fill_value);
}

/// Runs `method` for every step of `mesh.time()` starting from `u0`, which must
/// span the whole grid, ghosts included. `u0` is not modified.
pub fn march<F, M, B>(
    method: &M,
    bc: &B,
    mesh: &Mesh<F>,
    speed: F,
    fill_value: F,
    u0: MatRef<'_, F>,
) -> Result<Mat<F>, SimError>
where
    F: SimpleFloat,
    M: Method<F> + ?Sized,
    B: BoundaryCondition<F> + ?Sized,
{
    march_with(method, bc, mesh, speed, fill_value, u0, |_, _| Ok(()))
}

/// [`march`], calling `on_step(ctx, v)` with each freshly computed field.
pub fn march_with<F, M, B, S>(
    method: &M,
    bc: &B,
    mesh: &Mesh<F>,
    speed: F,
    fill_value: F,
    u0: MatRef<'_, F>,
    mut on_step: S,
) -> Result<Mat<F>, SimError>
where
    F: SimpleFloat,
    M: Method<F> + ?Sized,
    B: BoundaryCondition<F> + ?Sized,
    S: FnMut(Ctx<F>, MatRef<'_, F>) -> Result<(), SimError>,
{
    let (required, provided) = (method.ghost_cells(), mesh.space.ghost_cells);
    if provided < required {
        return Err(SimError::NotEnoughGhostCells {
            method: method.name(),
            required,
            provided,
        });
    }
    if u0.nrows() != mesh.space.len() {
        return Err(SimError::FieldSize {
            expected: mesh.space.len(),
            found: u0.nrows(),
        });
    }

    let mut u = u0.to_owned();
    let mut v = Mat::<F>::zeros(u.nrows(), 1);

    for (n, t) in mesh.time.iter().enumerate().skip(1) {
        let ctx = Ctx { mesh, speed, n, t };
        step(ctx, method, bc, fill_value, u.as_ref(), v.as_mut());
        on_step(ctx, v.as_ref())?;

        // exchange u and v
        std::mem::swap(&mut u, &mut v);
    }

    Ok(u)
}

#[derive(Clone, Copy)]
pub struct ObsCtx<'ctx, F: SimpleFloat> {
    // Meta
    problem: &'ctx Problem<F>,
    mesh: &'ctx Mesh<F>,
    method: &'ctx dyn Method<F>,
    sampling: usize,

    // Iteration info
    iter: usize,
    time: F,
    initial: MatRef<'ctx, F>,
    solution: MatRef<'ctx, F>, // current solution *with* ghost cells
}

impl<'ctx, F: SimpleFloat> ObsCtx<'ctx, F> {
    pub fn problem(&self) -> &Problem<F> {
        self.problem
    }

    pub fn mesh(&self) -> &Mesh<F> {
        self.mesh
    }

    pub fn method(&self) -> &dyn Method<F> {
        self.method
    }

    pub fn iter(&self) -> usize {
        self.iter
    }

    pub fn time(&self) -> F {
        self.time
    }

    pub fn initial(&self) -> MatRef<'_, F> {
        self.initial
    }

    pub fn solution(&self) -> MatRef<'_, F> {
        self.solution
    }

    pub fn sampling_period(&self) -> usize {
        self.sampling
    }

    /// `max |u - u0|` over every cell, ghosts included.
    pub fn abs_err(&self) -> F {
        max_abs_diff(self.solution, self.initial)
    }
}

#[allow(unused_variables)]
pub trait Observer<F: SimpleFloat> {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        Ok(())
    }
}

impl<F: SimpleFloat, O: Observer<F> + ?Sized> Observer<F> for &mut O {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        (**self).at_startup(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        (**self).at_each_iteration(ctx)
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        (**self).at_cleanup(ctx)
    }
}

pub struct Driver<'d, F: SimpleFloat, M> {
    pub(crate) sim: Simulation<F, M>,
    pub(crate) observers: Vec<Box<dyn Observer<F> + 'd>>,
    pub(crate) sampling: Option<usize>,
}

impl<'d, F: SimpleFloat, M: Method<F>> Driver<'d, F, M> {
    pub fn new(sim: Simulation<F, M>) -> Self {
        Self {
            sim,
            observers: Vec::new(),
            sampling: None,
        }
    }

    /// Observers see every `steps`-th step. Defaults to about ten samples per run.
    pub fn with_sampling_period(mut self, steps: usize) -> Self {
        self.sampling = Some(steps.max(1));
        self
    }

    pub fn with_observer(mut self, observer: impl Observer<F> + 'd) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn run(&mut self) -> Result<Outcome<F>, SimError> {
        let mesh = self.sim.mesh()?;
        let Simulation {
            problem, method, ..
        } = &self.sim;
        let ghost_cells = mesh.space.ghost_cells;
        let sampling = self.sampling.unwrap_or(1 + mesh.time.steps / 10);

        // set initial condition
        let xi = mesh.space.cell_centers();
        let mut p0 = apply_func(xi.as_ref(), |x| problem.initial(x));
        problem
            .boundary
            .apply(p0.as_mut(), ghost_cells, problem.fill_value);

        let ctx = ctx_base(problem, &mesh, method, sampling, p0.as_ref());
        for o in self.observers.iter_mut() {
            o.at_startup(ctx)?;
        }

        // propagate solution
        let observers = &mut self.observers;
        let u = march_with(
            method,
            &problem.boundary,
            &mesh,
            problem.speed,
            problem.fill_value,
            p0.as_ref(),
            |at, v| {
                if at.n % sampling == 0 {
                    let ctx = ObsCtx {
                        iter: at.n,
                        time: at.t,
                        solution: v,
                        ..ctx_base(problem, &mesh, method, sampling, p0.as_ref())
                    };
                    for o in observers.iter_mut() {
                        o.at_each_iteration(ctx)?;
                    }
                }
                Ok(())
            },
        )?;

        let ctx = ObsCtx {
            iter: mesh.time.steps,
            time: mesh.time.upper(),
            solution: u.as_ref(),
            ..ctx_base(problem, &mesh, method, sampling, p0.as_ref())
        };
        for o in self.observers.iter_mut() {
            o.at_cleanup(ctx)?;
        }

        let abs_err = max_abs_diff(u.as_ref(), p0.as_ref());
        Ok(Outcome {
            dx: mesh.space.delta,
            dt: mesh.time.delta,
            steps: mesh.time.steps,
            xi,
            p0,
            pend: u,
            abs_err,
        })
    }
}

fn ctx_base<'ctx, F: SimpleFloat>(
    problem: &'ctx Problem<F>,
    mesh: &'ctx Mesh<F>,
    method: &'ctx dyn Method<F>,
    sampling: usize,
    initial: MatRef<'ctx, F>,
) -> ObsCtx<'ctx, F> {
    ObsCtx {
        problem,
        mesh,
        method,
        sampling,
        iter: 0,
        time: mesh.time.lower,
        initial,
        solution: initial,
    }
}

pub struct Logger;

impl<F: SimpleFloat> Observer<F> for Logger {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "start of simulation of problem `{}` (`{}` method, `{}` boundary, Δx={:e} ({} cells), Δt={:e} ({} steps))",
            ctx.problem().name,
            ctx.method().name(),
            BoundaryCondition::<F>::name(&ctx.problem().boundary),
            ctx.mesh().space.delta,
            ctx.mesh().space.steps,
            ctx.mesh().time.delta,
            ctx.mesh().time.steps,
        );
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::TRACE,
            "problem `{}`: step {}, |u - u0| = {:e}",
            ctx.problem().name,
            ctx.iter(),
            ctx.abs_err()
        );
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        tracing::event!(
            tracing::Level::INFO,
            "finished simulation of problem `{}` after {} steps (|u - u0| = {:e})",
            ctx.problem().name,
            ctx.iter(),
            ctx.abs_err()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorRecord<F> {
    pub iter: usize,
    pub time: F,
    pub abs_err: F,
}

/// Keeps `max |u - u0|` at startup, at every sampled step and at cleanup.
#[derive(Debug, Clone, Default)]
pub struct ErrorHistory<F> {
    records: Vec<ErrorRecord<F>>,
}

impl<F: SimpleFloat> ErrorHistory<F> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ErrorRecord<F>] {
        &self.records
    }

    fn push(&mut self, ctx: ObsCtx<F>) {
        let record = ErrorRecord {
            iter: ctx.iter(),
            time: ctx.time(),
            abs_err: ctx.abs_err(),
        };
        // the last sample and cleanup can land on the same step
        if self.records.last().map(|r| r.iter) != Some(record.iter) {
            self.records.push(record);
        }
    }
}

impl<F: SimpleFloat> Observer<F> for ErrorHistory<F> {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.records.clear();
        self.push(ctx);
        Ok(())
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.push(ctx);
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        self.push(ctx);
        Ok(())
    }
}

const CSFF1_HEADER: &[u8] = b"CSFF1";
const CSFF1_MARKER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Streams sampled fields (ghosts included) as raw native-endian floats.
pub struct Csff1Writer<W> {
    output: W,
}

impl<W: Write> Csff1Writer<W> {
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

fn header_u32(field: &'static str, value: usize) -> Result<u32, SimError> {
    u32::try_from(value).map_err(|_| SimError::HeaderOverflow { field, value })
}

impl<F: SimpleFloat, W: Write> Observer<F> for Csff1Writer<W> {
    fn at_startup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        let output = &mut self.output;
        let (space, time) = (ctx.mesh.space, ctx.mesh.time);
        // magic bytes
        output.write_all(CSFF1_HEADER)?;
        // write float precision
        output.write_all(bytes_of(&(std::mem::size_of::<F>() as u8)))?;
        // write dimensions
        output.write_all(bytes_of(&header_u32("steps", space.steps)?))?;
        output.write_all(bytes_of(&header_u32("ghost_cells", space.ghost_cells)?))?;
        output.write_all(bytes_of(&header_u32("sampling", ctx.sampling)?))?;
        output.write_all(bytes_of(&header_u32("time_steps", time.steps)?))?;
        // write bounds and step sizes
        output.write_all(bytes_of(&space.lower))?;
        output.write_all(bytes_of(&space.upper))?;
        output.write_all(bytes_of(&space.delta))?;
        output.write_all(bytes_of(&time.lower))?;
        output.write_all(bytes_of(&time.delta))?;
        // write method name
        let name = ctx.method.name().as_bytes();
        output.write_all(bytes_of(&header_u32("name_len", name.len())?))?;
        output.write_all(name)?;

        output.write_all(&CSFF1_MARKER)?;

        // write initial condition
        self.at_each_iteration(ctx)
    }

    fn at_each_iteration(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        let u = ctx.solution;
        for i in 0..u.nrows() {
            self.output.write_all(bytes_of(&u[(i, 0)]))?;
        }
        Ok(())
    }

    fn at_cleanup(&mut self, ctx: ObsCtx<F>) -> Result<(), SimError> {
        // the final field is only written if it was not the last sample
        if ctx.iter % ctx.sampling != 0 {
            self.at_each_iteration(ctx)?;
        }
        self.output.write_all(&CSFF1_MARKER)?;
        self.output.flush().map_err(SimError::from)
    }
}
