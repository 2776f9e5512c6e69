use std::{fmt, ops::Range};

pub mod bc;
pub mod driver;
pub mod error;
pub mod field;
pub mod mesh;
pub mod method;
pub mod methods;
pub mod problem;
pub mod sim;

pub use bc::{Boundary, BoundaryCondition, Constant, Periodic};
pub use driver::{march, march_with, Csff1Writer, Driver, ErrorHistory, ErrorRecord, Logger, ObsCtx, Observer};
pub use error::SimError;
pub use mesh::{Grid, Mesh, StepRounding, TimeGrid};
pub use method::Method;
pub use methods::{Centered, LaxWendroff, Scheme, Upwind};
pub use problem::Problem;
pub use sim::{cfd_app, Outcome, Simulation};

/// Real scalar the solver is generic over (`f32` or `f64` in practice).
pub trait SimpleFloat:
    faer_core::RealField
    + faer_core::SimpleEntity
    + bytemuck::Pod
    + Copy
    + PartialOrd
    + Into<f64>
    + fmt::Debug
    + fmt::LowerExp
{
}

impl<F> SimpleFloat for F where
    F: faer_core::RealField
        + faer_core::SimpleEntity
        + bytemuck::Pod
        + Copy
        + PartialOrd
        + Into<f64>
        + fmt::Debug
        + fmt::LowerExp
{
}

/// Everything a stencil may look at while advancing from step `n - 1` to step `n`.
#[derive(Clone, Copy, Debug)]
pub struct Ctx<'a, F: SimpleFloat> {
    pub mesh: &'a Mesh<F>,
    pub speed: F,
    pub n: usize,
    pub t: F,
}

impl<F: SimpleFloat> Ctx<'_, F> {
    /// Realized Courant number `c * Δt / Δx`.
    pub fn courant(&self) -> F {
        self.speed
            .mul(self.mesh.time.delta)
            .div(self.mesh.space.delta)
    }

    /// Storage rows owned by the stencil.
    pub fn interior(&self) -> Range<usize> {
        self.mesh.space.interior()
    }
}
