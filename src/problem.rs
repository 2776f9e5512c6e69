use core::fmt;
use std::sync::Arc;

use crate::{Boundary, SimpleFloat};

pub trait InitialCondition<F: SimpleFloat>: Fn(F) -> F + Send + Sync {}
impl<F: SimpleFloat, T> InitialCondition<F> for T where T: Fn(F) -> F + Send + Sync {}

/// Linear advection `u_t + c u_x = 0` on `[lower, upper]`.
#[derive(Clone)]
pub struct Problem<F: SimpleFloat> {
    pub(crate) name: String,
    pub(crate) domain: (F, F),
    pub(crate) speed: F,
    pub(crate) boundary: Boundary,
    pub(crate) fill_value: F,
    pub(crate) u0: Arc<dyn InitialCondition<F>>,
}

impl<F: SimpleFloat> Problem<F> {
    pub fn new(
        name: impl AsRef<str>,
        domain: (F, F),
        speed: F,
        boundary: Boundary,
        u0: impl InitialCondition<F> + 'static,
    ) -> Self {
        Self {
            name: name.as_ref().to_string(),
            domain,
            speed,
            boundary,
            fill_value: F::zero(),
            u0: Arc::new(u0),
        }
    }

    /// One period of `sin(2πx / L)` on `[0, 5]`, unit speed, periodic ends.
    pub fn sine_wave() -> Self {
        let (lower, upper) = (0.0, 5.0);
        Self::new(
            "sine_wave",
            (F::from_f64(lower), F::from_f64(upper)),
            F::one(),
            Boundary::Periodic,
            move |x: F| {
                let x: f64 = x.into();
                F::from_f64((2.0 * std::f64::consts::PI * x / (upper - lower)).sin())
            },
        )
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Value written into ghost cells by [`Boundary::Constant`].
    pub fn with_fill_value(mut self, fill_value: F) -> Self {
        self.fill_value = fill_value;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> (F, F) {
        self.domain
    }

    pub fn length(&self) -> F {
        self.domain.1.sub(self.domain.0)
    }

    pub fn speed(&self) -> F {
        self.speed
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn fill_value(&self) -> F {
        self.fill_value
    }

    pub fn initial(&self, x: F) -> F {
        (self.u0)(x)
    }
}

impl<F: SimpleFloat> fmt::Debug for Problem<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("speed", &self.speed)
            .field("boundary", &self.boundary)
            .field("fill_value", &self.fill_value)
            .field("u0", &"<dyn InitialCondition<_>>")
            .finish()
    }
}
