use faer_core::{MatMut, MatRef};

use crate::{method::three_point, Ctx, Method, SimpleFloat};

#[derive(Debug, Clone, Copy, Default)]
pub struct Upwind;

impl<F: SimpleFloat> Method<F> for Upwind {
    fn ghost_cells(&self) -> usize {
        1
    }

    fn apply(&self, ctx: Ctx<F>, u: MatRef<'_, F>, v: MatMut<'_, F>) {
        let r = ctx.courant();
        let schema = |um: F, u: F, _up: F| u.sub(r.mul(u.sub(um)));

        three_point(ctx, u, v, schema)
    }

    fn name(&self) -> &'static str {
        "First-order upwind"
    }
}

/// Forward-in-time, centered-in-space. Unconditionally unstable for advection.
#[derive(Debug, Clone, Copy, Default)]
pub struct Centered;

impl<F: SimpleFloat> Method<F> for Centered {
    fn ghost_cells(&self) -> usize {
        1
    }

    fn apply(&self, ctx: Ctx<F>, u: MatRef<'_, F>, v: MatMut<'_, F>) {
        let r = ctx.courant();
        let half = F::from_f64(0.5);
        let schema = |um: F, u: F, up: F| u.sub(half.mul(r).mul(up.sub(um)));

        three_point(ctx, u, v, schema)
    }

    fn name(&self) -> &'static str {
        "Centered"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LaxWendroff;

impl<F: SimpleFloat> Method<F> for LaxWendroff {
    fn ghost_cells(&self) -> usize {
        1
    }

    fn apply(&self, ctx: Ctx<F>, u: MatRef<'_, F>, v: MatMut<'_, F>) {
        let r = ctx.courant();
        let (half, two) = (F::from_f64(0.5), F::from_f64(2.0));
        let schema = |um: F, u: F, up: F| {
            u.sub(half.mul(r).mul(up.sub(um)))
                .add(half.mul(r.mul(r)).mul(up.sub(two.mul(u)).add(um)))
        };

        three_point(ctx, u, v, schema)
    }

    fn name(&self) -> &'static str {
        "Lax-Wendroff"
    }
}

/// Scheme picked at run time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    Upwind,
    Centered,
    #[default]
    LaxWendroff,
}

impl Scheme {
    pub const ALL: [Scheme; 3] = [Scheme::Upwind, Scheme::Centered, Scheme::LaxWendroff];
}

impl<F: SimpleFloat> Method<F> for Scheme {
    fn ghost_cells(&self) -> usize {
        match self {
            Scheme::Upwind => Method::<F>::ghost_cells(&Upwind),
            Scheme::Centered => Method::<F>::ghost_cells(&Centered),
            Scheme::LaxWendroff => Method::<F>::ghost_cells(&LaxWendroff),
        }
    }

    fn apply(&self, ctx: Ctx<F>, u: MatRef<'_, F>, v: MatMut<'_, F>) {
        match self {
            Scheme::Upwind => Upwind.apply(ctx, u, v),
            Scheme::Centered => Centered.apply(ctx, u, v),
            Scheme::LaxWendroff => LaxWendroff.apply(ctx, u, v),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Scheme::Upwind => Method::<F>::name(&Upwind),
            Scheme::Centered => Method::<F>::name(&Centered),
            Scheme::LaxWendroff => Method::<F>::name(&LaxWendroff),
        }
    }
}
