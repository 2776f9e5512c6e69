use faer_core::{MatMut, MatRef};

use crate::{Ctx, SimpleFloat};

/// One explicit time step of an advection scheme.
pub trait Method<F: SimpleFloat> {
    /// Neighbours read on each side of a cell, i.e. the ghost cells needed.
    fn ghost_cells(&self) -> usize;

    /// Writes the interior of `v` from `u`. Ghost rows of `v` are left to the
    /// boundary condition.
    fn apply(&self, ctx: Ctx<F>, u: MatRef<'_, F>, v: MatMut<'_, F>);

    fn name(&self) -> &'static str;
}

/// Runs a three-point `schema(u[i - 1], u[i], u[i + 1])` over the interior.
pub(crate) fn three_point<F: SimpleFloat>(
    ctx: Ctx<F>,
    u: MatRef<'_, F>,
    mut v: MatMut<'_, F>,
    schema: impl Fn(F, F, F) -> F,
) {
    assert!(u.nrows() == v.nrows());
    assert!(u.nrows() == ctx.mesh.space.len());

    for i in ctx.interior() {
        v[(i, 0)] = schema(u[(i - 1, 0)], u[(i, 0)], u[(i + 1, 0)]);
    }
}
