use advect1d::{
    cfd_app, field::apply_func, march, Grid, Mesh, Periodic, Scheme, StepRounding, TimeGrid,
};
use faer_core::Mat;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sine_setup(points: usize) -> (Mesh<f64>, Mat<f64>) {
    let space = Grid::from_steps(0.0, 5.0, points, 1).unwrap();
    let time = TimeGrid::from_cfl(&space, 0.5, 1.0, 5.0, StepRounding::Ceil).unwrap();
    let xi = space.cell_centers();
    let u0 = apply_func(xi.as_ref(), |x| (2.0 * std::f64::consts::PI * x / 5.0).sin());
    (Mesh::new(time, space), u0)
}

fn benchmark_single_step(c: &mut Criterion) {
    let (mesh, u0) = sine_setup(1000);
    let mesh = Mesh::new(TimeGrid::new(0.0, mesh.time().delta(), 1), mesh.space());

    for scheme in Scheme::ALL {
        c.bench_function(&format!("step/{scheme:?}/1000"), |b| {
            b.iter(|| march(&scheme, &Periodic, &mesh, 1.0, 0.0, black_box(u0.as_ref())).unwrap())
        });
    }
}

fn benchmark_full_transit(c: &mut Criterion) {
    for scheme in Scheme::ALL {
        c.bench_function(&format!("cfd_app/{scheme:?}/200"), |b| {
            b.iter(|| cfd_app::<f64>(scheme, black_box(0.5), 200).unwrap().abs_err)
        });
    }
}

criterion_group!(benches, benchmark_single_step, benchmark_full_transit);
criterion_main!(benches);
