use std::{fs, io};

use advect1d::{Csff1Writer, Driver, ErrorHistory, Logger, Problem, Scheme, Simulation};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let problem = Problem::<f64>::sine_wave();

    fs::create_dir_all("bin").expect("couldn't create output directory");

    for scheme in Scheme::ALL {
        let sim = Simulation::new(problem.clone())
            .with_points(200)
            .with_cfl(0.8)
            .with_transits(2)
            .using(scheme);

        tracing::info!("{sim}");

        let mut output = io::BufWriter::new(
            fs::File::create(format!("bin/{}_{:?}.csff1", problem.name(), scheme))
                .expect("couldn't create output file"),
        );
        let mut history = ErrorHistory::new();

        let outcome = Driver::new(sim)
            .with_sampling_period(25)
            .with_observer(Logger)
            .with_observer(&mut history)
            .with_observer(Csff1Writer::new(&mut output))
            .run()
            .expect("failed to run simulation");

        for record in history.records() {
            tracing::debug!(
                "{:?}: step {} (t = {:.3}) |u - u0| = {:e}",
                scheme,
                record.iter,
                record.time,
                record.abs_err
            );
        }

        tracing::info!(
            "{:?}: Δx = {:e}, Δt = {:e}, {} steps, |u - u0| = {:e}",
            scheme,
            outcome.dx,
            outcome.dt,
            outcome.steps,
            outcome.abs_err
        );
    }
}
