use advect1d::{cfd_app, Scheme, SimError};
use tracing::info;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt::init();

    let cfl = 0.5;

    for scheme in Scheme::ALL {
        info!("{:?} (CFL = {})", scheme, cfl);

        let mut previous: Option<f64> = None;
        for npts in [25, 50, 100, 200, 400] {
            let outcome = cfd_app::<f64>(scheme, cfl, npts)?;
            let order = previous.map(|e| (e / outcome.abs_err).log2());

            match order {
                Some(order) => info!(
                    "  npts = {:>4}, |u - u0| = {:.3e}, observed order = {:.2}",
                    npts, outcome.abs_err, order
                ),
                None => info!("  npts = {:>4}, |u - u0| = {:.3e}", npts, outcome.abs_err),
            }

            previous = Some(outcome.abs_err);
        }
    }

    Ok(())
}
