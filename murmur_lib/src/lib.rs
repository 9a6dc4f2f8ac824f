use chrono::Timelike;
use options::{RunOptions, Viewport};
use simulation::{SetupError, Simulation};

pub mod boid;
pub mod catalog;
pub mod flock;
pub mod math_helpers;
pub mod noise_field;
pub mod options;
pub mod render;
pub mod simulation;
pub mod transit;
pub mod wanderer;

/// Sets up a simulation and runs it headless for `no_iter` frames at time of day `now`
pub fn simulate<T: Timelike>(
    no_iter: u64,
    viewport: Viewport,
    run_options: RunOptions,
    now: &T,
) -> Result<Simulation, SetupError> {
    let mut sim = Simulation::setup(viewport, run_options)?;

    (0..no_iter).for_each(|_| sim.step(now));

    Ok(sim)
}
