use chrono::Timelike;
use glam::Vec2;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use thiserror::Error;

use crate::{
    boid::{FlockContext, FlockWeights},
    flock::Flock,
    noise_field::{NoiseField, PerlinNoise},
    options::{RunOptions, Viewport, ViewportTuning},
    render::Canvas,
    transit::{ridership_brightness, Line},
    wanderer::Wanderer,
};

pub const BACKGROUND: [f32; 3] = [10., 14., 18.];

#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("no render surface to draw on (viewport {width}x{height})")]
    NoSurface { width: f32, height: f32 },
}

/// Owns the wanderer and one flock per transit line and advances them frame by frame.
pub struct Simulation {
    run_options: RunOptions,
    tuning: ViewportTuning,
    wanderer: Wanderer,
    flocks: Vec<Flock>,
    noise: Box<dyn NoiseField>,
    rng: Xoshiro256PlusPlus,
    frame: u64,
    /// brightness of each line in `Line::ALL` order, as of the last step
    brightness: [f32; 3],
}

impl Simulation {
    /// Builds the wanderer and the flocks for `viewport`, steering the
    /// wanderer with Perlin noise
    pub fn setup(viewport: Viewport, run_options: RunOptions) -> Result<Self, SetupError> {
        let mut rng = match run_options.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        let noise = PerlinNoise::new(rng.gen());
        Self::with_noise(viewport, run_options, Box::new(noise), rng)
    }

    pub fn with_noise(
        viewport: Viewport,
        run_options: RunOptions,
        noise: Box<dyn NoiseField>,
        mut rng: Xoshiro256PlusPlus,
    ) -> Result<Self, SetupError> {
        if !viewport.is_drawable() {
            return Err(SetupError::NoSurface {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let tuning = ViewportTuning::new(&run_options, viewport);

        // fill the trail before any boid starts following it
        let mut wanderer = Wanderer::new(&run_options, viewport, tuning.history_capacity);
        for _ in 0..tuning.history_capacity {
            wanderer.update(noise.as_ref(), 0);
        }

        let weights = FlockWeights {
            separation: run_options.separation_coefficient,
            cohesion: run_options.cohesion_coefficient,
            center: run_options.center_coefficient,
            alignment: run_options.alignment_coefficient,
        };

        let width = viewport.width;
        let fly_zone_bottom = tuning.fly_zone_bottom;
        let radius = ((width + fly_zone_bottom) / 8.).min(fly_zone_bottom / 2. - 20.);

        let flocks = Line::ALL
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                let offset = idx as f32 - 1.;
                let center = Vec2::new(
                    width / 2. + offset * (width * 0.08),
                    fly_zone_bottom / 2. + offset * (fly_zone_bottom * 0.03),
                );
                let mut flock = Flock::new(*line, weights);
                flock.spawn(
                    tuning.boids_per_flock,
                    center,
                    radius,
                    run_options.initial_free_fraction,
                    &tuning,
                    &mut rng,
                );
                flock
            })
            .collect::<Vec<_>>();

        debug!(
            "simulation set up for {}x{}: {} flocks of {} boids, trail of {}",
            viewport.width,
            viewport.height,
            flocks.len(),
            tuning.boids_per_flock,
            tuning.history_capacity
        );

        Ok(Simulation {
            run_options,
            tuning,
            wanderer,
            flocks,
            noise,
            rng,
            frame: 0,
            brightness: [0.; 3],
        })
    }

    /// Advances the whole simulation by one frame at time of day `now`
    pub fn step<T: Timelike>(&mut self, now: &T) {
        self.frame += 1;
        self.brightness = Line::ALL.map(|line| ridership_brightness(line, now));

        self.wanderer.update(self.noise.as_ref(), self.frame);

        let ctx = FlockContext {
            tuning: &self.tuning,
            wanderer: &self.wanderer,
        };
        for flock in self.flocks.iter_mut() {
            flock.run(&ctx, &mut self.rng);
        }
    }

    /// Paints the background and every flock, first flock at the back
    pub fn render(&self, canvas: &mut dyn Canvas) {
        canvas.background(BACKGROUND);
        for flock in self.flocks.iter() {
            flock.render(canvas, self.brightness(flock.line), &self.tuning);
        }
    }

    pub fn tick<T: Timelike>(&mut self, now: &T, canvas: &mut dyn Canvas) {
        self.step(now);
        self.render(canvas);
    }

    /// Re-derives the size dependent tuning for `viewport`.
    ///
    /// Boids are kept, only their speed and force caps change; boids left
    /// outside the new bounds are brought back by the boundary policy on
    /// the next step.
    pub fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_drawable() {
            warn!(
                "ignoring resize to {}x{}, nothing to draw on",
                viewport.width, viewport.height
            );
            return;
        }
        if viewport == self.tuning.viewport {
            return;
        }

        self.tuning = ViewportTuning::new(&self.run_options, viewport);
        self.wanderer
            .resize(viewport, self.tuning.history_capacity);
        for flock in self.flocks.iter_mut() {
            flock.apply_caps(self.tuning.max_speed, self.tuning.max_force);
            // a shorter trail would leave some boids chasing the live wanderer
            flock.fit_delays(self.tuning.history_capacity, &mut self.rng);
        }

        debug!("resized to {}x{}", viewport.width, viewport.height);
    }

    pub fn brightness(&self, line: Line) -> f32 {
        Line::ALL
            .iter()
            .position(|l| *l == line)
            .map(|i| self.brightness[i])
            .unwrap_or_default()
    }

    pub fn tuning(&self) -> &ViewportTuning {
        &self.tuning
    }

    pub fn run_options(&self) -> &RunOptions {
        &self.run_options
    }

    pub fn wanderer(&self) -> &Wanderer {
        &self.wanderer
    }

    pub fn flocks(&self) -> &[Flock] {
        &self.flocks
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::{SetupError, Simulation};
    use crate::{
        options::{RunOptions, Variant, Viewport},
        transit::Line,
    };

    fn options(variant: Variant) -> RunOptions {
        let mut options = RunOptions::for_variant(variant);
        options.seed = Some(1234);
        options.boids_per_flock = 12;
        options
    }

    #[test]
    fn no_surface_aborts_setup() {
        let res = Simulation::setup(Viewport::new(0., 0.), options(Variant::Baseline));
        assert!(matches!(res, Err(SetupError::NoSurface { .. })));
    }

    #[test]
    fn setup_builds_three_flocks_and_a_full_trail() {
        let sim = Simulation::setup(Viewport::new(1200., 700.), options(Variant::Baseline)).unwrap();
        let lines: Vec<Line> = sim.flocks().iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![Line::L123, Line::L456, Line::Nqr]);
        assert!(sim.flocks().iter().all(|f| f.len() == 12));
        assert_eq!(sim.wanderer().history_len(), sim.tuning().history_capacity);
        assert_eq!(sim.frame(), 0);
    }

    #[test]
    fn step_advances_and_tracks_brightness() {
        let mut sim =
            Simulation::setup(Viewport::new(1200., 700.), options(Variant::Enhanced)).unwrap();
        let now = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        sim.step(&now);
        sim.step(&now);
        assert_eq!(sim.frame(), 2);
        assert_eq!(sim.brightness(Line::L123), 255.);
        assert_eq!(sim.brightness(Line::L456), 193.);
        assert_eq!(sim.brightness(Line::Nqr), 241.);
    }

    #[test]
    fn same_seed_same_run() {
        let now = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        let run = || {
            let mut sim =
                Simulation::setup(Viewport::new(900., 600.), options(Variant::Baseline)).unwrap();
            for _ in 0..30 {
                sim.step(&now);
            }
            sim.flocks()[2].view()[5].position
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn resize_updates_caps_without_recreating_boids() {
        let mut sim =
            Simulation::setup(Viewport::new(1200., 700.), options(Variant::Enhanced)).unwrap();
        let now = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        sim.step(&now);
        let ids: Vec<usize> = sim.flocks()[0].view().iter().map(|b| b.id).collect();

        sim.resize(Viewport::new(500., 400.));

        assert_eq!(sim.tuning().max_speed, 2.);
        assert_eq!(sim.wanderer().history_capacity(), 140);
        for flock in sim.flocks() {
            assert_eq!(flock.len(), 12);
            assert!(flock.view().iter().all(|b| b.max_speed == 2.));
        }
        let after: Vec<usize> = sim.flocks()[0].view().iter().map(|b| b.id).collect();
        assert_eq!(ids, after);

        // the clamp policy pulls everyone into the smaller aviary
        sim.step(&now);
        let (min, max) = sim.tuning().clamp_rect();
        for flock in sim.flocks() {
            for b in flock.view() {
                assert!(b.position.cmpge(min).all() && b.position.cmple(max).all());
            }
        }
    }

    #[test]
    fn shrinking_the_trail_keeps_delays_in_range() {
        let mut options = options(Variant::Baseline);
        options.seed = Some(7);
        options.boids_per_flock = 90;
        let mut sim = Simulation::setup(Viewport::new(1200., 700.), options).unwrap();
        let now = NaiveTime::from_hms_opt(8, 30, 0).unwrap();
        sim.step(&now);

        sim.resize(Viewport::new(500., 700.));
        sim.step(&now);

        let capacity = sim.wanderer().history_capacity();
        assert_eq!(capacity, 140);
        let out_of_range = sim
            .flocks()
            .iter()
            .flat_map(|f| f.view())
            .filter(|b| b.delay >= capacity)
            .count();
        assert_eq!(out_of_range, 0);
    }

    #[test]
    fn resize_to_nothing_is_ignored() {
        let mut sim =
            Simulation::setup(Viewport::new(1200., 700.), options(Variant::Baseline)).unwrap();
        sim.resize(Viewport::new(0., 700.));
        assert_eq!(sim.tuning().viewport, Viewport::new(1200., 700.));
    }
}
