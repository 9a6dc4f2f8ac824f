use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::{
    boid::{uniform, Boid, FlockContext, FlockWeights},
    options::ViewportTuning,
    render::Canvas,
    transit::Line,
};

/// Boids of one transit line.
///
/// Every member scans every other member each frame, O(n^2) per flock. That
/// is fine for tens up to about a hundred boids and is the scaling limit of
/// this design.
#[derive(Debug, Clone)]
pub struct Flock {
    pub line: Line,
    boids: Vec<Boid>,
    /// copied into boids spawned by this flock
    pub weights: FlockWeights,
}

impl Flock {
    pub fn new(line: Line, weights: FlockWeights) -> Self {
        Flock {
            line,
            boids: Vec::new(),
            weights,
        }
    }

    pub fn add_boid(&mut self, boid: Boid) {
        self.boids.push(boid);
    }

    /// Adds `count` boids spread uniformly over the disk of `radius` around `center`
    pub fn spawn<R: Rng>(
        &mut self,
        count: usize,
        center: Vec2,
        radius: f32,
        free_fraction: f32,
        tuning: &ViewportTuning,
        rng: &mut R,
    ) {
        let radius = radius.max(0.);
        self.boids.reserve(count);

        for _ in 0..count {
            let angle = uniform(rng, 0., 2. * PI);
            // sqrt keeps the density even toward the rim
            let r = rng.gen::<f32>().sqrt() * radius;
            let position = center + Vec2::new(r * angle.cos(), r * angle.sin());
            let id = self.boids.len();
            let boid = Boid::spawn(
                position,
                id,
                self.line,
                self.weights,
                free_fraction,
                tuning,
                rng,
            );
            self.add_boid(boid);
        }
    }

    /// Runs every member against a snapshot of the flock taken before the
    /// frame, so the outcome does not depend on member order
    pub fn run<R: Rng>(&mut self, ctx: &FlockContext, rng: &mut R) {
        let snapshot = self.boids.to_owned();
        for boid in self.boids.iter_mut() {
            boid.run(&snapshot, ctx, rng);
        }
    }

    /// Draws members in order, later ones on top
    pub fn render(&self, canvas: &mut dyn Canvas, brightness: f32, tuning: &ViewportTuning) {
        for boid in self.boids.iter() {
            boid.render(canvas, brightness, tuning);
        }
    }

    pub fn apply_caps(&mut self, max_speed: f32, max_force: f32) {
        self.boids
            .iter_mut()
            .for_each(|b| b.set_caps(max_speed, max_force));
    }

    /// Rerolls the delays that point past a trail of `capacity` entries
    pub fn fit_delays<R: Rng>(&mut self, capacity: usize, rng: &mut R) {
        let capacity = capacity.max(1);
        for boid in self.boids.iter_mut().filter(|b| b.delay >= capacity) {
            boid.delay = rng.gen_range(0..capacity);
        }
    }

    pub fn view(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::Flock;
    use crate::{
        boid::{FlockContext, FlockWeights},
        options::{RunOptions, Variant, Viewport, ViewportTuning},
        transit::Line,
        wanderer::Wanderer,
    };

    const WEIGHTS: FlockWeights = FlockWeights {
        separation: 2.,
        cohesion: 0.5,
        center: 0.1,
        alignment: 0.5,
    };

    fn setup(variant: Variant) -> (RunOptions, ViewportTuning) {
        let mut options = RunOptions::for_variant(variant);
        options.delay_reroll_probability = 0.;
        let tuning = ViewportTuning::new(&options, Viewport::new(800., 500.));
        (options, tuning)
    }

    #[test]
    fn spawns_inside_the_disk() {
        let (_, tuning) = setup(Variant::Baseline);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut flock = Flock::new(Line::L456, WEIGHTS);
        let center = Vec2::new(400., 250.);
        flock.spawn(50, center, 80., 0., &tuning, &mut rng);

        assert_eq!(flock.len(), 50);
        for (i, b) in flock.view().iter().enumerate() {
            assert_eq!(b.id, i);
            assert_eq!(b.line, Line::L456);
            assert_eq!(b.weights, WEIGHTS);
            assert!(b.position.distance(center) <= 80. + 1e-3);
            assert!(b.delay < tuning.history_capacity);
            assert!(b.velocity.x.abs() <= 1. && b.velocity.y.abs() <= 1.);
        }
    }

    #[test]
    fn negative_radius_spawns_at_the_centre() {
        let (_, tuning) = setup(Variant::Baseline);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut flock = Flock::new(Line::Nqr, WEIGHTS);
        flock.spawn(3, Vec2::new(10., 10.), -4., 0., &tuning, &mut rng);
        assert!(flock.view().iter().all(|b| b.position == Vec2::new(10., 10.)));
    }

    #[test]
    fn run_does_not_depend_on_member_order() {
        let (options, tuning) = setup(Variant::Enhanced);
        let wanderer = Wanderer::new(&options, tuning.viewport, 20);
        let ctx = FlockContext {
            tuning: &tuning,
            wanderer: &wanderer,
        };

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
        let mut forward = Flock::new(Line::L123, WEIGHTS);
        forward.spawn(30, Vec2::new(400., 250.), 60., 0., &tuning, &mut rng);

        let mut backward = Flock::new(Line::L123, WEIGHTS);
        forward
            .view()
            .iter()
            .rev()
            .for_each(|b| backward.add_boid(*b));

        forward.run(&ctx, &mut Xoshiro256PlusPlus::seed_from_u64(1));
        backward.run(&ctx, &mut Xoshiro256PlusPlus::seed_from_u64(2));

        for (a, b) in forward.view().iter().zip(backward.view().iter().rev()) {
            assert_eq!(a.id, b.id);
            // peers are summed in a different order, allow for rounding
            assert_relative_eq!(a.position.x, b.position.x, epsilon = 1e-3);
            assert_relative_eq!(a.position.y, b.position.y, epsilon = 1e-3);
            assert_relative_eq!(a.velocity.x, b.velocity.x, epsilon = 1e-3);
            assert_relative_eq!(a.velocity.y, b.velocity.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn delays_are_refit_into_a_shorter_trail() {
        let (_, tuning) = setup(Variant::Baseline);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut flock = Flock::new(Line::L123, WEIGHTS);
        flock.spawn(200, Vec2::new(100., 100.), 10., 0., &tuning, &mut rng);
        let before: Vec<usize> = flock.view().iter().map(|b| b.delay).collect();
        assert!(before.iter().any(|d| *d >= 140));

        flock.fit_delays(140, &mut rng);

        for (b, old) in flock.view().iter().zip(before) {
            assert!(b.delay < 140);
            if old < 140 {
                assert_eq!(b.delay, old);
            }
        }
    }

    #[test]
    fn caps_propagate() {
        let (_, tuning) = setup(Variant::Baseline);
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
        let mut flock = Flock::new(Line::L123, WEIGHTS);
        flock.spawn(4, Vec2::new(100., 100.), 10., 0., &tuning, &mut rng);
        flock.apply_caps(7., 0.2);
        assert!(flock
            .view()
            .iter()
            .all(|b| b.max_speed == 7. && b.max_force == 0.2));
    }
}
