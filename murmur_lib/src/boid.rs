use std::f32::consts::PI;

use glam::f32::Vec2;
use rand::Rng;

use crate::{
    math_helpers::{map_range, Steering},
    options::{BoundaryPolicy, ModeSwitching, ViewportTuning},
    render::{BirdShape, Canvas, Placement, Rgba},
    transit::Line,
    wanderer::Wanderer,
};

/// Alpha for the card tint so text on the card stays readable (0-255)
pub const CARD_TINT_ALPHA: f32 = 155.;

/// Nominal radius used when wrapping around the horizontal edges
const WRAP_RADIUS: f32 = 3.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoidType {
    /// follows the flock and the wanderer's trail
    Murm,
    /// only keeps its distance
    Free,
}

impl BoidType {
    pub fn flipped(self) -> Self {
        match self {
            BoidType::Murm => BoidType::Free,
            BoidType::Free => BoidType::Murm,
        }
    }
}

/// Per force multipliers, shared by all members of a flock at spawn time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockWeights {
    pub separation: f32,
    pub cohesion: f32,
    pub center: f32,
    pub alignment: f32,
}

/// Read only state every boid of every flock sees during a frame
#[derive(Debug, Clone, Copy)]
pub struct FlockContext<'a> {
    pub tuning: &'a ViewportTuning,
    pub wanderer: &'a Wanderer,
}

#[derive(Debug, Clone, Copy)]
pub struct Boid {
    // sequential id within the flock, starting from 0
    pub id: usize,
    pub line: Line,
    pub position: Vec2,
    pub velocity: Vec2,
    acceleration: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
    pub boid_type: BoidType,
    pub weights: FlockWeights,
    /// index into the wanderer's history this boid is drawn to
    pub delay: usize,
    /// wing phase, purely cosmetic
    pub angle: f32,
    pub tilt: f32,
}

impl Boid {
    /// Creates a new cohesive [`Boid`] with the caps of the given tuning.
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        id: usize,
        line: Line,
        weights: FlockWeights,
        tuning: &ViewportTuning,
    ) -> Self {
        Boid {
            id,
            line,
            position,
            velocity,
            acceleration: Vec2::ZERO,
            max_speed: tuning.max_speed,
            max_force: tuning.max_force,
            boid_type: BoidType::Murm,
            weights,
            delay: 0,
            angle: PI / 6.,
            tilt: 0.,
        }
    }

    /// Like [`Boid::new`], with a random heading, wing phase, trail delay and
    /// a `free_fraction` chance of starting out free
    pub fn spawn<R: Rng>(
        position: Vec2,
        id: usize,
        line: Line,
        weights: FlockWeights,
        free_fraction: f32,
        tuning: &ViewportTuning,
        rng: &mut R,
    ) -> Self {
        let velocity = Vec2::new(uniform(rng, -1., 1.), uniform(rng, -1., 1.));
        let mut boid = Boid::new(position, velocity, id, line, weights, tuning);

        boid.angle = uniform(rng, PI / 18., PI / 3.);
        boid.delay = rng.gen_range(0..tuning.history_capacity.max(1));
        if rng.gen::<f32>() < free_fraction {
            boid.boid_type = BoidType::Free;
        }
        boid
    }

    /// One full frame: steer by the flock, move, then enforce the borders
    pub fn run<R: Rng>(&mut self, peers: &[Boid], ctx: &FlockContext, rng: &mut R) {
        self.flock(peers, ctx, rng);
        self.update(ctx.tuning, rng);
        self.borders(ctx.tuning, rng);
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Accumulates the weighted steering forces for this frame
    pub fn flock<R: Rng>(&mut self, peers: &[Boid], ctx: &FlockContext, rng: &mut R) {
        let tuning = ctx.tuning;

        let sep = self.separate(peers, tuning) * self.weights.separation;
        self.apply_force(sep);

        if self.boid_type == BoidType::Murm {
            let coh = self.cohesion(peers, tuning) * self.weights.cohesion;
            let ctr = self.center(ctx.wanderer) * self.weights.center;
            self.apply_force(coh);
            self.apply_force(ctr);

            if tuning.alignment_on {
                let ali = self.align(peers, tuning) * self.weights.alignment;
                self.apply_force(ali);
            }
        }

        if tuning.contain_on {
            let con = self.contain(tuning) * tuning.contain_coefficient;
            self.apply_force(con);
        }

        match tuning.mode_switching {
            ModeSwitching::Random { probability } => {
                if rng.gen::<f32>() < probability {
                    self.boid_type = self.boid_type.flipped();
                }
            }
            ModeSwitching::Locked => (),
        }
    }

    /// Steer away from every peer closer than the separation distance,
    /// the closer the peer the harder
    pub fn separate(&self, peers: &[Boid], tuning: &ViewportTuning) -> Vec2 {
        let mut steer = Vec2::ZERO;
        let mut count = 0;

        for other in peers {
            let distance = self.position.distance(other.position);
            if distance > 0. && distance < tuning.separation_distance {
                steer += (self.position - other.position).normalized() / distance;
                count += 1;
            }
        }

        steer = steer.div_count(count);

        if steer.length() > 0. {
            steer = steer.normalized() * self.max_speed - self.velocity;
            steer.limit(self.max_force)
        } else {
            Vec2::ZERO
        }
    }

    /// Steer toward the centroid of the peers within the cohesion radius
    pub fn cohesion(&self, peers: &[Boid], tuning: &ViewportTuning) -> Vec2 {
        let mut center = Vec2::ZERO;
        let mut count = 0;

        for other in peers {
            let distance = self.position.distance(other.position);
            if distance > 0. && distance < tuning.cohesion_distance {
                center += other.position;
                count += 1;
            }
        }

        if count > 0 {
            self.seek(center.div_count(count))
        } else {
            Vec2::ZERO
        }
    }

    /// Match the mean heading of the peers within the alignment radius
    pub fn align(&self, peers: &[Boid], tuning: &ViewportTuning) -> Vec2 {
        let mut avg = Vec2::ZERO;
        let mut count = 0;

        for other in peers {
            let distance = self.position.distance(other.position);
            if distance > 0. && distance < tuning.alignment_distance {
                avg += other.velocity;
                count += 1;
            }
        }

        if count > 0 {
            let desired = avg.div_count(count).normalized() * self.max_speed;
            (desired - self.velocity).limit(self.max_force)
        } else {
            Vec2::ZERO
        }
    }

    pub fn seek(&self, target: Vec2) -> Vec2 {
        let desired = (target - self.position).normalized() * self.max_speed;
        (desired - self.velocity).limit(self.max_force)
    }

    /// Unit pull toward the wanderer's position `delay` frames back along its trail
    pub fn center(&self, wanderer: &Wanderer) -> Vec2 {
        let target = wanderer.attractor(self.delay);
        (self.position - target).normalized() * -1.
    }

    /// Soft inward push once a boid enters the margin along any edge,
    /// growing with the penetration up to a capped multiple of the max force
    pub fn contain(&self, tuning: &ViewportTuning) -> Vec2 {
        let margin = tuning.contain_margin;
        if margin <= 0. {
            return Vec2::ZERO;
        }

        let strength = |penetration: f32| {
            (penetration / margin).min(tuning.contain_max_multiplier) * self.max_force
        };

        let right = tuning.viewport.width;
        let bottom = tuning.fly_zone_bottom;
        let mut force = Vec2::ZERO;

        if self.position.x < margin {
            force.x += strength(margin - self.position.x);
        } else if self.position.x > right - margin {
            force.x -= strength(self.position.x - (right - margin));
        }

        if self.position.y < margin {
            force.y += strength(margin - self.position.y);
        } else if self.position.y > bottom - margin {
            force.y -= strength(self.position.y - (bottom - margin));
        }

        force
    }

    // Actually shifts the individual's location
    pub fn update<R: Rng>(&mut self, tuning: &ViewportTuning, rng: &mut R) {
        self.velocity += self.acceleration;
        self.angle += self.acceleration.length();
        // climbing birds flap harder
        if self.velocity.y < 0. {
            self.angle -= tuning.flap_speed * (self.velocity.y * 0.2);
        }
        self.velocity = self.velocity.limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;

        self.tilt = (self.tilt + uniform(rng, -0.01, 0.01)).clamp(-0.04, 0.04);

        if rng.gen::<f32>() < tuning.delay_reroll_probability {
            self.delay = rng.gen_range(0..tuning.history_capacity.max(1));
        }
    }

    pub fn borders<R: Rng>(&mut self, tuning: &ViewportTuning, rng: &mut R) {
        match tuning.boundary {
            BoundaryPolicy::Wrap => self.wrap(tuning, rng),
            BoundaryPolicy::Clamp => self.clamp(tuning),
        }
    }

    fn wrap<R: Rng>(&mut self, tuning: &ViewportTuning, rng: &mut R) {
        let width = tuning.viewport.width;
        let fly_zone_bottom = tuning.fly_zone_bottom;

        if self.position.x < -width / 4. {
            self.position.x = width + WRAP_RADIUS;
        }
        if self.position.x > width + width / 4. {
            self.position.x = -WRAP_RADIUS;
        }

        // below the fly zone, come back in along the top or one of the sides
        if self.position.y > fly_zone_bottom {
            match rng.gen_range(0..3) {
                0 => {
                    self.position.y = uniform(rng, 0., 40.);
                    self.position.x = uniform(rng, 0., width);
                }
                1 => {
                    self.position.x = uniform(rng, 0., 30.);
                    self.position.y = uniform(rng, 0., fly_zone_bottom);
                }
                _ => {
                    self.position.x = uniform(rng, width - 30., width);
                    self.position.y = uniform(rng, 0., fly_zone_bottom);
                }
            }
        }

        if self.position.y < 0. {
            self.position.y = fly_zone_bottom - uniform(rng, 0., 30.);
            self.position.x = self.position.x.clamp(0., width.max(0.));
        }
    }

    fn clamp(&mut self, tuning: &ViewportTuning) {
        let (min, max) = tuning.clamp_rect();
        self.position = self.position.max(min).min(max);
        self.velocity = self.velocity.limit(self.max_speed);
    }

    pub fn set_caps(&mut self, max_speed: f32, max_force: f32) {
        self.max_speed = max_speed;
        self.max_force = max_force;
    }

    /// Outline of the bird, wings spread and flapping with `angle`
    pub fn bird_shape(&self, tuning: &ViewportTuning) -> BirdShape {
        let size = tuning.size;
        let climb = if self.max_speed > 0. {
            self.velocity.y / self.max_speed
        } else {
            0.
        };

        let mut delta = size * self.angle.sin();
        let delta_flap = size * (self.angle + 0.5).sin() * 0.5 - size / 4.;
        let flap_x = size * 0.5;
        let mut wing = size;
        delta *= (1.05 - climb).min(1.5);
        wing += (0.6 * size * climb).max(0.1);
        let body = Vec2::new(0., 4.);

        BirdShape {
            start: Vec2::new(-wing, delta),
            segments: [
                (Vec2::new(-flap_x, delta_flap), body, body),
                (body, Vec2::new(flap_x, delta_flap), Vec2::new(wing, delta)),
            ],
        }
    }

    /// Draws the boid as a tinted card when the sprite is available,
    /// as a stroked bird otherwise
    pub fn render(&self, canvas: &mut dyn Canvas, brightness: f32, tuning: &ViewportTuning) {
        let placement = Placement {
            position: self.position,
            rotation: map_range(self.velocity.x, -1., 1., -0.01, 0.01) + self.tilt,
        };
        let [r, g, b] = self.line.color(brightness);

        if canvas.has_sprite() {
            let alpha = CARD_TINT_ALPHA * (0.6 + 0.4 * (brightness / 255.));
            canvas.draw_sprite(
                placement,
                Vec2::new(tuning.card_width, tuning.card_height),
                Rgba::new(r, g, b, alpha),
            );
        } else {
            canvas.stroke_bird(
                placement,
                &self.bird_shape(tuning),
                Rgba::opaque([r, g, b]),
                tuning.stroke_weight,
            );
        }
    }
}

/// Uniform sample in [lo, hi), `lo` for an empty range
#[inline]
pub(crate) fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        lo + rng.gen::<f32>() * (hi - lo)
    } else {
        lo
    }
}
