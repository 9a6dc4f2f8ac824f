use std::f32::consts::PI;

use circular_queue::CircularQueue;
use glam::Vec2;

use crate::{
    math_helpers::{from_angle, Steering},
    noise_field::NoiseField,
    options::{RunOptions, Viewport},
};

/// A single point roaming a box on a noise driven heading.
///
/// The flocks do not chase the wanderer directly; every boid follows the
/// position the wanderer had some frames ago, taken from [`Wanderer::history`].
#[derive(Debug, Clone)]
pub struct Wanderer {
    pub position: Vec2,
    pub velocity: Vec2,
    acceleration: Vec2,
    pub max_speed: f32,
    pub max_force: f32,
    noise_scale: f64,
    edge_force_scale: f32,
    box_width_ratio: f32,
    box_height_ratio: f32,
    pub box_center: Vec2,
    pub box_width: f32,
    pub box_height: f32,
    /// oldest first when read through `asc_iter`
    history: CircularQueue<Vec2>,
}

impl Wanderer {
    pub fn new(run_options: &RunOptions, viewport: Viewport, history_capacity: usize) -> Self {
        let mut wanderer = Wanderer {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            max_speed: run_options.wanderer_max_speed,
            max_force: run_options.wanderer_max_force,
            noise_scale: run_options.wanderer_noise_scale,
            edge_force_scale: run_options.wanderer_edge_force_scale,
            box_width_ratio: run_options.wanderer_box_width_ratio,
            box_height_ratio: run_options.wanderer_box_height_ratio,
            box_center: Vec2::ZERO,
            box_width: 0.,
            box_height: 0.,
            history: CircularQueue::with_capacity(history_capacity.max(1)),
        };
        wanderer.fit_box(viewport);
        wanderer.position = wanderer.box_center;
        wanderer
    }

    /// Steers by the noise field sampled at the current position and `frame`,
    /// moves and records the new position.
    pub fn update(&mut self, noise: &dyn NoiseField, frame: u64) {
        let k = self.noise_scale;
        let n = noise.sample(
            self.position.x as f64 * k,
            self.position.y as f64 * k,
            frame as f64 * k,
        ) as f32;
        // two full turns, the path curls more than with a single revolution
        let angle = n * PI * 4.;
        self.apply_force(from_angle(angle).with_magnitude(self.max_force));

        let edge_force = self.stay_in_box();
        self.apply_force(edge_force);

        self.velocity += self.acceleration;
        self.velocity = self.velocity.limit(self.max_speed);
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;

        self.history.push(self.position);
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Push back toward the box centre, per axis, once outside the box
    fn stay_in_box(&self) -> Vec2 {
        let push = self.max_force * self.edge_force_scale;
        let half = Vec2::new(self.box_width / 2., self.box_height / 2.);
        let mut edge_force = Vec2::ZERO;

        if self.position.x < self.box_center.x - half.x {
            edge_force.x = push;
        } else if self.position.x > self.box_center.x + half.x {
            edge_force.x = -push;
        }

        if self.position.y < self.box_center.y - half.y {
            edge_force.y = push;
        } else if self.position.y > self.box_center.y + half.y {
            edge_force.y = -push;
        }

        edge_force
    }

    /// Refits the box to a new viewport and pulls the wanderer inside it.
    ///
    /// Velocity and acceleration carry over; the history keeps its newest
    /// entries if the capacity shrinks.
    pub fn resize(&mut self, viewport: Viewport, history_capacity: usize) {
        self.fit_box(viewport);

        let half = Vec2::new(self.box_width / 2., self.box_height / 2.);
        self.position = self
            .position
            .max(self.box_center - half)
            .min(self.box_center + half);

        let history_capacity = history_capacity.max(1);
        if history_capacity != self.history.capacity() {
            let kept: Vec<Vec2> = self.history.asc_iter().copied().collect();
            let skip = kept.len().saturating_sub(history_capacity);
            self.history = CircularQueue::with_capacity(history_capacity);
            for p in kept.into_iter().skip(skip) {
                self.history.push(p);
            }
        }
    }

    fn fit_box(&mut self, viewport: Viewport) {
        self.box_center = Vec2::new(viewport.width / 3., viewport.height / 2.);
        self.box_width = self.box_width_ratio * viewport.width;
        self.box_height = self.box_height_ratio * viewport.height;
    }

    /// Position recorded `delay` entries after the oldest one in the history,
    /// or the live position while the history is not that long yet
    pub fn attractor(&self, delay: usize) -> Vec2 {
        self.history
            .asc_iter()
            .nth(delay)
            .copied()
            .unwrap_or(self.position)
    }

    pub fn history(&self) -> impl Iterator<Item = &Vec2> {
        self.history.asc_iter()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }
}
