use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("unknown variant `{0}`, expected `baseline` or `enhanced`")]
    UnknownVariant(String),
    #[error("unknown transit line `{0}`, expected `123`, `456` or `nqr`")]
    UnknownLine(String),
}

/// Knobs of the simulation that do not depend on the viewport.
///
/// Size dependent values (agent size, speed caps, counts) are derived from
/// these through [`ViewportTuning::new`] whenever the viewport changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub boundary: BoundaryPolicy,
    pub mode_switching: ModeSwitching,
    pub alignment_on: bool,
    pub contain_on: bool,

    pub separation_coefficient: f32,
    pub cohesion_coefficient: f32,
    pub center_coefficient: f32,
    pub alignment_coefficient: f32,
    pub contain_coefficient: f32,

    /// separation distance as a multiple of the agent size
    pub separation_size_ratio: f32,
    /// cohesion radius as a multiple of the agent size
    pub cohesion_size_ratio: f32,
    /// cohesion radius never drops below this
    pub cohesion_min_distance: f32,
    /// alignment radius relative to the cohesion radius
    pub alignment_radius_ratio: f32,

    /// width of the zone along the edges where containment pushes inward
    pub contain_margin: f32,
    /// cap of the containment multiplier
    pub contain_max_multiplier: f32,

    /// probability that a new boid starts out ignoring the flock
    pub initial_free_fraction: f32,
    pub delay_reroll_probability: f32,
    pub flap_speed: f32,

    pub wanderer_max_speed: f32,
    pub wanderer_max_force: f32,
    pub wanderer_noise_scale: f64,
    pub wanderer_box_width_ratio: f32,
    pub wanderer_box_height_ratio: f32,
    pub wanderer_edge_force_scale: f32,

    pub size: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub stroke_weight: f32,
    pub boids_per_flock: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub history_capacity: usize,

    /// viewports narrower than this get the small tuning
    pub narrow_breakpoint: f32,
    /// viewports wider than this get the large tuning
    pub wide_breakpoint: f32,

    pub seed: Option<u64>,
}

impl RunOptions {
    /// Options preset for one of the two known animation variants
    pub fn for_variant(variant: Variant) -> Self {
        let mut res = RunOptions::default();
        res.apply_variant(variant);
        res
    }

    /// Switches the behavioural knobs that differ in between the variants,
    /// leaving the rest untouched
    pub fn apply_variant(&mut self, variant: Variant) {
        match variant {
            Variant::Baseline => {
                self.boundary = BoundaryPolicy::Wrap;
                self.mode_switching = ModeSwitching::Random { probability: 0.005 };
                self.alignment_on = false;
                self.contain_on = false;
            }
            Variant::Enhanced => {
                self.boundary = BoundaryPolicy::Clamp;
                self.mode_switching = ModeSwitching::Locked;
                self.alignment_on = true;
                self.contain_on = true;
            }
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            boundary: BoundaryPolicy::Wrap,
            mode_switching: ModeSwitching::Random { probability: 0.005 },
            alignment_on: false,
            contain_on: false,

            separation_coefficient: 2.,
            cohesion_coefficient: 0.5,
            center_coefficient: 0.1,
            alignment_coefficient: 0.5,
            contain_coefficient: 1.,

            separation_size_ratio: 4.,
            cohesion_size_ratio: 6.,
            cohesion_min_distance: 50.,
            alignment_radius_ratio: 1.2,

            contain_margin: 60.,
            contain_max_multiplier: 2.,

            initial_free_fraction: 0.,
            delay_reroll_probability: 0.0005,
            flap_speed: 0.1,

            wanderer_max_speed: 6.,
            wanderer_max_force: 0.05,
            wanderer_noise_scale: 0.01,
            wanderer_box_width_ratio: 0.66,
            wanderer_box_height_ratio: 0.4,
            wanderer_edge_force_scale: 2.,

            size: 8.,
            max_speed: 3.,
            max_force: 0.04,
            stroke_weight: 1.5,
            boids_per_flock: 90,
            card_width: 22.,
            card_height: 14.,
            history_capacity: 200,

            narrow_breakpoint: 600.,
            wide_breakpoint: 1800.,

            seed: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// endless scrolling field, boids drift in and out of the flock
    Baseline,
    /// contained aviary, the whole flock stays cohesive
    Enhanced,
}

impl FromStr for Variant {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(Variant::Baseline),
            "enhanced" => Ok(Variant::Enhanced),
            _ => Err(OptionsError::UnknownVariant(s.to_owned())),
        }
    }
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Clamp"}
pub enum BoundaryPolicy {
    /// wrap around horizontally, re-enter from a random edge vertically
    Wrap,
    /// hard clamp into the inset rectangle
    Clamp,
}

#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
// {"type": "Random", "probability": 0.005}
pub enum ModeSwitching {
    /// every frame, each boid flips between murm and free with the given probability
    Random { probability: f32 },
    /// boids keep the mode they were spawned with
    Locked,
}

/// Pixel dimensions of the render surface, origin top left, y pointing down
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Viewport { width, height }
    }

    /// A surface with no area cannot host the animation
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0. && self.height > 0.
    }
}

/// Everything the simulation reads per frame, resolved for one viewport.
///
/// Immutable once built; a resize produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportTuning {
    pub viewport: Viewport,
    /// boids below this line wrap back in from another edge
    pub fly_zone_bottom: f32,

    pub size: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub stroke_weight: f32,
    pub boids_per_flock: usize,
    pub card_width: f32,
    pub card_height: f32,
    pub history_capacity: usize,

    pub separation_distance: f32,
    pub cohesion_distance: f32,
    pub alignment_distance: f32,

    pub boundary: BoundaryPolicy,
    pub mode_switching: ModeSwitching,
    pub alignment_on: bool,
    pub contain_on: bool,
    pub contain_margin: f32,
    pub contain_max_multiplier: f32,
    pub contain_coefficient: f32,
    /// clamp rectangle inset from the edges
    pub clamp_inset: f32,

    pub delay_reroll_probability: f32,
    pub flap_speed: f32,
}

impl ViewportTuning {
    pub fn new(run_options: &RunOptions, viewport: Viewport) -> Self {
        let mut size = run_options.size;
        let mut history_capacity = run_options.history_capacity;
        let mut max_speed = run_options.max_speed;
        let mut stroke_weight = run_options.stroke_weight;
        let mut boids_per_flock = run_options.boids_per_flock;
        let mut card_width = run_options.card_width;
        let mut card_height = run_options.card_height;

        if viewport.width < run_options.narrow_breakpoint {
            size = 6.;
            history_capacity = 140;
            max_speed = 2.;
            stroke_weight = 1.;
            boids_per_flock = (boids_per_flock as f32 * 0.6).floor() as usize;
            card_width = 16.;
            card_height = 10.;
        } else if viewport.width > run_options.wide_breakpoint {
            size = 10.;
            history_capacity = 240;
            stroke_weight = 2.;
            card_width = 28.;
            card_height = 18.;
        }

        let cohesion_distance =
            (size * run_options.cohesion_size_ratio).max(run_options.cohesion_min_distance);

        ViewportTuning {
            viewport,
            fly_zone_bottom: viewport.height,
            size,
            max_speed,
            max_force: run_options.max_force,
            stroke_weight,
            boids_per_flock,
            card_width,
            card_height,
            history_capacity: history_capacity.max(1),
            separation_distance: size * run_options.separation_size_ratio,
            cohesion_distance,
            alignment_distance: cohesion_distance * run_options.alignment_radius_ratio,
            boundary: run_options.boundary,
            mode_switching: run_options.mode_switching,
            alignment_on: run_options.alignment_on,
            contain_on: run_options.contain_on,
            contain_margin: run_options.contain_margin,
            contain_max_multiplier: run_options.contain_max_multiplier,
            contain_coefficient: run_options.contain_coefficient,
            clamp_inset: size,
            delay_reroll_probability: run_options.delay_reroll_probability,
            flap_speed: run_options.flap_speed,
        }
    }

    /// The rectangle boids are held in under [`BoundaryPolicy::Clamp`],
    /// as (min, max) corners. Collapses to the centre on tiny viewports.
    pub fn clamp_rect(&self) -> (glam::Vec2, glam::Vec2) {
        let w = self.viewport.width;
        let h = self.fly_zone_bottom;
        let inset_x = self.clamp_inset.min(w / 2.);
        let inset_y = self.clamp_inset.min(h / 2.);
        (
            glam::Vec2::new(inset_x, inset_y),
            glam::Vec2::new(w - inset_x, h - inset_y),
        )
    }
}
