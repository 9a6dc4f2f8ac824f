//! Smooth 3D noise used to steer the wanderer.

use noise::{NoiseFn, Perlin};

/// A smooth scalar field over (x, y, t) with values in [0, 1].
pub trait NoiseField {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

/// Perlin noise remapped from [-1, 1] into [0, 1]
pub struct PerlinNoise {
    noise: Perlin,
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        PerlinNoise {
            noise: Perlin::new(seed),
        }
    }
}

impl NoiseField for PerlinNoise {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        ((self.noise.get([x, y, z]) + 1.) / 2.).clamp(0., 1.)
    }
}
