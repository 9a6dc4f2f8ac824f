//! The drawing surface the simulation renders onto, and the geometry of a bird.
//!
//! Coordinates are canvas pixels with the origin in the top left corner and
//! y pointing down. Implementations convert to whatever their backend uses.

use glam::Vec2;

/// Colour with channels in [0, 255]
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn opaque([r, g, b]: [f32; 3]) -> Self {
        Rgba { r, g, b, a: 255. }
    }

    /// Channels scaled into [0, 1]
    pub fn normalized(&self) -> [f32; 4] {
        [self.r / 255., self.g / 255., self.b / 255., self.a / 255.]
    }
}

/// Where a shape goes: translation to `position`, then rotation by `rotation` radians
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Placement {
    pub position: Vec2,
    pub rotation: f32,
}

/// A stroked "bird": two cubic bezier segments meeting at the body.
///
/// Points are local to the bird's [`Placement`].
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct BirdShape {
    pub start: Vec2,
    /// (control 1, control 2, end) of each segment
    pub segments: [(Vec2, Vec2, Vec2); 2],
}

impl BirdShape {
    /// Flattens both segments into a polyline of `2 * steps + 1` points
    pub fn flatten(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(1);
        let mut points = Vec::with_capacity(2 * steps + 1);
        points.push(self.start);

        let mut from = self.start;
        for (c1, c2, to) in self.segments {
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                points.push(cubic_bezier(from, c1, c2, to, t));
            }
            from = to;
        }
        points
    }
}

#[inline]
fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let u = 1. - t;
    p0 * (u * u * u) + p1 * (3. * u * u * t) + p2 * (3. * u * t * t) + p3 * (t * t * t)
}

/// Write only drawing surface.
pub trait Canvas {
    fn background(&mut self, color: [f32; 3]);
    /// Whether the card sprite asset is loaded
    fn has_sprite(&self) -> bool;
    /// Draws the card sprite centred on the placement, tinted
    fn draw_sprite(&mut self, placement: Placement, size: Vec2, tint: Rgba);
    fn stroke_bird(&mut self, placement: Placement, shape: &BirdShape, color: Rgba, weight: f32);
}
