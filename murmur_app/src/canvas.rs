use murmur_lib::{
    options::Viewport,
    render::{BirdShape, Canvas, Placement, Rgba},
};
use nannou::prelude::*;

const BEZIER_STEPS: usize = 8;

/// Draws onto a nannou frame.
///
/// The simulation works in pixels from the top left corner with y pointing
/// down, nannou has the origin in the window centre and y pointing up.
pub struct NannouCanvas<'a> {
    draw: &'a Draw,
    viewport: Viewport,
    card: Option<&'a wgpu::Texture>,
}

impl<'a> NannouCanvas<'a> {
    pub fn new(draw: &'a Draw, viewport: Viewport, card: Option<&'a wgpu::Texture>) -> Self {
        NannouCanvas {
            draw,
            viewport,
            card,
        }
    }

    fn to_window(&self, p: Vec2) -> Vec2 {
        vec2(
            p.x - self.viewport.width / 2.,
            self.viewport.height / 2. - p.y,
        )
    }

    fn placed(&self, placement: Placement) -> Draw {
        let p = self.to_window(placement.position);
        self.draw.x_y(p.x, p.y).rotate(-placement.rotation)
    }
}

impl<'a> Canvas for NannouCanvas<'a> {
    fn background(&mut self, [r, g, b]: [f32; 3]) {
        self.draw.background().rgb(r / 255., g / 255., b / 255.);
    }

    fn has_sprite(&self) -> bool {
        self.card.is_some()
    }

    fn draw_sprite(&mut self, placement: Placement, size: Vec2, tint: Rgba) {
        let card = match self.card {
            Some(card) => card,
            None => return,
        };
        let draw = self.placed(placement);
        let [r, g, b, a] = tint.normalized();
        draw.texture(card).w_h(size.x, size.y);
        // nannou textures take no tint, lay the line colour over the card
        draw.rect().w_h(size.x, size.y).rgba(r, g, b, a);
    }

    fn stroke_bird(&mut self, placement: Placement, shape: &BirdShape, color: Rgba, weight: f32) {
        let [r, g, b, a] = color.normalized();
        let points = shape
            .flatten(BEZIER_STEPS)
            .into_iter()
            .map(|p| pt2(p.x, -p.y));

        self.placed(placement)
            .polyline()
            .weight(weight)
            .join_round()
            .points(points)
            .rgba(r, g, b, a);
    }
}
