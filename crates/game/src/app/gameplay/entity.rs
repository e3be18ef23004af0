use engine::{Rect, Vec2};

/// Shared kinematic state of every moving sprite: top-left position, size and
/// velocity in px/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub width: f32,
    pub height: f32,
    bounds_padding: f32,
}

impl Body {
    pub(crate) fn new(position: Vec2, width: f32, height: f32, bounds_padding: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            width,
            height,
            bounds_padding,
        }
    }

    pub(crate) fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub(crate) fn step(&mut self, dt_ms: f32) {
        let dt_seconds = dt_ms / 1000.0;
        self.position.x += self.velocity.x * dt_seconds;
        self.position.y += self.velocity.y * dt_seconds;
    }

    /// Full sprite rectangle.
    pub(crate) fn rect(&self) -> Rect {
        Rect::from_position(self.position, self.width, self.height)
    }

    /// Collision rectangle, inset by the padding on every side.
    pub(crate) fn bounds(&self) -> Rect {
        self.rect().inset(self.bounds_padding)
    }

    pub(crate) fn is_offscreen_left(&self) -> bool {
        self.position.x + self.width < 0.0
    }
}
