use engine::{Color, Image, Rect, Renderer, Vec2};

use super::entity::Body;

pub(crate) const RUN_FRAME_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JumpState {
    Grounded,
    Airborne,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlayerTuning {
    pub gravity_px_per_s2: f32,
    pub jump_strength_px_per_s: f32,
    pub animation_speed_ms: f32,
    pub bounds_padding: f32,
}

#[derive(Debug, Clone)]
pub(crate) struct PlayerSprites {
    pub run: [Image; RUN_FRAME_COUNT],
    pub jump: Image,
}

/// The runner. Horizontal position never changes; only the vertical axis is
/// simulated.
#[derive(Debug)]
pub(crate) struct Player {
    body: Body,
    start_x: f32,
    rest_y: f32,
    jump_state: JumpState,
    tuning: PlayerTuning,
    sprites: PlayerSprites,
    frame_index: usize,
    animation_timer_ms: f32,
}

impl Player {
    /// Places the player with its feet on `ground_y`; the size comes from the first
    /// run frame.
    pub(crate) fn new(x: f32, ground_y: f32, sprites: PlayerSprites, tuning: PlayerTuning) -> Self {
        let width = sprites.run[0].width() as f32;
        let height = sprites.run[0].height() as f32;
        let rest_y = ground_y - height;
        Self {
            body: Body::new(Vec2::new(x, rest_y), width, height, tuning.bounds_padding),
            start_x: x,
            rest_y,
            jump_state: JumpState::Grounded,
            tuning,
            sprites,
            frame_index: 0,
            animation_timer_ms: 0.0,
        }
    }

    pub(crate) fn jump(&mut self) {
        if self.jump_state == JumpState::Grounded {
            self.jump_state = JumpState::Airborne;
            self.body.velocity.y = -self.tuning.jump_strength_px_per_s;
        }
    }

    pub(crate) fn update(&mut self, dt_ms: f32) {
        match self.jump_state {
            JumpState::Airborne => {
                self.body.step(dt_ms);
                self.body.velocity.y += self.tuning.gravity_px_per_s2 * (dt_ms / 1000.0);

                if self.body.position.y >= self.rest_y {
                    self.body.position.y = self.rest_y;
                    self.body.velocity.y = 0.0;
                    self.jump_state = JumpState::Grounded;
                }
            }
            JumpState::Grounded => {
                self.animation_timer_ms += dt_ms;
                if self.animation_timer_ms > self.tuning.animation_speed_ms {
                    self.animation_timer_ms = 0.0;
                    self.frame_index = (self.frame_index + 1) % self.sprites.run.len();
                }
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.body.position = Vec2::new(self.start_x, self.rest_y);
        self.body.velocity = Vec2::ZERO;
        self.jump_state = JumpState::Grounded;
        self.frame_index = 0;
        self.animation_timer_ms = 0.0;
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    #[cfg(test)]
    pub(crate) fn jump_state(&self) -> JumpState {
        self.jump_state
    }

    pub(crate) fn is_at_rest(&self) -> bool {
        self.jump_state == JumpState::Grounded && self.body.position.y == self.rest_y
    }

    #[cfg(test)]
    pub(crate) fn position(&self) -> Vec2 {
        self.body.position
    }

    #[cfg(test)]
    pub(crate) fn velocity_y(&self) -> f32 {
        self.body.velocity.y
    }

    #[cfg(test)]
    pub(crate) fn rest_y(&self) -> f32 {
        self.rest_y
    }

    #[cfg(test)]
    pub(crate) fn frame_index(&self) -> usize {
        self.frame_index
    }

    fn current_image(&self) -> &Image {
        match self.jump_state {
            JumpState::Airborne => &self.sprites.jump,
            JumpState::Grounded => &self.sprites.run[self.frame_index],
        }
    }

    pub(crate) fn draw(&self, renderer: &mut dyn Renderer) {
        let position = self.body.position;
        renderer.draw_image(self.current_image(), position.x, position.y, None);
    }

    pub(crate) fn draw_bounds(&self, renderer: &mut dyn Renderer, color: Color) {
        renderer.draw_rectangle(self.bounds(), color, true);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) const GROUND_Y: f32 = 300.0;

    pub(crate) fn sprites() -> PlayerSprites {
        PlayerSprites {
            run: [
                Image::filled(40, 60, [20, 20, 200, 255]),
                Image::filled(40, 60, [20, 200, 20, 255]),
            ],
            jump: Image::filled(40, 60, [200, 20, 20, 255]),
        }
    }

    pub(crate) fn tuning() -> PlayerTuning {
        PlayerTuning {
            gravity_px_per_s2: 1800.0,
            jump_strength_px_per_s: 700.0,
            animation_speed_ms: 150.0,
            bounds_padding: 5.0,
        }
    }

    pub(crate) fn player() -> Player {
        Player::new(50.0, GROUND_Y, sprites(), tuning())
    }
}
