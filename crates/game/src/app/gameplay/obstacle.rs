use engine::{Color, Image, Rect, Renderer, Vec2};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::entity::Body;
use super::player::Player;
use super::util::random_int_inclusive;

/// One scrolling obstacle. Its sprite and size are fixed at creation.
#[derive(Debug, Clone)]
pub(crate) struct Obstacle {
    body: Body,
    image: Image,
}

impl Obstacle {
    fn new(x: f32, ground_y: f32, image: Image, speed_px_per_s: f32, bounds_padding: f32) -> Self {
        let width = image.width() as f32;
        let height = image.height() as f32;
        let body = Body::new(Vec2::new(x, ground_y - height), width, height, bounds_padding)
            .with_velocity(Vec2::new(-speed_px_per_s, 0.0));
        Self { body, image }
    }

    fn update(&mut self, dt_ms: f32) {
        self.body.step(dt_ms);
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.body.bounds()
    }

    #[cfg(test)]
    pub(crate) fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub(crate) fn is_offscreen(&self) -> bool {
        self.body.is_offscreen_left()
    }

    #[cfg(test)]
    pub(crate) fn image(&self) -> &Image {
        &self.image
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        let position = self.body.position;
        renderer.draw_image(&self.image, position.x, position.y, None);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ObstacleSettings {
    pub canvas_width: f32,
    pub ground_y: f32,
    pub speed_px_per_s: f32,
    pub bounds_padding: f32,
    pub min_spawn_interval_ms: u32,
    pub max_spawn_interval_ms: u32,
}

/// Spawns, scrolls and culls obstacles. Live obstacles are kept in spawn order.
#[derive(Debug)]
pub(crate) struct ObstacleManager {
    settings: ObstacleSettings,
    variants: Vec<Image>,
    obstacles: Vec<Obstacle>,
    spawn_timer_ms: f32,
    rng: SmallRng,
}

impl ObstacleManager {
    pub(crate) fn new(settings: ObstacleSettings, variants: Vec<Image>, seed: u64) -> Self {
        Self {
            spawn_timer_ms: settings.min_spawn_interval_ms as f32,
            settings,
            variants,
            obstacles: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub(crate) fn update(&mut self, dt_ms: f32) {
        self.obstacles.retain_mut(|obstacle| {
            obstacle.update(dt_ms);
            !obstacle.is_offscreen()
        });

        self.spawn_timer_ms -= dt_ms;
        if self.spawn_timer_ms <= 0.0 {
            self.generate_obstacle();
            self.spawn_timer_ms = random_int_inclusive(
                &mut self.rng,
                self.settings.min_spawn_interval_ms,
                self.settings.max_spawn_interval_ms,
            ) as f32;
        }
    }

    fn generate_obstacle(&mut self) {
        let Some(last_index) = self.variants.len().checked_sub(1) else {
            return;
        };
        let index = random_int_inclusive(&mut self.rng, 0, last_index as u32) as usize;
        let image = self.variants[index].clone();
        self.spawn(self.settings.canvas_width, image);
    }

    /// Adds an obstacle with its bottom edge on the ground line.
    pub(crate) fn spawn(&mut self, x: f32, image: Image) {
        self.obstacles.push(Obstacle::new(
            x,
            self.settings.ground_y,
            image,
            self.settings.speed_px_per_s,
            self.settings.bounds_padding,
        ));
    }

    pub(crate) fn check_collision(&self, player: &Player) -> bool {
        let player_bounds = player.bounds();
        self.obstacles
            .iter()
            .any(|obstacle| player_bounds.overlaps(&obstacle.bounds()))
    }

    pub(crate) fn clear(&mut self) {
        self.obstacles.clear();
        self.spawn_timer_ms = self.settings.min_spawn_interval_ms as f32;
    }

    #[cfg(test)]
    pub(crate) fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[cfg(test)]
    pub(crate) fn variants(&self) -> &[Image] {
        &self.variants
    }

    #[cfg(test)]
    pub(crate) fn spawn_timer_ms(&self) -> f32 {
        self.spawn_timer_ms
    }

    pub(crate) fn draw(&self, renderer: &mut dyn Renderer) {
        for obstacle in &self.obstacles {
            obstacle.draw(renderer);
        }
    }

    pub(crate) fn draw_bounds(&self, renderer: &mut dyn Renderer, color: Color) {
        for obstacle in &self.obstacles {
            renderer.draw_rectangle(obstacle.bounds(), color, true);
        }
    }
}
