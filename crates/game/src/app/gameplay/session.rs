use std::path::Path;

use engine::{
    AssetError, AssetManager, AssetSpec, Color, FrameHandler, FrameScheduler, FrameToken,
    InputEvent, Rect, Renderer, TextAlign, TextStyle,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::background::Background;
use super::obstacle::{ObstacleManager, ObstacleSettings};
use super::player::{Player, PlayerSprites, PlayerTuning};
use super::util::to_pixels_per_second;
use crate::app::config::GameConfig;

pub(crate) const CANVAS_WIDTH: u32 = 800;
pub(crate) const CANVAS_HEIGHT: u32 = 400;
const GROUND_OFFSET_PX: f32 = 100.0;
const GROUND_MARK_SPACING_PX: f32 = 40.0;

pub(crate) const ASSETS: [AssetSpec; 7] = [
    AssetSpec::new("playerRun1", "player_run_1.png"),
    AssetSpec::new("playerRun2", "player_run_2.png"),
    AssetSpec::new("playerJump", "player_jump.png"),
    AssetSpec::new("background", "background_tile.png"),
    AssetSpec::new("obstacleRock1", "obstacle_rock.png"),
    AssetSpec::new("obstacleRock2", "obstacle_rock50-80.png"),
    AssetSpec::new("obstacleRock3", "obstacle_rock40-50.png"),
];
const OBSTACLE_ASSETS: [&str; 3] = ["obstacleRock1", "obstacleRock2", "obstacleRock3"];

const TEXT_COLOR: Color = Color::BLACK;
const GAME_OVER_COLOR: Color = Color::rgb(220, 20, 20);
const PANEL_COLOR: Color = Color::rgba(255, 255, 255, 170);
const GROUND_COLOR: Color = Color::rgb(150, 110, 70);
const GROUND_LINE_COLOR: Color = Color::rgb(0x33, 0x33, 0x33);
const GROUND_MARK_COLOR: Color = Color::rgb(120, 85, 50);
const DEBUG_BOUNDS_COLOR: Color = Color::rgba(255, 0, 0, 128);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    Loading,
    LoadFailed,
    ReadyToStart,
    Running,
    GameOver,
}

/// What a single simulation tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Not running; nothing changed.
    Idle,
    /// Timestamp did not advance; nothing changed but the loop stays scheduled.
    Skipped,
    Advanced,
    /// This tick's collision ended the run.
    GameOver,
}

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("frame timestamp is not finite: {0}")]
    NonFiniteTimestamp(f64),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

#[derive(Debug)]
struct World {
    player: Player,
    background: Background,
    obstacles: ObstacleManager,
}

/// Owns every piece of simulation state and drives the update/draw cycle.
#[derive(Debug)]
pub(crate) struct GameSession {
    config: GameConfig,
    speed_px_per_s: f32,
    canvas_width: f32,
    canvas_height: f32,
    ground_y: f32,
    seed: u64,
    state: SessionState,
    world: Option<World>,
    distance_m: f64,
    last_frame_ms: f64,
    pending_frame: Option<FrameToken>,
    debug_bounds: bool,
}

impl GameSession {
    pub(crate) fn new(config: GameConfig) -> Self {
        let seed = config.rng_seed.unwrap_or_else(rand::random);
        let canvas_height = CANVAS_HEIGHT as f32;
        Self {
            speed_px_per_s: to_pixels_per_second(config.game_speed_kmh, config.pixels_per_meter),
            canvas_width: CANVAS_WIDTH as f32,
            canvas_height,
            ground_y: canvas_height - GROUND_OFFSET_PX,
            seed,
            state: SessionState::Loading,
            world: None,
            distance_m: 0.0,
            last_frame_ms: 0.0,
            pending_frame: None,
            debug_bounds: config.debug_bounds,
            config,
        }
    }

    /// Loads the whole asset batch and leaves the session either ready or failed.
    pub(crate) fn load_assets(&mut self, asset_root: &Path) -> Result<(), SessionError> {
        let loaded = AssetManager::load_all(asset_root, &ASSETS);
        self.finish_loading(loaded)
    }

    pub(crate) fn finish_loading(
        &mut self,
        loaded: Result<AssetManager, AssetError>,
    ) -> Result<(), SessionError> {
        let world = loaded.and_then(|assets| self.build_world(&assets));
        match world {
            Ok(world) => {
                self.world = Some(world);
                self.state = SessionState::ReadyToStart;
                info!(
                    seed = self.seed,
                    speed_px_per_s = self.speed_px_per_s,
                    "session_ready"
                );
                Ok(())
            }
            Err(load_error) => {
                self.state = SessionState::LoadFailed;
                error!(error = %load_error, "session_load_failed");
                Err(load_error.into())
            }
        }
    }

    fn build_world(&self, assets: &AssetManager) -> Result<World, AssetError> {
        let sprites = PlayerSprites {
            run: [
                assets.get("playerRun1")?.clone(),
                assets.get("playerRun2")?.clone(),
            ],
            jump: assets.get("playerJump")?.clone(),
        };
        let tuning = PlayerTuning {
            gravity_px_per_s2: self.config.gravity_px_per_s2,
            jump_strength_px_per_s: self.config.jump_strength_px_per_s,
            animation_speed_ms: self.config.animation_speed_ms,
            bounds_padding: self.config.bounds_padding,
        };
        let player = Player::new(self.config.player_x, self.ground_y, sprites, tuning);

        let background = Background::new(
            assets.get("background")?.clone(),
            self.canvas_height,
            self.config.background_scroll_ratio,
        );
        if background.width() < self.canvas_width {
            warn!(
                background_width = background.width(),
                canvas_width = self.canvas_width,
                "background_narrower_than_canvas"
            );
        }

        let variants = OBSTACLE_ASSETS
            .iter()
            .map(|name| assets.get(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;
        let obstacles = ObstacleManager::new(
            ObstacleSettings {
                canvas_width: self.canvas_width,
                ground_y: self.ground_y,
                speed_px_per_s: self.speed_px_per_s,
                bounds_padding: self.config.bounds_padding,
                min_spawn_interval_ms: self.config.min_spawn_interval_ms,
                max_spawn_interval_ms: self.config.max_spawn_interval_ms,
            },
            variants,
            self.seed,
        );

        Ok(World {
            player,
            background,
            obstacles,
        })
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub(crate) fn distance_m(&self) -> f64 {
        self.distance_m
    }

    #[cfg(test)]
    pub(crate) fn debug_bounds(&self) -> bool {
        self.debug_bounds
    }

    /// Resets distance, player and obstacles and enters `Running` at `now_ms`.
    pub(crate) fn start_run(&mut self, now_ms: f64) {
        let Some(world) = self.world.as_mut() else {
            return;
        };
        world.player.reset();
        world.obstacles.clear();
        self.distance_m = 0.0;
        self.last_frame_ms = now_ms;
        self.state = SessionState::Running;
        info!("run_started");
    }

    fn start(&mut self, scheduler: &mut FrameScheduler) {
        self.start_run(scheduler.now_ms());
        self.pending_frame = Some(scheduler.request_frame());
    }

    /// Advances the simulation to `timestamp_ms`. Draws nothing.
    pub(crate) fn tick(&mut self, timestamp_ms: f64) -> TickOutcome {
        if self.state != SessionState::Running {
            return TickOutcome::Idle;
        }
        let Some(world) = self.world.as_mut() else {
            return TickOutcome::Idle;
        };

        let raw_dt_ms = timestamp_ms - self.last_frame_ms;
        if raw_dt_ms <= 0.0 {
            return TickOutcome::Skipped;
        }
        self.last_frame_ms = timestamp_ms;
        let max_dt_ms = f64::from(self.config.max_frame_delta_ms);
        if raw_dt_ms > max_dt_ms {
            debug!(raw_dt_ms, max_dt_ms, "frame_delta_clamped");
        }
        let dt_ms = raw_dt_ms.min(max_dt_ms) as f32;

        world.background.update(dt_ms, self.speed_px_per_s);
        world.player.update(dt_ms);
        world.obstacles.update(dt_ms);

        if world.obstacles.check_collision(&world.player) {
            self.state = SessionState::GameOver;
            info!(distance_m = self.distance_m.floor() as u64, "game_over");
            return TickOutcome::GameOver;
        }

        self.distance_m += f64::from(self.speed_px_per_s) * (f64::from(dt_ms) / 1000.0)
            / f64::from(self.config.pixels_per_meter);
        TickOutcome::Advanced
    }

    fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.clear();
        let Some(world) = self.world.as_ref() else {
            return;
        };

        world.background.draw(renderer);
        self.draw_ground(renderer, world);
        world.obstacles.draw(renderer);
        world.player.draw(renderer);

        renderer.draw_text(
            &format!("Distance: {} m", self.distance_m.floor() as u64),
            20.0,
            40.0,
            TextStyle::new(24, TEXT_COLOR),
        );

        if self.debug_bounds {
            world.player.draw_bounds(renderer, DEBUG_BOUNDS_COLOR);
            world.obstacles.draw_bounds(renderer, DEBUG_BOUNDS_COLOR);
        }
    }

    fn draw_ground(&self, renderer: &mut dyn Renderer, world: &World) {
        let strip_height = self.canvas_height - self.ground_y;
        renderer.draw_rectangle(
            Rect::new(0.0, self.ground_y, self.canvas_width, strip_height),
            GROUND_COLOR,
            true,
        );
        renderer.draw_rectangle(
            Rect::new(0.0, self.ground_y, self.canvas_width, 2.0),
            GROUND_LINE_COLOR,
            true,
        );

        // marks scroll with the background so the ground reads as moving
        let (x1, _) = world.background.segments();
        let mut mark_x = x1.rem_euclid(GROUND_MARK_SPACING_PX) - GROUND_MARK_SPACING_PX;
        while mark_x < self.canvas_width {
            renderer.draw_rectangle(
                Rect::new(mark_x, self.ground_y + 12.0, 14.0, 3.0),
                GROUND_MARK_COLOR,
                true,
            );
            renderer.draw_rectangle(
                Rect::new(mark_x + 20.0, self.ground_y + 40.0, 10.0, 3.0),
                GROUND_MARK_COLOR,
                true,
            );
            mark_x += GROUND_MARK_SPACING_PX;
        }
    }

    fn draw_game_over(&self, renderer: &mut dyn Renderer) {
        let center_x = self.canvas_width / 2.0;
        let center_y = self.canvas_height / 2.0;
        renderer.draw_rectangle(
            Rect::new(center_x - 260.0, center_y - 100.0, 520.0, 160.0),
            PANEL_COLOR,
            true,
        );
        renderer.draw_text(
            "Game Over",
            center_x,
            center_y - 40.0,
            TextStyle::new(50, GAME_OVER_COLOR).aligned(TextAlign::Center),
        );
        renderer.draw_text(
            &format!("Final Distance: {} m", self.distance_m.floor() as u64),
            center_x,
            center_y,
            TextStyle::new(30, TEXT_COLOR).aligned(TextAlign::Center),
        );
        renderer.draw_text(
            "Press R to Restart",
            center_x,
            center_y + 40.0,
            TextStyle::new(24, TEXT_COLOR).aligned(TextAlign::Center),
        );
    }

    fn draw_static_screen(&self, renderer: &mut dyn Renderer) {
        let message = match self.state {
            SessionState::Loading => "Loading assets...",
            SessionState::LoadFailed => "Failed to load assets",
            SessionState::ReadyToStart => "Press Space or Tap to Start",
            SessionState::Running | SessionState::GameOver => return,
        };
        self.draw(renderer);
        renderer.draw_text(
            message,
            self.canvas_width / 2.0,
            self.canvas_height / 2.0,
            TextStyle::new(30, TEXT_COLOR).aligned(TextAlign::Center),
        );
    }

    fn cancel_pending_frame(&mut self, scheduler: &mut FrameScheduler) {
        if let Some(token) = self.pending_frame.take() {
            scheduler.cancel(token);
        }
    }
}

impl FrameHandler for GameSession {
    type Error = SessionError;

    fn attach(&mut self, renderer: &mut dyn Renderer, _scheduler: &mut FrameScheduler) {
        self.draw_static_screen(renderer);
    }

    fn handle_input(&mut self, event: InputEvent, scheduler: &mut FrameScheduler) {
        let state = self.state;
        match (state, event) {
            (SessionState::Loading | SessionState::LoadFailed, _) => {
                debug!(?event, ?state, "input_ignored");
            }
            (_, InputEvent::ToggleDebugBounds) => {
                self.debug_bounds = !self.debug_bounds;
                info!(enabled = self.debug_bounds, "debug_bounds_toggled");
            }
            (SessionState::ReadyToStart, InputEvent::Jump) => {
                let at_rest = self
                    .world
                    .as_ref()
                    .is_some_and(|world| world.player.is_at_rest());
                if at_rest {
                    self.start(scheduler);
                }
            }
            (SessionState::Running, InputEvent::Jump) => {
                if let Some(world) = self.world.as_mut() {
                    world.player.jump();
                }
            }
            (SessionState::GameOver, InputEvent::Restart) => {
                info!(previous_distance_m = self.distance_m.floor() as u64, "restart_requested");
                self.start(scheduler);
            }
            _ => {}
        }
    }

    fn frame(
        &mut self,
        timestamp_ms: f64,
        renderer: &mut dyn Renderer,
        scheduler: &mut FrameScheduler,
    ) -> Result<(), SessionError> {
        if !timestamp_ms.is_finite() {
            self.cancel_pending_frame(scheduler);
            return Err(SessionError::NonFiniteTimestamp(timestamp_ms));
        }

        match self.tick(timestamp_ms) {
            TickOutcome::Idle => {}
            TickOutcome::Skipped => {
                self.pending_frame = Some(scheduler.request_frame());
            }
            TickOutcome::Advanced => {
                self.draw(renderer);
                self.pending_frame = Some(scheduler.request_frame());
            }
            TickOutcome::GameOver => {
                self.draw(renderer);
                self.draw_game_over(renderer);
                self.cancel_pending_frame(scheduler);
            }
        }
        Ok(())
    }

    fn teardown(&mut self, scheduler: &mut FrameScheduler) {
        self.cancel_pending_frame(scheduler);
        info!(
            state = ?self.state,
            distance_m = self.distance_m.floor() as u64,
            "session_teardown"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::super::player::JumpState;
    use super::*;
    use engine::{FrameCanvas, Image};

    const RUN_COLOR: [u8; 4] = [20, 20, 200, 255];

    #[derive(Debug, Clone, PartialEq)]
    enum DrawCall {
        Clear,
        Image { width: u32, x: f32, y: f32 },
        Text(String),
        Rect { rect: Rect, color: Color },
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Vec<DrawCall>,
    }

    impl Renderer for RecordingRenderer {
        fn width(&self) -> u32 {
            CANVAS_WIDTH
        }

        fn height(&self) -> u32 {
            CANVAS_HEIGHT
        }

        fn clear(&mut self) {
            self.calls.push(DrawCall::Clear);
        }

        fn draw_image(&mut self, image: &Image, x: f32, y: f32, _size: Option<(f32, f32)>) {
            self.calls.push(DrawCall::Image {
                width: image.width(),
                x,
                y,
            });
        }

        fn draw_text(&mut self, text: &str, _x: f32, _y: f32, _style: TextStyle) {
            self.calls.push(DrawCall::Text(text.to_string()));
        }

        fn draw_rectangle(&mut self, rect: Rect, color: Color, _filled: bool) {
            self.calls.push(DrawCall::Rect { rect, color });
        }
    }

    impl RecordingRenderer {
        fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    DrawCall::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    fn test_assets() -> AssetManager {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let sizes = [
            ("player_run_1.png", 40, 60),
            ("player_run_2.png", 40, 60),
            ("player_jump.png", 40, 60),
            ("background_tile.png", 800, 40),
            ("obstacle_rock.png", 30, 30),
            ("obstacle_rock50-80.png", 50, 80),
            ("obstacle_rock40-50.png", 40, 50),
        ];
        for (file, width, height) in sizes {
            let color = if file.starts_with("player_run") {
                image::Rgba(RUN_COLOR)
            } else {
                image::Rgba([90, 90, 90, 255])
            };
            image::RgbaImage::from_pixel(width, height, color)
                .save(dir.path().join(file))
                .expect("write png");
        }
        AssetManager::load_all(dir.path(), &ASSETS).expect("assets load")
    }

    fn ready_session() -> GameSession {
        let config = GameConfig {
            rng_seed: Some(7),
            ..GameConfig::default()
        };
        let mut session = GameSession::new(config);
        session
            .finish_loading(Ok(test_assets()))
            .expect("session ready");
        session
    }

    fn world(session: &mut GameSession) -> &mut World {
        session.world.as_mut().expect("world built")
    }

    #[test]
    fn load_failure_moves_to_load_failed_and_ignores_input() {
        let mut session = GameSession::new(GameConfig::default());
        assert_eq!(session.state(), SessionState::Loading);

        let error = AssetError::UnknownAsset("playerRun1".to_string());
        assert!(session.finish_loading(Err(error)).is_err());
        assert_eq!(session.state(), SessionState::LoadFailed);

        let mut scheduler = FrameScheduler::new();
        session.handle_input(InputEvent::Jump, &mut scheduler);
        session.handle_input(InputEvent::ToggleDebugBounds, &mut scheduler);
        assert_eq!(session.state(), SessionState::LoadFailed);
        assert!(!session.debug_bounds());
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn missing_file_on_disk_fails_loading() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let mut session = GameSession::new(GameConfig::default());
        let error = session.load_assets(dir.path()).expect_err("no assets on disk");
        assert!(matches!(
            error,
            SessionError::Asset(AssetError::LoadFailed { total: 7, .. })
        ));
        assert_eq!(session.state(), SessionState::LoadFailed);
    }

    #[test]
    fn attach_draws_start_prompt() {
        let mut session = ready_session();
        let mut renderer = RecordingRenderer::default();
        let mut scheduler = FrameScheduler::new();
        session.attach(&mut renderer, &mut scheduler);

        assert_eq!(renderer.calls.first(), Some(&DrawCall::Clear));
        assert!(renderer.texts().contains(&"Press Space or Tap to Start"));
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn jump_starts_run_and_schedules_frame() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();

        session.handle_input(InputEvent::Restart, &mut scheduler);
        assert_eq!(session.state(), SessionState::ReadyToStart);

        session.handle_input(InputEvent::Jump, &mut scheduler);
        assert_eq!(session.state(), SessionState::Running);
        assert!(scheduler.has_pending());
        assert!(world(&mut session).player.is_at_rest());
    }

    #[test]
    fn idle_run_accumulates_expected_distance() {
        let mut session = ready_session();
        session.start_run(0.0);

        let mut timestamp = 0.0;
        while timestamp + 16.0 <= 1000.0 {
            timestamp += 16.0;
            assert_eq!(session.tick(timestamp), TickOutcome::Advanced);
        }
        assert_eq!(session.tick(1000.0), TickOutcome::Advanced);

        let expected = f64::from(to_pixels_per_second(70.0, 10.0)) / 10.0;
        assert!(
            (session.distance_m() - expected).abs() < 1e-3,
            "distance={} expected={expected}",
            session.distance_m()
        );
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn non_advancing_timestamp_is_skipped_but_keeps_loop_alive() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        let mut renderer = RecordingRenderer::default();
        session.start_run(100.0);

        session
            .frame(100.0, &mut renderer, &mut scheduler)
            .expect("frame");
        assert!(renderer.calls.is_empty());
        assert!(scheduler.has_pending());
        assert_eq!(session.distance_m(), 0.0);

        session
            .frame(90.0, &mut renderer, &mut scheduler)
            .expect("frame");
        assert!(renderer.calls.is_empty());
        assert_eq!(session.tick(116.0), TickOutcome::Advanced);
    }

    #[test]
    fn collision_ends_run_exactly_once() {
        let mut session = ready_session();
        session.start_run(0.0);
        {
            let world = world(&mut session);
            let rock = world.obstacles.variants()[0].clone();
            let player_x = world.player.position().x;
            world.obstacles.spawn(player_x, rock);
        }

        assert_eq!(session.tick(16.0), TickOutcome::GameOver);
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.distance_m(), 0.0);

        assert_eq!(session.tick(32.0), TickOutcome::Idle);
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.distance_m(), 0.0);
    }

    #[test]
    fn game_over_frame_draws_panel_and_stops_scheduling() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        let mut renderer = RecordingRenderer::default();
        session.start_run(0.0);
        {
            let world = world(&mut session);
            let rock = world.obstacles.variants()[1].clone();
            world.obstacles.spawn(60.0, rock);
        }

        session
            .frame(16.0, &mut renderer, &mut scheduler)
            .expect("frame");
        assert!(!scheduler.has_pending());
        assert_eq!(
            renderer.texts(),
            vec![
                "Distance: 0 m",
                "Game Over",
                "Final Distance: 0 m",
                "Press R to Restart"
            ]
        );

        renderer.calls.clear();
        session
            .frame(32.0, &mut renderer, &mut scheduler)
            .expect("frame");
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn restart_only_from_game_over_with_r() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        session.start_run(0.0);
        for step in 1..=30 {
            session.tick(f64::from(step) * 16.0);
        }
        {
            let world = world(&mut session);
            let rock = world.obstacles.variants()[0].clone();
            world.obstacles.spawn(60.0, rock);
        }
        assert_eq!(session.tick(31.0 * 16.0), TickOutcome::GameOver);
        assert!(session.distance_m() > 0.0);

        session.handle_input(InputEvent::Jump, &mut scheduler);
        assert_eq!(session.state(), SessionState::GameOver);

        session.handle_input(InputEvent::Restart, &mut scheduler);
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.distance_m(), 0.0);
        assert!(scheduler.has_pending());
        let world = world(&mut session);
        assert!(world.obstacles.obstacles().is_empty());
        assert!(world.player.is_at_rest());
    }

    #[test]
    fn jump_while_running_makes_player_airborne() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        session.handle_input(InputEvent::Jump, &mut scheduler);
        session.handle_input(InputEvent::Jump, &mut scheduler);

        let world = world(&mut session);
        assert_eq!(world.player.jump_state(), JumpState::Airborne);
    }

    #[test]
    fn large_frame_delta_is_clamped() {
        let mut session = ready_session();
        session.start_run(0.0);
        assert_eq!(session.tick(10_000.0), TickOutcome::Advanced);

        let expected = f64::from(to_pixels_per_second(70.0, 10.0)) * 0.25 / 10.0;
        assert!((session.distance_m() - expected).abs() < 1e-3);
    }

    #[test]
    fn non_finite_timestamp_halts_with_error() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        let mut renderer = RecordingRenderer::default();
        session.handle_input(InputEvent::Jump, &mut scheduler);

        let error = session
            .frame(f64::NAN, &mut renderer, &mut scheduler)
            .expect_err("nan timestamp");
        assert!(matches!(error, SessionError::NonFiniteTimestamp(_)));
        assert!(!scheduler.has_pending());
    }

    #[test]
    fn draw_order_and_debug_overlay() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        let mut renderer = RecordingRenderer::default();
        session.start_run(0.0);
        {
            let world = world(&mut session);
            let rock = world.obstacles.variants()[0].clone();
            world.obstacles.spawn(500.0, rock);
        }
        session.handle_input(InputEvent::ToggleDebugBounds, &mut scheduler);
        assert!(session.debug_bounds());

        session
            .frame(16.0, &mut renderer, &mut scheduler)
            .expect("frame");

        let calls = &renderer.calls;
        assert_eq!(calls[0], DrawCall::Clear);
        let image_widths: Vec<u32> = calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Image { width, .. } => Some(*width),
                _ => None,
            })
            .collect();
        // background twice, then the obstacle, then the player
        assert_eq!(image_widths, vec![800, 800, 30, 40]);

        let hud_index = calls
            .iter()
            .position(|call| matches!(call, DrawCall::Text(text) if text.starts_with("Distance")))
            .expect("hud text");
        let debug_rects = calls[hud_index..]
            .iter()
            .filter(|call| matches!(call, DrawCall::Rect { color, .. } if *color == DEBUG_BOUNDS_COLOR))
            .count();
        assert_eq!(debug_rects, 2);
    }

    #[test]
    fn rendered_frame_shows_player_sprite_on_ground() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        let mut buffer = vec![0u8; (CANVAS_WIDTH * CANVAS_HEIGHT * 4) as usize];
        let mut canvas = FrameCanvas::new(
            &mut buffer,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Color::rgb(135, 206, 235),
        )
        .expect("canvas");
        session.start_run(0.0);
        session
            .frame(16.0, &mut canvas, &mut scheduler)
            .expect("frame");

        // player sprite spans x 50..90, y 240..300
        assert_eq!(canvas.pixel(70, 270), Some(RUN_COLOR));
        assert_eq!(canvas.pixel(70, 350), Some(GROUND_COLOR.to_array()));
    }

    #[test]
    fn teardown_cancels_pending_frame() {
        let mut session = ready_session();
        let mut scheduler = FrameScheduler::new();
        session.handle_input(InputEvent::Jump, &mut scheduler);
        assert!(scheduler.has_pending());

        session.teardown(&mut scheduler);
        assert!(!scheduler.has_pending());
    }
}
