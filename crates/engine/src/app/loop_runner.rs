use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::{Error as PixelsError, Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowBuilder};

use super::input::PressLatch;
use super::metrics::MetricsAccumulator;
use super::{Color, FrameCanvas, FrameHandler, FrameScheduler, InputEvent};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub window_scale: f64,
    pub clear_color: Color,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Runner".to_string(),
            canvas_width: 800,
            canvas_height: 400,
            window_scale: 1.0,
            clear_color: Color::rgb(135, 206, 235),
            metrics_log_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("canvas size {width}x{height} does not match the frame buffer")]
    CanvasSize { width: u32, height: u32 },
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("frame handler halted the loop: {0}")]
    FrameHalted(String),
}

/// Owns the `pixels` surface; the logical canvas size never changes, the surface
/// scales it to the window.
struct Presenter {
    pixels: Pixels<'static>,
    canvas_width: u32,
    canvas_height: u32,
    clear_color: Color,
}

impl Presenter {
    fn new(window: Arc<Window>, config: &LoopConfig) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, window);
        let pixels = Pixels::new(config.canvas_width, config.canvas_height, surface)?;
        Ok(Self {
            pixels,
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            clear_color: config.clear_color,
        })
    }

    fn canvas(&mut self) -> Option<FrameCanvas<'_>> {
        FrameCanvas::new(
            self.pixels.frame_mut(),
            self.canvas_width,
            self.canvas_height,
            self.clear_color,
        )
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), TextureError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)
    }

    fn present(&self) -> Result<(), PixelsError> {
        self.pixels.render()
    }
}

pub fn run_app<H: FrameHandler>(config: LoopConfig, mut handler: H) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.canvas_width as f64 * config.window_scale,
                config.canvas_height as f64 * config.window_scale,
            ))
            .with_min_inner_size(LogicalSize::new(
                config.canvas_width as f64,
                config.canvas_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut presenter =
        Presenter::new(Arc::clone(&window), &config).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let mut scheduler = FrameScheduler::new();
    let mut input_collector = InputCollector::default();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut last_frame_instant = Instant::now();
    let mut halted: Option<String> = None;
    let halted_slot = &mut halted;

    {
        let mut canvas = presenter.canvas().ok_or(AppError::CanvasSize {
            width: config.canvas_width,
            height: config.canvas_height,
        })?;
        handler.attach(&mut canvas, &mut scheduler);
    }

    info!(
        canvas_width = config.canvas_width,
        canvas_height = config.canvas_height,
        window_scale = config.window_scale,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = presenter.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = presenter.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_physical_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::Touch(touch) => {
                    input_collector.handle_touch(touch.phase);
                }
                WindowEvent::RedrawRequested => {
                    for input in input_collector.drain_events() {
                        handler.handle_input(input, &mut scheduler);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    if scheduler.take_due().is_some() {
                        let timestamp_ms = scheduler.now_ms();
                        let Some(mut canvas) = presenter.canvas() else {
                            error!("canvas_unavailable");
                            window_target.exit();
                            return;
                        };
                        if let Err(frame_error) =
                            handler.frame(timestamp_ms, &mut canvas, &mut scheduler)
                        {
                            error!(error = %frame_error, "frame_failed_halting_loop");
                            *halted_slot = Some(frame_error.to_string());
                            window_target.exit();
                            return;
                        }
                        metrics_accumulator.record_handler_frame();
                    }

                    if let Err(error) = presenter.present() {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            handler_fps = snapshot.handler_fps,
                            frame_time_ms = snapshot.frame_time_ms,
                            max_frame_time_ms = snapshot.max_frame_time_ms,
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                handler.teardown(&mut scheduler);
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match halted {
        Some(message) => Err(AppError::FrameHalted(message)),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    space: PressLatch,
    arrow_up: PressLatch,
    restart_key: PressLatch,
    debug_toggle_key: PressLatch,
    left_mouse: PressLatch,
    pending: Vec<InputEvent>,
}

impl InputCollector {
    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let (latch, event) = match code {
            KeyCode::Space => (&mut self.space, InputEvent::Jump),
            KeyCode::ArrowUp => (&mut self.arrow_up, InputEvent::Jump),
            KeyCode::KeyR => (&mut self.restart_key, InputEvent::Restart),
            KeyCode::F3 => (&mut self.debug_toggle_key, InputEvent::ToggleDebugBounds),
            KeyCode::Escape => {
                if is_pressed {
                    self.quit_requested = true;
                }
                return;
            }
            _ => return,
        };
        if latch.update(is_pressed) {
            self.pending.push(event);
        }
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        if self.left_mouse.update(state == ElementState::Pressed) {
            self.pending.push(InputEvent::Jump);
        }
    }

    fn handle_touch(&mut self, phase: TouchPhase) {
        if phase == TouchPhase::Started {
            self.pending.push(InputEvent::Jump);
        }
    }

    fn drain_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
