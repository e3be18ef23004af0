mod frame;
mod input;
mod loop_runner;
mod metrics;
mod rendering;

pub use frame::{FrameHandler, FrameScheduler, FrameToken};
pub use input::InputEvent;
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{Color, FrameCanvas, Renderer, TextAlign, TextStyle};
