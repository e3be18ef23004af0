mod canvas;
mod font;
mod renderer;

pub use canvas::FrameCanvas;
pub use renderer::{Color, Renderer, TextAlign, TextStyle};
