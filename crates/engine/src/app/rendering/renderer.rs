use crate::assets::Image;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// `size_px` is the target glyph height; `y` passed to `draw_text` is the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size_px: u32,
    pub color: Color,
    pub align: TextAlign,
}

impl TextStyle {
    pub const fn new(size_px: u32, color: Color) -> Self {
        Self {
            size_px,
            color,
            align: TextAlign::Left,
        }
    }

    pub const fn aligned(self, align: TextAlign) -> Self {
        Self { align, ..self }
    }
}

/// Drawing surface handed to game code each frame. Implementations own the pixels;
/// callers only describe what to draw.
pub trait Renderer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn clear(&mut self);
    /// Blits `image` with its top-left corner at `(x, y)`. `size` stretches it to
    /// `(width, height)`; `None` draws at native size.
    fn draw_image(&mut self, image: &Image, x: f32, y: f32, size: Option<(f32, f32)>);
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle);
    fn draw_rectangle(&mut self, rect: Rect, color: Color, filled: bool);
}
