use crate::assets::Image;
use crate::geometry::Rect;

use super::font::{glyph_advance, glyph_bit, glyph_for, scale_for_size, text_width_px};
use super::font::{GLYPH_HEIGHT, GLYPH_WIDTH};
use super::{Color, Renderer, TextAlign, TextStyle};

/// Software renderer over a borrowed RGBA8 frame, typically the `pixels` back buffer.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    clear_color: Color,
}

impl<'a> FrameCanvas<'a> {
    /// Returns `None` when `frame` is not exactly `width * height * 4` bytes.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32, clear_color: Color) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if frame.len() != expected {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
            clear_color,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(pixel)
    }
}

impl Renderer for FrameCanvas<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        let clear = self.clear_color.to_array();
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&clear);
        }
    }

    fn draw_image(&mut self, image: &Image, x: f32, y: f32, size: Option<(f32, f32)>) {
        let (dest_width, dest_height) =
            size.unwrap_or((image.width() as f32, image.height() as f32));
        draw_image_scaled(
            self.frame,
            self.width,
            self.height,
            image,
            x.floor() as i32,
            y.floor() as i32,
            dest_width.round().max(0.0) as i32,
            dest_height.round().max(0.0) as i32,
        );
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) {
        let scale = scale_for_size(style.size_px);
        let width = text_width_px(text, scale);
        let left = match style.align {
            TextAlign::Left => x.round() as i32,
            TextAlign::Center => x.round() as i32 - width / 2,
            TextAlign::Right => x.round() as i32 - width,
        };
        let top = y.round() as i32 - GLYPH_HEIGHT * scale;

        let mut cursor = left;
        for ch in text.chars() {
            if let Some(glyph) = glyph_for(ch) {
                draw_glyph(
                    self.frame,
                    self.width,
                    self.height,
                    cursor,
                    top,
                    glyph,
                    scale,
                    style.color,
                );
            }
            cursor += glyph_advance(scale);
        }
    }

    fn draw_rectangle(&mut self, rect: Rect, color: Color, filled: bool) {
        let x = rect.x.floor() as i32;
        let y = rect.y.floor() as i32;
        let width = rect.width.round() as i32;
        let height = rect.height.round() as i32;
        if filled {
            fill_rect(self.frame, self.width, self.height, x, y, width, height, color);
        } else {
            outline_rect(self.frame, self.width, self.height, x, y, width, height, color);
        }
    }
}

fn blend_pixel_clipped(frame: &mut [u8], width: u32, height: u32, x: i32, y: i32, src: [u8; 4]) {
    if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
        return;
    }
    let alpha = src[3];
    if alpha == 0 {
        return;
    }
    let offset = (y as usize * width as usize + x as usize) * 4;
    let Some(dst) = frame.get_mut(offset..offset + 4) else {
        return;
    };
    if alpha == 255 {
        dst.copy_from_slice(&src);
        return;
    }
    let a = alpha as u32;
    for channel in 0..3 {
        let blended = (src[channel] as u32 * a + dst[channel] as u32 * (255 - a) + 127) / 255;
        dst[channel] = blended as u8;
    }
    dst[3] = 255;
}

#[allow(clippy::too_many_arguments)]
fn fill_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Color,
) {
    let start_x = x.max(0);
    let start_y = y.max(0);
    let end_x = x.saturating_add(rect_width).min(width as i32);
    let end_y = y.saturating_add(rect_height).min(height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }
    let src = color.to_array();
    for py in start_y..end_y {
        for px in start_x..end_x {
            blend_pixel_clipped(frame, width, height, px, py, src);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn outline_rect(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Color,
) {
    if rect_width <= 1 || rect_height <= 1 {
        return;
    }
    fill_rect(frame, width, height, x, y, rect_width, 1, color);
    fill_rect(frame, width, height, x, y + rect_height - 1, rect_width, 1, color);
    fill_rect(frame, width, height, x, y + 1, 1, rect_height - 2, color);
    fill_rect(frame, width, height, x + rect_width - 1, y + 1, 1, rect_height - 2, color);
}

#[allow(clippy::too_many_arguments)]
fn draw_image_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    image: &Image,
    left: i32,
    top: i32,
    dest_width: i32,
    dest_height: i32,
) {
    if image.width() == 0 || image.height() == 0 || dest_width <= 0 || dest_height <= 0 {
        return;
    }

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = left.saturating_add(dest_width).min(width as i32);
    let draw_bottom = top.saturating_add(dest_height).min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let x_step = image.width() as f32 / dest_width as f32;
    let y_step = image.height() as f32 / dest_height as f32;
    let source = image.rgba();
    let source_width = image.width() as usize;

    for out_y in draw_top..draw_bottom {
        let src_y = (((out_y - top) as f32 * y_step) as u32).min(image.height() - 1) as usize;
        for out_x in draw_left..draw_right {
            let src_x = (((out_x - left) as f32 * x_step) as u32).min(image.width() - 1) as usize;
            let offset = (src_y * source_width + src_x) * 4;
            let mut texel = [0u8; 4];
            texel.copy_from_slice(&source[offset..offset + 4]);
            blend_pixel_clipped(frame, width, height, out_x, out_y, texel);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    glyph: u16,
    scale: i32,
    color: Color,
) {
    let src = color.to_array();
    for row in 0..GLYPH_HEIGHT {
        for col in 0..GLYPH_WIDTH {
            if !glyph_bit(glyph, row, col) {
                continue;
            }
            let px = x + col * scale;
            let py = y + row * scale;
            for sy in 0..scale {
                for sx in 0..scale {
                    blend_pixel_clipped(frame, width, height, px + sx, py + sy, src);
                }
            }
        }
    }
}
