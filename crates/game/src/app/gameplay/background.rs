use engine::{Image, Renderer};

/// Two copies of one tile laid end to end and scrolled left.
#[derive(Debug, Clone)]
pub(crate) struct Background {
    image: Image,
    width: f32,
    height: f32,
    scroll_ratio: f32,
    x1: f32,
    x2: f32,
}

impl Background {
    pub(crate) fn new(image: Image, canvas_height: f32, scroll_ratio: f32) -> Self {
        let width = (image.width() as f32).max(1.0);
        Self {
            image,
            width,
            height: canvas_height,
            scroll_ratio,
            x1: 0.0,
            x2: width,
        }
    }

    pub(crate) fn update(&mut self, dt_ms: f32, scroll_px_per_s: f32) {
        let scroll_amount = scroll_px_per_s / 1000.0 * dt_ms * self.scroll_ratio;
        self.x1 -= scroll_amount;
        self.x2 -= scroll_amount;

        // The segment that left the screen goes behind the other one. Whole widths
        // are folded away so a long step still leaves one segment in (-width, 0].
        let lead = self.x1.min(self.x2);
        if lead <= -self.width {
            let front = -((-lead).rem_euclid(self.width));
            if self.x1 <= self.x2 {
                self.x2 = front;
                self.x1 = front + self.width;
            } else {
                self.x1 = front;
                self.x2 = front + self.width;
            }
        }
    }

    pub(crate) fn segments(&self) -> (f32, f32) {
        (self.x1, self.x2)
    }

    pub(crate) fn width(&self) -> f32 {
        self.width
    }

    pub(crate) fn draw(&self, renderer: &mut dyn Renderer) {
        let size = Some((self.width, self.height));
        renderer.draw_image(&self.image, self.x1, 0.0, size);
        renderer.draw_image(&self.image, self.x2, 0.0, size);
    }
}
