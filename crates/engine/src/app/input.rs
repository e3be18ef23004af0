/// Discrete gameplay input delivered to the frame handler, at most once per press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    Jump,
    Restart,
    ToggleDebugBounds,
}

/// Edge detector for one physical key or button. Holding the key, or OS key repeat,
/// never produces a second press until it has been released.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PressLatch {
    is_down: bool,
}

impl PressLatch {
    pub(crate) fn update(&mut self, is_pressed: bool) -> bool {
        let pressed_edge = is_pressed && !self.is_down;
        self.is_down = is_pressed;
        pressed_edge
    }
}
