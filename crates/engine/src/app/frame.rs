use std::time::Instant;

use super::{InputEvent, Renderer};

/// Handle for one requested frame. Cancelling it revokes the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Single-slot next-frame schedule, the native counterpart of `requestAnimationFrame`.
/// At most one frame is pending; the host only invokes the handler when a request
/// is still pending at the next display refresh.
#[derive(Debug)]
pub struct FrameScheduler {
    origin: Instant,
    next_token: u64,
    pending: Option<FrameToken>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            next_token: 0,
            pending: None,
        }
    }

    /// Milliseconds on a monotonic clock since the scheduler was created.
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    pub fn request_frame(&mut self) -> FrameToken {
        self.next_token = self.next_token.wrapping_add(1);
        let token = FrameToken(self.next_token);
        self.pending = Some(token);
        token
    }

    /// Revokes `token` if it is still the pending request. Returns whether anything
    /// was cancelled; stale tokens are ignored.
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, token: FrameToken) -> bool {
        self.pending == Some(token)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn take_due(&mut self) -> Option<FrameToken> {
        self.pending.take()
    }
}

/// Game-side callbacks driven by [`run_app`](super::run_app).
pub trait FrameHandler {
    type Error: std::error::Error;

    /// Called once with the initial canvas before the event loop starts.
    fn attach(&mut self, renderer: &mut dyn Renderer, scheduler: &mut FrameScheduler);
    fn handle_input(&mut self, event: InputEvent, scheduler: &mut FrameScheduler);
    /// Runs one scheduled frame. An error halts the loop.
    fn frame(
        &mut self,
        timestamp_ms: f64,
        renderer: &mut dyn Renderer,
        scheduler: &mut FrameScheduler,
    ) -> Result<(), Self::Error>;
    fn teardown(&mut self, scheduler: &mut FrameScheduler);
}
