use std::time::{Duration, Instant};

/// Measures wall-clock time between frames.
///
/// The first tick reports zero so a freshly started loop does not try to
/// catch up on start-up time. Long stalls (a debugger break, a dragged
/// window) are capped at [`FrameTimer::MAX_FRAME_TIME`].
#[derive(Debug, Default)]
pub struct FrameTimer {
    last: Option<Instant>,
}

impl FrameTimer {
    pub const MAX_FRAME_TIME: f32 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        elapsed.as_secs_f32().min(Self::MAX_FRAME_TIME)
    }
}
