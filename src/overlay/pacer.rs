//! Frame-rate gate.
//!
//! `requestAnimationFrame` fires at the display refresh rate; the overlay
//! renders at most at `TARGET_FPS`. The last-render timestamp lives here as
//! an explicit field rather than hanging off the animation callback.

/// Render cadence while noise is visible.
pub const TARGET_FPS: f64 = 24.0;

pub struct FramePacer {
    interval_ms: f64,
    last_render_ms: Option<f64>,
}

impl FramePacer {
    pub fn new(target_fps: f64) -> Self {
        Self {
            interval_ms: 1000.0 / target_fps,
            last_render_ms: None,
        }
    }

    /// Whether enough time has passed for another render. Records `now_ms`
    /// as the new last-render timestamp when it answers yes.
    pub fn should_render(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_render_ms {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_render_ms = Some(now_ms);
        true
    }
}
