//! Overlay orchestration.
//!
//! One owned state record holds the random source, the pixel buffers, the
//! mask state, and the frame gate. Everything runs synchronously inside the
//! host's single-threaded dispatch, so a setter either fully precedes or
//! fully follows any given tick.

use super::buffers::{PixelBuffers, SurfaceExtent};
use super::compose;
use super::mask::MaskLayer;
use super::noise::refresh_noise;
use super::pacer::{FramePacer, TARGET_FPS};
use super::rng::EntropySource;

/// What a scheduler tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// `q` is zero: the presenter should clear the surface, nothing was
    /// computed, and the loop stays armed.
    Idle,
    /// Inside the frame interval; nothing to present.
    Throttled,
    /// A fresh frame was composed and should be presented.
    Rendered,
}

pub struct OverlayController {
    source: Box<dyn EntropySource>,
    buffers: PixelBuffers,
    mask: MaskLayer,
    pacer: FramePacer,
    probability: f64,
    stable_mask: bool,
    /// CSS width, CSS height and DPR of the last applied resize; a repeat
    /// call with the exact same triple is a no-op.
    last_css: Option<(f64, f64, f64)>,
}

impl OverlayController {
    pub fn new(source: Box<dyn EntropySource>) -> Self {
        Self {
            source,
            buffers: PixelBuffers::new(SurfaceExtent { width: 1, height: 1 }),
            mask: MaskLayer::new(),
            pacer: FramePacer::new(TARGET_FPS),
            probability: 0.0,
            stable_mask: false,
            last_css: None,
        }
    }

    /// Set the replacement fraction, clamped into [0,1]. NaN counts as 0.
    pub fn set_probability(&mut self, q: f64) {
        self.probability = if q.is_nan() { 0.0 } else { q.clamp(0.0, 1.0) };
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn set_stable_mask(&mut self, stable: bool) {
        self.stable_mask = stable;
    }

    pub fn stable_mask(&self) -> bool {
        self.stable_mask
    }

    /// Apply a viewport measurement. Returns true when the geometry changed
    /// and the presenter must update the canvas backing store; a repeat of
    /// the previous (cssW, cssH, dpr) triple returns false and touches
    /// nothing.
    pub fn resize(&mut self, css_width: f64, css_height: f64, dpr: f64) -> bool {
        if self.last_css == Some((css_width, css_height, dpr)) {
            return false;
        }
        self.last_css = Some((css_width, css_height, dpr));
        self.buffers.resize(SurfaceExtent::from_css(css_width, css_height, dpr));
        // Even under a stable mask the next render must rebuild.
        self.mask.invalidate();
        true
    }

    pub fn extent(&self) -> SurfaceExtent {
        self.buffers.extent()
    }

    /// The composed RGBA frame, `W*H*4` bytes.
    pub fn frame(&self) -> &[u8] {
        &self.buffers.frame
    }

    /// Rebuild count of the mask layer.
    pub fn mask_rebuilds(&self) -> u64 {
        self.mask.rebuild_count()
    }

    /// Run one scheduler tick at timestamp `now_ms` (milliseconds, any
    /// monotonic-enough origin).
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if self.probability == 0.0 {
            compose::clear(&mut self.buffers.frame);
            return TickOutcome::Idle;
        }
        if !self.pacer.should_render(now_ms) {
            return TickOutcome::Throttled;
        }
        self.render();
        TickOutcome::Rendered
    }

    /// One unconditional mask/noise/compose pass.
    fn render(&mut self) {
        self.mask.refresh(
            &mut self.buffers.mask,
            self.probability,
            self.stable_mask,
            self.source.as_mut(),
        );
        refresh_noise(&mut self.buffers.noise, self.source.as_mut());
        compose::compose(&mut self.buffers.frame, &self.buffers.mask, &self.buffers.noise);
    }

    /// Human-readable entropy readout. Fair two-valued noise carries exactly
    /// 1 bit per replaced pixel, so the injected rate is `q` bits/pixel.
    pub fn readout(&self) -> String {
        let q = self.probability;
        format!(
            "Injected noise: q × H(N) = {:.3} bits/pixel (fair B/W, H(N)=1) • Noise probability: {}%",
            q,
            (q * 100.0).round() as u32
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::rng::FallbackSource;

    fn controller() -> OverlayController {
        let mut c = OverlayController::new(Box::new(FallbackSource::seeded(11)));
        // 115.2 CSS pixels square at dpr 1.25 is a 144x144 device-pixel grid
        c.resize(115.2, 115.2, 1.25);
        c
    }

    #[test]
    fn resize_tracks_the_exact_css_triple() {
        let mut c = controller();
        assert_eq!(c.extent(), SurfaceExtent { width: 144, height: 144 });
        assert!(!c.resize(115.2, 115.2, 1.25), "repeat measurement is a no-op");
        assert!(c.resize(115.2, 115.2, 2.0), "dpr change alone must apply");
        assert_eq!(c.extent(), SurfaceExtent { width: 230, height: 230 });
    }

    #[test]
    fn out_of_range_probabilities_are_clamped() {
        let mut c = controller();
        c.set_probability(1.7);
        assert_eq!(c.probability(), 1.0);
        c.set_probability(-0.3);
        assert_eq!(c.probability(), 0.0);
        c.set_probability(f64::NAN);
        assert_eq!(c.probability(), 0.0);
    }

    #[test]
    fn idle_tick_clears_the_frame_and_skips_compute() {
        let mut c = controller();
        c.set_probability(1.0);
        assert_eq!(c.tick(0.0), TickOutcome::Rendered);
        assert!(c.frame().iter().any(|&b| b != 0));

        c.set_probability(0.0);
        assert_eq!(c.tick(100.0), TickOutcome::Idle);
        assert!(c.frame().iter().all(|&b| b == 0));
        assert_eq!(c.mask_rebuilds(), 1, "idle ticks must not touch the mask");

        // back to rendering as soon as q is nonzero again
        c.set_probability(0.5);
        assert_eq!(c.tick(200.0), TickOutcome::Rendered);
    }

    #[test]
    fn ticks_are_gated_to_the_frame_interval() {
        let mut c = controller();
        c.set_probability(0.5);
        assert_eq!(c.tick(0.0), TickOutcome::Rendered);
        assert_eq!(c.tick(16.7), TickOutcome::Throttled);
        assert_eq!(c.tick(33.3), TickOutcome::Throttled);
        assert_eq!(c.tick(50.0), TickOutcome::Rendered);
    }

    #[test]
    fn stable_mask_holds_positions_while_values_twinkle() {
        let mut c = controller();
        c.set_probability(0.5);
        c.set_stable_mask(true);

        assert_eq!(c.tick(0.0), TickOutcome::Rendered);
        let first_mask = c.buffers.mask.clone();
        let first_noise = c.buffers.noise.clone();

        assert_eq!(c.tick(100.0), TickOutcome::Rendered);
        assert_eq!(c.buffers.mask, first_mask);
        assert_ne!(c.buffers.noise, first_noise);
        assert_eq!(c.mask_rebuilds(), 1);
    }

    #[test]
    fn unstable_mask_moves_between_frames() {
        let mut c = controller();
        c.set_probability(0.5);

        assert_eq!(c.tick(0.0), TickOutcome::Rendered);
        let first_mask = c.buffers.mask.clone();
        assert_eq!(c.tick(100.0), TickOutcome::Rendered);
        assert_ne!(c.buffers.mask, first_mask);
        assert_eq!(c.mask_rebuilds(), 2);
    }

    #[test]
    fn probability_change_rebuilds_a_stable_mask_on_the_next_tick() {
        let mut c = controller();
        c.set_probability(0.5);
        c.set_stable_mask(true);
        c.tick(0.0);
        assert_eq!(c.mask_rebuilds(), 1);

        c.set_probability(0.25);
        c.tick(100.0);
        assert_eq!(c.mask_rebuilds(), 2);
    }

    #[test]
    fn resize_rebuilds_a_stable_mask_on_the_next_tick() {
        let mut c = controller();
        c.set_probability(0.5);
        c.set_stable_mask(true);
        c.tick(0.0);
        assert_eq!(c.mask_rebuilds(), 1);

        c.resize(200.0, 100.0, 1.0);
        c.tick(100.0);
        assert_eq!(c.mask_rebuilds(), 2);
        assert_eq!(c.frame().len(), 200 * 100 * 4);
    }

    #[test]
    fn composed_alpha_is_exact() {
        let mut c = controller();
        c.set_probability(0.5);
        c.tick(0.0);
        for pixel in c.frame().chunks_exact(4) {
            assert!(pixel[3] == 0 || pixel[3] == u8::MAX);
        }
    }

    #[test]
    fn readout_formats_exactly() {
        let mut c = controller();
        c.set_probability(0.42);
        assert_eq!(
            c.readout(),
            "Injected noise: q × H(N) = 0.420 bits/pixel (fair B/W, H(N)=1) • Noise probability: 42%"
        );

        c.set_probability(0.0);
        assert_eq!(
            c.readout(),
            "Injected noise: q × H(N) = 0.000 bits/pixel (fair B/W, H(N)=1) • Noise probability: 0%"
        );

        c.set_probability(1.0);
        assert_eq!(
            c.readout(),
            "Injected noise: q × H(N) = 1.000 bits/pixel (fair B/W, H(N)=1) • Noise probability: 100%"
        );
    }
}
