//! Bernoulli replacement mask.
//!
//! One 32-bit uniform draw per pixel is compared against the integer
//! threshold `floor(q · 2^32)`. The integer comparison keeps the realized
//! frequency convergent to `q` without floating-point rounding bias and
//! makes the mask reproducible for a fixed draw sequence.

use super::rng::EntropySource;

pub struct MaskLayer {
    /// Probability the current mask was built with; `None` forces a rebuild.
    last_applied: Option<f64>,
    rebuilds: u64,
    /// Draw scratch, 4 bytes per pixel, reused across frames.
    draw: Vec<u8>,
}

impl MaskLayer {
    pub fn new() -> Self {
        Self {
            last_applied: None,
            rebuilds: 0,
            draw: Vec::new(),
        }
    }

    /// Forget the last-applied probability. Called after the buffers were
    /// reallocated so the next render rebuilds even under a stable mask.
    pub fn invalidate(&mut self) {
        self.last_applied = None;
    }

    /// Number of rebuilds performed so far. Increments only when the mask
    /// is actually regenerated.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Bring `mask` up to date for probability `q`.
    ///
    /// With `stable` set, the existing mask is kept as long as `q` matches
    /// the probability it was built with; otherwise every call rebuilds.
    pub fn refresh(
        &mut self,
        mask: &mut [bool],
        q: f64,
        stable: bool,
        source: &mut dyn EntropySource,
    ) {
        if stable && self.last_applied == Some(q) {
            return;
        }
        self.rebuild(mask, q, source);
    }

    fn rebuild(&mut self, mask: &mut [bool], q: f64, source: &mut dyn EntropySource) {
        // u64 arithmetic so q = 1 maps to 2^32 and replaces every pixel.
        let threshold = (q * 4_294_967_296.0) as u64;

        self.draw.resize(mask.len() * 4, 0);
        source.fill_bytes(&mut self.draw);

        for (m, bytes) in mask.iter_mut().zip(self.draw.chunks_exact(4)) {
            let draw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;
            *m = draw < threshold;
        }

        self.last_applied = Some(q);
        self.rebuilds += 1;
    }
}

impl Default for MaskLayer {
    fn default() -> Self {
        Self::new()
    }
}
