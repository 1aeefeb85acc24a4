//! Per-pixel noise values.

use super::rng::EntropySource;

/// Refresh every pixel with a fair black/white draw, taken from the low bit
/// of a fresh random byte rather than a float comparison so no
/// range-reduction rounding can bias the coin.
///
/// Runs every render call regardless of mask stability; this is what keeps
/// replaced pixels twinkling even while their positions are held fixed.
pub fn refresh_noise(noise: &mut [u8], source: &mut dyn EntropySource) {
    source.fill_bytes(noise);
    for value in noise.iter_mut() {
        *value = if *value & 1 == 1 { u8::MAX } else { 0 };
    }
}
