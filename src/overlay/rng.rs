//! Uniform random supply for the overlay.
//!
//! Two interchangeable backends behind one capability trait: the platform's
//! cryptographically strong generator (via `getrandom`, which is
//! `crypto.getRandomValues` on wasm) and a seeded general-purpose PRNG. The
//! backend is picked once at startup and never re-evaluated per frame.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// The platform generator bounds how much data one call may fill
/// (65536 bytes for `crypto.getRandomValues`), so larger buffers are
/// filled in chunks of this size.
const SECURE_CHUNK: usize = 64 * 1024;

/// Supplier of uniformly distributed bytes.
pub trait EntropySource {
    /// Fill `dest` entirely with uniform bytes.
    fn fill_bytes(&mut self, dest: &mut [u8]);
}

/// Cryptographically strong backend.
pub struct SecureSource;

impl EntropySource for SecureSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(SECURE_CHUNK) {
            // Availability was probed in `acquire`; a failure past that
            // point means the platform generator is gone mid-session.
            getrandom::getrandom(chunk).expect("secure random source failed");
        }
    }
}

/// General-purpose PRNG backend. Also the deterministic source for tests.
pub struct FallbackSource {
    rng: SmallRng,
}

impl FallbackSource {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl EntropySource for FallbackSource {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }
}

/// Select a backend once: probe the secure generator and fall back to the
/// seeded PRNG when it is absent. The fallback is silent; a weaker
/// generator still produces a usable picture, so no error reaches the
/// caller.
pub fn acquire(fallback_seed: u64) -> Box<dyn EntropySource> {
    let mut probe = [0u8; 1];
    if getrandom::getrandom(&mut probe).is_ok() {
        Box::new(SecureSource)
    } else {
        log::warn!("secure random source unavailable, using seeded PRNG");
        Box::new(FallbackSource::seeded(fallback_seed))
    }
}
