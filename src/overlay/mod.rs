//! Portable overlay core: buffer lifecycle, Bernoulli mask, noise values,
//! alpha-exact composition, and frame pacing. No browser types; everything
//! here compiles and tests on the host.

pub mod buffers;
pub mod compose;
pub mod controller;
pub mod mask;
pub mod noise;
pub mod pacer;
pub mod rng;

pub use buffers::SurfaceExtent;
pub use controller::{OverlayController, TickOutcome};
