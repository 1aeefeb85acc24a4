//! Typed errors at the browser seam.
//!
//! RNG degradation is deliberately not represented here: the secure
//! backend falling back to the PRNG is an accepted weakening, not a
//! failure. A missing 2D context is a failure, since no correct visual
//! behavior is possible without a surface.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("2d canvas context unavailable")]
    ContextUnavailable,

    #[error("canvas context error: {0}")]
    Context(String),
}

impl From<OverlayError> for JsValue {
    fn from(err: OverlayError) -> JsValue {
        JsValue::from_str(&err.to_string())
    }
}
