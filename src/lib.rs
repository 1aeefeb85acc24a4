//! Entropy-visualization overlay for the site: a full-viewport canvas layer
//! that stochastically replaces a fraction `q` of device pixels with fair
//! black/white noise, frame after frame, visualizing `q` bits of injected
//! entropy per pixel.
//!
//! The numeric core ([`overlay`]) is free of browser types and tested on
//! the host; the canvas/scheduling plumbing compiles only for wasm32.

pub mod overlay;

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    pub mod controls;
    pub mod error;
    pub mod render;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    /// Canvas id the auto-start looks for. Pages without it are left alone
    /// and can construct [`render::EntropyOverlay`] themselves.
    const CANVAS_ID: &str = "entropy-overlay";

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        let _ = console_log::init_with_level(log::Level::Info);

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let Some(element) = document.get_element_by_id(CANVAS_ID) else {
            return Ok(());
        };
        let canvas = element.dyn_into::<web_sys::HtmlCanvasElement>()?;

        let overlay = render::EntropyOverlay::new(canvas)?;
        controls::wire(&document, &overlay)?;
        log::info!("entropy overlay attached");

        // The auto-started overlay lives for the page lifetime.
        std::mem::forget(overlay);
        Ok(())
    }
}
