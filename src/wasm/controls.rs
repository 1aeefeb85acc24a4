//! Wiring of the page's control panel to the overlay.
//!
//! The panel is an external collaborator: a percent slider, a stable-mask
//! checkbox, and a readout element, each looked up by a well-known id.
//! Pages that lack a control simply don't get that hook. Panel listeners
//! live for the page lifetime; `EntropyOverlay::dispose` does not unhook
//! them.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlInputElement};

use super::render::EntropyOverlay;

const SLIDER_ID: &str = "noise-probability";
const STABLE_ID: &str = "stable-mask";
const READOUT_ID: &str = "noise-readout";

pub fn wire(document: &Document, overlay: &EntropyOverlay) -> Result<(), JsValue> {
    if let Some(target) = document.get_element_by_id(READOUT_ID) {
        overlay.attach_readout(target);
    }

    if let Some(slider) = document.get_element_by_id(SLIDER_ID) {
        let slider: HtmlInputElement = slider.dyn_into()?;
        let shared = overlay.shared();
        let input = slider.clone();
        let hook = Closure::wrap(Box::new(move || {
            let percent = input.value().parse::<f64>().unwrap_or(0.0);
            shared.set_probability(percent / 100.0);
        }) as Box<dyn FnMut()>);
        slider.add_event_listener_with_callback("input", hook.as_ref().unchecked_ref())?;
        hook.forget();

        // Apply the slider's initial position.
        let percent = slider.value().parse::<f64>().unwrap_or(0.0);
        overlay.set_probability(percent / 100.0);
    }

    if let Some(toggle) = document.get_element_by_id(STABLE_ID) {
        let toggle: HtmlInputElement = toggle.dyn_into()?;
        let shared = overlay.shared();
        let input = toggle.clone();
        let hook = Closure::wrap(Box::new(move || {
            shared.controller.borrow_mut().set_stable_mask(input.checked());
        }) as Box<dyn FnMut()>);
        toggle.add_event_listener_with_callback("change", hook.as_ref().unchecked_ref())?;
        hook.forget();

        overlay.set_stable_mask(toggle.checked());
    }

    Ok(())
}
