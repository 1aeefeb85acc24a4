#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use entropy_wasm::wasm::render::EntropyOverlay;

wasm_bindgen_test_configure!(run_in_browser);

fn fresh_canvas() -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: web_sys::HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

#[wasm_bindgen_test]
fn overlay_sizes_canvas_and_blocks_pointer_input() {
    let canvas = fresh_canvas();
    let overlay = EntropyOverlay::new(canvas.clone()).expect("attach overlay");

    // Backing store is sized in device pixels, at least 1x1.
    assert!(canvas.width() >= 1);
    assert!(canvas.height() >= 1);
    assert_eq!(
        canvas.style().get_property_value("pointer-events").unwrap(),
        "none"
    );

    overlay.dispose();
}

#[wasm_bindgen_test]
fn readout_reflects_probability_changes() {
    let canvas = fresh_canvas();
    let overlay = EntropyOverlay::new(canvas).expect("attach overlay");

    overlay.set_probability(0.42);
    assert_eq!(
        overlay.readout(),
        "Injected noise: q × H(N) = 0.420 bits/pixel (fair B/W, H(N)=1) • Noise probability: 42%"
    );

    // Out-of-range input is clamped before use.
    overlay.set_probability(7.0);
    assert_eq!(overlay.probability(), 1.0);

    overlay.dispose();
}
