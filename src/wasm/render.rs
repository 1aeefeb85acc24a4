//! Canvas surface and animation loop.
//!
//! The composed frame is presented with `putImageData`, a replace-style
//! blit: every pixel of the surface is overwritten each present, so no
//! opacity from a prior frame can linger where the mask flipped from
//! "replace" to "keep."

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{window, CanvasRenderingContext2d, Element, HtmlCanvasElement, ImageData};

use super::error::OverlayError;
use crate::overlay::{rng, OverlayController, SurfaceExtent, TickOutcome};

/// The overlay's drawable surface: a full-viewport canvas layered above the
/// page content.
pub struct OverlaySurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl OverlaySurface {
    pub fn attach(canvas: HtmlCanvasElement) -> Result<Self, OverlayError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|err| OverlayError::Context(format!("{err:?}")))?
            .ok_or(OverlayError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| OverlayError::ContextUnavailable)?;

        // Layered above the page but never intercepts pointer input.
        canvas
            .style()
            .set_property("pointer-events", "none")
            .map_err(|err| OverlayError::Context(format!("{err:?}")))?;

        Ok(Self { canvas, ctx })
    }

    /// Size the backing store in device pixels; the displayed size stays in
    /// CSS pixels.
    pub fn configure(&self, extent: SurfaceExtent, css_width: f64, css_height: f64) {
        self.canvas.set_width(extent.width);
        self.canvas.set_height(extent.height);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{css_width}px"));
        let _ = style.set_property("height", &format!("{css_height}px"));
    }

    /// Replace-style blit of one composed RGBA frame.
    pub fn present(&self, frame: &[u8], extent: SurfaceExtent) -> Result<(), JsValue> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame),
            extent.width,
            extent.height,
        )?;
        self.ctx.put_image_data(&image, 0.0, 0.0)
    }

    /// Make the whole surface fully transparent.
    pub fn clear(&self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }
}

/// State shared between the exported handle, the animation loop, and the
/// control-panel hooks.
pub(super) struct OverlayShared {
    pub(super) controller: RefCell<OverlayController>,
    pub(super) surface: OverlaySurface,
    pub(super) readout: RefCell<Option<Element>>,
}

impl OverlayShared {
    pub(super) fn set_probability(&self, q: f64) {
        self.controller.borrow_mut().set_probability(q);
        self.publish_readout();
    }

    pub(super) fn publish_readout(&self) {
        if let Some(target) = self.readout.borrow().as_ref() {
            target.set_text_content(Some(&self.controller.borrow().readout()));
        }
    }

    /// Measure the viewport and apply it. Reconfigures the canvas only when
    /// the controller reports a geometry change, so calling this every tick
    /// is cheap.
    pub(super) fn sync_size(&self) {
        let Some(win) = window() else { return };
        let css_w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let css_h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let dpr = win.device_pixel_ratio();

        let mut controller = self.controller.borrow_mut();
        if controller.resize(css_w, css_h, dpr) {
            self.surface.configure(controller.extent(), css_w, css_h);
        }
    }
}

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(tick: &TickClosure) -> Option<i32> {
    let tick = tick.borrow();
    let callback = tick.as_ref()?;
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

/// Browser handle for the overlay renderer.
///
/// Constructing one attaches the given canvas, starts the animation loop,
/// and listens for window resizes. Driving the probability to zero idles
/// the loop; `dispose` shuts it down completely.
#[wasm_bindgen]
pub struct EntropyOverlay {
    shared: Rc<OverlayShared>,
    raf_id: Rc<Cell<Option<i32>>>,
    tick: TickClosure,
    resize_hook: Option<Closure<dyn FnMut()>>,
}

impl EntropyOverlay {
    pub(super) fn shared(&self) -> Rc<OverlayShared> {
        self.shared.clone()
    }
}

#[wasm_bindgen]
impl EntropyOverlay {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<EntropyOverlay, JsValue> {
        let surface = OverlaySurface::attach(canvas)?;
        // The seed only matters when the secure backend is absent.
        let source = rng::acquire(js_sys::Date::now() as u64);

        let shared = Rc::new(OverlayShared {
            controller: RefCell::new(OverlayController::new(source)),
            surface,
            readout: RefCell::new(None),
        });
        shared.sync_size();

        // `tick` holds the animation-frame closure so it can re-arm itself;
        // keeping it in an `Option` lets the closure be created first and
        // referenced from within its own body.
        let tick: TickClosure = Rc::new(RefCell::new(None));
        let raf_id = Rc::new(Cell::new(None));
        {
            let shared = shared.clone();
            let tick_handle = tick.clone();
            let raf_id = raf_id.clone();
            *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
                shared.sync_size();
                let outcome = shared.controller.borrow_mut().tick(now_ms);
                match outcome {
                    TickOutcome::Idle => shared.surface.clear(),
                    TickOutcome::Throttled => {}
                    TickOutcome::Rendered => {
                        let controller = shared.controller.borrow();
                        if let Err(err) =
                            shared.surface.present(controller.frame(), controller.extent())
                        {
                            log::error!("overlay present failed: {err:?}");
                        }
                    }
                }
                raf_id.set(request_frame(&tick_handle));
            }) as Box<dyn FnMut(f64)>));
        }
        raf_id.set(request_frame(&tick));

        let resize_hook = {
            let shared = shared.clone();
            Closure::wrap(Box::new(move || shared.sync_size()) as Box<dyn FnMut()>)
        };
        window()
            .ok_or("no window")?
            .add_event_listener_with_callback("resize", resize_hook.as_ref().unchecked_ref())?;

        Ok(EntropyOverlay {
            shared,
            raf_id,
            tick,
            resize_hook: Some(resize_hook),
        })
    }

    /// Fraction of pixels to replace with noise, clamped into [0,1].
    pub fn set_probability(&self, q: f64) {
        self.shared.set_probability(q);
    }

    pub fn probability(&self) -> f64 {
        self.shared.controller.borrow().probability()
    }

    /// Hold replaced-pixel positions fixed across frames; their values
    /// still refresh every frame.
    pub fn set_stable_mask(&self, stable: bool) {
        self.shared.controller.borrow_mut().set_stable_mask(stable);
    }

    /// Human-readable entropy readout for the current probability.
    pub fn readout(&self) -> String {
        self.shared.controller.borrow().readout()
    }

    /// Element whose text content mirrors the readout whenever the
    /// probability changes.
    pub fn attach_readout(&self, element: Element) {
        *self.shared.readout.borrow_mut() = Some(element);
        self.shared.publish_readout();
    }

    /// Re-check viewport size and device pixel ratio now.
    pub fn notify_resize(&self) {
        self.shared.sync_size();
    }

    /// Stop the animation loop, detach the resize listener, and clear the
    /// surface. The handle is consumed; buffers are released with it.
    pub fn dispose(mut self) {
        if let Some(win) = window() {
            if let Some(id) = self.raf_id.take() {
                let _ = win.cancel_animation_frame(id);
            }
            if let Some(hook) = self.resize_hook.take() {
                let _ = win
                    .remove_event_listener_with_callback("resize", hook.as_ref().unchecked_ref());
            }
        }
        self.tick.borrow_mut().take();
        self.shared.surface.clear();
    }
}
