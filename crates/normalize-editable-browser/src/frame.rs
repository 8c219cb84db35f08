//! `requestAnimationFrame` scheduling.

use std::cell::RefCell;
use std::rc::Rc;

use normalize_editable_core::FrameScheduler;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Runs frame callbacks on the window's next animation frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window for requestAnimationFrame, running frame now");
            callback();
            return;
        };
        request_or_run(
            |f| window.request_animation_frame(f.unchecked_ref()),
            callback,
        );
    }
}

/// Hand `callback` to `request` as a JS function. When `request` throws the
/// callback runs immediately, so pending frame work is never stranded.
pub fn request_or_run(
    request: impl FnOnce(&JsValue) -> Result<i32, JsValue>,
    callback: Box<dyn FnOnce()>,
) {
    let callback = Rc::new(RefCell::new(Some(callback)));
    let queued = callback.clone();
    let closure = Closure::once(move || {
        if let Some(callback) = queued.borrow_mut().take() {
            callback();
        }
    });

    if let Err(e) = request(closure.as_ref()) {
        tracing::warn!("requestAnimationFrame failed, running frame now: {:?}", e);
        let pending = callback.borrow_mut().take();
        if let Some(callback) = pending {
            callback();
        }
        return;
    }
    closure.forget();
}
