// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` refresh source.
//!
//! [`RafScheduler`] implements [`RefreshSource`] on top of the browser's
//! `requestAnimationFrame` / `cancelAnimationFrame`. It does not own the JS
//! callback: [`CanvasLoop`](crate::CanvasLoop) installs the closure in a
//! shared slot and the scheduler re-registers that same closure on every
//! request, so exactly one `Closure` lives for the lifetime of the loop.
//!
//! Each callback receives a [`DOMHighResTimeStamp`][mdn] in milliseconds,
//! which is passed straight to
//! [`FramePresenter::tick`](pixelcanvas_core::FramePresenter::tick).
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::rc::Rc;
use core::cell::RefCell;

use pixelcanvas_core::backend::RefreshSource;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Global bindings, so no Window/Performance lookup happens per frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

pub(crate) type RafClosure = Closure<dyn FnMut(f64)>;

/// The slot holding the loop's rAF closure, shared with
/// [`CanvasLoop`](crate::CanvasLoop).
pub(crate) type ClosureSlot = Rc<RefCell<Option<RafClosure>>>;

/// A [`RefreshSource`] backed by `requestAnimationFrame`.
///
/// Handles are the request IDs returned by `requestAnimationFrame`.
pub struct RafScheduler {
    closure: ClosureSlot,
    outstanding: Option<i32>,
}

impl RafScheduler {
    pub(crate) fn new(closure: ClosureSlot) -> Self {
        Self {
            closure,
            outstanding: None,
        }
    }

    /// Records that the outstanding request's callback is running.
    pub(crate) fn delivered(&mut self) {
        self.outstanding = None;
    }
}

impl RefreshSource for RafScheduler {
    type Handle = i32;

    fn request_refresh(&mut self) -> i32 {
        match &*self.closure.borrow() {
            Some(closure) => {
                let id = request_animation_frame(closure.as_ref().unchecked_ref());
                self.outstanding = Some(id);
                id
            }
            None => {
                // Only reachable once the owning loop has been dropped.
                // Request IDs are non-zero, so cancelling 0 is a no-op.
                log::warn!("refresh requested with no frame callback installed");
                0
            }
        }
    }

    fn cancel_refresh(&mut self, handle: i32) {
        cancel_animation_frame(handle);
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
    }

    fn is_outstanding(&self, handle: i32) -> bool {
        self.outstanding == Some(handle)
    }
}

impl core::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("installed", &self.closure.borrow().is_some())
            .field("outstanding", &self.outstanding)
            .finish_non_exhaustive()
    }
}
