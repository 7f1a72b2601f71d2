// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for pixelcanvas.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`RafScheduler`]: `requestAnimationFrame` refresh source
//! - [`CanvasTarget`]: `<canvas>` 2D context fed through `putImageData`
//! - [`CanvasLoop`]: owns a [`WebPresenter`] and the rAF closure driving it
//! - [`init_console_log`]: `log` records to the browser console
//!
//! ```no_run
//! # fn demo() -> Result<(), pixelcanvas_backend_web::WebError> {
//! use pixelcanvas_backend_web::create_presenter;
//!
//! let document = web_sys::window().and_then(|w| w.document()).unwrap();
//! let canvas_loop = create_presenter(&document, 320, 200)?;
//! canvas_loop.start(30.0, None)?;
//! # Ok(()) }
//! ```

#![no_std]

extern crate alloc;

mod canvas;
mod canvas_loop;
mod console;
mod raf;

use alloc::format;
use alloc::string::String;

pub use canvas::CanvasTarget;
pub use canvas_loop::{CanvasLoop, WebPresenter};
pub use console::init_console_log;
pub use pixelcanvas_core::backend::{PresentTarget, RefreshSource};
pub use raf::RafScheduler;

use pixelcanvas_core::PresentError;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlCanvasElement, Window};

/// Errors from the web backend.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A required DOM object was not available.
    #[error("missing DOM object: {0}")]
    MissingDom(&'static str),
    /// A JS call threw.
    #[error("JavaScript error: {0}")]
    Js(String),
    /// The requested canvas does not fit a 32-bit byte length.
    #[error("canvas of {width}x{height} pixels is too large")]
    TooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The presenter rejected the call.
    #[error(transparent)]
    Present(#[from] PresentError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&format!("{err}")).into()
    }
}

/// Returns the current time from `performance.now()`, in milliseconds.
///
/// This is the same clock `requestAnimationFrame` timestamps are taken from.
#[must_use]
pub fn now() -> f64 {
    raf::performance_now()
}

/// Creates a `width` × `height` canvas in the document body and an idle
/// [`CanvasLoop`] presenting to it.
///
/// # Errors
///
/// See [`CanvasTarget::create`] and [`CanvasLoop::new`].
pub fn create_presenter(
    document: &Document,
    width: u32,
    height: u32,
) -> Result<CanvasLoop, WebError> {
    CanvasLoop::new(CanvasTarget::create(document, width, height)?)
}

/// Like [`create_presenter`], sized to the window's inner dimensions.
///
/// # Errors
///
/// See [`CanvasTarget::create_fullscreen`] and [`CanvasLoop::new`].
pub fn create_fullscreen_presenter(window: &Window) -> Result<CanvasLoop, WebError> {
    CanvasLoop::new(CanvasTarget::create_fullscreen(window)?)
}

/// Creates an idle [`CanvasLoop`] presenting to an existing canvas.
///
/// # Errors
///
/// See [`CanvasTarget::attach`] and [`CanvasLoop::new`].
pub fn attach_existing(
    canvas: HtmlCanvasElement,
    width: u32,
    height: u32,
) -> Result<CanvasLoop, WebError> {
    CanvasLoop::new(CanvasTarget::attach(canvas, width, height)?)
}
