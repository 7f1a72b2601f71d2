// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `<canvas>` presentation target.
//!
//! [`CanvasTarget`] allocates its transfer buffer once: a
//! `Uint8ClampedArray` of `width * height * 4` bytes that also backs an
//! `ImageData` of the same size. A frame copy is then
//!
//! ```text
//!   wasm memory ──copy_from──► Uint8ClampedArray (= ImageData.data)
//!               ──putImageData(0, 0)──► canvas backing store
//! ```
//!
//! with no JS allocation per frame.

use js_sys::Uint8ClampedArray;
use kurbo::Point;
use pixelcanvas_core::backend::PresentTarget;
use wasm_bindgen::JsCast as _;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData, Window};

use crate::WebError;

/// A 2D canvas that accepts full-frame RGBA blits.
pub struct CanvasTarget {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    transfer: Uint8ClampedArray,
    image_data: ImageData,
    width: u32,
    height: u32,
}

impl core::fmt::Debug for CanvasTarget {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasTarget")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("transfer_len", &self.transfer.length())
            .finish_non_exhaustive()
    }
}

impl CanvasTarget {
    /// Creates a `width` × `height` `<canvas>` and appends it to the
    /// document body.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MissingDom`] if the document has no body, or
    /// [`WebError::Js`] if a DOM call throws.
    pub fn create(document: &Document, width: u32, height: u32) -> Result<Self, WebError> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.unchecked_into();
        canvas.set_width(width);
        canvas.set_height(height);
        let body = document.body().ok_or(WebError::MissingDom("document.body"))?;
        body.append_child(&canvas)?;
        Self::attach(canvas, width, height)
    }

    /// Creates a canvas filling the window's inner size and appends it to the
    /// document body.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    pub fn create_fullscreen(window: &Window) -> Result<Self, WebError> {
        let document = window
            .document()
            .ok_or(WebError::MissingDom("window.document"))?;
        let width = css_px_to_dimension(window.inner_width()?.as_f64());
        let height = css_px_to_dimension(window.inner_height()?.as_f64());
        Self::create(&document, width, height)
    }

    /// Binds to an existing canvas element.
    ///
    /// `width` and `height` size the transfer buffer and the drawn region;
    /// the canvas's own attributes are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::MissingDom`] if the canvas has no 2D context, or
    /// [`WebError::Js`] if creating the `ImageData` throws (e.g. a zero
    /// dimension).
    pub fn attach(canvas: HtmlCanvasElement, width: u32, height: u32) -> Result<Self, WebError> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or(WebError::MissingDom("2d context"))?
            .unchecked_into();
        let len = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(4))
            .ok_or(WebError::TooLarge { width, height })?;
        let transfer = Uint8ClampedArray::new_with_length(len);
        // Note: width, then height.
        let image_data = ImageData::new_with_js_u8_clamped_array_and_sh(&transfer, width, height)?;
        log::debug!("canvas target ready: {width}x{height}, {len} byte transfer buffer");
        Ok(Self {
            canvas,
            ctx,
            transfer,
            image_data,
            width,
            height,
        })
    }

    /// The canvas element.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// The canvas's 2D context.
    #[must_use]
    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    /// Width of the drawn region in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the drawn region in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}

impl PresentTarget for CanvasTarget {
    fn transfer_len(&self) -> usize {
        self.transfer.length() as usize
    }

    fn copy_bytes(&mut self, src: &[u8]) {
        self.transfer.copy_from(src);
    }

    fn present_at(&mut self, origin: Point) {
        if let Err(err) = self.ctx.put_image_data(&self.image_data, origin.x, origin.y) {
            log::error!("putImageData failed: {err:?}");
        }
    }
}

/// Converts a CSS pixel length (as returned by `innerWidth`) to a canvas
/// dimension, falling back to 1 for missing or non-positive values.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "clamped to [1, u32::MAX] before the cast; flooring is intended"
)]
pub(crate) fn css_px_to_dimension(px: Option<f64>) -> u32 {
    match px {
        Some(v) if v >= 1.0 => v.min(f64::from(u32::MAX)) as u32,
        _ => 1,
    }
}
