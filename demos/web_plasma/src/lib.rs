// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web demo: a software plasma drawn into a pixelcanvas surface.
//!
//! Every accepted frame advances the plasma by one step and copies the whole
//! surface to a `<canvas>`. Pausing makes the render step report "unchanged",
//! so the loop keeps ticking without copying.
//!
//! Build with: `wasm-pack build --target web demos/web_plasma`
//! Then serve `demos/web_plasma/` and open `index.html`.

#![no_std]
#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "this crate only runs in the browser")
)]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;

use pixelcanvas_backend_web::{CanvasLoop, WebError, create_presenter, init_console_log};
use pixelcanvas_core::{RenderStep, Rgba8, Surface};
use wasm_bindgen::prelude::*;

const DEFAULT_WIDTH: u32 = 320;
const DEFAULT_HEIGHT: u32 = 200;
const DEFAULT_FPS: f64 = 30.0;

/// Triangle wave with period 512 and range `0..=255`.
fn tri(x: u32) -> u8 {
    let v = x % 512;
    let folded = if v < 256 { v } else { 511 - v };
    u8::try_from(folded).unwrap_or(u8::MAX)
}

/// Draws plasma step `phase` into `surface`.
fn draw_plasma(surface: &mut Surface, phase: u32) {
    for y in 0..surface.height() {
        let Some(row) = surface.row_mut(y) else {
            continue;
        };
        for (x, px) in (0_u32..).zip(row) {
            *px = Rgba8::opaque(
                tri(x.wrapping_mul(3).wrapping_add(phase)),
                tri(y.wrapping_mul(2).wrapping_add(phase.wrapping_mul(2))),
                tri(x.wrapping_add(y).wrapping_add(phase.wrapping_mul(3))),
            );
        }
    }
}

/// A render step that advances the plasma unless `paused` is set.
fn plasma_step(paused: Rc<Cell<bool>>) -> RenderStep {
    let mut phase = 0_u32;
    Box::new(move |surface| {
        if paused.get() {
            return false;
        }
        draw_plasma(surface, phase);
        phase = phase.wrapping_add(1);
        true
    })
}

/// A plasma canvas appended to the document body.
#[wasm_bindgen]
#[derive(Debug)]
pub struct PlasmaDemo {
    canvas_loop: CanvasLoop,
    paused: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl PlasmaDemo {
    /// Creates an idle `width` × `height` plasma canvas.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(WebError::MissingDom("document"))?;
        Ok(Self {
            canvas_loop: create_presenter(&document, width, height)?,
            paused: Rc::new(Cell::new(false)),
        })
    }

    /// Starts animating at up to `max_fps` frames per second.
    pub fn start(&self, max_fps: f64) -> Result<(), JsValue> {
        let step = plasma_step(Rc::clone(&self.paused));
        Ok(self.canvas_loop.start(max_fps, Some(step))?)
    }

    /// Changes the FPS cap.
    #[wasm_bindgen(js_name = setFps)]
    pub fn set_fps(&self, max_fps: f64) -> Result<(), JsValue> {
        Ok(self.canvas_loop.set_fps(max_fps)?)
    }

    /// Stops animating.
    pub fn stop(&self) -> Result<(), JsValue> {
        Ok(self.canvas_loop.stop()?)
    }

    /// Freezes the plasma; the loop keeps running.
    pub fn pause(&self) {
        self.paused.set(true);
    }

    /// Unfreezes the plasma.
    pub fn resume(&self) {
        self.paused.set(false);
    }

    /// Number of frames copied to the canvas so far.
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.canvas_loop.stats().presented
    }
}

/// Module entry point: starts a default-sized plasma at 30 fps.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() -> Result<(), JsValue> {
    if let Err(err) = init_console_log(log::LevelFilter::Info) {
        log::warn!("console logging not installed: {err}");
    }

    let window = web_sys::window().ok_or(WebError::MissingDom("window"))?;
    let demo = PlasmaDemo::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)?;
    demo.canvas_loop.stop_on_unload(&window)?;
    demo.start(DEFAULT_FPS)?;
    log::info!("plasma running at up to {DEFAULT_FPS} fps");
    // The loop lives for the rest of the page.
    core::mem::forget(demo);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_wave_peaks_mid_period() {
        assert_eq!(tri(0), 0);
        assert_eq!(tri(255), 255);
        assert_eq!(tri(256), 255);
        assert_eq!(tri(511), 0);
        assert_eq!(tri(512), 0);
    }

    #[test]
    fn plasma_fills_every_pixel_opaque() {
        let mut surface = Surface::new(7, 5);
        draw_plasma(&mut surface, 40);
        assert!(surface.pixels().iter().all(|px| px.a == 255));
        assert_ne!(surface.pixel(0, 0), surface.pixel(6, 4));
    }

    #[test]
    fn paused_step_reports_unchanged() {
        let paused = Rc::new(Cell::new(false));
        let mut step = plasma_step(Rc::clone(&paused));
        let mut surface = Surface::new(4, 4);

        assert!(step(&mut surface));
        let drawn = surface.pixels().to_vec();
        paused.set(true);
        assert!(!step(&mut surface));
        assert_eq!(surface.pixels(), drawn.as_slice());
    }
}
