// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The browser-driven frame loop.
//!
//! [`CanvasLoop`] owns a [`WebPresenter`] and the single rAF closure that
//! drives it. The closure and the presenter's [`RafScheduler`] share a slot,
//! so every tick re-registers the same JS function.
//!
//! Dropping the loop stops the presenter (cancelling the outstanding
//! registration) and releases the closure.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;

use pixelcanvas_core::backend::{PresentTarget, RefreshSource};
use pixelcanvas_core::config::PacerConfig;
use pixelcanvas_core::timing::PacingStats;
use pixelcanvas_core::{FramePresenter, RenderStep};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::WebError;
use crate::canvas::CanvasTarget;
use crate::raf::{ClosureSlot, RafScheduler};

/// A [`FramePresenter`] presenting to a canvas on `requestAnimationFrame`.
pub type WebPresenter = FramePresenter<CanvasTarget, RafScheduler>;

type UnloadHook = (Window, Closure<dyn FnMut()>);

struct LoopInner {
    presenter: RefCell<WebPresenter>,
    closure: ClosureSlot,
    unload: RefCell<Option<UnloadHook>>,
}

/// Drives a [`WebPresenter`] from `requestAnimationFrame`.
pub struct CanvasLoop {
    inner: Rc<LoopInner>,
}

impl core::fmt::Debug for CanvasLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CanvasLoop")
            .field("presenter", &self.inner.presenter)
            .field("stop_on_unload", &self.inner.unload.borrow().is_some())
            .finish_non_exhaustive()
    }
}

impl CanvasLoop {
    /// Wraps `target` in a presenter whose surface matches the target's size.
    ///
    /// The loop is idle until [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Present`] if the target's transfer buffer does not
    /// match its dimensions.
    pub fn new(target: CanvasTarget) -> Result<Self, WebError> {
        let (width, height) = (target.width(), target.height());
        let slot: ClosureSlot = Rc::new(RefCell::new(None));
        let presenter =
            FramePresenter::new(target, RafScheduler::new(Rc::clone(&slot)), width, height)?;
        let inner = Rc::new(LoopInner {
            presenter: RefCell::new(presenter),
            closure: slot,
            unload: RefCell::new(None),
        });

        let tick_inner = Rc::clone(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            let Ok(mut presenter) = tick_inner.presenter.try_borrow_mut() else {
                log::warn!("frame callback fired while the presenter was borrowed");
                return;
            };
            presenter.refresh_mut().delivered();
            if let Err(err) = presenter.tick(timestamp_ms) {
                log::error!("frame loop stopped: {err}");
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Ok(Self { inner })
    }

    /// Starts the loop at `max_fps`.
    ///
    /// `render` is called once per accepted frame and returns whether the
    /// surface changed. Without a render step, every accepted frame is
    /// copied.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Present`] for a non-positive FPS or if the loop
    /// is already running.
    pub fn start(&self, max_fps: f64, render: Option<RenderStep>) -> Result<(), WebError> {
        self.inner.presenter.borrow_mut().start(max_fps, render)?;
        Ok(())
    }

    /// [`start`](Self::start) with the frame-rate cap taken from a
    /// [`PacerConfig`] preset.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_with(
        &self,
        config: PacerConfig,
        render: Option<RenderStep>,
    ) -> Result<(), WebError> {
        self.inner.presenter.borrow_mut().start_with(config, render)?;
        Ok(())
    }

    /// Changes the FPS cap; takes effect on the next refresh.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Present`] for a non-positive FPS; the previous
    /// cap stays in effect.
    pub fn set_fps(&self, max_fps: f64) -> Result<(), WebError> {
        self.inner.presenter.borrow_mut().set_fps(max_fps)?;
        Ok(())
    }

    /// Stops the loop and cancels the outstanding registration.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Present`] if the loop is not running.
    pub fn stop(&self) -> Result<(), WebError> {
        self.inner.presenter.borrow_mut().stop()?;
        Ok(())
    }

    /// Copies the current surface to the canvas immediately, ignoring the
    /// FPS gate.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Present`] if the transfer buffer no longer matches.
    pub fn present_now(&self) -> Result<(), WebError> {
        self.inner.presenter.borrow_mut().present_now()?;
        Ok(())
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.inner.presenter.borrow().width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.inner.presenter.borrow().height()
    }

    /// Whether the loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.presenter.borrow().is_running()
    }

    /// Counters over every refresh processed so far.
    #[must_use]
    pub fn stats(&self) -> PacingStats {
        self.inner.presenter.borrow().stats()
    }

    /// Runs `f` with exclusive access to the presenter.
    ///
    /// Use this to draw into the surface outside the render step. Ticking
    /// the presenter from `f` replaces the outstanding frame request rather
    /// than adding a second one. Calling back into the loop from `f` panics.
    pub fn with_presenter<Out>(&self, f: impl FnOnce(&mut WebPresenter) -> Out) -> Out {
        f(&mut self.inner.presenter.borrow_mut())
    }

    /// Stops the loop when the page unloads (`beforeunload`).
    ///
    /// Calling this again replaces the previous hook.
    ///
    /// # Errors
    ///
    /// Returns [`WebError::Js`] if the listener cannot be added.
    pub fn stop_on_unload(&self, window: &Window) -> Result<(), WebError> {
        let unload_inner = Rc::clone(&self.inner);
        let hook = Closure::wrap(Box::new(move || {
            if let Ok(mut presenter) = unload_inner.presenter.try_borrow_mut() {
                stop_if_running(&mut presenter, "unload");
            }
        }) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("beforeunload", hook.as_ref().unchecked_ref())?;
        if let Some(previous) = self.inner.unload.replace(Some((window.clone(), hook))) {
            remove_unload_hook(previous);
        }
        Ok(())
    }
}

/// Stops `presenter` if it is running. Returns whether it was stopped.
fn stop_if_running<T: PresentTarget, R: RefreshSource>(
    presenter: &mut FramePresenter<T, R>,
    reason: &str,
) -> bool {
    if !presenter.is_running() {
        return false;
    }
    match presenter.stop() {
        Ok(()) => {
            log::debug!("frame loop stopped on {reason}");
            true
        }
        Err(err) => {
            log::warn!("failed to stop frame loop on {reason}: {err}");
            false
        }
    }
}

fn remove_unload_hook((window, hook): UnloadHook) {
    if let Err(err) =
        window.remove_event_listener_with_callback("beforeunload", hook.as_ref().unchecked_ref())
    {
        log::warn!("failed to remove unload listener: {err:?}");
    }
}

impl Drop for CanvasLoop {
    fn drop(&mut self) {
        if let Ok(mut presenter) = self.inner.presenter.try_borrow_mut() {
            stop_if_running(&mut presenter, "drop");
        }
        if let Some(hook) = self.inner.unload.borrow_mut().take() {
            remove_unload_hook(hook);
        }
        // Releases the closure, and with it the closure's reference to
        // `inner`.
        self.inner.closure.borrow_mut().take();
    }
}

#[cfg(test)]
mod tests {
    use pixelcanvas_harness::headless;

    use super::*;

    #[test]
    fn stop_if_running_stops_once() {
        let mut p = headless(2, 2).unwrap();
        assert!(!stop_if_running(&mut p, "drop"), "idle presenter");
        assert!(p.refresh().cancelled().is_empty(), "nothing to cancel");

        p.start(30.0, None).unwrap();
        assert!(stop_if_running(&mut p, "unload"), "running presenter");
        assert!(!p.is_running(), "stopped");
        assert_eq!(p.refresh().cancelled().len(), 1);

        assert!(!stop_if_running(&mut p, "drop"), "already stopped");
        assert_eq!(p.refresh().cancelled().len(), 1);
    }
}
