// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! The presenter reaches the host through two capabilities, each a trait so
//! that backends and test doubles can supply them:
//!
//! - **Refresh source**: [`RefreshSource`] registers a one-shot callback for
//!   the next display refresh and can cancel it (e.g.
//!   `requestAnimationFrame` / `cancelAnimationFrame`). Delivering the
//!   callback is the backend's job: it calls
//!   [`FramePresenter::tick`](crate::FramePresenter::tick) with the refresh
//!   timestamp.
//!
//! - **Presentation target**: [`PresentTarget`] owns a transfer buffer
//!   sized once at setup, copies frame bytes through it into its backing
//!   store, and marks the surface for redraw.
//!
//! # Crate boundaries
//!
//! `pixelcanvas_core` owns the pacing logic, the frame buffer and this
//! contract module. Backend crates depend on `pixelcanvas_core` and provide
//! platform glue. Application code depends on both and supplies the render
//! step.

use kurbo::Point;

/// Registers and cancels one-shot display-refresh callbacks.
///
/// Registration is fire-and-forget: the result arrives as the next call to
/// [`FramePresenter::tick`](crate::FramePresenter::tick). The presenter
/// keeps at most one registration pending.
pub trait RefreshSource {
    /// Identifies a pending registration for cancellation.
    type Handle: Copy + core::fmt::Debug;

    /// Asks for a callback before the next display refresh.
    fn request_refresh(&mut self) -> Self::Handle;

    /// Withdraws a pending registration. The callback must not fire after
    /// this returns.
    fn cancel_refresh(&mut self, handle: Self::Handle);

    /// Whether `handle` is registered and has neither fired nor been
    /// cancelled.
    ///
    /// A tick that arrives while its own registration is still outstanding
    /// did not come from the host's callback; the presenter cancels that
    /// registration before requesting the next one.
    fn is_outstanding(&self, handle: Self::Handle) -> bool;
}

/// A visible surface that accepts full-frame RGBA blits.
///
/// # Frame copy
///
/// The presenter performs each copy as:
///
/// ```rust,ignore
/// // Length checked against the frame buffer first.
/// assert_eq!(target.transfer_len(), surface.byte_len());
/// // bytes → transfer buffer → backing store
/// target.copy_bytes(surface.as_bytes());
/// // mark for redraw at the origin, full width/height
/// target.present_at(Point::ORIGIN);
/// ```
pub trait PresentTarget {
    /// Length in bytes of the transfer buffer allocated at setup.
    ///
    /// This must not change over the target's lifetime.
    fn transfer_len(&self) -> usize;

    /// Copies `src` into the transfer buffer and on into the surface's
    /// backing store.
    ///
    /// `src.len()` always equals [`transfer_len`](Self::transfer_len); the
    /// presenter checks this before calling.
    fn copy_bytes(&mut self, src: &[u8]);

    /// Marks the backing store for redraw with its top-left corner at
    /// `origin`, covering the surface's own width and height.
    fn present_at(&mut self, origin: Point);
}
