// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-refresh timing types.
//!
//! - [`FrameTick`]: a refresh opportunity as seen by the presenter
//! - [`TickOutcome`]: what the presenter did with it
//! - [`PacingStats`]: running counters over all ticks

/// A display refresh delivered to the presenter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Host timestamp in milliseconds (e.g. the `requestAnimationFrame`
    /// `DOMHighResTimeStamp`). Monotonic.
    pub timestamp_ms: f64,
    /// Monotonically increasing refresh counter, counting throttled
    /// refreshes too.
    pub frame_index: u64,
}

/// What a single call to
/// [`FramePresenter::tick`](crate::FramePresenter::tick) did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// The presenter was stopped; nothing happened and nothing was re-armed.
    Stopped,
    /// The refresh came too soon after the last frame and was skipped.
    Throttled,
    /// The gate opened but the render step reported no change, so nothing
    /// was copied.
    Unchanged,
    /// The frame buffer was copied to the presentation surface.
    Presented,
}

impl TickOutcome {
    /// Returns `true` if a copy to the presentation surface happened.
    #[inline]
    #[must_use]
    pub const fn presented(self) -> bool {
        matches!(self, Self::Presented)
    }
}

/// Running counters over every tick a presenter has processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PacingStats {
    /// Ticks processed while running.
    pub refreshes: u64,
    /// Ticks skipped by the FPS gate.
    pub throttled: u64,
    /// Render-step invocations.
    pub rendered: u64,
    /// Gate-passing ticks whose render step reported no change.
    pub unchanged: u64,
    /// Copies to the presentation surface, including
    /// [`present_now`](crate::FramePresenter::present_now).
    pub presented: u64,
}

impl PacingStats {
    /// Folds one tick outcome into the counters.
    pub fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Stopped => return,
            TickOutcome::Throttled => self.throttled += 1,
            TickOutcome::Unchanged => self.unchanged += 1,
            TickOutcome::Presented => self.presented += 1,
        }
        self.refreshes += 1;
    }
}
