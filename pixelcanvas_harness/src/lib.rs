// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic headless driver and pacing metrics for presenters.
//!
//! Drives a [`FramePresenter`] without a browser: [`ScriptedRefresh`] stands
//! in for `requestAnimationFrame`, [`RecordingTarget`] for the canvas, and
//! [`drive`] feeds a list of refresh timestamps through the loop the way a
//! host would. [`PacingReport`] summarizes the run.

#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::Point;
use pixelcanvas_core::backend::{PresentTarget, RefreshSource};
use pixelcanvas_core::surface::BYTES_PER_PIXEL;
use pixelcanvas_core::timing::TickOutcome;
use pixelcanvas_core::{FramePresenter, PresentError};

/// Handle issued by [`ScriptedRefresh`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefreshId(pub u32);

/// A [`RefreshSource`] whose callbacks are delivered by hand.
///
/// Keeps the single outstanding registration and counts anything that
/// breaks the one-pending-at-a-time rule instead of panicking, so tests can
/// assert on it.
#[derive(Debug, Default)]
pub struct ScriptedRefresh {
    next_id: u32,
    pending: Option<RefreshId>,
    requests: u64,
    cancelled: Vec<RefreshId>,
    overlapping_requests: u64,
    stale_cancels: u64,
}

impl ScriptedRefresh {
    /// Creates a source with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers the pending registration, returning its handle, or `None`
    /// if nothing was registered.
    pub fn fire(&mut self) -> Option<RefreshId> {
        self.pending.take()
    }

    /// The registration waiting to fire, if any.
    #[must_use]
    pub fn pending(&self) -> Option<RefreshId> {
        self.pending
    }

    /// Total registrations requested.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Handles cancelled so far, in order.
    #[must_use]
    pub fn cancelled(&self) -> &[RefreshId] {
        &self.cancelled
    }

    /// Requests made while another registration was still pending.
    #[must_use]
    pub fn overlapping_requests(&self) -> u64 {
        self.overlapping_requests
    }

    /// Cancels of a handle that was not the pending one.
    #[must_use]
    pub fn stale_cancels(&self) -> u64 {
        self.stale_cancels
    }
}

impl RefreshSource for ScriptedRefresh {
    type Handle = RefreshId;

    fn request_refresh(&mut self) -> RefreshId {
        if self.pending.is_some() {
            self.overlapping_requests += 1;
        }
        self.next_id += 1;
        self.requests += 1;
        let id = RefreshId(self.next_id);
        self.pending = Some(id);
        id
    }

    fn cancel_refresh(&mut self, handle: RefreshId) {
        if self.pending == Some(handle) {
            self.pending = None;
        } else {
            self.stale_cancels += 1;
        }
        self.cancelled.push(handle);
    }

    fn is_outstanding(&self, handle: RefreshId) -> bool {
        self.pending == Some(handle)
    }
}

/// An in-memory [`PresentTarget`] that records every copy and present.
#[derive(Clone, Debug)]
pub struct RecordingTarget {
    transfer: Vec<u8>,
    backing: Vec<u8>,
    copies: u64,
    presents: Vec<Point>,
}

impl RecordingTarget {
    /// Creates a target with a transfer buffer sized for `width` × `height`
    /// RGBA pixels.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_transfer_len(width as usize * height as usize * BYTES_PER_PIXEL)
    }

    /// Creates a target with an explicitly sized transfer buffer.
    #[must_use]
    pub fn with_transfer_len(len: usize) -> Self {
        Self {
            transfer: vec![0; len],
            backing: vec![0; len],
            copies: 0,
            presents: Vec::new(),
        }
    }

    /// The backing store as of the last copy.
    #[must_use]
    pub fn backing(&self) -> &[u8] {
        &self.backing
    }

    /// Number of copies performed.
    #[must_use]
    pub fn copies(&self) -> u64 {
        self.copies
    }

    /// Origins passed to every present, in order.
    #[must_use]
    pub fn presents(&self) -> &[Point] {
        &self.presents
    }
}

impl PresentTarget for RecordingTarget {
    fn transfer_len(&self) -> usize {
        self.transfer.len()
    }

    fn copy_bytes(&mut self, src: &[u8]) {
        self.transfer.copy_from_slice(src);
        self.backing.copy_from_slice(&self.transfer);
        self.copies += 1;
    }

    fn present_at(&mut self, origin: Point) {
        self.presents.push(origin);
    }
}

/// A presenter wired to the headless doubles.
pub type HeadlessPresenter = FramePresenter<RecordingTarget, ScriptedRefresh>;

/// Creates a stopped [`HeadlessPresenter`] with a `width` × `height` surface.
///
/// # Errors
///
/// Never fails in practice; the transfer buffer is sized to match.
pub fn headless(width: u32, height: u32) -> Result<HeadlessPresenter, PresentError> {
    FramePresenter::new(
        RecordingTarget::new(width, height),
        ScriptedRefresh::new(),
        width,
        height,
    )
}

/// Fires one refresh callback at each timestamp, in order.
///
/// Each step delivers whatever registration is pending and then calls
/// [`FramePresenter::tick`], so a callback arriving after `stop` is modelled
/// too: it finds nothing pending and the presenter reports
/// [`TickOutcome::Stopped`].
///
/// # Errors
///
/// Stops at the first tick that fails and returns its error.
pub fn drive<T: PresentTarget>(
    presenter: &mut FramePresenter<T, ScriptedRefresh>,
    timestamps: &[f64],
) -> Result<Vec<TickOutcome>, PresentError> {
    let mut outcomes = Vec::with_capacity(timestamps.len());
    for &t in timestamps {
        presenter.refresh_mut().fire();
        outcomes.push(presenter.tick(t)?);
    }
    Ok(outcomes)
}

/// Refresh timestamps for a display running at `hz`, starting at zero.
#[must_use]
pub fn display_refreshes(hz: f64, count: usize) -> Vec<f64> {
    let period = 1000.0 / hz;
    (0..count).map(|i| i as f64 * period).collect()
}

/// Summary of a [`drive`] run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PacingReport {
    /// Timestamps at which a frame was presented.
    pub presented_at: Vec<f64>,
    /// Refreshes skipped by the FPS gate.
    pub throttled: u64,
    /// Gate-passing refreshes whose render step reported no change.
    pub unchanged: u64,
    /// Callbacks that arrived while stopped.
    pub stopped: u64,
}

impl PacingReport {
    /// Builds a report from matching timestamp and outcome lists.
    ///
    /// Extra entries in the longer list are ignored.
    #[must_use]
    pub fn from_run(timestamps: &[f64], outcomes: &[TickOutcome]) -> Self {
        let mut report = Self::default();
        for (&t, &outcome) in timestamps.iter().zip(outcomes) {
            match outcome {
                TickOutcome::Presented => report.presented_at.push(t),
                TickOutcome::Throttled => report.throttled += 1,
                TickOutcome::Unchanged => report.unchanged += 1,
                TickOutcome::Stopped => report.stopped += 1,
            }
        }
        report
    }

    /// Frames per second between the first and last presented frame, or
    /// `None` with fewer than two presents.
    #[must_use]
    pub fn effective_fps(&self) -> Option<f64> {
        let (&first, &last) = (self.presented_at.first()?, self.presented_at.last()?);
        let span = last - first;
        if self.presented_at.len() < 2 || span <= 0.0 {
            return None;
        }
        Some((self.presented_at.len() - 1) as f64 * 1000.0 / span)
    }
}

/// Renders outcomes as one character each: `#` presented, `.` throttled,
/// `o` unchanged, `_` stopped.
#[must_use]
pub fn timeline_ascii(outcomes: &[TickOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| match o {
            TickOutcome::Presented => '#',
            TickOutcome::Throttled => '.',
            TickOutcome::Unchanged => 'o',
            TickOutcome::Stopped => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::Cell;

    use pixelcanvas_core::{Precondition, Rgba8, Surface};

    use super::*;

    #[test]
    fn sixty_fps_scenario() {
        let mut p = headless(4, 4).unwrap();
        p.start(60.0, Some(Box::new(|_: &mut Surface| true))).unwrap();
        assert_eq!(p.target_interval_ms(), 1000.0 / 60.0);

        let ts = [0.0, 8.0, 17.0, 33.0];
        let outcomes = drive(&mut p, &ts).unwrap();
        // 8 - 0 and 33 - 17 both fall short of 16.67 ms.
        assert_eq!(PacingReport::from_run(&ts, &outcomes).presented_at, [17.0]);
        assert_eq!(timeline_ascii(&outcomes), "..#.");

        let mut p = headless(4, 4).unwrap();
        p.start(60.0, Some(Box::new(|_: &mut Surface| true))).unwrap();
        let ts = [0.0, 8.0, 17.0, 34.0];
        let outcomes = drive(&mut p, &ts).unwrap();
        assert_eq!(
            PacingReport::from_run(&ts, &outcomes).presented_at,
            [17.0, 34.0]
        );
        assert_eq!(p.target().copies(), 2);
    }

    #[test]
    fn unchanged_frame_moves_the_gate() {
        let mut p = headless(1, 1).unwrap();
        p.start(
            60.0,
            Some(Box::new(|s: &mut Surface| {
                // The first rendered frame reports no change.
                if s.pixel(0, 0) == Some(Rgba8::TRANSPARENT) {
                    s.set_pixel(0, 0, Rgba8::BLACK);
                    return false;
                }
                s.set_pixel(0, 0, Rgba8::WHITE);
                true
            })),
        )
        .unwrap();

        let ts = [17.0, 30.0, 34.0];
        let outcomes = drive(&mut p, &ts).unwrap();
        assert_eq!(timeline_ascii(&outcomes), "o.#");
        assert_eq!(p.last_frame_ms(), 34.0);
        assert_eq!(p.target().backing(), [255; 4]);
    }

    #[test]
    fn absent_render_step_copies_on_every_open_gate() {
        let mut p = headless(2, 2).unwrap();
        p.surface_mut().fill(Rgba8::opaque(1, 2, 3));
        p.start(50.0, None).unwrap();

        let ts = display_refreshes(100.0, 11);
        let outcomes = drive(&mut p, &ts).unwrap();
        // 10 ms refreshes against a 20 ms interval: every other one.
        assert_eq!(timeline_ascii(&outcomes), "..#.#.#.#.#");
        assert_eq!(p.target().copies(), 5);
        assert!(
            p.target().presents().iter().all(|&o| o == Point::ORIGIN),
            "always drawn at the origin"
        );
        assert_eq!(p.target().backing(), p.surface().as_bytes());
    }

    #[test]
    fn stale_callback_after_stop_has_no_effect() {
        let renders = Rc::new(Cell::new(0_u32));
        let counter = Rc::clone(&renders);
        let mut p = headless(1, 1).unwrap();
        p.start(
            60.0,
            Some(Box::new(move |_: &mut Surface| {
                counter.set(counter.get() + 1);
                true
            })),
        )
        .unwrap();
        drive(&mut p, &[20.0]).unwrap();
        p.stop().unwrap();

        let requests = p.refresh().requests();
        let outcomes = drive(&mut p, &[40.0, 60.0]).unwrap();
        assert_eq!(timeline_ascii(&outcomes), "__");
        assert_eq!(renders.get(), 1, "no render after stop");
        assert_eq!(p.target().copies(), 1, "no copy after stop");
        assert_eq!(p.refresh().requests(), requests, "no re-arm after stop");
        assert_eq!(p.refresh().cancelled(), [RefreshId(2)]);
        assert_eq!(
            p.stop(),
            Err(PresentError::PrecondViolation(Precondition::AlreadyStopped))
        );
        assert_eq!(p.refresh().cancelled().len(), 1, "cancelled exactly once");
    }

    #[test]
    fn never_more_than_one_pending_registration() {
        let mut p = headless(1, 1).unwrap();
        p.start(30.0, None).unwrap();
        let ts = display_refreshes(144.0, 300);
        drive(&mut p, &ts).unwrap();
        p.set_fps(90.0).unwrap();
        let later: Vec<f64> = ts.iter().map(|t| t + 2100.0).collect();
        drive(&mut p, &later).unwrap();
        p.stop().unwrap();

        let refresh = p.refresh();
        assert_eq!(refresh.overlapping_requests(), 0);
        assert_eq!(refresh.stale_cancels(), 0);
        assert_eq!(refresh.pending(), None);
    }

    #[test]
    fn direct_tick_does_not_orphan_the_pending_registration() {
        let mut p = headless(1, 1).unwrap();
        p.start(60.0, None).unwrap();
        // No fire(): the registration from start is still outstanding.
        assert_eq!(p.tick(20.0), Ok(TickOutcome::Presented));
        assert_eq!(p.refresh().pending(), Some(RefreshId(2)));
        p.stop().unwrap();

        let refresh = p.refresh();
        assert_eq!(refresh.overlapping_requests(), 0);
        assert_eq!(refresh.stale_cancels(), 0);
        assert_eq!(refresh.cancelled(), &[RefreshId(1), RefreshId(2)]);
        assert_eq!(refresh.pending(), None);
    }

    #[test]
    fn cap_below_display_rate_halves_presents() {
        let mut p = headless(1, 1).unwrap();
        p.start(25.0, None).unwrap();
        // One second of a 100 Hz display, timestamps 0, 10, ..., 1000.
        let ts = display_refreshes(100.0, 101);
        let outcomes = drive(&mut p, &ts).unwrap();
        let report = PacingReport::from_run(&ts, &outcomes);

        assert_eq!(report.presented_at.len(), 25);
        assert_eq!(report.throttled, 76);
        assert_eq!(report.effective_fps(), Some(25.0));
    }

    #[test]
    fn set_fps_twice_is_idempotent() {
        let ts = display_refreshes(120.0, 240);

        let mut once = headless(1, 1).unwrap();
        once.start(60.0, None).unwrap();
        once.set_fps(24.0).unwrap();
        let a = drive(&mut once, &ts).unwrap();

        let mut twice = headless(1, 1).unwrap();
        twice.start(60.0, None).unwrap();
        twice.set_fps(24.0).unwrap();
        twice.set_fps(24.0).unwrap();
        let b = drive(&mut twice, &ts).unwrap();

        assert_eq!(a, b);
        assert_eq!(once.target_interval_ms(), twice.target_interval_ms());
    }

    #[test]
    fn report_needs_two_presents_for_a_rate() {
        let report = PacingReport::from_run(&[5.0], &[TickOutcome::Presented]);
        assert_eq!(report.effective_fps(), None);
    }

    #[test]
    fn nan_timestamp_is_throttled() {
        let mut p = headless(1, 1).unwrap();
        p.start(10.0, None).unwrap();
        let outcomes = drive(&mut p, &[f64::NAN, 1.0, 2.0, 3.0, 120.0]).unwrap();
        assert_eq!(timeline_ascii(&outcomes), "....#");
        assert_eq!(p.last_frame_ms(), 120.0);
    }

    #[test]
    fn oversized_surface_is_refused() {
        let err = FramePresenter::new(
            RecordingTarget::with_transfer_len(0),
            ScriptedRefresh::new(),
            u32::MAX,
            u32::MAX,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PresentError::TooLarge {
                width: u32::MAX,
                height: u32::MAX,
            }
        );
    }

    #[test]
    fn mismatched_target_is_refused() {
        let err = FramePresenter::new(
            RecordingTarget::with_transfer_len(10),
            ScriptedRefresh::new(),
            2,
            2,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PresentError::SurfaceMismatch {
                expected: 16,
                actual: 10,
            }
        );
    }
}
