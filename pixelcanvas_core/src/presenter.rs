// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame pacer and presenter state machine.
//!
//! [`FramePresenter`] owns a [`Surface`], a [`PresentTarget`] and a
//! [`RefreshSource`]. Once started, every call to
//! [`tick`](FramePresenter::tick) (one per host refresh) runs:
//!
//! 1. FPS gate: too soon after the last frame? Skip to step 4.
//! 2. Render step: if supplied, called with the surface; returns whether
//!    the frame changed. No render step counts as "changed".
//! 3. Copy: if changed, frame buffer → transfer buffer → presentation
//!    surface, redrawn at the origin.
//! 4. Re-arm: exactly one new refresh registration.
//!
//! ```text
//!             start()                    stop()
//!   Idle ───────────────► Running ───────────────► Stopped
//!                           ▲  │ tick()               │
//!                           └──┘                      │
//!                           ▲         start()         │
//!                           └─────────────────────────┘
//! ```

use alloc::boxed::Box;

use kurbo::Point;

use crate::backend::{PresentTarget, RefreshSource};
use crate::config::PacerConfig;
use crate::error::{Precondition, PresentError};
use crate::pacer::{FramePacer, Gate};
use crate::surface::Surface;
use crate::timing::{FrameTick, PacingStats, TickOutcome};
use crate::trace::{
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, RefreshEvent, ThrottleEvent,
    TickSummary, Tracer,
};

/// A caller-supplied step that draws into the surface and reports whether
/// anything changed.
pub type RenderStep = Box<dyn FnMut(&mut Surface) -> bool>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState<H> {
    /// Never started.
    Idle,
    /// Started; `pending` is the outstanding refresh registration, if any.
    Running { pending: Option<H> },
    /// Stopped after running.
    Stopped,
}

/// Paces a software frame buffer onto a presentation surface.
///
/// See the [module docs](self) for the per-tick sequence.
///
/// # Example
///
/// ```rust,ignore
/// let mut presenter = FramePresenter::new(target, refresh, 320, 240)?;
/// presenter.start(30.0, Some(Box::new(|surface: &mut Surface| {
///     surface.fill(Rgba8::opaque(255, 0, 0));
///     true
/// })))?;
/// // From the host's refresh callback:
/// presenter.tick(timestamp_ms)?;
/// ```
pub struct FramePresenter<T, R: RefreshSource> {
    surface: Surface,
    target: T,
    refresh: R,
    pacer: FramePacer,
    render: Option<RenderStep>,
    state: LoopState<R::Handle>,
    /// Refreshes seen while running (becomes `FrameTick::frame_index`).
    frame_counter: u64,
    stats: PacingStats,
}

impl<T, R: RefreshSource> core::fmt::Debug for FramePresenter<T, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FramePresenter")
            .field("surface", &self.surface)
            .field("pacer", &self.pacer)
            .field("has_render_step", &self.render.is_some())
            .field("state", &self.state)
            .field("frame_counter", &self.frame_counter)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<T: PresentTarget, R: RefreshSource> FramePresenter<T, R> {
    /// Creates a stopped presenter with a transparent `width` × `height`
    /// surface, capped at [`PacerConfig::display`] until started.
    ///
    /// # Errors
    ///
    /// - [`PresentError::TooLarge`] if `width * height * 4` overflows `usize`.
    /// - [`PresentError::SurfaceMismatch`] if the target's transfer buffer
    ///   is not exactly `width * height * 4` bytes.
    pub fn new(target: T, refresh: R, width: u32, height: u32) -> Result<Self, PresentError> {
        let surface = Surface::try_new(width, height)?;
        check_transfer_len(&surface, &target)?;
        Ok(Self {
            surface,
            target,
            refresh,
            pacer: FramePacer::new(PacerConfig::display().max_fps)?,
            render: None,
            state: LoopState::Idle,
            frame_counter: 0,
            stats: PacingStats::default(),
        })
    }

    /// Starts the loop: sets the FPS cap, installs `render` and registers the
    /// first refresh.
    ///
    /// With `render == None` every refresh that passes the FPS gate copies
    /// the surface as-is; drawing then happens elsewhere through
    /// [`surface_mut`](Self::surface_mut).
    ///
    /// # Errors
    ///
    /// - [`PresentError::Config`] if `max_fps` is not positive.
    /// - [`PresentError::PrecondViolation`] if already running.
    ///
    /// On error nothing changes.
    pub fn start(&mut self, max_fps: f64, render: Option<RenderStep>) -> Result<(), PresentError> {
        if matches!(self.state, LoopState::Running { .. }) {
            log::warn!("start called on a running presenter");
            return Err(PresentError::PrecondViolation(Precondition::AlreadyRunning));
        }
        self.pacer.set_max_fps(max_fps)?;
        self.render = render;
        let handle = self.refresh.request_refresh();
        self.state = LoopState::Running {
            pending: Some(handle),
        };
        log::debug!(
            "presenter started: {}x{} at {max_fps} FPS (interval {:.3} ms)",
            self.surface.width(),
            self.surface.height(),
            self.pacer.target_interval_ms(),
        );
        Ok(())
    }

    /// [`start`](Self::start) with the frame-rate cap taken from `config`.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_with(
        &mut self,
        config: PacerConfig,
        render: Option<RenderStep>,
    ) -> Result<(), PresentError> {
        self.start(config.max_fps, render)
    }

    /// Changes the FPS cap, running or not.
    ///
    /// The new interval applies from the next tick; a tick already in
    /// progress is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Config`] if `max_fps` is not positive; the
    /// previous cap stays in effect.
    pub fn set_fps(&mut self, max_fps: f64) -> Result<(), PresentError> {
        self.pacer.set_max_fps(max_fps)?;
        log::debug!(
            "presenter FPS cap set to {max_fps} (interval {:.3} ms)",
            self.pacer.target_interval_ms()
        );
        Ok(())
    }

    /// Stops the loop, cancelling the pending refresh registration.
    ///
    /// After this returns, [`tick`](Self::tick) does nothing until the next
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::PrecondViolation`] if the presenter was never
    /// started or is already stopped.
    pub fn stop(&mut self) -> Result<(), PresentError> {
        match self.state {
            LoopState::Idle => {
                log::warn!("stop called before start");
                Err(PresentError::PrecondViolation(Precondition::NotStarted))
            }
            LoopState::Stopped => {
                log::warn!("stop called twice");
                Err(PresentError::PrecondViolation(Precondition::AlreadyStopped))
            }
            LoopState::Running { pending } => {
                self.halt(pending);
                log::debug!("presenter stopped after {} refreshes", self.stats.refreshes);
                Ok(())
            }
        }
    }

    /// Processes a host refresh at `timestamp_ms`.
    ///
    /// The refresh consumes the pending registration; a new one is made
    /// before returning. When stopped this is a no-op returning
    /// [`TickOutcome::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::SurfaceMismatch`] if the transfer buffer no
    /// longer matches the frame buffer. The presenter stops in that case.
    pub fn tick(&mut self, timestamp_ms: f64) -> Result<TickOutcome, PresentError> {
        self.tick_traced(timestamp_ms, &mut Tracer::none())
    }

    /// [`tick`](Self::tick), reporting each stage to `tracer`.
    ///
    /// # Errors
    ///
    /// See [`tick`](Self::tick).
    pub fn tick_traced(
        &mut self,
        timestamp_ms: f64,
        tracer: &mut Tracer<'_>,
    ) -> Result<TickOutcome, PresentError> {
        let LoopState::Running { pending } = &mut self.state else {
            return Ok(TickOutcome::Stopped);
        };
        if let Some(stale) = pending.take()
            && self.refresh.is_outstanding(stale)
        {
            log::warn!(
                "tick at {timestamp_ms:.3} ms before refresh {stale:?} fired; cancelling it"
            );
            self.refresh.cancel_refresh(stale);
        }

        let tick = FrameTick {
            timestamp_ms,
            frame_index: self.frame_counter,
        };
        self.frame_counter += 1;
        tracer.refresh(&RefreshEvent::new(&tick, self.pacer.target_interval_ms()));

        let outcome = match self.pacer.poll(timestamp_ms) {
            Gate::Closed {
                elapsed_ms,
                remaining_ms,
            } => {
                tracer.throttle(&ThrottleEvent {
                    frame_index: tick.frame_index,
                    elapsed_ms,
                    remaining_ms,
                });
                TickOutcome::Throttled
            }
            Gate::Open { .. } => {
                let changed = self.run_render_step(tick.frame_index, tracer);
                if changed {
                    if let Err(err) = self.copy_frame(tick.frame_index, tracer) {
                        log::error!("frame {}: {err}; stopping", tick.frame_index);
                        self.halt(None);
                        return Err(err);
                    }
                    TickOutcome::Presented
                } else {
                    TickOutcome::Unchanged
                }
            }
        };

        let handle = self.refresh.request_refresh();
        self.state = LoopState::Running {
            pending: Some(handle),
        };

        self.stats.record(outcome);
        tracer.tick_summary(&TickSummary {
            frame_index: tick.frame_index,
            timestamp_ms,
            outcome,
        });
        log::trace!(
            "frame {} at {timestamp_ms:.3} ms: {outcome:?}",
            tick.frame_index
        );
        Ok(outcome)
    }

    /// Copies the surface to the presentation target immediately, outside
    /// the paced loop. Works whether or not the loop is running and does not
    /// touch the FPS gate.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::SurfaceMismatch`] if the transfer buffer no
    /// longer matches the frame buffer.
    pub fn present_now(&mut self) -> Result<(), PresentError> {
        self.copy_frame(self.frame_counter, &mut Tracer::none())?;
        self.stats.presented += 1;
        Ok(())
    }

    fn run_render_step(&mut self, frame_index: u64, tracer: &mut Tracer<'_>) -> bool {
        let Some(render) = self.render.as_mut() else {
            return true;
        };
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Render,
        });
        let changed = render(&mut self.surface);
        self.stats.rendered += 1;
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Render,
            changed: Some(changed),
        });
        changed
    }

    fn copy_frame(&mut self, frame_index: u64, tracer: &mut Tracer<'_>) -> Result<(), PresentError> {
        check_transfer_len(&self.surface, &self.target)?;
        tracer.phase_begin(&PhaseBeginEvent {
            frame_index,
            phase: PhaseKind::Copy,
        });
        self.target.copy_bytes(self.surface.as_bytes());
        self.target.present_at(Point::ORIGIN);
        tracer.phase_end(&PhaseEndEvent {
            frame_index,
            phase: PhaseKind::Copy,
            changed: None,
        });
        tracer.present(&PresentEvent {
            frame_index,
            bytes: self.surface.byte_len(),
            origin: Point::ORIGIN,
        });
        Ok(())
    }
}

impl<T, R: RefreshSource> FramePresenter<T, R> {
    /// Width of the surface in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    /// Height of the surface in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// The frame buffer.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// The frame buffer, for drawing outside a render step.
    #[inline]
    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// The presentation target.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The presentation target, mutably.
    #[inline]
    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// The refresh source.
    #[inline]
    #[must_use]
    pub fn refresh(&self) -> &R {
        &self.refresh
    }

    /// The refresh source, mutably.
    #[inline]
    pub fn refresh_mut(&mut self) -> &mut R {
        &mut self.refresh
    }

    /// Returns `true` between [`start`](Self::start) and
    /// [`stop`](Self::stop).
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Minimum spacing between presented frames, in milliseconds.
    #[inline]
    #[must_use]
    pub fn target_interval_ms(&self) -> f64 {
        self.pacer.target_interval_ms()
    }

    /// Timestamp of the last refresh that passed the FPS gate.
    #[inline]
    #[must_use]
    pub fn last_frame_ms(&self) -> f64 {
        self.pacer.last_frame_ms()
    }

    /// Counters over every tick processed so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> PacingStats {
        self.stats
    }

    /// Moves to `Stopped`, cancelling `pending` if it is still outstanding.
    fn halt(&mut self, pending: Option<R::Handle>) {
        if let Some(handle) = pending {
            self.refresh.cancel_refresh(handle);
        }
        self.state = LoopState::Stopped;
    }
}

impl<T, R: RefreshSource> Drop for FramePresenter<T, R> {
    fn drop(&mut self) {
        if let LoopState::Running {
            pending: Some(handle),
        } = self.state
        {
            self.refresh.cancel_refresh(handle);
        }
    }
}

fn check_transfer_len<T: PresentTarget>(surface: &Surface, target: &T) -> Result<(), PresentError> {
    let expected = surface.byte_len();
    let actual = target.transfer_len();
    if expected != actual {
        return Err(PresentError::SurfaceMismatch { expected, actual });
    }
    Ok(())
}
