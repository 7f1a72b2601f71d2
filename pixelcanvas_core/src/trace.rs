// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the frame loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that
//! the presenter calls at each stage of a tick. All method bodies default to
//! no-ops, so implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use kurbo::Point;

use crate::timing::{FrameTick, TickOutcome};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which phase of a tick is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// The caller-supplied render step.
    Render,
    /// Frame buffer → transfer buffer → presentation surface.
    Copy,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every refresh processed while running.
#[derive(Clone, Copy, Debug)]
pub struct RefreshEvent {
    /// Refresh counter.
    pub frame_index: u64,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: f64,
    /// Target interval in effect for this refresh.
    pub target_interval_ms: f64,
}

impl RefreshEvent {
    /// Creates a `RefreshEvent` from a [`FrameTick`] plus the interval in
    /// effect (which the tick itself does not carry).
    #[must_use]
    pub fn new(tick: &FrameTick, target_interval_ms: f64) -> Self {
        Self {
            frame_index: tick.frame_index,
            timestamp_ms: tick.timestamp_ms,
            target_interval_ms,
        }
    }
}

/// Emitted when the FPS gate skips a refresh.
#[derive(Clone, Copy, Debug)]
pub struct ThrottleEvent {
    /// Refresh counter.
    pub frame_index: u64,
    /// Milliseconds since the last accepted frame.
    pub elapsed_ms: f64,
    /// Milliseconds still missing before the gate would open.
    pub remaining_ms: f64,
}

/// Marks the beginning of a tick phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseBeginEvent {
    /// Refresh counter.
    pub frame_index: u64,
    /// Which phase is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a tick phase.
#[derive(Clone, Copy, Debug)]
pub struct PhaseEndEvent {
    /// Refresh counter.
    pub frame_index: u64,
    /// Which phase is ending.
    pub phase: PhaseKind,
    /// For [`PhaseKind::Render`], whether the step reported a change.
    pub changed: Option<bool>,
}

/// Emitted after a frame reaches the presentation surface.
#[derive(Clone, Copy, Debug)]
pub struct PresentEvent {
    /// Refresh counter.
    pub frame_index: u64,
    /// Bytes copied.
    pub bytes: usize,
    /// Where the frame was drawn.
    pub origin: Point,
}

/// Emitted once per tick with what the tick did.
#[derive(Clone, Copy, Debug)]
pub struct TickSummary {
    /// Refresh counter.
    pub frame_index: u64,
    /// Host timestamp in milliseconds.
    pub timestamp_ms: f64,
    /// The tick's outcome.
    pub outcome: TickOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the frame loop.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a refresh is processed.
    fn on_refresh(&mut self, e: &RefreshEvent) {
        _ = e;
    }

    /// Called when the FPS gate skips a refresh.
    fn on_throttle(&mut self, e: &ThrottleEvent) {
        _ = e;
    }

    /// Called at the beginning of a tick phase.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a tick phase.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called after a frame is presented.
    fn on_present(&mut self, e: &PresentEvent) {
        _ = e;
    }

    /// Called once per tick with its outcome.
    fn on_tick_summary(&mut self, s: &TickSummary) {
        _ = s;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`RefreshEvent`].
    #[inline]
    pub fn refresh(&mut self, e: &RefreshEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_refresh(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ThrottleEvent`].
    #[inline]
    pub fn throttle(&mut self, e: &ThrottleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_throttle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PresentEvent`].
    #[inline]
    pub fn present(&mut self, e: &PresentEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_present(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TickSummary`].
    #[inline]
    pub fn tick_summary(&mut self, s: &TickSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_tick_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tick() -> FrameTick {
        FrameTick {
            timestamp_ms: 33.5,
            frame_index: 4,
        }
    }

    #[test]
    fn refresh_event_from_frame_tick() {
        let evt = RefreshEvent::new(&sample_tick(), 16.0);
        assert_eq!(evt.frame_index, 4);
        assert_eq!(evt.timestamp_ms, 33.5);
        assert_eq!(evt.target_interval_ms, 16.0);
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_refresh(&RefreshEvent::new(&sample_tick(), 16.0));
        sink.on_tick_summary(&TickSummary {
            frame_index: 0,
            timestamp_ms: 0.0,
            outcome: TickOutcome::Throttled,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut tracer = Tracer::none();
        tracer.refresh(&RefreshEvent::new(&sample_tick(), 16.0));
        tracer.throttle(&ThrottleEvent {
            frame_index: 4,
            elapsed_ms: 1.0,
            remaining_ms: 15.0,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            refreshes: Vec<u64>,
        }
        impl TraceSink for RecordingSink {
            fn on_refresh(&mut self, e: &RefreshEvent) {
                self.refreshes.push(e.frame_index);
            }
        }

        let mut sink = RecordingSink {
            refreshes: Vec::new(),
        };
        let mut tracer = Tracer::new(&mut sink);
        tracer.refresh(&RefreshEvent::new(&sample_tick(), 16.0));
        // Access sink after tracer is dropped.
        drop(tracer);
        assert_eq!(sink.refreshes, &[4]);
    }
}
