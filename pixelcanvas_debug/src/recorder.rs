// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and keeps every event, in order,
//! as a [`RecordedEvent`].

use pixelcanvas_core::timing::TickOutcome;
use pixelcanvas_core::trace::{
    PhaseBeginEvent, PhaseEndEvent, PresentEvent, RefreshEvent, ThrottleEvent, TickSummary,
    TraceSink,
};

/// One recorded trace event.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A [`RefreshEvent`].
    Refresh(RefreshEvent),
    /// A [`ThrottleEvent`].
    Throttle(ThrottleEvent),
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// A [`PresentEvent`].
    Present(PresentEvent),
    /// A [`TickSummary`].
    TickSummary(TickSummary),
}

impl RecordedEvent {
    /// The refresh counter the event belongs to.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        match self {
            Self::Refresh(e) => e.frame_index,
            Self::Throttle(e) => e.frame_index,
            Self::PhaseBegin(e) => e.frame_index,
            Self::PhaseEnd(e) => e.frame_index,
            Self::Present(e) => e.frame_index,
            Self::TickSummary(s) => s.frame_index,
        }
    }
}

/// A [`TraceSink`] that stores events in memory.
#[derive(Debug, Default)]
pub struct RecorderSink {
    events: Vec<RecordedEvent>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns its events.
    #[must_use]
    pub fn into_events(self) -> Vec<RecordedEvent> {
        self.events
    }

    /// Outcome of every recorded tick, in order.
    pub fn outcomes(&self) -> impl Iterator<Item = TickOutcome> + '_ {
        self.events.iter().filter_map(|e| match e {
            RecordedEvent::TickSummary(s) => Some(s.outcome),
            _ => None,
        })
    }

    /// Host timestamps of the ticks that reached the presentation target.
    #[must_use]
    pub fn presented_at(&self) -> Vec<f64> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::TickSummary(s) if s.outcome.presented() => Some(s.timestamp_ms),
                _ => None,
            })
            .collect()
    }

    /// Drops all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for RecorderSink {
    fn on_refresh(&mut self, e: &RefreshEvent) {
        self.events.push(RecordedEvent::Refresh(*e));
    }

    fn on_throttle(&mut self, e: &ThrottleEvent) {
        self.events.push(RecordedEvent::Throttle(*e));
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.events.push(RecordedEvent::PhaseBegin(*e));
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.events.push(RecordedEvent::PhaseEnd(*e));
    }

    fn on_present(&mut self, e: &PresentEvent) {
        self.events.push(RecordedEvent::Present(*e));
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        self.events.push(RecordedEvent::TickSummary(*s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcanvas_core::trace::Tracer;
    use pixelcanvas_harness::headless;

    #[test]
    fn records_a_paced_run() {
        let mut p = headless(4, 4).unwrap();
        p.start(60.0, None).unwrap();

        let mut rec = RecorderSink::new();
        for ts in [0.0, 8.0, 17.0, 34.0] {
            p.refresh_mut().fire();
            p.tick_traced(ts, &mut Tracer::new(&mut rec)).unwrap();
        }

        assert_eq!(
            rec.outcomes().collect::<Vec<_>>(),
            [
                TickOutcome::Throttled,
                TickOutcome::Throttled,
                TickOutcome::Presented,
                TickOutcome::Presented,
            ]
        );
        assert_eq!(rec.presented_at(), [17.0, 34.0]);

        let throttles: Vec<_> = rec
            .events()
            .iter()
            .filter_map(|e| match e {
                RecordedEvent::Throttle(t) => Some(t.frame_index),
                _ => None,
            })
            .collect();
        assert_eq!(throttles, [0, 1]);
    }

    #[test]
    fn events_stay_grouped_by_frame() {
        let mut p = headless(1, 1).unwrap();
        p.start(60.0, None).unwrap();

        let mut rec = RecorderSink::new();
        for ts in [20.0, 40.0] {
            p.refresh_mut().fire();
            p.tick_traced(ts, &mut Tracer::new(&mut rec)).unwrap();
        }
        let frames: Vec<u64> = rec.events().iter().map(RecordedEvent::frame_index).collect();
        assert!(frames.is_sorted(), "got: {frames:?}");
        assert_eq!(frames.first(), Some(&0));
        assert_eq!(frames.last(), Some(&1));

        rec.clear();
        assert!(rec.events().is_empty());
    }
}
