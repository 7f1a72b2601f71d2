// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! host milliseconds as delivered with each refresh.

use std::io::Write;

use pixelcanvas_core::timing::TickOutcome;
use pixelcanvas_core::trace::{
    PhaseBeginEvent, PhaseEndEvent, PhaseKind, PresentEvent, RefreshEvent, ThrottleEvent,
    TickSummary, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Render => "render",
        PhaseKind::Copy => "copy",
    }
}

fn outcome_name(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Stopped => "stopped",
        TickOutcome::Throttled => "throttled",
        TickOutcome::Unchanged => "unchanged",
        TickOutcome::Presented => "presented",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_refresh(&mut self, e: &RefreshEvent) {
        let _ = writeln!(
            self.writer,
            "[refresh] frame={} at {:.3}ms interval={:.3}ms",
            e.frame_index, e.timestamp_ms, e.target_interval_ms,
        );
    }

    fn on_throttle(&mut self, e: &ThrottleEvent) {
        let _ = writeln!(
            self.writer,
            "[throttle] frame={} elapsed={:.3}ms remaining={:.3}ms",
            e.frame_index, e.elapsed_ms, e.remaining_ms,
        );
    }

    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] frame={} {}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let changed = match e.changed {
            Some(true) => " changed",
            Some(false) => " unchanged",
            None => "",
        };
        let _ = writeln!(
            self.writer,
            "[phase:end] frame={} {}{changed}",
            e.frame_index,
            phase_name(e.phase),
        );
    }

    fn on_present(&mut self, e: &PresentEvent) {
        let _ = writeln!(
            self.writer,
            "[present] frame={} bytes={} at ({}, {})",
            e.frame_index, e.bytes, e.origin.x, e.origin.y,
        );
    }

    fn on_tick_summary(&mut self, s: &TickSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] frame={} at {:.3}ms {}",
            s.frame_index,
            s.timestamp_ms,
            outcome_name(s.outcome),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelcanvas_core::trace::Tracer;
    use pixelcanvas_harness::headless;

    #[test]
    fn pretty_print_throttle() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_throttle(&ThrottleEvent {
            frame_index: 1,
            elapsed_ms: 8.0,
            remaining_ms: 8.667,
        });
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "[throttle] frame=1 elapsed=8.000ms remaining=8.667ms\n"
        );
    }

    #[test]
    fn presented_tick_prints_every_stage() {
        let mut p = headless(2, 2).unwrap();
        p.start(60.0, Some(Box::new(|_| true))).unwrap();
        p.refresh_mut().fire();

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        p.tick_traced(17.0, &mut Tracer::new(&mut sink)).unwrap();

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let tags: Vec<&str> = output
            .lines()
            .map(|line| line.split(' ').next().unwrap())
            .collect();
        assert_eq!(
            tags,
            [
                "[refresh]",
                "[phase:begin]",
                "[phase:end]",
                "[phase:begin]",
                "[phase:end]",
                "[present]",
                "[summary]",
            ],
            "got: {output}"
        );
        assert!(output.contains("bytes=16"), "got: {output}");
        assert!(output.ends_with("presented\n"), "got: {output}");
    }
}
