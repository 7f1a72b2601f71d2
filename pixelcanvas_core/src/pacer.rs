// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-rate gate layered on top of the display's refresh cadence.
//!
//! The host's refresh callback is the only clock. [`FramePacer`] never
//! schedules a timer of its own: it is polled on every refresh and simply
//! rejects the ones that arrive too soon after the last accepted frame.
//!
//! ```text
//!   refresh:   0    8    17   25   33   41   50
//!   60 FPS:    ·    ·    ✓    ·    ·    ✓    ·      (interval 16.67 ms)
//! ```

use crate::error::PresentError;

/// Converts a frame-rate cap into the minimum spacing between frames, in
/// milliseconds.
///
/// The result is exactly `1000.0 / max_fps`. An infinite cap yields `0.0`,
/// which lets every refresh through.
///
/// # Errors
///
/// Returns [`PresentError::Config`] if `max_fps` is zero, negative or NaN.
pub fn interval_for_fps(max_fps: f64) -> Result<f64, PresentError> {
    if max_fps.is_nan() || max_fps <= 0.0 {
        return Err(PresentError::Config { max_fps });
    }
    Ok(1000.0 / max_fps)
}

/// The result of polling the gate with a refresh timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gate {
    /// Enough time has passed; the timestamp is now the last frame time.
    Open {
        /// Milliseconds since the previous accepted frame.
        elapsed_ms: f64,
    },
    /// Too soon; the refresh should be skipped.
    Closed {
        /// Milliseconds since the previous accepted frame.
        elapsed_ms: f64,
        /// Milliseconds still missing before the gate would open.
        remaining_ms: f64,
    },
}

impl Gate {
    /// Returns `true` if the frame may be rendered and presented.
    #[inline]
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }
}

/// Tracks the target frame interval and the time of the last accepted frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePacer {
    target_interval_ms: f64,
    last_frame_ms: f64,
}

impl FramePacer {
    /// Creates a pacer capped at `max_fps`, with the last frame time at zero.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Config`] if `max_fps` is not positive.
    pub fn new(max_fps: f64) -> Result<Self, PresentError> {
        Ok(Self {
            target_interval_ms: interval_for_fps(max_fps)?,
            last_frame_ms: 0.0,
        })
    }

    /// Changes the frame-rate cap.
    ///
    /// Only subsequent calls to [`poll`](Self::poll) see the new interval.
    /// On error the previous interval is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Config`] if `max_fps` is not positive.
    pub fn set_max_fps(&mut self, max_fps: f64) -> Result<(), PresentError> {
        self.target_interval_ms = interval_for_fps(max_fps)?;
        Ok(())
    }

    /// Minimum spacing between accepted frames, in milliseconds.
    #[inline]
    #[must_use]
    pub fn target_interval_ms(&self) -> f64 {
        self.target_interval_ms
    }

    /// Timestamp of the last accepted frame, in milliseconds.
    #[inline]
    #[must_use]
    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    /// Evaluates the gate for a refresh at `timestamp_ms`.
    ///
    /// When the gate opens the last frame time advances to `timestamp_ms`,
    /// whether or not the caller ends up presenting anything. A non-finite
    /// timestamp never opens the gate.
    pub fn poll(&mut self, timestamp_ms: f64) -> Gate {
        let elapsed_ms = timestamp_ms - self.last_frame_ms;
        if !timestamp_ms.is_finite() || elapsed_ms < self.target_interval_ms {
            return Gate::Closed {
                elapsed_ms,
                remaining_ms: self.target_interval_ms - elapsed_ms,
            };
        }
        self.last_frame_ms = timestamp_ms;
        Gate::Open { elapsed_ms }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    fn accepted(pacer: &mut FramePacer, timestamps: &[f64]) -> Vec<f64> {
        timestamps
            .iter()
            .copied()
            .filter(|&t| pacer.poll(t).is_open())
            .collect()
    }

    #[test]
    fn interval_is_exact_reciprocal() {
        for fps in [1.0, 24.0, 30.0, 59.94, 60.0, 75.0, 120.0, 144.0, 0.5] {
            assert_eq!(
                interval_for_fps(fps),
                Ok(1000.0 / fps),
                "interval for {fps} FPS"
            );
        }
        assert_eq!(interval_for_fps(f64::INFINITY), Ok(0.0));
    }

    #[test]
    fn non_positive_fps_is_rejected() {
        assert!(interval_for_fps(0.0).is_err(), "zero");
        assert!(interval_for_fps(-0.0).is_err(), "negative zero");
        assert!(interval_for_fps(-30.0).is_err(), "negative");
        assert!(interval_for_fps(f64::NAN).is_err(), "NaN");
        assert!(FramePacer::new(0.0).is_err(), "constructor");
    }

    #[test]
    fn non_finite_timestamps_never_open_the_gate() {
        let mut pacer = FramePacer::new(10.0).unwrap();
        let ts = [f64::NAN, f64::INFINITY, 150.0, f64::NEG_INFINITY, f64::NAN, 300.0];
        assert_eq!(accepted(&mut pacer, &ts), [150.0, 300.0]);
        assert_eq!(pacer.last_frame_ms(), 300.0);
    }

    #[test]
    fn sixty_fps_skips_early_refreshes() {
        let mut pacer = FramePacer::new(60.0).unwrap();
        // 33 - 17 = 16 < 16.67, so 33 is throttled.
        assert_eq!(accepted(&mut pacer, &[0.0, 8.0, 17.0, 33.0]), [17.0]);

        let mut pacer = FramePacer::new(60.0).unwrap();
        assert_eq!(accepted(&mut pacer, &[0.0, 8.0, 17.0, 34.0]), [17.0, 34.0]);
    }

    #[test]
    fn closed_gate_reports_remaining_time() {
        let mut pacer = FramePacer::new(50.0).unwrap();
        assert_eq!(
            pacer.poll(5.0),
            Gate::Closed {
                elapsed_ms: 5.0,
                remaining_ms: 15.0,
            }
        );
        assert_eq!(pacer.last_frame_ms(), 0.0);
        assert_eq!(pacer.poll(20.0), Gate::Open { elapsed_ms: 20.0 });
        assert_eq!(pacer.last_frame_ms(), 20.0);
    }

    #[test]
    fn exact_interval_opens_the_gate() {
        let mut pacer = FramePacer::new(100.0).unwrap();
        assert!(pacer.poll(10.0).is_open(), "elapsed == interval");
    }

    #[test]
    fn set_max_fps_applies_to_next_poll_only() {
        let mut pacer = FramePacer::new(60.0).unwrap();
        assert!(pacer.poll(20.0).is_open(), "first frame");

        pacer.set_max_fps(10.0).unwrap();
        assert_eq!(pacer.target_interval_ms(), 100.0);
        assert!(!pacer.poll(40.0).is_open(), "new 100 ms interval applies");
        assert!(pacer.poll(120.0).is_open(), "100 ms after the last frame");
    }

    #[test]
    fn set_max_fps_is_idempotent() {
        let mut a = FramePacer::new(60.0).unwrap();
        let mut b = a.clone();
        a.set_max_fps(30.0).unwrap();
        b.set_max_fps(30.0).unwrap();
        b.set_max_fps(30.0).unwrap();
        assert_eq!(a, b);

        let ts = [0.0, 20.0, 34.0, 40.0, 67.0, 70.0, 101.0];
        assert_eq!(accepted(&mut a, &ts), accepted(&mut b, &ts));
    }

    #[test]
    fn rejected_fps_keeps_previous_interval() {
        let mut pacer = FramePacer::new(60.0).unwrap();
        assert_eq!(
            pacer.set_max_fps(-1.0),
            Err(PresentError::Config { max_fps: -1.0 })
        );
        assert_eq!(pacer.target_interval_ms(), 1000.0 / 60.0);
    }

    #[test]
    fn uncapped_accepts_every_refresh() {
        let mut pacer = FramePacer::new(f64::INFINITY).unwrap();
        let ts = [0.0, 0.5, 1.0, 1.0, 2.0];
        assert_eq!(accepted(&mut pacer, &ts), ts);
    }
}
