// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presenter configuration.

use crate::error::PresentError;
use crate::pacer;

/// Frame-rate settings passed to
/// [`FramePresenter::start_with`](crate::FramePresenter::start_with).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PacerConfig {
    /// Maximum number of frames presented per second.
    ///
    /// `f64::INFINITY` disables throttling: every refresh passes the gate.
    pub max_fps: f64,
}

impl PacerConfig {
    /// Presents at most 60 frames per second, the common display rate.
    #[must_use]
    pub const fn display() -> Self {
        Self { max_fps: 60.0 }
    }

    /// Presents at most 30 frames per second, halving copy work on 60 Hz
    /// displays.
    #[must_use]
    pub const fn low_power() -> Self {
        Self { max_fps: 30.0 }
    }

    /// Creates a config with the given frame-rate cap.
    #[must_use]
    pub const fn with_max_fps(max_fps: f64) -> Self {
        Self { max_fps }
    }

    /// Checks the config and returns the frame interval in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`PresentError::Config`] if `max_fps` is not positive.
    pub fn validate(&self) -> Result<f64, PresentError> {
        pacer::interval_for_fps(self.max_fps)
    }
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self::display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert_eq!(PacerConfig::display().validate(), Ok(1000.0 / 60.0));
        assert_eq!(PacerConfig::low_power().validate(), Ok(1000.0 / 30.0));
        assert_eq!(PacerConfig::default(), PacerConfig::display());
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert_eq!(
            PacerConfig::with_max_fps(0.0).validate(),
            Err(PresentError::Config { max_fps: 0.0 })
        );
    }
}
