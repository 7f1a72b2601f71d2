// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors returned by presenter operations.
//!
//! Every error here is caller misuse and is fatal to the operation that
//! raised it. Nothing in this crate performs I/O that could fail
//! transiently, so there is no retry path.

use core::fmt;

/// A lifecycle rule the caller broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Precondition {
    /// `start` was called while the presenter was already running.
    AlreadyRunning,
    /// `stop` was called on a presenter that was never started.
    NotStarted,
    /// `stop` was called a second time.
    AlreadyStopped,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyRunning => "start called while already running",
            Self::NotStarted => "stop called before start",
            Self::AlreadyStopped => "stop called twice",
        })
    }
}

/// Errors from [`FramePresenter`](crate::FramePresenter) operations.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum PresentError {
    /// The requested frame rate was zero, negative or NaN.
    #[error("max FPS must be positive, got {max_fps}")]
    Config {
        /// The rejected value.
        max_fps: f64,
    },
    /// A lifecycle method was called out of order.
    #[error("precondition violated: {0}")]
    PrecondViolation(Precondition),
    /// The transfer buffer and the frame buffer disagree on length.
    #[error("transfer buffer holds {actual} bytes but the frame buffer has {expected}")]
    SurfaceMismatch {
        /// Frame buffer length in bytes (`width * height * 4`).
        expected: usize,
        /// Transfer buffer length in bytes.
        actual: usize,
    },
    /// The frame buffer's byte length does not fit in `usize`.
    #[error("a {width}x{height} frame buffer does not fit in memory")]
    TooLarge {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}
