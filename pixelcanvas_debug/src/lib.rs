// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording and pretty-printing for pixelcanvas diagnostics.
//!
//! This crate provides [`TraceSink`](pixelcanvas_core::trace::TraceSink)
//! implementations for development:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: keeps every event in memory for later
//!   inspection.

pub mod pretty;
pub mod recorder;
