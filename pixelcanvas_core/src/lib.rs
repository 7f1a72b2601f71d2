// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame pacing and pixel-buffer presentation for software-rendered canvases.
//!
//! `pixelcanvas_core` holds the platform-independent half of a presenter that
//! copies a software-rendered RGBA frame buffer into a visible surface on
//! display refreshes. It is `no_std` compatible (with `alloc`) and knows
//! nothing about browsers: the host's refresh callback and its presentation
//! surface are reached only through the traits in [`backend`].
//!
//! # Architecture
//!
//! ```text
//!   RefreshSource (tick source)
//!       │  timestamp (ms)
//!       ▼
//!   FramePresenter::tick() ──► FramePacer::poll() ──► Gate
//!                                                      │ open
//!                 ┌────────────────────────────────────┘
//!                 ▼
//!   render step(&mut Surface) ──► changed? ──► PresentTarget::copy_bytes()
//!                                                    │
//!                                                    ▼
//!                                         PresentTarget::present_at(origin)
//!       │
//!       ▼
//!   RefreshSource::request_refresh()   (re-arm, exactly once per tick)
//! ```
//!
//! **[`pacer`]**: The FPS gate: skips refreshes that arrive sooner than
//! `1000 / max_fps` milliseconds after the last accepted one.
//!
//! **[`surface`]**: The [`Surface`](surface::Surface) and its RGBA frame
//! buffer.
//!
//! **[`presenter`]**: The Stopped/Running state machine that ties the gate,
//! the render step and the buffer copy together.
//!
//! **[`backend`]**: Capability traits implemented by platform backends.
//!
//! **[`timing`]**: Per-tick types: [`FrameTick`](timing::FrameTick),
//! [`TickOutcome`](timing::TickOutcome) and
//! [`PacingStats`](timing::PacingStats).
//!
//! **[`config`]**: [`PacerConfig`](config::PacerConfig) presets.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod backend;
pub mod config;
pub mod error;
pub mod pacer;
pub mod presenter;
pub mod surface;
pub mod timing;
pub mod trace;

pub use error::{Precondition, PresentError};
pub use presenter::{FramePresenter, RenderStep};
pub use surface::{Rgba8, Surface};
