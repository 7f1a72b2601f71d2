// Copyright 2026 the Pixelcanvas Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A [`log`] backend writing to the browser console.

use alloc::format;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use wasm_bindgen::JsValue;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format_record(record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(target: &str, args: &core::fmt::Arguments<'_>) -> alloc::string::String {
    format!("[{target}] {args}")
}

/// Routes `log` records at or above `level` to the browser console.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger was already installed.
pub fn init_console_log(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_prefixed_with_target() {
        let line = format_record("pixelcanvas_core::presenter", &format_args!("tick {}", 3));
        assert_eq!(line, "[pixelcanvas_core::presenter] tick 3");
    }
}
