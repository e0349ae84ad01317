// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Meshfield Network Backdrop - Console Logging

//! `log` backend for the browser.
//!
//! Records go to `console.log` on wasm and to stderr elsewhere, so the same
//! binary-free library logs sensibly in both places. Native binaries are
//! free to install `env_logger` instead; only the first logger wins.

use std::str::FromStr;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log(s: &str);
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            emit(&format_record(record));
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record) -> String {
    format!("[meshfield {} {}] {}", record.level(), record.target(), record.args())
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    console_log(line);
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    eprintln!("{}", line);
}

/// Parse a level name such as `"debug"`; unknown names map to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    LevelFilter::from_str(name.trim()).unwrap_or(LevelFilter::Info)
}

/// Install the console logger and, on wasm, the panic hook.
///
/// Returns `false` when another logger was already installed; the max level
/// is updated either way.
pub fn init_console_logger(level: LevelFilter) -> bool {
    #[cfg(target_arch = "wasm32")]
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(level);
    installed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }

    #[test]
    fn test_format_record() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("resized to {}x{}", 10, 20))
                .level(log::Level::Debug)
                .target("meshfield_engine::simulation")
                .build(),
        );
        assert_eq!(line, "[meshfield DEBUG meshfield_engine::simulation] resized to 10x20");
    }

    #[test]
    fn test_second_install_is_harmless() {
        init_console_logger(LevelFilter::Warn);
        assert!(!init_console_logger(LevelFilter::Warn));
        assert_eq!(log::max_level(), LevelFilter::Warn);
    }
}
