#![deny(missing_docs)]
//! Shared logging utilities for the fetcher workspace.
//!
//! This crate provides the `fetcher_*` logging macros used across the codebase,
//! a process-wide tick counter that is prefixed to every message, and a minimal
//! test initializer for the global logger.

use std::sync::atomic::{AtomicU64, Ordering};

/// The tick currently being processed, shared by every thread of the process.
static CURRENT_TICK: AtomicU64 = AtomicU64::new(0);

/// Sets the tick number for the whole process.
/// The supervisor calls this once per tick, before any tick work is logged.
pub fn set_current_tick(tick: u64) {
    CURRENT_TICK.store(tick, Ordering::Relaxed);
}

/// Retrieves the tick number last set by the supervisor.
/// Returns 0 before the first tick.
pub fn current_tick() -> u64 {
    CURRENT_TICK.load(Ordering::Relaxed)
}

/// Logs a trace-level message tagged with the current tick.
#[macro_export]
macro_rules! fetcher_trace {
    ($($arg:tt)*) => {{
        log::trace!("[tick {}] {}", $crate::current_tick(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message tagged with the current tick.
#[macro_export]
macro_rules! fetcher_debug {
    ($($arg:tt)*) => {{
        log::debug!("[tick {}] {}", $crate::current_tick(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message tagged with the current tick.
#[macro_export]
macro_rules! fetcher_info {
    ($($arg:tt)*) => {{
        log::info!("[tick {}] {}", $crate::current_tick(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message tagged with the current tick.
#[macro_export]
macro_rules! fetcher_warn {
    ($($arg:tt)*) => {{
        log::warn!("[tick {}] {}", $crate::current_tick(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message tagged with the current tick.
#[macro_export]
macro_rules! fetcher_error {
    ($($arg:tt)*) => {{
        log::error!("[tick {}] {}", $crate::current_tick(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_is_visible_from_other_threads() {
        set_current_tick(7);
        assert_eq!(current_tick(), 7);

        let other = std::thread::spawn(current_tick).join().unwrap();
        assert_eq!(other, 7);
    }
}
