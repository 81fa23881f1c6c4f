//! Cross-cutting instrumentation, called at defined scan events.
//!
//! Replaces the debug-macro variants that would otherwise proliferate
//! near-duplicate scan loops: tracing is an orthogonal concern, so it's a
//! trait the scanner calls into rather than a compile-time verbosity knob.

use crate::slope::Slope;

/// Hook called at each notable event during a scan. All methods default to
/// a no-op, so implementing just the ones a consumer cares about is enough.
pub trait ScanObserver {
    fn slope_token(&mut self, index: usize, token: Slope) {
        let _ = (index, token);
    }
    fn push_prev(&mut self, index: usize) {
        let _ = index;
    }
    fn open_plateau(&mut self, index: usize) {
        let _ = index;
    }
    fn close_plateau(&mut self, start: usize, end: usize) {
        let _ = (start, end);
    }
    fn emit_peak(&mut self, index: usize, winsize: u32) {
        let _ = (index, winsize);
    }
}

/// The default observer: every hook is a no-op, optimised away entirely.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ScanObserver for NullObserver {}

/// Forwards every scan event to the `log` facade at `trace` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl ScanObserver for LoggingObserver {
    fn slope_token(&mut self, index: usize, token: Slope) {
        log::trace!("slope[{index}] = {token:?}");
    }

    fn push_prev(&mut self, index: usize) {
        log::trace!("prev_stack <- {index}");
    }

    fn open_plateau(&mut self, index: usize) {
        log::trace!("plateau open at {index}");
    }

    fn close_plateau(&mut self, start: usize, end: usize) {
        log::trace!("plateau closed [{start}, {end}]");
    }

    fn emit_peak(&mut self, index: usize, winsize: u32) {
        log::trace!("peak at {index}, winsize {winsize}");
    }
}
