use thiserror::Error;

/// Failure modes surfaced by [`crate::detect_peaks`] and [`crate::Scanner`].
///
/// A negative cap is the only recoverable error the scanner can produce; it
/// is checked before any scratch buffer is allocated. Non-finite samples
/// (`NaN`) are not an error — see the crate-level docs for the comparison
/// policy applied to them.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PeakError {
    #[error("cap_win_size must be non-negative (got {0})")]
    NegativeCap(i64),
}

pub type Result<T> = std::result::Result<T, PeakError>;
