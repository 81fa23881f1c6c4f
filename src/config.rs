//! Configuration surface for [`crate::Scanner`] and [`crate::detect_peaks`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a scan should treat non-finite samples.
///
/// Currently only one policy exists — `NaN` compares as flat, infinities
/// compare conventionally — but this is kept as an enum rather than baked
/// silently into the scanner so the API can grow a stricter policy later
/// without a breaking change to [`DetectorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NanPolicy {
    #[default]
    TreatAsFlat,
}

/// Bundles the knobs a scan accepts.
///
/// Small on purpose: there is no file format or environment variable layer
/// at this level, just a plain struct a host application can fold into its
/// own configuration however it likes (optionally via `serde`, behind the
/// `serde` feature).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorConfig {
    /// Upper bound on a peak's symmetric half-window size. `None` means
    /// unbounded. Negative values are rejected by the scanner with
    /// [`crate::PeakError::NegativeCap`] rather than silently clamped.
    pub cap_win_size: Option<i64>,
    pub nan_policy: NanPolicy,
}

impl DetectorConfig {
    pub fn new() -> Self {
        DetectorConfig::default()
    }

    pub fn with_cap(mut self, cap_win_size: i64) -> Self {
        self.cap_win_size = Some(cap_win_size);
        self
    }
}
