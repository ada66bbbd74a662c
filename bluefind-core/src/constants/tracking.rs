//! RSSI History Bounds and Trend Thresholds

/// Hard capacity of a device history (samples).
///
/// Twenty samples at the usual 1-2 Hz advertising rate covers 10-20 s,
/// inside the age window below.
pub const MAX_HISTORY_SAMPLES: usize = 20;

/// Maximum age of a retained sample relative to insert time (ms).
pub const HISTORY_WINDOW_MS: u64 = 30_000;

/// Samples required before a trend or quality is reported.
pub const MIN_TREND_SAMPLES: usize = 3;

/// Size of the "recent" and "older" averaging windows.
pub const TREND_WINDOW: usize = 5;

/// Mean RSSI difference (dB) that separates a trend from noise.
pub const TREND_THRESHOLD_DB: f32 = 2.0;

/// Samples used for the variance in the signal quality metric.
pub const QUALITY_VARIANCE_SAMPLES: usize = 10;

/// Variance limit (dB²) for `SignalQuality::Stable`.
pub const QUALITY_STABLE_VARIANCE: f32 = 5.0;

/// Recent/older mean shift limit (dB) for `SignalQuality::Stable`.
pub const QUALITY_STABLE_SHIFT_DB: f32 = 3.0;

/// Variance limit (dB²) for `SignalQuality::Moderate`.
pub const QUALITY_MODERATE_VARIANCE: f32 = 10.0;

/// Recent/older mean shift limit (dB) for `SignalQuality::Moderate`.
pub const QUALITY_MODERATE_SHIFT_DB: f32 = 5.0;

/// Variance (dB²) limit for `SignalQuality::Variable`; above is unstable.
pub const QUALITY_VARIABLE_VARIANCE: f32 = 20.0;
