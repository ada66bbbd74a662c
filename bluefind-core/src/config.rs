//! Estimation pipeline configuration
//!
//! Defaults reproduce the constants in [`crate::constants`]. Every component
//! is built from a validated [`FinderConfig`]; `validate()` is the only place
//! a bad tunable is reported.

use crate::constants::{distance, heading, tracking};
use crate::errors::{FinderError, FinderResult};

/// How the "recent" and "older" averaging windows are cut from a history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrendWindowing {
    /// Histories of at most `trend_window` samples compare their first and
    /// second halves (`ceil(len / 2)` each). Longer histories use the first
    /// and last `trend_window` samples, exactly as `Overlapping` does.
    #[default]
    Adaptive,
    /// Always the first and last `trend_window` samples. Up to
    /// `trend_window` samples both windows cover the whole history.
    Overlapping,
}

/// Log-distance path-loss model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PathLossConfig {
    /// RSSI at one metre (dBm)
    pub measured_power_dbm: f32,
    /// Path-loss exponent
    pub path_loss_exponent: f32,
    /// Distance reported for the unknown-RSSI sentinel (m)
    pub unknown_rssi_distance_m: f32,
    /// Lower distance clamp (m)
    pub min_distance_m: f32,
    /// Upper distance clamp (m)
    pub max_distance_m: f32,
}

impl Default for PathLossConfig {
    fn default() -> Self {
        Self {
            measured_power_dbm: distance::MEASURED_POWER_AT_1M_DBM,
            path_loss_exponent: distance::PATH_LOSS_EXPONENT,
            unknown_rssi_distance_m: distance::UNKNOWN_RSSI_DISTANCE_M,
            min_distance_m: distance::MIN_DISTANCE_M,
            max_distance_m: distance::MAX_DISTANCE_M,
        }
    }
}

/// Per-device history policy
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrackingConfig {
    /// Samples kept per device, at most [`tracking::MAX_HISTORY_SAMPLES`]
    pub max_samples: usize,
    /// Oldest sample age kept, relative to insert time (ms)
    pub max_age_ms: u64,
    /// Mean RSSI shift (dB) that counts as approaching/receding
    pub trend_threshold_db: f32,
    /// Samples per averaging window
    pub trend_window: usize,
    /// Window cutting policy
    pub windowing: TrendWindowing,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_samples: tracking::MAX_HISTORY_SAMPLES,
            max_age_ms: tracking::HISTORY_WINDOW_MS,
            trend_threshold_db: tracking::TREND_THRESHOLD_DB,
            trend_window: tracking::TREND_WINDOW,
            windowing: TrendWindowing::default(),
        }
    }
}

/// Heading smoother policy
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeadingConfig {
    /// Buffered headings needed before averaging (1..=buffer size)
    pub min_smoothing_samples: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            min_smoothing_samples: heading::MIN_SMOOTHING_SAMPLES,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FinderConfig {
    /// RSSI to distance conversion
    pub path_loss: PathLossConfig,
    /// Device history and trend
    pub tracking: TrackingConfig,
    /// Compass smoothing
    pub heading: HeadingConfig,
}

impl FinderConfig {
    /// Check every tunable, returning the first violation
    pub fn validate(&self) -> FinderResult<()> {
        let p = &self.path_loss;
        if !p.measured_power_dbm.is_finite() {
            return Err(invalid("measured power must be finite"));
        }
        if !(p.path_loss_exponent.is_finite() && p.path_loss_exponent > 0.0) {
            return Err(invalid("path-loss exponent must be positive"));
        }
        if !(p.min_distance_m.is_finite() && p.min_distance_m > 0.0) {
            return Err(invalid("minimum distance must be positive"));
        }
        if !(p.max_distance_m.is_finite() && p.max_distance_m >= p.min_distance_m) {
            return Err(invalid("maximum distance must not be below minimum"));
        }
        if !(p.unknown_rssi_distance_m >= p.min_distance_m
            && p.unknown_rssi_distance_m <= p.max_distance_m)
        {
            return Err(invalid("unknown-RSSI distance must lie within the clamp bounds"));
        }

        let t = &self.tracking;
        if t.max_samples == 0 || t.max_samples > tracking::MAX_HISTORY_SAMPLES {
            return Err(invalid("max samples must be within 1..=20"));
        }
        if t.max_age_ms == 0 {
            return Err(invalid("history age window must be non-zero"));
        }
        if !(t.trend_threshold_db.is_finite() && t.trend_threshold_db >= 0.0) {
            return Err(invalid("trend threshold must be non-negative"));
        }
        if t.trend_window == 0 {
            return Err(invalid("trend window must be non-zero"));
        }

        let h = &self.heading;
        if h.min_smoothing_samples == 0 || h.min_smoothing_samples > heading::HEADING_BUFFER_SIZE {
            return Err(invalid("smoothing threshold must be within 1..=10"));
        }

        Ok(())
    }
}

fn invalid(reason: &'static str) -> FinderError {
    FinderError::InvalidConfig { reason }
}
