//! Constants for BlueFind Core
//!
//! Every numeric threshold used by the estimation pipeline lives here, with
//! units in the name and a note on where the value comes from.
//!
//! ## Organization
//!
//! - **Distance**: path-loss model parameters, clamp bounds, confidence ladders
//! - **Tracking**: history bounds and trend/quality thresholds
//! - **Heading**: smoothing buffer sizes and sensor-fusion rejection limits
//! - **Guidance**: proximity zone breakpoints and direction octants

/// Path-loss model parameters, clamp bounds and confidence tiers.
pub mod distance;

/// Per-device RSSI history bounds and trend thresholds.
pub mod tracking;

/// Compass heading fusion and smoothing parameters.
pub mod heading;

/// Proximity zone breakpoints and relative direction octants.
pub mod guidance;

// Re-export commonly used constants for convenience
pub use distance::{
    MEASURED_POWER_AT_1M_DBM, PATH_LOSS_EXPONENT, UNKNOWN_RSSI, UNKNOWN_RSSI_DISTANCE_M,
    MIN_DISTANCE_M, MAX_DISTANCE_M,
};

pub use tracking::{
    MAX_HISTORY_SAMPLES, HISTORY_WINDOW_MS, MIN_TREND_SAMPLES, TREND_WINDOW, TREND_THRESHOLD_DB,
};

pub use heading::{HEADING_BUFFER_SIZE, MIN_SMOOTHING_SAMPLES};

pub use guidance::ZONE_BREAKPOINTS_DBM;
