//! Path-Loss Model Parameters
//!
//! The log-distance path-loss model relates received power to distance:
//!
//! ```text
//! d = 10 ^ ((P_1m - RSSI) / (10 × n))
//! ```
//!
//! Values below are typical for BLE beacons indoors.

// ===== PATH-LOSS MODEL =====

/// Received power at one metre from the transmitter (dBm).
///
/// Most iBeacon-style advertisers calibrate "measured power" between
/// -59 and -75 dBm; -69 dBm is the common midpoint.
pub const MEASURED_POWER_AT_1M_DBM: f32 = -69.0;

/// Path-loss exponent (dimensionless).
///
/// 2.0 is free space. Cluttered rooms sit between 2.7 and 4.0.
pub const PATH_LOSS_EXPONENT: f32 = 2.0;

/// RSSI sentinel reported by scanners that have no reading.
pub const UNKNOWN_RSSI: i32 = 0;

/// Distance reported for the unknown-RSSI sentinel (metres).
pub const UNKNOWN_RSSI_DISTANCE_M: f32 = 20.0;

/// Lower clamp for estimated distance (metres).
pub const MIN_DISTANCE_M: f32 = 0.1;

/// Upper clamp for estimated distance (metres).
///
/// Beyond this the exponential model says nothing useful indoors.
pub const MAX_DISTANCE_M: f32 = 50.0;

// ===== CONFIDENCE =====

/// Weight of the RSSI tier in the combined confidence.
pub const RSSI_CONFIDENCE_WEIGHT: f32 = 0.7;

/// Weight of the distance tier in the combined confidence.
pub const DISTANCE_CONFIDENCE_WEIGHT: f32 = 0.3;

/// RSSI confidence ladder: `(minimum dBm, confidence)`, evaluated top-down.
pub const RSSI_CONFIDENCE_TIERS: [(i32, f32); 6] = [
    (-50, 0.95),
    (-60, 0.85),
    (-70, 0.75),
    (-80, 0.65),
    (-90, 0.55),
    (-100, 0.45),
];

/// Confidence below the last RSSI tier.
pub const RSSI_CONFIDENCE_FLOOR: f32 = 0.35;

/// Confidence assigned to the unknown-RSSI sentinel.
///
/// "No reading" gets the floor tier, not the tier its magnitude would pick.
pub const UNKNOWN_RSSI_CONFIDENCE: f32 = RSSI_CONFIDENCE_FLOOR;

/// Distance confidence ladder: `(maximum metres, confidence)`, evaluated top-down.
pub const DISTANCE_CONFIDENCE_TIERS: [(f32, f32); 4] = [
    (1.0, 0.9),
    (3.0, 0.8),
    (8.0, 0.7),
    (15.0, 0.6),
];

/// Confidence beyond the last distance tier.
pub const DISTANCE_CONFIDENCE_FLOOR: f32 = 0.5;

// ===== MOVEMENT SUGGESTION =====

/// RSSI change (dB) between two readings that counts as a real move.
pub const MOVEMENT_CHANGE_DB: i32 = 5;

/// RSSI change (dB) small enough to tell the user to hold still.
pub const MOVEMENT_STILL_DB: i32 = 2;

// ===== SCAN CADENCE =====

/// Advisory rescan interval by distance: `(maximum metres, interval ms)`.
pub const SCAN_INTERVAL_TIERS: [(f32, u64); 4] = [
    (1.0, 1_000),
    (3.0, 2_000),
    (8.0, 3_000),
    (15.0, 5_000),
];

/// Rescan interval beyond the last tier (ms).
pub const SCAN_INTERVAL_FAR_MS: u64 = 10_000;
