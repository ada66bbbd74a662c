//! RSSI to Distance Estimation
//!
//! ## Model
//!
//! The log-distance path-loss model:
//!
//! ```text
//! distance = 10 ^ ((measured_power_1m - rssi) / (10 × n))
//! ```
//!
//! With the defaults (-69 dBm at 1 m, n = 2.0):
//!
//! | RSSI (dBm) | Distance (m) |
//! |------------|--------------|
//! | -49        | 0.1          |
//! | -69        | 1.0          |
//! | -83        | 5.0          |
//! | -89        | 10.0         |
//! | -103       | 50.1 → 50.0  |
//!
//! Results are clamped to `[0.1, 50.0]` m. Outside that range the model
//! amplifies noise into meaningless numbers.
//!
//! RSSI `0` is the scanner's "no reading" sentinel. It skips the formula
//! (which would report a few centimetres) and its own confidence tier.
//!
//! ## Confidence
//!
//! Two step functions, one over RSSI and one over the clamped distance,
//! combined as `0.7 × rssi_tier + 0.3 × distance_tier` and clamped to
//! `[0, 1]`. Strong signals are both less noisy and less sensitive to the
//! exponent, so the ladder rewards them twice.
//!
//! ```rust
//! use bluefind_core::distance::{DistanceEstimator, DistanceBucket};
//!
//! let estimator = DistanceEstimator::default();
//! let estimate = estimator.estimate(-69);
//! assert!((estimate.distance_m - 1.0).abs() < 1e-4);
//! assert_eq!(estimate.bucket, DistanceBucket::Close);
//! ```

use crate::config::PathLossConfig;
use crate::constants::distance::*;

/// Descriptive distance bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceBucket {
    /// ≤ 0.5 m
    VeryClose,
    /// ≤ 1 m
    Close,
    /// ≤ 2 m
    Nearby,
    /// ≤ 4 m
    MediumDistance,
    /// ≤ 8 m
    Far,
    /// ≤ 15 m
    VeryFar,
    /// > 15 m
    ExtremelyFar,
}

/// Upper bound (m, inclusive) of each bucket except the last
const BUCKET_BOUNDS_M: [(f32, DistanceBucket); 6] = [
    (0.5, DistanceBucket::VeryClose),
    (1.0, DistanceBucket::Close),
    (2.0, DistanceBucket::Nearby),
    (4.0, DistanceBucket::MediumDistance),
    (8.0, DistanceBucket::Far),
    (15.0, DistanceBucket::VeryFar),
];

/// Accuracy bands: `(maximum metres, label)`
const ACCURACY_BANDS: [(f32, &str); 4] = [
    (1.0, "±0.2m"),
    (3.0, "±0.5m"),
    (8.0, "±1.0m"),
    (15.0, "±2.0m"),
];

const ACCURACY_FAR: &str = "±5.0m";

impl DistanceBucket {
    /// All buckets, nearest first
    pub const ALL: [DistanceBucket; 7] = [
        DistanceBucket::VeryClose,
        DistanceBucket::Close,
        DistanceBucket::Nearby,
        DistanceBucket::MediumDistance,
        DistanceBucket::Far,
        DistanceBucket::VeryFar,
        DistanceBucket::ExtremelyFar,
    ];

    /// Bucket for a distance in metres
    pub fn from_distance(distance_m: f32) -> Self {
        BUCKET_BOUNDS_M
            .iter()
            .find(|(bound, _)| distance_m <= *bound)
            .map(|(_, bucket)| *bucket)
            .unwrap_or(DistanceBucket::ExtremelyFar)
    }

    /// Human-readable label
    pub const fn label(&self) -> &'static str {
        match self {
            DistanceBucket::VeryClose => "Very Close",
            DistanceBucket::Close => "Close",
            DistanceBucket::Nearby => "Nearby",
            DistanceBucket::MediumDistance => "Medium Distance",
            DistanceBucket::Far => "Far",
            DistanceBucket::VeryFar => "Very Far",
            DistanceBucket::ExtremelyFar => "Extremely Far",
        }
    }

    /// Position in [`DistanceBucket::ALL`]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

/// Distance estimate for a single RSSI reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DistanceEstimate {
    /// Clamped distance in metres
    pub distance_m: f32,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Descriptive bucket
    pub bucket: DistanceBucket,
    /// Accuracy range, e.g. "±0.5m"
    pub accuracy: &'static str,
}

impl DistanceEstimate {
    /// Bucket label, e.g. "Medium Distance"
    pub fn label(&self) -> &'static str {
        self.bucket.label()
    }
}

/// One-step movement hint from two consecutive readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementSuggestion {
    /// Signal rose by more than 5 dB
    GettingCloser,
    /// Signal fell by more than 5 dB
    GettingFarther,
    /// Signal within ±2 dB
    StayPut,
    /// No previous reading yet
    StartMoving,
    /// Change between 2 and 5 dB either way
    MinorChange,
}

/// Coarse signal strength shown next to a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalStrength {
    /// ≥ -50 dBm
    Strong,
    /// ≥ -70 dBm
    Medium,
    /// ≥ -90 dBm
    Weak,
    /// < -90 dBm
    VeryWeak,
    /// Unknown-RSSI sentinel
    Unknown,
}

impl SignalStrength {
    /// Strength tier for an RSSI reading
    pub fn from_rssi(rssi: i32) -> Self {
        match rssi {
            UNKNOWN_RSSI => SignalStrength::Unknown,
            r if r >= -50 => SignalStrength::Strong,
            r if r >= -70 => SignalStrength::Medium,
            r if r >= -90 => SignalStrength::Weak,
            _ => SignalStrength::VeryWeak,
        }
    }

    /// Normalized strength for progress bars
    pub const fn quality(&self) -> f32 {
        match self {
            SignalStrength::Strong => 1.0,
            SignalStrength::Medium => 0.75,
            SignalStrength::Weak => 0.5,
            SignalStrength::VeryWeak => 0.25,
            SignalStrength::Unknown => 0.0,
        }
    }

    /// Human-readable label
    pub const fn label(&self) -> &'static str {
        match self {
            SignalStrength::Strong => "Strong",
            SignalStrength::Medium => "Medium",
            SignalStrength::Weak => "Weak",
            SignalStrength::VeryWeak => "Very Weak",
            SignalStrength::Unknown => "Unknown",
        }
    }
}

/// Path-loss distance estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEstimator {
    model: PathLossConfig,
}

impl DistanceEstimator {
    /// Estimator using `model`
    ///
    /// The model is expected to have passed [`crate::FinderConfig::validate`].
    pub fn new(model: PathLossConfig) -> Self {
        Self { model }
    }

    /// Model in use
    pub fn model(&self) -> &PathLossConfig {
        &self.model
    }

    /// Estimate distance, confidence and bucket for one RSSI reading
    ///
    /// Total over `i32`: the sentinel `0` maps to the configured default
    /// distance and positive (invalid) readings clamp to the minimum.
    pub fn estimate(&self, rssi: i32) -> DistanceEstimate {
        let distance_m = self.distance_m(rssi);

        DistanceEstimate {
            distance_m,
            confidence: combined_confidence(rssi, distance_m),
            bucket: DistanceBucket::from_distance(distance_m),
            accuracy: accuracy_label(distance_m),
        }
    }

    /// Clamped distance in metres
    pub fn distance_m(&self, rssi: i32) -> f32 {
        let m = &self.model;
        let raw = if rssi == UNKNOWN_RSSI {
            m.unknown_rssi_distance_m
        } else {
            let exponent = (m.measured_power_dbm - rssi as f32) / (10.0 * m.path_loss_exponent);
            libm::powf(10.0, exponent)
        };

        // NaN only if the model itself is broken; report the far bound then.
        if raw.is_nan() {
            return m.max_distance_m;
        }
        raw.clamp(m.min_distance_m, m.max_distance_m)
    }
}

/// RSSI confidence tier
pub fn rssi_confidence(rssi: i32) -> f32 {
    if rssi == UNKNOWN_RSSI {
        return UNKNOWN_RSSI_CONFIDENCE;
    }

    RSSI_CONFIDENCE_TIERS
        .iter()
        .find(|(min_dbm, _)| rssi >= *min_dbm)
        .map(|(_, confidence)| *confidence)
        .unwrap_or(RSSI_CONFIDENCE_FLOOR)
}

/// Distance confidence tier
pub fn distance_confidence(distance_m: f32) -> f32 {
    DISTANCE_CONFIDENCE_TIERS
        .iter()
        .find(|(max_m, _)| distance_m <= *max_m)
        .map(|(_, confidence)| *confidence)
        .unwrap_or(DISTANCE_CONFIDENCE_FLOOR)
}

/// Weighted combination of both tiers, clamped to [0, 1]
pub fn combined_confidence(rssi: i32, distance_m: f32) -> f32 {
    let combined = rssi_confidence(rssi) * RSSI_CONFIDENCE_WEIGHT
        + distance_confidence(distance_m) * DISTANCE_CONFIDENCE_WEIGHT;
    combined.clamp(0.0, 1.0)
}

/// Accuracy range label for a distance
pub fn accuracy_label(distance_m: f32) -> &'static str {
    ACCURACY_BANDS
        .iter()
        .find(|(max_m, _)| distance_m <= *max_m)
        .map(|(_, label)| *label)
        .unwrap_or(ACCURACY_FAR)
}

/// Movement hint from the current and previous reading
///
/// Operates on two scalars only; the history-based trend lives in
/// [`crate::tracker`].
pub fn movement_suggestion(current: i32, previous: Option<i32>) -> MovementSuggestion {
    let Some(previous) = previous else {
        return MovementSuggestion::StartMoving;
    };

    let delta = current.saturating_sub(previous);
    if delta > MOVEMENT_CHANGE_DB {
        MovementSuggestion::GettingCloser
    } else if delta < -MOVEMENT_CHANGE_DB {
        MovementSuggestion::GettingFarther
    } else if delta.abs() <= MOVEMENT_STILL_DB {
        MovementSuggestion::StayPut
    } else {
        MovementSuggestion::MinorChange
    }
}

/// Advisory rescan interval for a device at `distance_m`
///
/// Near devices change faster relative to their distance, so they are
/// polled more often. Consumed by the scanning layer, not by the core.
pub fn optimal_scan_interval_ms(distance_m: f32) -> u64 {
    SCAN_INTERVAL_TIERS
        .iter()
        .find(|(max_m, _)| distance_m <= *max_m)
        .map(|(_, interval)| *interval)
        .unwrap_or(SCAN_INTERVAL_FAR_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn unknown_rssi_uses_default_distance() {
        let estimate = DistanceEstimator::default().estimate(0);
        assert_eq!(estimate.distance_m, 20.0);
        assert_eq!(estimate.bucket, DistanceBucket::ExtremelyFar);
        // floor RSSI tier (0.35) and >15 m distance tier (0.5)
        assert!(approx(estimate.confidence, 0.35 * 0.7 + 0.5 * 0.3));
        assert_eq!(estimate.accuracy, "±5.0m");
    }

    #[test]
    fn one_metre_reference() {
        let estimate = DistanceEstimator::default().estimate(-69);
        assert!(approx(estimate.distance_m, 1.0));
        assert_eq!(estimate.bucket, DistanceBucket::Close);
        assert_eq!(estimate.accuracy, "±0.2m");
        // -69 sits in the >= -70 tier
        assert!(approx(estimate.confidence, 0.75 * 0.7 + 0.9 * 0.3));
    }

    #[test]
    fn clamps_both_ends() {
        let estimator = DistanceEstimator::default();
        assert_eq!(estimator.estimate(-20).distance_m, 0.1);
        assert_eq!(estimator.estimate(25).distance_m, 0.1);
        assert_eq!(estimator.estimate(-120).distance_m, 50.0);
        assert_eq!(estimator.estimate(i32::MIN).distance_m, 50.0);
        assert_eq!(estimator.estimate(i32::MAX).distance_m, 0.1);
    }

    #[test]
    fn rssi_tiers() {
        assert_eq!(rssi_confidence(-50), 0.95);
        assert_eq!(rssi_confidence(-51), 0.85);
        assert_eq!(rssi_confidence(-100), 0.45);
        assert_eq!(rssi_confidence(-101), 0.35);
        assert_eq!(rssi_confidence(0), UNKNOWN_RSSI_CONFIDENCE);
    }

    #[test]
    fn distance_buckets() {
        assert_eq!(DistanceBucket::from_distance(0.5), DistanceBucket::VeryClose);
        assert_eq!(DistanceBucket::from_distance(0.51), DistanceBucket::Close);
        assert_eq!(DistanceBucket::from_distance(3.9), DistanceBucket::MediumDistance);
        assert_eq!(DistanceBucket::from_distance(15.0), DistanceBucket::VeryFar);
        assert_eq!(DistanceBucket::from_distance(15.1), DistanceBucket::ExtremelyFar);
        assert_eq!(DistanceBucket::MediumDistance.label(), "Medium Distance");
    }

    #[test]
    fn movement_hints() {
        assert_eq!(movement_suggestion(-60, None), MovementSuggestion::StartMoving);
        assert_eq!(movement_suggestion(-60, Some(-70)), MovementSuggestion::GettingCloser);
        assert_eq!(movement_suggestion(-70, Some(-60)), MovementSuggestion::GettingFarther);
        assert_eq!(movement_suggestion(-60, Some(-62)), MovementSuggestion::StayPut);
        assert_eq!(movement_suggestion(-60, Some(-64)), MovementSuggestion::MinorChange);
        assert_eq!(movement_suggestion(-60, Some(-55)), MovementSuggestion::MinorChange);
    }

    #[test]
    fn scan_interval_tiers() {
        assert_eq!(optimal_scan_interval_ms(0.8), 1_000);
        assert_eq!(optimal_scan_interval_ms(5.0), 3_000);
        assert_eq!(optimal_scan_interval_ms(40.0), 10_000);
    }

    #[test]
    fn signal_strength_tiers() {
        assert_eq!(SignalStrength::from_rssi(-45), SignalStrength::Strong);
        assert_eq!(SignalStrength::from_rssi(-70), SignalStrength::Medium);
        assert_eq!(SignalStrength::from_rssi(-91), SignalStrength::VeryWeak);
        assert_eq!(SignalStrength::from_rssi(0).quality(), 0.0);
    }
}
