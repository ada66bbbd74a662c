//! Guidance Synthesis
//!
//! Turns the current RSSI, the device's history and the phone heading into
//! one user-facing [`Guidance`] value. Nothing here keeps state; every call
//! recomputes from its inputs.
//!
//! ## Decision Structure
//!
//! ```text
//! rssi ──► DistanceEstimator ──► bucket ─┐
//!                                        ├─► SUGGESTIONS[bucket][trend]
//! history ──► trend ─────────────────────┘
//!
//! rssi ──► ProximityZone (8 breakpoints, top-down) ──► glyph
//!
//! strongest sample heading ─┐
//!                           ├─► (remembered - current + 360) mod 360 ──► octant
//! current heading ──────────┘
//! ```
//!
//! Distance dominates and trend refines: every row of the suggestion table
//! is a single distance bucket, and the `Unknown` column holds the
//! bucket-only text.

use crate::constants::guidance::{OCTANT_BOUNDS_DEG, ZONE_BREAKPOINTS_DBM};
use crate::constants::UNKNOWN_RSSI;
use crate::distance::{optimal_scan_interval_ms, DistanceBucket, DistanceEstimate, DistanceEstimator};
use crate::heading::normalize_degrees;
use crate::tracker::{MovementTrend, SignalQuality, TrackerSnapshot};

/// Fine-grained RSSI zone driving the glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProximityZone {
    /// ≥ -45 dBm
    VeryClose,
    /// ≥ -55 dBm
    Close,
    /// ≥ -65 dBm
    Near,
    /// ≥ -75 dBm
    Medium,
    /// ≥ -85 dBm
    MediumFar,
    /// ≥ -95 dBm
    Far,
    /// ≥ -105 dBm
    Distant,
    /// < -105 dBm, or no reading
    VeryFar,
}

/// Zones matching [`ZONE_BREAKPOINTS_DBM`] entry by entry
const BREAKPOINT_ZONES: [ProximityZone; 7] = [
    ProximityZone::VeryClose,
    ProximityZone::Close,
    ProximityZone::Near,
    ProximityZone::Medium,
    ProximityZone::MediumFar,
    ProximityZone::Far,
    ProximityZone::Distant,
];

impl ProximityZone {
    /// Zone for an RSSI reading; first matching breakpoint wins
    pub fn from_rssi(rssi: i32) -> Self {
        if rssi == UNKNOWN_RSSI {
            return ProximityZone::VeryFar;
        }

        ZONE_BREAKPOINTS_DBM
            .iter()
            .zip(BREAKPOINT_ZONES.iter())
            .find(|(min_dbm, _)| rssi >= **min_dbm)
            .map(|(_, zone)| *zone)
            .unwrap_or(ProximityZone::VeryFar)
    }

    /// Glyph shown next to the device
    pub const fn glyph(&self) -> &'static str {
        match self {
            ProximityZone::VeryClose => "🎯",
            ProximityZone::Close => "📍",
            ProximityZone::Near => "🔍",
            ProximityZone::Medium => "👀",
            ProximityZone::MediumFar => "🔭",
            ProximityZone::Far => "🔎",
            ProximityZone::Distant => "🏃",
            ProximityZone::VeryFar => "🚶",
        }
    }
}

/// Where the device is relative to the way the phone points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelativeDirection {
    /// [330, 360) ∪ [0, 30)
    Ahead,
    /// [30, 60)
    SlightlyRight,
    /// [60, 120)
    Right,
    /// [120, 150)
    BehindRight,
    /// [150, 210)
    Behind,
    /// [210, 240)
    BehindLeft,
    /// [240, 300)
    Left,
    /// [300, 330)
    SlightlyLeft,
}

/// Octants matching [`OCTANT_BOUNDS_DEG`] entry by entry
const BOUND_OCTANTS: [RelativeDirection; 8] = [
    RelativeDirection::Ahead,
    RelativeDirection::SlightlyRight,
    RelativeDirection::Right,
    RelativeDirection::BehindRight,
    RelativeDirection::Behind,
    RelativeDirection::BehindLeft,
    RelativeDirection::Left,
    RelativeDirection::SlightlyLeft,
];

const NO_DIRECTION_TEXT: &str = "🔄 Move around to determine direction";

impl RelativeDirection {
    /// Octant for a clockwise offset in degrees (any value, wrapped)
    pub fn from_offset(offset_deg: f32) -> Self {
        let diff = normalize_degrees(offset_deg);
        OCTANT_BOUNDS_DEG
            .iter()
            .zip(BOUND_OCTANTS.iter())
            .find(|(upper, _)| diff < **upper)
            .map(|(_, octant)| *octant)
            // [330, 360) and non-finite input
            .unwrap_or(RelativeDirection::Ahead)
    }

    /// Octant of a remembered bearing seen from the current heading
    pub fn between(remembered_deg: f32, current_deg: f32) -> Self {
        Self::from_offset(remembered_deg - current_deg + 360.0)
    }

    /// Instruction text
    pub const fn text(&self) -> &'static str {
        match self {
            RelativeDirection::Ahead => "📍 Device is straight ahead",
            RelativeDirection::SlightlyRight => "↗️ Device is slightly to the right",
            RelativeDirection::Right => "➡️ Device is to the right",
            RelativeDirection::BehindRight => "↘️ Device is behind and to the right",
            RelativeDirection::Behind => "⬇️ Device is behind you",
            RelativeDirection::BehindLeft => "↙️ Device is behind and to the left",
            RelativeDirection::Left => "⬅️ Device is to the left",
            RelativeDirection::SlightlyLeft => "↖️ Device is slightly to the left",
        }
    }
}

/// Suggestion text by distance bucket (rows, nearest first) and trend
/// (columns in [`MovementTrend::ALL`] order)
const SUGGESTIONS: [[&str; 4]; 7] = [
    [
        "Almost there - keep going!",
        "You just passed it - step back",
        "It's right here - look around you",
        "Very close - you're almost on top of it!",
    ],
    [
        "Getting closer - look around carefully",
        "Moving away - turn back slowly",
        "Close by - search the immediate area",
        "Close - look around carefully",
    ],
    [
        "Getting closer - keep going",
        "Moving away - try another direction",
        "Nearby - scan the area around you",
        "Nearby - scan the area",
    ],
    [
        "Signal improving - keep going",
        "Signal weakening - try a different direction",
        "No change - walk a few steps and watch the signal",
        "Medium distance - search a wider area",
    ],
    [
        "Signal improving - keep heading this way",
        "Signal weakening - turn around",
        "No change - move around to find the signal",
        "Far - move around to get closer",
    ],
    [
        "Heading the right way - keep walking",
        "Walking away - turn around",
        "No change - try another room",
        "Very far - start walking in any direction",
    ],
    [
        "Signal picked up - keep walking",
        "Losing the signal - go back",
        "Barely detectable - change location",
        "Extremely far - start walking in any direction",
    ],
];

/// Suggestion for a bucket and trend
pub fn suggestion(bucket: DistanceBucket, trend: MovementTrend) -> &'static str {
    SUGGESTIONS[bucket.index()][trend.index()]
}

/// Everything the presentation layer shows for one device
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Guidance {
    /// Reading the guidance was computed for
    pub rssi: i32,
    /// Distance, bucket and accuracy
    pub distance: DistanceEstimate,
    /// Fine-grained RSSI zone
    pub zone: ProximityZone,
    /// History-based movement trend
    pub trend: MovementTrend,
    /// History-based signal stability
    pub quality: SignalQuality,
    /// Same as `distance.confidence`
    pub confidence: f32,
    /// What the user should do next
    pub suggestion: &'static str,
    /// Zone glyph
    pub glyph: &'static str,
    /// Relative direction, once a bearing is known
    pub direction: Option<RelativeDirection>,
    /// Direction instruction, or a prompt to move around
    pub direction_text: &'static str,
    /// Advisory rescan interval for this distance (ms)
    pub scan_interval_ms: u64,
}

/// Combines distance, trend and heading into [`Guidance`]
#[derive(Debug, Clone, Copy, Default)]
pub struct GuidanceSynthesizer {
    estimator: DistanceEstimator,
}

impl GuidanceSynthesizer {
    /// Synthesizer using `estimator` for the distance part
    pub fn new(estimator: DistanceEstimator) -> Self {
        Self { estimator }
    }

    /// Distance estimator in use
    pub fn estimator(&self) -> &DistanceEstimator {
        &self.estimator
    }

    /// Guidance for `device_id` at `rssi`
    ///
    /// `tracker` supplies trend, quality and remembered bearing. An unseen
    /// device yields `Unknown` trend and no direction. `heading_deg` is the
    /// current smoothed phone heading.
    pub fn synthesize(
        &self,
        device_id: &str,
        rssi: i32,
        tracker: &TrackerSnapshot,
        heading_deg: f32,
    ) -> Guidance {
        let distance = self.estimator.estimate(rssi);
        let zone = ProximityZone::from_rssi(rssi);
        let trend = tracker.trend(device_id);
        let direction = tracker
            .estimated_bearing(device_id)
            .map(|bearing| RelativeDirection::between(bearing, heading_deg));

        Guidance {
            rssi,
            distance,
            zone,
            trend,
            quality: tracker.signal_quality(device_id),
            confidence: distance.confidence,
            suggestion: suggestion(distance.bucket, trend),
            glyph: zone.glyph(),
            direction,
            direction_text: direction.map_or(NO_DIRECTION_TEXT, |d| d.text()),
            scan_interval_ms: optimal_scan_interval_ms(distance.distance_m),
        }
    }
}
