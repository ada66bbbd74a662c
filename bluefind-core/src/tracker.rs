//! Per-Device RSSI History and Movement Trend
//!
//! ## History Policy
//!
//! Each device owns a bounded, chronologically ordered history. On every
//! insert, both limits are enforced:
//!
//! 1. **Age**: entries older than `max_age_ms` relative to the insert time
//!    are dropped (checked per entry, so late-arriving samples are handled)
//! 2. **Count**: the oldest entries are dropped until at most `max_samples`
//!    remain
//!
//! Samples are placed by timestamp, not appended blindly, so a sample that
//! arrives out of order still lands in its chronological slot and the
//! "recent" window really is the most recent.
//!
//! ## Trend
//!
//! ```text
//! history:  [o o o o o ........ r r r r r]
//!            └ older ┘          └ recent ┘
//! Δ = mean(recent) - mean(older)
//! Δ > +2 dB → Approaching
//! Δ < -2 dB → Receding
//! otherwise → Stable
//! ```
//!
//! Fewer than three samples is `Unknown`, which callers must treat as a
//! normal state. See [`TrendWindowing`] for how windows are cut on short
//! histories.
//!
//! ## Sharing
//!
//! The tracker state is an `Arc<TrackerSnapshot>` updated copy-on-write.
//! A reader holding an older snapshot keeps seeing it unchanged; the writer
//! clones only the device record it touches.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::config::{TrackingConfig, TrendWindowing};
use crate::constants::tracking::*;
use crate::time::{age_ms, Timestamp};

/// One RSSI reading as delivered by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SignalSample {
    device_id: String,
    rssi: i32,
    timestamp: Timestamp,
}

impl SignalSample {
    /// New immutable sample
    pub fn new(device_id: impl Into<String>, rssi: i32, timestamp: Timestamp) -> Self {
        Self {
            device_id: device_id.into(),
            rssi,
            timestamp,
        }
    }

    /// Stable device identifier (hardware address)
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Signal strength in dBm
    pub fn rssi(&self) -> i32 {
        self.rssi
    }

    /// Capture time in milliseconds
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Retained history entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistoryEntry {
    /// Signal strength in dBm
    pub rssi: i32,
    /// Capture time in milliseconds
    pub timestamp: Timestamp,
    /// Phone heading when the sample was recorded
    pub heading_deg: f32,
}

/// Movement of the device relative to the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementTrend {
    /// Signal getting stronger
    Approaching,
    /// Signal getting weaker
    Receding,
    /// No significant change
    Stable,
    /// Fewer than three samples
    Unknown,
}

impl MovementTrend {
    /// All trends, in decision-table column order
    pub const ALL: [MovementTrend; 4] = [
        MovementTrend::Approaching,
        MovementTrend::Receding,
        MovementTrend::Stable,
        MovementTrend::Unknown,
    ];

    /// Column in [`MovementTrend::ALL`]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

/// Stability of a device's signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalQuality {
    /// Variance < 5 and mean shift < 3 dB
    Stable,
    /// Variance < 10 and mean shift < 5 dB
    Moderate,
    /// Variance < 20
    Variable,
    /// Anything noisier
    Unstable,
    /// Fewer than three samples
    Unknown,
}

/// Bounded, time-ordered RSSI history of one device
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceHistory {
    // One spare slot: insert first, then truncate.
    entries: heapless::Vec<HistoryEntry, { MAX_HISTORY_SAMPLES + 1 }>,
}

impl DeviceHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert in timestamp order and apply both eviction policies
    ///
    /// Returns the number of evicted entries (the new one included, if it
    /// was already too old).
    pub fn insert(&mut self, entry: HistoryEntry, now: Timestamp, policy: &TrackingConfig) -> usize {
        let before = self.entries.len() + 1;

        // after equal timestamps, so ties keep arrival order
        let pos = self
            .entries
            .iter()
            .rposition(|e| e.timestamp <= entry.timestamp)
            .map_or(0, |i| i + 1);

        // len <= MAX_HISTORY_SAMPLES before insert, so the spare slot is free
        if self.entries.insert(pos, entry).is_err() {
            log_warn!("History full, dropping sample at {} ms", entry.timestamp);
            return 1;
        }

        self.entries
            .retain(|e| age_ms(now, e.timestamp) <= policy.max_age_ms);

        let max = policy.max_samples.min(MAX_HISTORY_SAMPLES);
        while self.entries.len() > max {
            self.entries.remove(0);
        }

        before - self.entries.len()
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No retained entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Newest entry by timestamp
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Entry with the highest RSSI; the earliest wins ties
    pub fn strongest(&self) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .fold(None, |best: Option<&HistoryEntry>, e| match best {
                Some(b) if b.rssi >= e.rssi => Some(b),
                _ => Some(e),
            })
    }

    /// Older and recent averaging windows, `None` below three entries
    fn windows(&self, policy: &TrackingConfig) -> Option<(&[HistoryEntry], &[HistoryEntry])> {
        let len = self.entries.len();
        if len < MIN_TREND_SAMPLES {
            return None;
        }

        let window = match policy.windowing {
            // first and last `trend_window` would be the same samples
            TrendWindowing::Adaptive if len <= policy.trend_window => (len + 1) / 2,
            _ => policy.trend_window.min(len),
        }
        .max(1);

        Some((&self.entries[..window], &self.entries[len - window..]))
    }

    /// Movement trend from the mean RSSI shift between windows
    pub fn trend(&self, policy: &TrackingConfig) -> MovementTrend {
        let Some((older, recent)) = self.windows(policy) else {
            return MovementTrend::Unknown;
        };

        let delta = mean_rssi(recent) - mean_rssi(older);
        if delta > policy.trend_threshold_db {
            MovementTrend::Approaching
        } else if delta < -policy.trend_threshold_db {
            MovementTrend::Receding
        } else {
            MovementTrend::Stable
        }
    }

    /// Stability class from variance and mean shift
    ///
    /// Variance covers the last ten samples, measured around the recent
    /// window's mean.
    pub fn signal_quality(&self, policy: &TrackingConfig) -> SignalQuality {
        let Some((older, recent)) = self.windows(policy) else {
            return SignalQuality::Unknown;
        };

        let recent_mean = mean_rssi(recent);
        let shift = libm::fabsf(recent_mean - mean_rssi(older));

        let tail = &self.entries[self.entries.len().saturating_sub(QUALITY_VARIANCE_SAMPLES)..];
        let variance = tail
            .iter()
            .map(|e| {
                let d = e.rssi as f32 - recent_mean;
                d * d
            })
            .sum::<f32>()
            / tail.len() as f32;

        if variance < QUALITY_STABLE_VARIANCE && shift < QUALITY_STABLE_SHIFT_DB {
            SignalQuality::Stable
        } else if variance < QUALITY_MODERATE_VARIANCE && shift < QUALITY_MODERATE_SHIFT_DB {
            SignalQuality::Moderate
        } else if variance < QUALITY_VARIABLE_VARIANCE {
            SignalQuality::Variable
        } else {
            SignalQuality::Unstable
        }
    }

    /// Phone heading recorded with the strongest sample
    ///
    /// Needs at least three samples; with fewer the peak is just noise.
    pub fn estimated_bearing(&self) -> Option<f32> {
        if self.entries.len() < MIN_TREND_SAMPLES {
            return None;
        }
        self.strongest().map(|e| e.heading_deg)
    }
}

fn mean_rssi(entries: &[HistoryEntry]) -> f32 {
    if entries.is_empty() {
        return 0.0;
    }
    entries.iter().map(|e| e.rssi as f32).sum::<f32>() / entries.len() as f32
}

/// Everything known about one device
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeviceRecord {
    /// Device identifier
    pub id: String,
    /// Bounded RSSI history
    pub history: DeviceHistory,
    /// Earliest sample timestamp seen
    pub first_seen: Timestamp,
    /// Latest sample timestamp seen
    pub last_seen: Timestamp,
    /// RSSI of the most recently delivered sample
    pub last_rssi: i32,
    /// Samples delivered since the device appeared, evicted ones included
    pub total_samples: u64,
}

impl DeviceRecord {
    fn new(id: &str, sample: &SignalSample) -> Self {
        Self {
            id: String::from(id),
            history: DeviceHistory::new(),
            first_seen: sample.timestamp(),
            last_seen: sample.timestamp(),
            last_rssi: sample.rssi(),
            total_samples: 0,
        }
    }
}

/// Immutable view of all tracked devices
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    policy: TrackingConfig,
    devices: BTreeMap<String, Arc<DeviceRecord>>,
}

impl TrackerSnapshot {
    /// Empty snapshot under `policy`
    pub fn new(policy: TrackingConfig) -> Self {
        Self {
            policy,
            devices: BTreeMap::new(),
        }
    }

    /// History policy the snapshot was built with
    pub fn policy(&self) -> &TrackingConfig {
        &self.policy
    }

    /// Record for one device
    pub fn device(&self, device_id: &str) -> Option<&Arc<DeviceRecord>> {
        self.devices.get(device_id)
    }

    /// History for one device
    pub fn history(&self, device_id: &str) -> Option<&DeviceHistory> {
        self.device(device_id).map(|r| &r.history)
    }

    /// Number of devices seen since the last clear
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Devices, strongest last RSSI first, ties by id
    pub fn devices(&self) -> Vec<Arc<DeviceRecord>> {
        let mut list: Vec<_> = self.devices.values().cloned().collect();
        list.sort_by(|a, b| b.last_rssi.cmp(&a.last_rssi).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Movement trend, `Unknown` for unseen devices
    pub fn trend(&self, device_id: &str) -> MovementTrend {
        self.history(device_id)
            .map_or(MovementTrend::Unknown, |h| h.trend(&self.policy))
    }

    /// Signal quality, `Unknown` for unseen devices
    pub fn signal_quality(&self, device_id: &str) -> SignalQuality {
        self.history(device_id)
            .map_or(SignalQuality::Unknown, |h| h.signal_quality(&self.policy))
    }

    /// Heading of the strongest sample, if enough history exists
    pub fn estimated_bearing(&self, device_id: &str) -> Option<f32> {
        self.history(device_id).and_then(DeviceHistory::estimated_bearing)
    }
}

/// Result of recording one sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    /// Entries in the device history after the insert
    pub retained: usize,
    /// Entries evicted by this insert
    pub evicted: usize,
    /// First sample for this device since the last clear
    pub new_device: bool,
}

/// Owner of all device histories
///
/// Single writer. Readers take [`DeviceSignalTracker::snapshot`] and query
/// it without touching the tracker again.
#[derive(Debug, Clone)]
pub struct DeviceSignalTracker {
    state: Arc<TrackerSnapshot>,
}

impl Default for DeviceSignalTracker {
    fn default() -> Self {
        Self::new(TrackingConfig::default())
    }
}

impl DeviceSignalTracker {
    /// Empty tracker under `policy`
    pub fn new(policy: TrackingConfig) -> Self {
        Self {
            state: Arc::new(TrackerSnapshot::new(policy)),
        }
    }

    /// Append a sample to its device's history
    ///
    /// `heading_deg` is the phone heading at the time of the sample and
    /// `now` is the insert time used for age eviction.
    pub fn record(&mut self, sample: &SignalSample, heading_deg: f32, now: Timestamp) -> RecordOutcome {
        let state = Arc::make_mut(&mut self.state);
        let policy = state.policy;

        let new_device = !state.devices.contains_key(sample.device_id());
        let slot = state
            .devices
            .entry(String::from(sample.device_id()))
            .or_insert_with(|| Arc::new(DeviceRecord::new(sample.device_id(), sample)));
        let record = Arc::make_mut(slot);

        let evicted = record.history.insert(
            HistoryEntry {
                rssi: sample.rssi(),
                timestamp: sample.timestamp(),
                heading_deg,
            },
            now,
            &policy,
        );
        record.first_seen = record.first_seen.min(sample.timestamp());
        record.last_seen = record.last_seen.max(sample.timestamp());
        record.last_rssi = sample.rssi();
        record.total_samples += 1;

        if evicted > 0 {
            log_debug!(
                "Device {}: evicted {} sample(s), {} retained",
                sample.device_id(),
                evicted,
                record.history.len()
            );
        }

        RecordOutcome {
            retained: record.history.len(),
            evicted,
            new_device,
        }
    }

    /// Drop every device and history
    pub fn clear(&mut self) {
        let policy = self.state.policy;
        self.state = Arc::new(TrackerSnapshot::new(policy));
    }

    /// Current state; cheap to clone and safe to hand to other threads
    pub fn snapshot(&self) -> Arc<TrackerSnapshot> {
        Arc::clone(&self.state)
    }

    /// History for one device
    pub fn history(&self, device_id: &str) -> Option<&DeviceHistory> {
        self.state.history(device_id)
    }

    /// Movement trend for one device
    pub fn trend(&self, device_id: &str) -> MovementTrend {
        self.state.trend(device_id)
    }

    /// Signal quality for one device
    pub fn signal_quality(&self, device_id: &str) -> SignalQuality {
        self.state.signal_quality(device_id)
    }

    /// Heading of the strongest retained sample
    pub fn estimated_bearing(&self, device_id: &str) -> Option<f32> {
        self.state.estimated_bearing(device_id)
    }

    /// Devices, strongest first
    pub fn devices(&self) -> Vec<Arc<DeviceRecord>> {
        self.state.devices()
    }
}
