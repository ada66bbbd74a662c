//! Scan Session
//!
//! Wires the estimation components to the scan lifecycle and publishes
//! read-only state for concurrent consumers.
//!
//! ## Lifecycle
//!
//! ```text
//!            start() ok
//!  Stopped ─────────────► Scanning
//!     ▲                      │
//!     └──────────────────────┘
//!      stop() / on_scan_failed()
//! ```
//!
//! - A successful `start()` clears every device history first
//! - `start()` while scanning is a no-op
//! - A refused start leaves the session `Stopped` and returns
//!   [`FinderError::ScanStartFailed`]; there is no retry state
//! - Leaving `Scanning` for any reason clears all tracker state
//! - Samples delivered while `Stopped` are counted and dropped
//!
//! ## Threads
//!
//! The session is the single writer of tracker state and must receive scan
//! callbacks from one serialized path. After every mutation it publishes a
//! new [`SessionView`]. Any number of [`GuidanceReader`]s, on any thread,
//! answer queries from the latest view without touching the writer.
//! The heading comes from a [`HeadingReader`] fed by a separate sensor path.

use std::sync::Arc;
use std::vec::Vec;

use crate::config::FinderConfig;
use crate::distance::DistanceEstimator;
use crate::errors::{FinderError, FinderResult, ScanFailure};
use crate::guidance::{Guidance, GuidanceSynthesizer};
use crate::heading::HeadingReader;
use crate::snapshot::SnapshotCell;
use crate::time::{TimeSource, Timestamp};
use crate::tracker::{
    DeviceRecord, DeviceSignalTracker, MovementTrend, RecordOutcome, SignalQuality, SignalSample,
    TrackerSnapshot,
};

/// Scan lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanState {
    /// Not scanning; samples are ignored
    #[default]
    Stopped,
    /// Platform scan running
    Scanning,
}

/// Seam to the platform BLE scanner
pub trait ScanBackend: Send {
    /// Ask the platform to start delivering scan results
    fn start_scan(&mut self) -> Result<(), ScanFailure>;

    /// Ask the platform to stop
    fn stop_scan(&mut self);
}

/// Backend for feeds that are driven from outside (channels, replay)
///
/// Starting always succeeds; samples arrive through
/// [`ScanSession::record`] or [`ScanSession::on_signal_sample`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveBackend;

impl ScanBackend for PassiveBackend {
    fn start_scan(&mut self) -> Result<(), ScanFailure> {
        Ok(())
    }

    fn stop_scan(&mut self) {}
}

/// State published to readers after every mutation
#[derive(Debug, Clone, Default)]
pub struct SessionView {
    /// Lifecycle state
    pub state: ScanState,
    /// Tracker contents
    pub tracker: Arc<TrackerSnapshot>,
}

/// Single-writer scan session
pub struct ScanSession {
    backend: Box<dyn ScanBackend>,
    clock: Box<dyn TimeSource>,
    tracker: DeviceSignalTracker,
    synthesizer: GuidanceSynthesizer,
    heading: HeadingReader,
    state: ScanState,
    published: SnapshotCell<SessionView>,
    ignored: u64,
}

impl core::fmt::Debug for ScanSession {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScanSession")
            .field("state", &self.state)
            .field("devices", &self.tracker.snapshot().device_count())
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

impl ScanSession {
    /// Session over `backend`, timestamping samples with `clock`
    ///
    /// Fails with [`FinderError::InvalidConfig`] if `config` does not
    /// validate. Until [`ScanSession::with_heading`] is called the heading
    /// reads 0°.
    pub fn new(
        config: FinderConfig,
        backend: Box<dyn ScanBackend>,
        clock: Box<dyn TimeSource>,
    ) -> FinderResult<Self> {
        config.validate()?;

        let tracker = DeviceSignalTracker::new(config.tracking);
        let published = SnapshotCell::new(Arc::new(SessionView {
            state: ScanState::Stopped,
            tracker: tracker.snapshot(),
        }));

        Ok(Self {
            backend,
            clock,
            tracker,
            synthesizer: GuidanceSynthesizer::new(DistanceEstimator::new(config.path_loss)),
            heading: HeadingReader::default(),
            state: ScanState::Stopped,
            published,
            ignored: 0,
        })
    }

    /// Read the phone heading from `heading`
    pub fn with_heading(mut self, heading: HeadingReader) -> Self {
        self.heading = heading;
        self
    }

    /// Start scanning
    pub fn start(&mut self) -> FinderResult<()> {
        if self.state == ScanState::Scanning {
            log_debug!("Scan already running, start ignored");
            return Ok(());
        }

        if let Err(failure) = self.backend.start_scan() {
            log_warn!("Scan start failed: {}", failure);
            return Err(FinderError::ScanStartFailed { failure });
        }

        self.tracker.clear();
        self.state = ScanState::Scanning;
        self.publish();
        log_info!("Scan started");
        Ok(())
    }

    /// Stop scanning and drop all device state
    pub fn stop(&mut self) {
        if self.state == ScanState::Stopped {
            return;
        }

        self.backend.stop_scan();
        self.halt();
        log_info!("Scan stopped");
    }

    /// Platform aborted the scan
    ///
    /// Moves to `Stopped` and returns the error to surface to the user.
    pub fn on_scan_failed(&mut self, failure: ScanFailure) -> FinderError {
        log_warn!("Scan failed: {}", failure);
        self.halt();
        FinderError::ScanFailed { failure }
    }

    fn halt(&mut self) {
        self.tracker.clear();
        self.state = ScanState::Stopped;
        self.publish();
    }

    /// Scan callback: record `rssi` for `device_id` at the current time
    pub fn on_signal_sample(&mut self, device_id: &str, rssi: i32) -> Option<RecordOutcome> {
        let now = self.clock.now();
        self.record_at(&SignalSample::new(device_id, rssi, now), now)
    }

    /// Record a sample that carries its own timestamp
    pub fn record(&mut self, sample: &SignalSample) -> Option<RecordOutcome> {
        let now = self.clock.now();
        self.record_at(sample, now)
    }

    /// Record with an explicit insert time, for replay
    ///
    /// Returns `None` when the session is stopped.
    pub fn record_at(&mut self, sample: &SignalSample, now: Timestamp) -> Option<RecordOutcome> {
        if self.state != ScanState::Scanning {
            self.ignored += 1;
            return None;
        }

        let outcome = self
            .tracker
            .record(sample, self.heading.degrees(), now);
        if outcome.new_device {
            log_debug!("New device {} at {} dBm", sample.device_id(), sample.rssi());
        }
        self.publish();
        Some(outcome)
    }

    fn publish(&self) {
        self.published.publish(Arc::new(SessionView {
            state: self.state,
            tracker: self.tracker.snapshot(),
        }));
    }

    /// Guidance for `device_id` at `rssi` from the writer's own state
    pub fn synthesize(&self, device_id: &str, rssi: i32) -> Guidance {
        self.synthesizer
            .synthesize(device_id, rssi, &self.tracker.snapshot(), self.heading.degrees())
    }

    /// Movement trend for one device
    pub fn trend(&self, device_id: &str) -> MovementTrend {
        self.tracker.trend(device_id)
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Samples dropped because the session was stopped
    pub fn ignored_samples(&self) -> u64 {
        self.ignored
    }

    /// Tracker owned by this session
    pub fn tracker(&self) -> &DeviceSignalTracker {
        &self.tracker
    }

    /// Handle for concurrent readers
    pub fn reader(&self) -> GuidanceReader {
        GuidanceReader {
            view: self.published.clone(),
            heading: self.heading.clone(),
            synthesizer: self.synthesizer,
        }
    }
}

/// Cloneable, thread-safe query handle
///
/// Every call loads the latest published view once, so the answer of a
/// single call is internally consistent.
#[derive(Debug, Clone)]
pub struct GuidanceReader {
    view: SnapshotCell<SessionView>,
    heading: HeadingReader,
    synthesizer: GuidanceSynthesizer,
}

impl GuidanceReader {
    /// Latest published view
    pub fn view(&self) -> Arc<SessionView> {
        self.view.load()
    }

    /// Guidance for `device_id` at `rssi`
    pub fn synthesize(&self, device_id: &str, rssi: i32) -> Guidance {
        let view = self.view.load();
        self.synthesizer
            .synthesize(device_id, rssi, &view.tracker, self.heading.degrees())
    }

    /// Guidance at the device's last delivered RSSI
    pub fn latest_guidance(&self, device_id: &str) -> Option<Guidance> {
        let view = self.view.load();
        let rssi = view.tracker.device(device_id)?.last_rssi;
        Some(
            self.synthesizer
                .synthesize(device_id, rssi, &view.tracker, self.heading.degrees()),
        )
    }

    /// Movement trend for one device
    pub fn trend(&self, device_id: &str) -> MovementTrend {
        self.view.load().tracker.trend(device_id)
    }

    /// Signal quality for one device
    pub fn signal_quality(&self, device_id: &str) -> SignalQuality {
        self.view.load().tracker.signal_quality(device_id)
    }

    /// Devices, strongest first
    pub fn devices(&self) -> Vec<Arc<DeviceRecord>> {
        self.view.load().tracker.devices()
    }

    /// Current smoothed heading in degrees
    pub fn heading(&self) -> f32 {
        self.heading.degrees()
    }

    /// Lifecycle state at the last publication
    pub fn scan_state(&self) -> ScanState {
        self.view.load().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heading::HeadingSmoother;
    use crate::time::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that refuses the first `failures` starts
    struct FlakyBackend {
        failures: usize,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    impl ScanBackend for FlakyBackend {
        fn start_scan(&mut self) -> Result<(), ScanFailure> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.failures > 0 {
                self.failures -= 1;
                return Err(ScanFailure::BluetoothDisabled);
            }
            Ok(())
        }

        fn stop_scan(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn session(clock: &ManualClock) -> ScanSession {
        ScanSession::new(
            FinderConfig::default(),
            Box::new(PassiveBackend),
            Box::new(clock.clone()),
        )
        .unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = FinderConfig::default();
        config.tracking.trend_window = 0;
        let result = ScanSession::new(config, Box::new(PassiveBackend), Box::new(ManualClock::new(0)));
        assert!(matches!(result, Err(FinderError::InvalidConfig { .. })));
    }

    #[test]
    fn samples_ignored_while_stopped() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);

        assert_eq!(session.on_signal_sample("AA:BB", -60), None);
        assert_eq!(session.ignored_samples(), 1);
        assert!(session.reader().devices().is_empty());
    }

    #[test]
    fn start_is_idempotent_and_clears_on_restart() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        session.start().unwrap();
        session.on_signal_sample("AA:BB", -60);

        // second start while scanning keeps the data
        session.start().unwrap();
        assert_eq!(session.reader().devices().len(), 1);

        session.stop();
        assert_eq!(session.state(), ScanState::Stopped);
        assert!(session.reader().devices().is_empty());
    }

    #[test]
    fn failed_start_stays_stopped() {
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        let backend = FlakyBackend {
            failures: 1,
            starts: Arc::clone(&starts),
            stops: Arc::clone(&stops),
        };
        let mut session = ScanSession::new(
            FinderConfig::default(),
            Box::new(backend),
            Box::new(ManualClock::new(0)),
        )
        .unwrap();

        let err = session.start().unwrap_err();
        assert_eq!(
            err,
            FinderError::ScanStartFailed {
                failure: ScanFailure::BluetoothDisabled
            }
        );
        assert_eq!(session.state(), ScanState::Stopped);

        // stopping a stopped session does not reach the backend
        session.stop();
        assert_eq!(stops.load(Ordering::SeqCst), 0);

        session.start().unwrap();
        assert_eq!(session.state(), ScanState::Scanning);
        assert_eq!(starts.load(Ordering::SeqCst), 2);

        session.stop();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn scan_failure_stops_and_clears() {
        let clock = ManualClock::new(0);
        let mut session = session(&clock);
        let reader = session.reader();
        session.start().unwrap();
        session.on_signal_sample("AA:BB", -60);
        assert_eq!(reader.scan_state(), ScanState::Scanning);

        let err = session.on_scan_failed(ScanFailure::from_code(3));
        assert_eq!(
            err,
            FinderError::ScanFailed {
                failure: ScanFailure::InternalError
            }
        );
        assert_eq!(reader.scan_state(), ScanState::Stopped);
        assert!(reader.devices().is_empty());
    }

    #[test]
    fn reader_sees_trend_and_heading() {
        let clock = ManualClock::new(0);
        let mut smoother = HeadingSmoother::default();
        smoother.start();
        smoother.push_raw_heading(45.0);

        let mut session = session(&clock).with_heading(smoother.reader());
        let reader = session.reader();
        session.start().unwrap();

        for rssi in [-40, -45, -50, -55, -60] {
            clock.advance(1_000);
            session.on_signal_sample("AA:BB", rssi);
        }

        assert_eq!(reader.trend("AA:BB"), MovementTrend::Receding);
        assert_eq!(reader.heading(), 45.0);

        let guidance = reader.latest_guidance("AA:BB").unwrap();
        assert_eq!(guidance.rssi, -60);
        assert_eq!(guidance.trend, MovementTrend::Receding);
        assert!(guidance.direction.is_some());
        assert_eq!(reader.latest_guidance("unknown"), None);
    }

    #[test]
    fn samples_stamped_with_heading_at_record_time() {
        let clock = ManualClock::new(0);
        let mut smoother = HeadingSmoother::new(crate::config::HeadingConfig {
            min_smoothing_samples: 1,
        });
        smoother.start();

        let mut session = session(&clock).with_heading(smoother.reader());
        session.start().unwrap();

        smoother.push_raw_heading(90.0);
        session.record(&SignalSample::new("AA:BB", -70, 0));
        // weighted mean of [90, 180] with weights 1, 2
        smoother.push_raw_heading(180.0);
        session.record(&SignalSample::new("AA:BB", -70, 0));

        let entries: Vec<f32> = session
            .tracker()
            .history("AA:BB")
            .unwrap()
            .entries()
            .iter()
            .map(|e| e.heading_deg)
            .collect();
        assert_eq!(entries, vec![90.0, 150.0]);
    }
}
