//! Channel-fed ingestion workers
//!
//! Each worker owns exactly one writer (the scan session or the heading
//! smoother) and processes its channel in order, so the core's
//! single-writer-per-stream rule holds no matter how many producers send.
//! Workers exit when every sender is dropped and hand back what they own.

use bluefind_core::tracker::RecordOutcome;
use bluefind_core::{
    FinderConfig, GuidanceReader, HeadingReader, HeadingSmoother, OrientationSample,
    ScanBackend, ScanFailure, ScanSession, SignalSample, TimeSource,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ConnectorError;

/// Input on the scan path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Start scanning
    Start,
    /// Stop scanning
    Stop,
    /// Scan result stamped at arrival
    Reading {
        /// Device identifier
        device_id: String,
        /// Signal strength (dBm)
        rssi: i32,
    },
    /// Scan result carrying its own capture time
    Sample(SignalSample),
    /// Platform aborted the scan
    Failed(ScanFailure),
}

impl ScanEvent {
    /// Scan result to be stamped on arrival
    pub fn reading(device_id: impl Into<String>, rssi: i32) -> Self {
        ScanEvent::Reading {
            device_id: device_id.into(),
            rssi,
        }
    }
}

/// Input on the sensor path
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrientationEvent {
    /// Start listening
    Start,
    /// Stop listening and drop the smoothing window
    Stop,
    /// Raw accelerometer or magnetometer vector
    Sample(OrientationSample),
    /// Azimuth already fused by the platform (degrees)
    Heading(f32),
}

/// Scan worker counters
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    /// Samples recorded into the tracker
    pub processed: u64,
    /// Samples dropped because the session was stopped
    pub ignored: u64,
    /// History entries evicted by age or count
    pub evicted: u64,
    /// Start refusals and platform scan failures
    pub failures: u64,
    /// Last error message
    pub last_error: Option<String>,
}

/// Heading worker counters
#[derive(Debug, Default, Clone)]
pub struct OrientationStats {
    /// Events received
    pub received: u64,
    /// Events that produced a new heading
    pub updates: u64,
}

/// Drain `rx` into `session` until every sender is dropped
pub fn spawn_scan_worker(
    mut session: ScanSession,
    mut rx: mpsc::Receiver<ScanEvent>,
) -> JoinHandle<(ScanSession, IngestStats)> {
    tokio::spawn(async move {
        let mut stats = IngestStats::default();
        debug!("Scan worker started");

        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::Start => {
                    if let Err(e) = session.start() {
                        warn!("Scan start refused: {}", e);
                        stats.failures += 1;
                        stats.last_error = Some(e.to_string());
                    }
                }
                ScanEvent::Stop => session.stop(),
                ScanEvent::Reading { device_id, rssi } => {
                    let outcome = session.on_signal_sample(&device_id, rssi);
                    count(&mut stats, outcome);
                }
                ScanEvent::Sample(sample) => {
                    let outcome = session.record(&sample);
                    count(&mut stats, outcome);
                }
                ScanEvent::Failed(failure) => {
                    let e = session.on_scan_failed(failure);
                    stats.failures += 1;
                    stats.last_error = Some(e.to_string());
                }
            }
        }

        info!(
            "Scan worker finished: {} processed, {} ignored, {} failures",
            stats.processed, stats.ignored, stats.failures
        );
        (session, stats)
    })
}

fn count(stats: &mut IngestStats, outcome: Option<RecordOutcome>) {
    match outcome {
        Some(outcome) => {
            stats.processed += 1;
            stats.evicted += outcome.evicted as u64;
        }
        None => stats.ignored += 1,
    }
}

/// Drain `rx` into `smoother` until every sender is dropped
pub fn spawn_orientation_worker(
    mut smoother: HeadingSmoother,
    mut rx: mpsc::Receiver<OrientationEvent>,
) -> JoinHandle<(HeadingSmoother, OrientationStats)> {
    tokio::spawn(async move {
        let mut stats = OrientationStats::default();
        debug!("Heading worker started");

        while let Some(event) = rx.recv().await {
            stats.received += 1;
            let updated = match event {
                OrientationEvent::Start => {
                    smoother.start();
                    false
                }
                OrientationEvent::Stop => {
                    smoother.stop();
                    false
                }
                OrientationEvent::Sample(sample) => smoother.on_orientation_sample(sample).is_some(),
                OrientationEvent::Heading(degrees) if smoother.is_listening() => {
                    smoother.push_raw_heading(degrees);
                    true
                }
                OrientationEvent::Heading(_) => false,
            };
            if updated {
                stats.updates += 1;
            }
        }

        info!(
            "Heading worker finished: {} events, {} updates",
            stats.received, stats.updates
        );
        (smoother, stats)
    })
}

/// Final state of both workers
#[derive(Debug)]
pub struct IngestReport {
    /// Scan session, stopped or not
    pub session: ScanSession,
    /// Scan counters
    pub scan: IngestStats,
    /// Heading smoother
    pub smoother: HeadingSmoother,
    /// Heading counters
    pub orientation: OrientationStats,
}

/// Both workers wired together, sharing one heading
pub struct IngestPipeline {
    scan_tx: mpsc::Sender<ScanEvent>,
    orientation_tx: mpsc::Sender<OrientationEvent>,
    reader: GuidanceReader,
    heading: HeadingReader,
    scan_task: JoinHandle<(ScanSession, IngestStats)>,
    orientation_task: JoinHandle<(HeadingSmoother, OrientationStats)>,
}

impl IngestPipeline {
    /// Spawn both workers on the current tokio runtime
    ///
    /// `capacity` bounds each channel; producers wait when a worker lags.
    pub fn spawn(
        config: FinderConfig,
        backend: Box<dyn ScanBackend>,
        clock: Box<dyn TimeSource>,
        capacity: usize,
    ) -> Result<Self, ConnectorError> {
        if capacity == 0 {
            return Err(ConnectorError::Config("channel capacity must be non-zero".into()));
        }

        let smoother = HeadingSmoother::new(config.heading);
        let heading = smoother.reader();
        let session = ScanSession::new(config, backend, clock)?.with_heading(heading.clone());
        let reader = session.reader();

        let (scan_tx, scan_rx) = mpsc::channel(capacity);
        let (orientation_tx, orientation_rx) = mpsc::channel(capacity);

        info!("Ingest pipeline started (capacity {})", capacity);
        Ok(Self {
            scan_tx,
            orientation_tx,
            reader,
            heading,
            scan_task: spawn_scan_worker(session, scan_rx),
            orientation_task: spawn_orientation_worker(smoother, orientation_rx),
        })
    }

    /// Producer handle for the scan path
    pub fn scan_sender(&self) -> mpsc::Sender<ScanEvent> {
        self.scan_tx.clone()
    }

    /// Producer handle for the sensor path
    pub fn orientation_sender(&self) -> mpsc::Sender<OrientationEvent> {
        self.orientation_tx.clone()
    }

    /// Query handle
    pub fn reader(&self) -> GuidanceReader {
        self.reader.clone()
    }

    /// Heading handle
    pub fn heading(&self) -> HeadingReader {
        self.heading.clone()
    }

    /// Send a scan event through the pipeline's own sender
    pub async fn send_scan(&self, event: ScanEvent) -> Result<(), ConnectorError> {
        self.scan_tx
            .send(event)
            .await
            .map_err(|_| ConnectorError::ChannelClosed)
    }

    /// Send a sensor event through the pipeline's own sender
    pub async fn send_orientation(&self, event: OrientationEvent) -> Result<(), ConnectorError> {
        self.orientation_tx
            .send(event)
            .await
            .map_err(|_| ConnectorError::ChannelClosed)
    }

    /// Close the pipeline's senders and wait for both workers
    ///
    /// Workers finish once every cloned sender is dropped too.
    pub async fn shutdown(self) -> Result<IngestReport, ConnectorError> {
        let Self {
            scan_tx,
            orientation_tx,
            scan_task,
            orientation_task,
            ..
        } = self;
        drop(scan_tx);
        drop(orientation_tx);

        let (session, scan) = scan_task.await?;
        let (smoother, orientation) = orientation_task.await?;
        info!("Ingest pipeline shut down");

        Ok(IngestReport {
            session,
            scan,
            smoother,
            orientation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluefind_core::{session::PassiveBackend, ManualClock, MovementTrend, ScanState};

    fn pipeline(clock: &ManualClock) -> IngestPipeline {
        IngestPipeline::spawn(
            FinderConfig::default(),
            Box::new(PassiveBackend),
            Box::new(clock.clone()),
            16,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn scan_path_records_in_order() {
        let clock = ManualClock::new(0);
        let pipeline = pipeline(&clock);

        pipeline.send_scan(ScanEvent::reading("tag", -70)).await.unwrap();
        pipeline.send_scan(ScanEvent::Start).await.unwrap();
        for (i, rssi) in [-40, -45, -50, -55, -60].into_iter().enumerate() {
            let sample = SignalSample::new("tag", rssi, i as u64 * 1_000);
            pipeline.send_scan(ScanEvent::Sample(sample)).await.unwrap();
        }

        let reader = pipeline.reader();
        let report = pipeline.shutdown().await.unwrap();

        assert_eq!(report.scan.ignored, 1);
        assert_eq!(report.scan.processed, 5);
        assert_eq!(reader.trend("tag"), MovementTrend::Receding);
        assert_eq!(report.session.state(), ScanState::Scanning);
    }

    #[tokio::test]
    async fn failure_stops_session() {
        let clock = ManualClock::new(0);
        let pipeline = pipeline(&clock);
        let reader = pipeline.reader();

        pipeline.send_scan(ScanEvent::Start).await.unwrap();
        pipeline.send_scan(ScanEvent::reading("tag", -60)).await.unwrap();
        pipeline
            .send_scan(ScanEvent::Failed(ScanFailure::from_code(2)))
            .await
            .unwrap();

        let report = pipeline.shutdown().await.unwrap();
        assert_eq!(report.scan.failures, 1);
        assert!(report.scan.last_error.is_some());
        assert_eq!(reader.scan_state(), ScanState::Stopped);
        assert!(reader.devices().is_empty());
    }

    #[tokio::test]
    async fn heading_path_feeds_reader() {
        let clock = ManualClock::new(0);
        let pipeline = pipeline(&clock);
        let heading = pipeline.heading();

        // ignored until started
        pipeline.send_orientation(OrientationEvent::Heading(10.0)).await.unwrap();
        pipeline.send_orientation(OrientationEvent::Start).await.unwrap();
        pipeline
            .send_orientation(OrientationEvent::Sample(OrientationSample::Accelerometer([
                0.0, 0.0, 9.81,
            ])))
            .await
            .unwrap();
        pipeline
            .send_orientation(OrientationEvent::Sample(OrientationSample::MagneticField([
                -30.0, 0.0, -40.0,
            ])))
            .await
            .unwrap();

        let report = pipeline.shutdown().await.unwrap();
        assert_eq!(report.orientation.received, 4);
        assert_eq!(report.orientation.updates, 1);
        assert!((heading.degrees() - 90.0).abs() < 0.01);
        assert_eq!(report.smoother.buffered(), 1);
    }

    #[tokio::test]
    async fn zero_capacity_rejected() {
        let result = IngestPipeline::spawn(
            FinderConfig::default(),
            Box::new(PassiveBackend),
            Box::new(ManualClock::new(0)),
            0,
        );
        assert!(matches!(result, Err(ConnectorError::Config(_))));
    }
}
