//! Recorded session replayed through the full ingest pipeline

use std::io::Write;

use bluefind_connectors::{load_config, pump, IngestPipeline, OrientationEvent, ReplaySource};
use bluefind_core::{session::PassiveBackend, ManualClock, MovementTrend};
use tempfile::NamedTempFile;

const RECORDING: &str = r#"[
    { "at_ms": 0, "event": "Start" },
    { "at_ms": 100, "event": { "Sample": { "device_id": "tag", "rssi": -82, "timestamp": 100 } } },
    { "at_ms": 200, "event": { "Sample": { "device_id": "tag", "rssi": -78, "timestamp": 200 } } },
    { "at_ms": 300, "event": { "Sample": { "device_id": "tag", "rssi": -73, "timestamp": 300 } } },
    { "at_ms": 400, "event": { "Sample": { "device_id": "tag", "rssi": -69, "timestamp": 400 } } },
    { "at_ms": 500, "event": { "Sample": { "device_id": "tag", "rssi": -64, "timestamp": 500 } } },
    { "at_ms": 600, "event": { "Reading": { "device_id": "other", "rssi": -90 } } }
]"#;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn replayed_approach_through_pipeline() {
    let config_file = temp_file(r#"{ "tracking": { "trend_threshold_db": 3.0 } }"#);
    let config = load_config(config_file.path()).unwrap();
    assert_eq!(config.tracking.trend_threshold_db, 3.0);

    let clock = ManualClock::new(600);
    let pipeline =
        IngestPipeline::spawn(config, Box::new(PassiveBackend), Box::new(clock.clone()), 8).unwrap();
    let reader = pipeline.reader();

    // Phone already facing 45°
    let compass = pipeline.orientation_sender();
    compass.send(OrientationEvent::Start).await.unwrap();
    compass.send(OrientationEvent::Heading(45.0)).await.unwrap();
    drop(compass);

    let recording = temp_file(RECORDING);
    let mut source = ReplaySource::from_file(recording.path()).unwrap();
    let scans = pipeline.scan_sender();
    let forwarded = pump(&mut source, &scans).await.unwrap();
    drop(scans);
    assert_eq!(forwarded, 7);

    let report = pipeline.shutdown().await.unwrap();
    assert_eq!(report.scan.processed, 6);
    assert_eq!(report.scan.ignored, 0);

    assert_eq!(reader.trend("tag"), MovementTrend::Approaching);
    assert_eq!(reader.trend("other"), MovementTrend::Unknown);

    let devices = reader.devices();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].id, "tag");
    assert_eq!(devices[0].total_samples, 5);

    let guidance = reader.latest_guidance("tag").unwrap();
    assert_eq!(guidance.rssi, -64);
    assert_eq!(guidance.trend, MovementTrend::Approaching);
    assert!(guidance.direction.is_some());
    assert!(guidance.confidence > 0.0 && guidance.confidence <= 1.0);
}

#[test]
fn missing_config_file_is_io_error() {
    let result = load_config("/nonexistent/bluefind.json");
    assert!(matches!(result, Err(bluefind_connectors::ConnectorError::Io(_))));
}
