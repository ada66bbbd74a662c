//! Feed Adapters for the BlueFind Estimation Core
//!
//! ## Overview
//!
//! The core is synchronous and single-writer per input stream. This crate
//! supplies the plumbing around it for hosts that deliver input
//! asynchronously:
//!
//! - **Ingestion**: two tokio workers, one owning the [`ScanSession`] and
//!   one owning the [`HeadingSmoother`], each draining its own bounded
//!   channel. The two streams never share a writer.
//! - **Sources**: an [`EventSource`] trait for anything that yields scan
//!   events, with [`ReplaySource`] for recorded sessions.
//! - **Config**: JSON loading of [`FinderConfig`] with validation.
//!
//! ```text
//!  platform scan callback ──► mpsc<ScanEvent> ──► scan worker ──► ScanSession ─┐
//!                                                                              ├─► GuidanceReader
//!  sensor callback ───► mpsc<OrientationEvent> ──► heading worker ──► Smoother ─┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use bluefind_connectors::{IngestPipeline, ScanEvent};
//! use bluefind_core::{session::PassiveBackend, FinderConfig, MonotonicTime};
//!
//! # async fn example() -> Result<(), bluefind_connectors::ConnectorError> {
//! let pipeline = IngestPipeline::spawn(
//!     FinderConfig::default(),
//!     Box::new(PassiveBackend),
//!     Box::new(MonotonicTime::new()),
//!     64,
//! )?;
//!
//! let scans = pipeline.scan_sender();
//! scans.send(ScanEvent::Start).await.ok();
//! scans.send(ScanEvent::reading("C4:7C:8D:6A:12:01", -61)).await.ok();
//!
//! let reader = pipeline.reader();
//! println!("{:?}", reader.latest_guidance("C4:7C:8D:6A:12:01"));
//!
//! drop(scans);
//! let report = pipeline.shutdown().await?;
//! println!("processed {} samples", report.scan.processed);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ingest;
pub mod source;

pub use config::{load_config, parse_config};
pub use ingest::{
    spawn_orientation_worker, spawn_scan_worker, IngestPipeline, IngestReport, IngestStats,
    OrientationEvent, OrientationStats, ScanEvent,
};
pub use source::{pump, EventSource, RecordedEvent, ReplaySource};

use bluefind_core::FinderError;
use thiserror::Error;

/// Errors from the adapter layer
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The receiving worker has gone away
    #[error("Channel closed")]
    ChannelClosed,

    /// Configuration could not be used
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a config or recording failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The core refused an operation
    #[error("Session error: {0}")]
    Session(#[from] FinderError),

    /// A worker task panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
