//! Scan event sources
//!
//! An [`EventSource`] yields [`ScanEvent`]s from wherever they come from. The
//! crate ships [`ReplaySource`], which plays back a recorded session from
//! JSON, optionally at the original pace.
//!
//! Recording format (a JSON array):
//!
//! ```json
//! [
//!   { "at_ms": 0,    "event": "Start" },
//!   { "at_ms": 1200, "event": { "Reading": { "device_id": "C4:7C:8D:6A:12:01", "rssi": -71 } } },
//!   { "at_ms": 2400, "event": { "Failed": "InternalError" } }
//! ]
//! ```

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ingest::ScanEvent;
use crate::ConnectorError;

/// Anything that yields scan events
#[async_trait]
pub trait EventSource: Send {
    /// Next event, or `None` once exhausted
    async fn next_event(&mut self) -> Option<ScanEvent>;
}

/// One event in a recording, at an offset from the recording start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Offset from the start of the recording (ms)
    pub at_ms: u64,
    /// Recorded event
    pub event: ScanEvent,
}

/// Plays back recorded events in offset order
#[derive(Debug, Clone)]
pub struct ReplaySource {
    events: VecDeque<RecordedEvent>,
    paced: bool,
    last_at_ms: u64,
}

impl ReplaySource {
    /// Source over `events`; sorted by offset, ties kept in order
    pub fn new(mut events: Vec<RecordedEvent>) -> Self {
        events.sort_by_key(|e| e.at_ms);
        Self {
            events: events.into(),
            paced: false,
            last_at_ms: 0,
        }
    }

    /// Parse a JSON recording
    pub fn from_json(json: &str) -> Result<Self, ConnectorError> {
        let events: Vec<RecordedEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Read a JSON recording from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConnectorError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Sleep between events to reproduce the recorded gaps
    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }

    /// Events left to play
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_event(&mut self) -> Option<ScanEvent> {
        let next = self.events.pop_front()?;

        if self.paced {
            let gap = next.at_ms.saturating_sub(self.last_at_ms);
            if gap > 0 {
                tokio::time::sleep(Duration::from_millis(gap)).await;
            }
        }
        self.last_at_ms = next.at_ms;

        Some(next.event)
    }
}

/// Forward every event from `source` into `tx`
///
/// Returns the number of events forwarded, or
/// [`ConnectorError::ChannelClosed`] if the receiver went away first.
pub async fn pump<S>(source: &mut S, tx: &mpsc::Sender<ScanEvent>) -> Result<u64, ConnectorError>
where
    S: EventSource + ?Sized,
{
    let mut forwarded = 0;
    while let Some(event) = source.next_event().await {
        tx.send(event)
            .await
            .map_err(|_| ConnectorError::ChannelClosed)?;
        forwarded += 1;
    }
    debug!("Source exhausted after {} events", forwarded);
    Ok(forwarded)
}
