//! Time management for signal tracking
//!
//! Sample ages are measured in milliseconds against a clock abstraction so
//! the same tracker runs against:
//! - A monotonic clock (normal operation)
//! - A manual clock (tests and log replay)

/// Timestamp in milliseconds (monotonic since an arbitrary origin, or epoch)
pub type Timestamp = u64;

/// Source of time for the system
///
/// `now()` is called from whichever thread delivers scan callbacks, so
/// implementations must be `Send`.
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Monotonic time source, milliseconds since construction
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicTime {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicTime {
    fn now(&self) -> Timestamp {
        self.origin.elapsed().as_millis() as Timestamp
    }
}

/// Shared manual clock
///
/// Clones observe the same time, so a test (or a log replayer) can keep one
/// handle and hand another to the session that owns it.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: std::sync::Arc<core::sync::atomic::AtomicU64>,
}

#[cfg(feature = "std")]
impl ManualClock {
    /// Clock starting at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            now: std::sync::Arc::new(core::sync::atomic::AtomicU64::new(timestamp)),
        }
    }

    /// Jump to `timestamp`
    pub fn set(&self, timestamp: Timestamp) {
        self.now.store(timestamp, core::sync::atomic::Ordering::Release);
    }

    /// Move forward by `ms`
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, core::sync::atomic::Ordering::AcqRel);
    }
}

#[cfg(feature = "std")]
impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(core::sync::atomic::Ordering::Acquire)
    }
}

/// Age of `timestamp` relative to `now`, zero for future timestamps
pub fn age_ms(now: Timestamp, timestamp: Timestamp) -> u64 {
    now.saturating_sub(timestamp)
}
