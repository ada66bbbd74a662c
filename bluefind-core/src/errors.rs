//! Error Types for the Estimation Core
//!
//! ## What Can Fail
//!
//! The estimation functions themselves are total: every RSSI value, every
//! orientation vector and every empty history produces a value (possibly
//! `Unknown`). "Not enough data" is a steady state, not an error.
//!
//! Errors are reserved for two places:
//!
//! ### Configuration
//! - `InvalidConfig`: a tunable is non-finite, inverted or out of range
//!
//! ### Scan Lifecycle
//! - `ScanStartFailed`: the platform scanner refused to start
//! - `ScanFailed`: a running scan was aborted by the platform
//!
//! Both lifecycle errors leave the session in `Stopped`. There is no retry
//! state; the caller decides whether to start again.
//!
//! ```rust
//! use bluefind_core::{FinderError, ScanFailure};
//!
//! fn describe(err: FinderError) -> &'static str {
//!     match err {
//!         FinderError::ScanStartFailed { failure: ScanFailure::BluetoothDisabled } => "turn Bluetooth on",
//!         FinderError::ScanStartFailed { failure: ScanFailure::PermissionRequired } => "grant scan permission",
//!         FinderError::ScanStartFailed { .. } | FinderError::ScanFailed { .. } => "try again",
//!         FinderError::InvalidConfig { reason } => reason,
//!     }
//! }
//! ```
//!
//! Errors are `Copy` and carry only `&'static str` so they can cross the
//! callback boundary without allocation.

use core::fmt;

use thiserror_no_std::Error;

/// Result type for fallible core operations
pub type FinderResult<T> = Result<T, FinderError>;

/// Failure reported by the platform scanning subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanFailure {
    /// A scan with the same callback is already running
    AlreadyStarted,
    /// The app could not be registered with the scanner
    RegistrationFailed,
    /// Internal scanner error
    InternalError,
    /// Hardware or OS does not support the requested scan
    FeatureUnsupported,
    /// The Bluetooth adapter is off or missing
    BluetoothDisabled,
    /// Scan permissions have not been granted
    PermissionRequired,
    /// Platform-specific error code
    Other(i32),
}

impl ScanFailure {
    /// Map a raw platform error code to a failure
    ///
    /// Codes 1-4 follow the BLE scanner callback convention.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::AlreadyStarted,
            2 => Self::RegistrationFailed,
            3 => Self::InternalError,
            4 => Self::FeatureUnsupported,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyStarted => f.write_str("scan already started"),
            Self::RegistrationFailed => f.write_str("app registration failed"),
            Self::InternalError => f.write_str("internal error"),
            Self::FeatureUnsupported => f.write_str("feature not supported"),
            Self::BluetoothDisabled => f.write_str("Bluetooth disabled"),
            Self::PermissionRequired => f.write_str("permission required"),
            Self::Other(code) => write!(f, "unknown error {}", code),
        }
    }
}

/// Core errors - small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FinderError {
    /// Configuration value rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },

    /// Platform scanner refused to start; session stays stopped
    #[error("Failed to start scan: {failure}")]
    ScanStartFailed {
        /// Platform failure
        failure: ScanFailure,
    },

    /// Running scan aborted by the platform; session is now stopped
    #[error("Scan failed: {failure}")]
    ScanFailed {
        /// Platform failure
        failure: ScanFailure,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn failure_codes_map() {
        assert_eq!(ScanFailure::from_code(1), ScanFailure::AlreadyStarted);
        assert_eq!(ScanFailure::from_code(4), ScanFailure::FeatureUnsupported);
        assert_eq!(ScanFailure::from_code(42), ScanFailure::Other(42));
    }

    #[cfg(feature = "std")]
    #[test]
    fn error_messages() {
        let err = FinderError::ScanStartFailed {
            failure: ScanFailure::BluetoothDisabled,
        };
        assert_eq!(err.to_string(), "Failed to start scan: Bluetooth disabled");

        let err = FinderError::InvalidConfig { reason: "bad exponent" };
        assert_eq!(err.to_string(), "Invalid configuration: bad exponent");
    }
}
