//! JSON configuration loading
//!
//! Missing fields fall back to their defaults, so a file only needs the
//! tunables it changes:
//!
//! ```json
//! { "path_loss": { "measured_power_dbm": -59.0, "path_loss_exponent": 2.4 } }
//! ```
//!
//! The result is validated before it is returned.

use std::path::Path;

use bluefind_core::FinderConfig;
use log::info;

use crate::ConnectorError;

/// Parse and validate a JSON config
pub fn parse_config(json: &str) -> Result<FinderConfig, ConnectorError> {
    let config: FinderConfig = serde_json::from_str(json)?;
    config
        .validate()
        .map_err(|e| ConnectorError::Config(e.to_string()))?;
    Ok(config)
}

/// Read, parse and validate a JSON config file
pub fn load_config(path: impl AsRef<Path>) -> Result<FinderConfig, ConnectorError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let config = parse_config(&json)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}
