//! Driver configuration loading from a JSON file

use crate::config::types::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default interval between RTC synchronisations (seconds)
pub const DEFAULT_RTC_SYNC_INTERVAL: f64 = 60.0 * 60.0;

/// The interval must be a finite number of seconds above zero; anything else
/// would resync the RTC on every sync-status update.
pub fn validate_rtc_sync_interval(interval: f64) -> Result<()> {
    if !interval.is_finite() || interval <= 0.0 {
        return Err(DriverError::Config(format!(
            "Invalid RTC sync interval: {}",
            interval
        )));
    }
    Ok(())
}

/// Configuration accessor consumed by the driver.
///
/// The daemon's own configuration layer implements this; [`DriverConfig`]
/// is the standalone implementation used by the CLI and tests.
pub trait DaemonConfig {
    /// Whether the system time should be pushed to the RTC periodically
    fn rtc_sync(&self) -> bool;

    /// Interval between RTC synchronisations in seconds
    fn rtc_sync_interval(&self) -> f64 {
        DEFAULT_RTC_SYNC_INTERVAL
    }

    /// Number of configured NTS server certificate/key pairs
    fn nts_server_cert_key_pairs(&self) -> usize;

    /// Number of NTS-KE helper processes to fork
    fn nts_server_processes(&self) -> u32;
}

/// Driver section of the daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    pub rtc_sync: bool,
    pub rtc_sync_interval_secs: f64,
    pub nts_server_cert_files: Vec<PathBuf>,
    pub nts_server_key_files: Vec<PathBuf>,
    pub nts_server_processes: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            rtc_sync: false,
            rtc_sync_interval_secs: DEFAULT_RTC_SYNC_INTERVAL,
            nts_server_cert_files: Vec::new(),
            nts_server_key_files: Vec::new(),
            nts_server_processes: 1,
        }
    }
}

impl DriverConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| DriverError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let config: DriverConfig = serde_json::from_str(content)
            .map_err(|e| DriverError::Config(format!("Failed to parse config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nts_server_cert_files.len() != self.nts_server_key_files.len() {
            return Err(DriverError::Config(format!(
                "Number of NTS server certificates ({}) does not match number of keys ({})",
                self.nts_server_cert_files.len(),
                self.nts_server_key_files.len()
            )));
        }

        validate_rtc_sync_interval(self.rtc_sync_interval_secs)
    }
}

impl DaemonConfig for DriverConfig {
    fn rtc_sync(&self) -> bool {
        self.rtc_sync
    }

    fn rtc_sync_interval(&self) -> f64 {
        self.rtc_sync_interval_secs
    }

    fn nts_server_cert_key_pairs(&self) -> usize {
        self.nts_server_cert_files
            .len()
            .min(self.nts_server_key_files.len())
    }

    fn nts_server_processes(&self) -> u32 {
        self.nts_server_processes
    }
}
