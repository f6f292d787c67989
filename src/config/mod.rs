//! Configuration and shared types
//!
//! Driver configuration loading and the closed enums and error type used
//! across the crate.

pub mod daemon;
pub mod types;

pub use daemon::{validate_rtc_sync_interval, DaemonConfig, DriverConfig, DEFAULT_RTC_SYNC_INTERVAL};
