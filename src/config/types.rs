/// Core types shared across the clockshim driver
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process role selecting which capability set a process requests.
///
/// Chosen by the caller at startup, never derived from process state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SandboxRole {
    /// The daemon's main process (network, config, drift file)
    #[serde(rename = "main")]
    MainProcess,
    /// Root helper performing clock writes for an unprivileged main process
    #[serde(rename = "privops")]
    PrivilegedHelper,
    /// NTS-KE helper that only receives descriptors from the main process
    #[serde(rename = "ntske")]
    UnprivilegedHelper,
}

impl SandboxRole {
    pub fn is_main(self) -> bool {
        matches!(self, SandboxRole::MainProcess)
    }
}

impl std::fmt::Display for SandboxRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SandboxRole::MainProcess => write!(f, "main"),
            SandboxRole::PrivilegedHelper => write!(f, "privops"),
            SandboxRole::UnprivilegedHelper => write!(f, "ntske"),
        }
    }
}

impl std::str::FromStr for SandboxRole {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(SandboxRole::MainProcess),
            "privops" => Ok(SandboxRole::PrivilegedHelper),
            "ntske" => Ok(SandboxRole::UnprivilegedHelper),
            other => Err(DriverError::Config(format!("Unknown process role: {}", other))),
        }
    }
}

/// Custom error types for clockshim
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Kernel clock error: {0}")]
    Kernel(String),

    #[error("Sandbox error: {0}")]
    Sandbox(String),

    #[error("Unsupported filter level {0}")]
    UnsupportedFilterLevel(i32),

    #[error("Privilege error: {0}")]
    Privilege(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
}

impl From<nix::errno::Errno> for DriverError {
    fn from(err: nix::errno::Errno) -> Self {
        DriverError::Kernel(err.to_string())
    }
}

/// Result type alias for clockshim operations
pub type Result<T> = std::result::Result<T, DriverError>;

/// Terminate the process on error.
///
/// Kernel clock and sandbox failures leave the daemon in an unknown or
/// under-protected state, so callers of those primitives finish with
/// `unwrap_or_fatal()` instead of continuing.
pub trait OrFatal<T> {
    fn unwrap_or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T> {
    fn unwrap_or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                log::error!("Fatal error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
