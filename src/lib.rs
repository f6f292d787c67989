//! clockshim: OpenBSD system driver for a clock-synchronization daemon
//!
//! Executes frequency adjustments requested by the daemon's generic driver
//! framework against the OpenBSD kernel, keeps the hardware RTC in step with
//! a synchronised system clock, and builds the pledge(2) promise set each
//! privilege-separated process runs under.
//!
//! # Architecture
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::KernelClockOps`]: adjfreq/adjtime/settimeofday/sysctl seam
//! - [`kernel::credentials`]: UID/GID transition away from root
//! - [`kernel::pledge`]: promise enforcement
//!
//! ## Clock Control ([`clock`])
//! - [`clock::frequency`]: ppm conversion, read-back after set, tick rate
//! - [`clock::rtc`]: periodic RTC resynchronisation
//! - [`clock::local`]: local clock collaborator and timestamp arithmetic
//!
//! ## Privilege Separation ([`sandbox`], [`startup`])
//! - [`sandbox::policy`]: capability set per process role
//! - [`sandbox::filter`]: one-shot policy application
//! - [`sandbox::privdrop`]: helper start and user switch
//! - [`startup`]: type-state ordering of drop-root and filter
//!
//! ## Driver Lifecycle ([`driver`])
//! - [`driver::initialise`] / [`driver::finalise`]
//!
//! Kernel and sandbox failures are fatal for the daemon: operations return
//! [`Result`] and callers finish them with [`OrFatal::unwrap_or_fatal`].

// Kernel Primitives
pub mod kernel;

// Clock Control
pub mod clock;

// Privilege Separation
pub mod sandbox;
pub mod startup;

// Driver Lifecycle
pub mod driver;

// Configuration & Types
pub mod config;

// Testing Infrastructure
pub mod testing;

// CLI entrypoint
pub mod cli;

pub use config::types::{DriverError, OrFatal, Result, SandboxRole};
pub use driver::{finalise, initialise, DriverParams, DriverRegistry, FrequencyDriver};
