//! Capability sets requested from pledge(2) per process role.

use crate::config::types::SandboxRole;
use crate::config::DaemonConfig;
use std::collections::BTreeSet;

/// A pledge promise, ordered as it appears in the promise string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// libc stdio and basic descriptor I/O
    BasicIo,
    /// read config, drift file, keys
    FilesystemRead,
    FilesystemWrite,
    FilesystemCreate,
    /// connections to/from the internet
    NetworkInet,
    /// command socket
    NetworkUnix,
    DnsResolution,
    /// hand accepted NTS-KE connections to helper processes
    FdPassingSend,
    FdPassingReceive,
    /// settimeofday/adjtime/adjfreq
    TimeSetting,
}

impl Capability {
    pub fn promise(self) -> &'static str {
        match self {
            Capability::BasicIo => "stdio",
            Capability::FilesystemRead => "rpath",
            Capability::FilesystemWrite => "wpath",
            Capability::FilesystemCreate => "cpath",
            Capability::NetworkInet => "inet",
            Capability::NetworkUnix => "unix",
            Capability::DnsResolution => "dns",
            Capability::FdPassingSend => "sendfd",
            Capability::FdPassingReceive => "recvfd",
            Capability::TimeSetting => "settime",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.promise())
    }
}

/// Ordered whitelist of capabilities for one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityPolicy {
    capabilities: BTreeSet<Capability>,
}

impl CapabilityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.capabilities.iter().copied()
    }

    /// Space-separated pledge promise string in canonical order
    pub fn promises(&self) -> String {
        self.iter()
            .map(Capability::promise)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl FromIterator<Capability> for CapabilityPolicy {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}

/// Inputs that widen the main process's capability set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyFlags {
    /// Running as root, so time can be set without the helper
    pub elevated: bool,
    /// NTS-KE helpers will be forked and need accepted sockets passed to them
    pub helper_configured: bool,
}

impl PolicyFlags {
    pub fn from_config<C: DaemonConfig + ?Sized>(config: &C, euid: u32) -> Self {
        Self {
            elevated: euid == 0,
            helper_configured: config.nts_server_cert_key_pairs() > 0
                && config.nts_server_processes() > 0,
        }
    }
}

/// Minimal capability set for `role`.
pub fn compute_policy(role: SandboxRole, flags: PolicyFlags) -> CapabilityPolicy {
    match role {
        SandboxRole::MainProcess => {
            let mut policy: CapabilityPolicy = [
                Capability::BasicIo,
                Capability::FilesystemRead,
                Capability::FilesystemWrite,
                Capability::FilesystemCreate,
                Capability::NetworkInet,
                Capability::NetworkUnix,
                Capability::DnsResolution,
            ]
            .into_iter()
            .collect();

            if flags.helper_configured {
                policy = policy.with(Capability::FdPassingSend);
            }
            // Without root the privops helper holds settime instead
            if flags.elevated {
                policy = policy.with(Capability::TimeSetting);
            }
            policy
        }
        SandboxRole::PrivilegedHelper => CapabilityPolicy::new()
            .with(Capability::BasicIo)
            .with(Capability::TimeSetting),
        SandboxRole::UnprivilegedHelper => CapabilityPolicy::new()
            .with(Capability::BasicIo)
            .with(Capability::FdPassingReceive),
    }
}
