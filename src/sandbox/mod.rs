//! Privilege separation: user switch and pledge policy per process role.

pub mod filter;
pub mod policy;
pub mod privdrop;

pub use filter::{enable_syscall_filter, SUPPORTED_FILTER_LEVEL};
pub use policy::{compute_policy, Capability, CapabilityPolicy, PolicyFlags};
pub use privdrop::{drop_root, HelperLauncher};
