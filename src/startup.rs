//! Startup ordering for privilege separation.
//!
//! Each process drops root (optionally) and then applies its pledge filter,
//! each at most once. The ordering is a type-state chain so that illegal
//! sequences do not compile:
//!
//! Fresh -> RootDropped -> Sandboxed
//! Fresh -> Sandboxed
//!
//! ```
//! use clockshim::sandbox::PolicyFlags;
//! use clockshim::startup::ProcessSetup;
//! use clockshim::testing::RecordingEnforcer;
//! use clockshim::SandboxRole;
//!
//! let mut enforcer = RecordingEnforcer::default();
//! let setup = ProcessSetup::new(SandboxRole::UnprivilegedHelper)
//!     .enable_syscall_filter(1, PolicyFlags::default(), &mut enforcer)
//!     .unwrap();
//! assert_eq!(setup.policy().promises(), "stdio recvfd");
//! ```
//!
//! Applying the filter twice, or dropping root after the filter, fails to
//! compile (see `tests/typestate_compile_fail/`).

use crate::config::types::{Result, SandboxRole};
use crate::kernel::pledge::PromiseEnforcer;
use crate::sandbox::filter::enable_syscall_filter;
use crate::sandbox::policy::{CapabilityPolicy, PolicyFlags};
use crate::sandbox::privdrop::{drop_root, HelperLauncher};
use std::marker::PhantomData;

/// Type-state marker: still running with startup credentials
pub struct Fresh;

/// Type-state marker: switched to the unprivileged user
pub struct RootDropped;

/// Type-state marker: pledge applied, no further transitions
pub struct Sandboxed;

/// Process privilege setup with type-state tracking
pub struct ProcessSetup<S> {
    role: SandboxRole,
    policy: CapabilityPolicy,
    _state: PhantomData<S>,
}

impl<S> ProcessSetup<S> {
    pub fn role(&self) -> SandboxRole {
        self.role
    }

    fn advance<T>(self, policy: CapabilityPolicy) -> ProcessSetup<T> {
        ProcessSetup {
            role: self.role,
            policy,
            _state: PhantomData,
        }
    }
}

impl ProcessSetup<Fresh> {
    pub fn new(role: SandboxRole) -> Self {
        Self {
            role,
            policy: CapabilityPolicy::new(),
            _state: PhantomData,
        }
    }

    pub fn drop_root<L>(self, uid: u32, gid: u32, launcher: &mut L) -> Result<ProcessSetup<RootDropped>>
    where
        L: HelperLauncher + ?Sized,
    {
        drop_root(uid, gid, self.role, launcher)?;
        Ok(self.advance(CapabilityPolicy::new()))
    }

    /// Sandbox without switching user (daemon configured to stay root)
    pub fn enable_syscall_filter<E>(
        self,
        level: i32,
        flags: PolicyFlags,
        enforcer: &mut E,
    ) -> Result<ProcessSetup<Sandboxed>>
    where
        E: PromiseEnforcer + ?Sized,
    {
        let policy = enable_syscall_filter(level, self.role, flags, enforcer)?;
        Ok(self.advance(policy))
    }
}

impl ProcessSetup<RootDropped> {
    pub fn enable_syscall_filter<E>(
        self,
        level: i32,
        flags: PolicyFlags,
        enforcer: &mut E,
    ) -> Result<ProcessSetup<Sandboxed>>
    where
        E: PromiseEnforcer + ?Sized,
    {
        let policy = enable_syscall_filter(level, self.role, flags, enforcer)?;
        Ok(self.advance(policy))
    }
}

impl ProcessSetup<Sandboxed> {
    /// The policy the kernel is enforcing
    pub fn policy(&self) -> &CapabilityPolicy {
        &self.policy
    }
}
