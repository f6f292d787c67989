//! One-shot application of the role's pledge policy.

use super::policy::{compute_policy, CapabilityPolicy, PolicyFlags};
use crate::config::types::{DriverError, Result, SandboxRole};
use crate::kernel::pledge::PromiseEnforcer;

/// The only filter level this driver implements.
pub const SUPPORTED_FILTER_LEVEL: i32 = 1;

/// Compute and apply the capability policy for `role`.
///
/// Level 0 means "no filter" and never reaches this call. Any other level
/// than 1 is refused in the main process; helpers are forked from it, so they
/// never see an unsupported level that the main process accepted.
pub fn enable_syscall_filter<E>(
    level: i32,
    role: SandboxRole,
    flags: PolicyFlags,
    enforcer: &mut E,
) -> Result<CapabilityPolicy>
where
    E: PromiseEnforcer + ?Sized,
{
    if level != SUPPORTED_FILTER_LEVEL && role.is_main() {
        return Err(DriverError::UnsupportedFilterLevel(level));
    }

    let policy = compute_policy(role, flags);
    let promises = policy.promises();

    enforcer
        .apply(&promises)
        .map_err(|e| DriverError::Sandbox(format!("pledge(\"{}\") failed: {}", promises, e)))?;

    if role.is_main() {
        log::info!("Loaded pledge filter");
    } else {
        log::debug!("Loaded pledge filter ({}: {})", role, promises);
    }

    Ok(policy)
}
