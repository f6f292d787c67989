//! Root privilege dropping.
//!
//! The main process forks the privops helper while it is still root, so
//! clock writes keep working after it switches user.

use crate::config::types::{Result, SandboxRole};
use crate::kernel::credentials::transition_to_unprivileged;

/// Starts the root helper that performs clock writes for the main process.
pub trait HelperLauncher {
    fn start_helper(&mut self) -> Result<()>;
}

/// Start the privops helper (main process only), then switch to `uid`/`gid`.
pub fn drop_root<L>(uid: u32, gid: u32, role: SandboxRole, launcher: &mut L) -> Result<()>
where
    L: HelperLauncher + ?Sized,
{
    drop_root_with(uid, gid, role, launcher, transition_to_unprivileged)
}

pub(crate) fn drop_root_with<L, T>(
    uid: u32,
    gid: u32,
    role: SandboxRole,
    launcher: &mut L,
    transition: T,
) -> Result<()>
where
    L: HelperLauncher + ?Sized,
    T: FnOnce(u32, u32) -> Result<()>,
{
    if role.is_main() {
        launcher.start_helper()?;
    }

    transition(uid, gid)
}
