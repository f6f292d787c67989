//! Irreversible UID/GID transition away from root.
//!
//! CRITICAL: setresgid MUST be called BEFORE setresuid; once the UID is
//! dropped the process can no longer change its groups.

use super::validation::validate_uid;
use crate::config::types::{DriverError, Result};
use nix::unistd::{getegid, geteuid, getgid, getuid, setgroups, setresgid, setresuid, Gid, Uid};

/// 5-step transition: validate -> clear groups -> setresgid -> setresuid -> verify.
pub fn transition_to_unprivileged(uid: u32, gid: u32) -> Result<()> {
    validate_uid(uid)?;

    setgroups(&[]).map_err(|e| {
        DriverError::Privilege(format!("Failed to clear supplementary groups: {}", e))
    })?;

    // CRITICAL: GID before UID
    let gid = Gid::from_raw(gid);
    setresgid(gid, gid, gid)
        .map_err(|e| DriverError::Privilege(format!("setresgid({}) failed: {}", gid, e)))?;

    let uid = Uid::from_raw(uid);
    setresuid(uid, uid, uid)
        .map_err(|e| DriverError::Privilege(format!("setresuid({}) failed: {}", uid, e)))?;

    verify_transition(uid, gid)?;

    log::debug!("Dropped root privileges to UID={}, GID={}", uid, gid);
    Ok(())
}

fn verify_transition(expected_uid: Uid, expected_gid: Gid) -> Result<()> {
    if getuid() != expected_uid || geteuid() != expected_uid {
        return Err(DriverError::Privilege(format!(
            "UID verification failed: expected {}, got real={}, effective={}",
            expected_uid,
            getuid(),
            geteuid()
        )));
    }

    if getgid() != expected_gid || getegid() != expected_gid {
        return Err(DriverError::Privilege(format!(
            "GID verification failed: expected {}, got real={}, effective={}",
            expected_gid,
            getgid(),
            getegid()
        )));
    }

    Ok(())
}
