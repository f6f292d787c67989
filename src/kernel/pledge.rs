//! pledge(2) promise enforcement.
//!
//! Applying promises is one-way: the kernel only allows a later call to
//! narrow the set, and any syscall outside it kills the process.

use crate::config::types::{DriverError, Result};

/// Applies a space-separated promise string to the current process.
pub trait PromiseEnforcer {
    fn apply(&mut self, promises: &str) -> Result<()>;
}

/// Enforcer backed by the running kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPledge;

impl PromiseEnforcer for SystemPledge {
    fn apply(&mut self, promises: &str) -> Result<()> {
        #[cfg(target_os = "openbsd")]
        {
            let promises_c = std::ffi::CString::new(promises)
                .map_err(|_| DriverError::Sandbox("Promise string contains NUL byte".to_string()))?;

            // SAFETY: promises_c is a valid NUL-terminated string; NULL
            // execpromises leaves exec promises unchanged.
            let rc = unsafe { libc::pledge(promises_c.as_ptr(), std::ptr::null()) };
            if rc < 0 {
                return Err(DriverError::Sandbox(format!(
                    "pledge() failed: {}",
                    std::io::Error::last_os_error()
                )));
            }
            Ok(())
        }

        #[cfg(not(target_os = "openbsd"))]
        {
            Err(DriverError::Unsupported(format!(
                "pledge(\"{}\") is only available on OpenBSD",
                promises
            )))
        }
    }
}

/// Check if pledge is supported on this system
pub fn is_pledge_supported() -> bool {
    cfg!(target_os = "openbsd")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_os = "openbsd"))]
    #[test]
    fn system_pledge_fails_closed_off_openbsd() {
        let result = SystemPledge.apply("stdio");
        assert!(matches!(result, Err(DriverError::Unsupported(_))));
        assert!(!is_pledge_supported());
    }
}
