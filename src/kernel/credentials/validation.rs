//! Target credential checks run before any syscall.

use crate::config::types::{DriverError, Result};

/// Reject uid 0 as a drop target. A non-root user whose primary group is 0
/// is allowed.
pub fn validate_uid(uid: u32) -> Result<()> {
    if uid == 0 {
        return Err(DriverError::Privilege(
            "Cannot drop root privileges to UID 0".to_string(),
        ));
    }
    Ok(())
}
