//! OpenBSD system calls behind [`super::KernelClockOps`].

use super::ClockInfo;
use crate::config::types::{DriverError, Result};
use nix::sys::time::{TimeSpec, TimeVal};

const CTL_KERN: libc::c_int = 1;
const KERN_CLOCKRATE: libc::c_int = 12;

extern "C" {
    fn adjfreq(newfreq: *const i64, oldfreq: *mut i64) -> libc::c_int;
    fn adjtime(delta: *const libc::timeval, olddelta: *mut libc::timeval) -> libc::c_int;
    fn settimeofday(tp: *const libc::timeval, tzp: *const libc::c_void) -> libc::c_int;
}

fn kernel_error(call: &str) -> DriverError {
    DriverError::Kernel(format!("{}() failed: {}", call, std::io::Error::last_os_error()))
}

pub(super) fn read_freq() -> Result<i64> {
    let mut freq: i64 = 0;
    // SAFETY: adjfreq with a NULL new value only writes the current value to
    // the valid, properly aligned out pointer.
    let rc = unsafe { adjfreq(std::ptr::null(), &mut freq) };
    if rc < 0 {
        return Err(kernel_error("adjfreq"));
    }
    Ok(freq)
}

pub(super) fn write_freq(freq: i64) -> Result<()> {
    // SAFETY: valid pointer to an initialized i64; NULL old-value pointer is allowed.
    let rc = unsafe { adjfreq(&freq, std::ptr::null_mut()) };
    if rc < 0 {
        return Err(kernel_error("adjfreq"));
    }
    Ok(())
}

pub(super) fn adjust_time(delta: &TimeVal) -> Result<()> {
    let raw: &libc::timeval = delta.as_ref();
    // SAFETY: delta points to a valid timeval; NULL old-delta pointer is allowed.
    let rc = unsafe { adjtime(raw, std::ptr::null_mut()) };
    if rc < 0 {
        return Err(kernel_error("adjtime"));
    }
    Ok(())
}

/// Uses settimeofday(2) because the `settime` pledge promise covers it,
/// while clock_settime(2) is not pledged.
pub(super) fn set_realtime(ts: &TimeSpec) -> Result<()> {
    let tv = libc::timeval {
        tv_sec: ts.tv_sec(),
        tv_usec: (ts.tv_nsec() / 1000) as libc::suseconds_t,
    };
    // SAFETY: tv is a valid timeval on the stack; NULL timezone is allowed.
    let rc = unsafe { settimeofday(&tv, std::ptr::null()) };
    if rc < 0 {
        return Err(kernel_error("settimeofday"));
    }
    Ok(())
}

pub(super) fn clock_rate() -> Result<ClockInfo> {
    let mut info = ClockInfo::default();
    let mut len = std::mem::size_of::<ClockInfo>() as libc::size_t;
    let mut mib = [CTL_KERN, KERN_CLOCKRATE];

    // SAFETY: mib has two valid entries, info is a repr(C) clockinfo of the
    // size passed in len, and no new value is written.
    let rc = unsafe {
        libc::sysctl(
            mib.as_mut_ptr(),
            mib.len() as libc::c_uint,
            &mut info as *mut ClockInfo as *mut libc::c_void,
            &mut len,
            std::ptr::null_mut(),
            0,
        )
    };
    if rc < 0 {
        return Err(kernel_error("sysctl"));
    }
    Ok(info)
}
