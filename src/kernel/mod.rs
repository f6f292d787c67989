//! Thin wrappers around OpenBSD kernel clock and privilege primitives.
//!
//! All `unsafe` code is concentrated here with explicit SAFETY comments.
//! Every other module reaches the kernel through [`KernelClockOps`] or
//! [`pledge::PromiseEnforcer`], so decision logic stays testable on any host.

pub mod credentials;
#[cfg(target_os = "openbsd")]
mod openbsd;
pub mod pledge;

use crate::config::types::Result;
use nix::sys::time::{TimeSpec, TimeVal};

/// Kernel clock rates as reported by `sysctl(KERN_CLOCKRATE)`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockInfo {
    /// Clock interrupt frequency
    pub hz: libc::c_int,
    /// Microseconds per hz tick
    pub tick: libc::c_int,
    /// Statistics clock frequency
    pub stathz: libc::c_int,
    /// Profiling clock frequency
    pub profhz: libc::c_int,
}

/// Raw kernel primitives used by the clock driver.
///
/// Frequency values are in the kernel's native fixed-point units; conversion
/// to ppm happens in [`crate::clock::frequency`].
pub trait KernelClockOps {
    /// Current oscillator frequency adjustment (`adjfreq(NULL, &old)`)
    fn read_freq(&mut self) -> Result<i64>;

    /// Replace the oscillator frequency adjustment (`adjfreq(&new, NULL)`)
    fn write_freq(&mut self, freq: i64) -> Result<()>;

    /// Start a slew of `delta`, replacing any pending one (`adjtime`)
    fn adjust_time(&mut self, delta: &TimeVal) -> Result<()>;

    /// Step the realtime clock; the kernel also writes it through to the RTC
    fn set_realtime(&mut self, ts: &TimeSpec) -> Result<()>;

    fn clock_rate(&mut self) -> Result<ClockInfo>;
}

/// Direct in-process access to the running kernel.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemKernel;

impl SystemKernel {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "openbsd")]
impl KernelClockOps for SystemKernel {
    fn read_freq(&mut self) -> Result<i64> {
        openbsd::read_freq()
    }

    fn write_freq(&mut self, freq: i64) -> Result<()> {
        openbsd::write_freq(freq)
    }

    fn adjust_time(&mut self, delta: &TimeVal) -> Result<()> {
        openbsd::adjust_time(delta)
    }

    fn set_realtime(&mut self, ts: &TimeSpec) -> Result<()> {
        openbsd::set_realtime(ts)
    }

    fn clock_rate(&mut self) -> Result<ClockInfo> {
        openbsd::clock_rate()
    }
}

#[cfg(not(target_os = "openbsd"))]
impl KernelClockOps for SystemKernel {
    fn read_freq(&mut self) -> Result<i64> {
        Err(unsupported("adjfreq"))
    }

    fn write_freq(&mut self, _freq: i64) -> Result<()> {
        Err(unsupported("adjfreq"))
    }

    fn adjust_time(&mut self, _delta: &TimeVal) -> Result<()> {
        Err(unsupported("adjtime"))
    }

    fn set_realtime(&mut self, _ts: &TimeSpec) -> Result<()> {
        Err(unsupported("settimeofday"))
    }

    fn clock_rate(&mut self) -> Result<ClockInfo> {
        Err(unsupported("sysctl(KERN_CLOCKRATE)"))
    }
}

#[cfg(not(target_os = "openbsd"))]
fn unsupported(call: &str) -> crate::config::types::DriverError {
    crate::config::types::DriverError::Unsupported(format!("{} is only available on OpenBSD", call))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_info_matches_kernel_layout() {
        assert_eq!(
            std::mem::size_of::<ClockInfo>(),
            4 * std::mem::size_of::<libc::c_int>()
        );
    }

    #[cfg(not(target_os = "openbsd"))]
    #[test]
    fn system_kernel_is_unsupported_off_openbsd() {
        use crate::config::types::DriverError;

        let mut kernel = SystemKernel::new();
        assert!(matches!(kernel.read_freq(), Err(DriverError::Unsupported(_))));
        assert!(matches!(kernel.write_freq(0), Err(DriverError::Unsupported(_))));
        assert!(matches!(kernel.clock_rate(), Err(DriverError::Unsupported(_))));
    }
}
