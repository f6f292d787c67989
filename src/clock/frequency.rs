//! Oscillator frequency control through `adjfreq(2)`.
//!
//! The kernel takes the frequency as a signed fixed-point "advance" in units
//! of `1000 << 32` per ppm. The driver reports the offset to apply, so both
//! conversions negate. Scale and sign are the OpenBSD ABI; another kernel
//! needs its own constants.

use crate::config::types::{DriverError, Result};
use crate::kernel::KernelClockOps;
use nix::sys::time::TimeVal;

/// Kernel fixed-point units per ppm
pub const FREQ_SCALE: f64 = (1000i64 << 32) as f64;

/// Maximum frequency offset (ppm).
///
/// The OpenBSD kernel accepts up to 500000 ppm; the daemon-wide ceiling is
/// used instead so the tested range matches other platforms.
pub const MAX_FREQ_PPM: f64 = 100_000.0;

pub fn raw_to_ppm(raw: i64) -> f64 {
    -(raw as f64) / FREQ_SCALE
}

pub fn ppm_to_raw(freq_ppm: f64) -> i64 {
    (-freq_ppm * FREQ_SCALE) as i64
}

/// Kernel clock interrupt rate, fixed for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTickRate {
    pub hz: u32,
}

impl ClockTickRate {
    /// Seconds per tick, reported as the driver's timer resolution
    pub fn tick_interval(&self) -> f64 {
        1.0 / f64::from(self.hz)
    }
}

/// Frequency and slew control on top of raw kernel primitives.
#[derive(Debug)]
pub struct KernelClock<K: KernelClockOps> {
    kernel: K,
}

impl<K: KernelClockOps> KernelClock<K> {
    pub fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    /// Current frequency offset in ppm.
    pub fn read_frequency(&mut self) -> Result<f64> {
        let raw = self.kernel.read_freq()?;
        Ok(raw_to_ppm(raw))
    }

    /// Set the frequency offset and return what the kernel actually applied.
    ///
    /// The kernel may round the value, so it is read back rather than trusted.
    pub fn set_frequency(&mut self, freq_ppm: f64) -> Result<f64> {
        // NaN would otherwise convert to raw 0 and wipe the current correction
        if !freq_ppm.is_finite() {
            return Err(DriverError::Kernel(format!(
                "Refusing non-finite frequency {} ppm",
                freq_ppm
            )));
        }

        let clamped = freq_ppm.clamp(-MAX_FREQ_PPM, MAX_FREQ_PPM);
        if clamped != freq_ppm {
            log::debug!("Frequency {:.3} ppm clamped to {:.3} ppm", freq_ppm, clamped);
        }

        self.kernel.write_freq(ppm_to_raw(clamped))?;
        self.read_frequency()
    }

    pub fn query_tick_rate(&mut self) -> Result<ClockTickRate> {
        let info = self.kernel.clock_rate()?;
        let hz = u32::try_from(info.hz)
            .ok()
            .filter(|hz| *hz > 0)
            .ok_or_else(|| DriverError::Kernel(format!("Invalid kernel clock rate hz={}", info.hz)))?;

        Ok(ClockTickRate { hz })
    }

    /// Cancel any slew left running by a previous instance of the daemon.
    pub fn reset_pending_adjustment(&mut self) -> Result<()> {
        self.kernel.adjust_time(&TimeVal::new(0, 0))
    }
}
