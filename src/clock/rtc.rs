//! Periodic push of the system time to the hardware RTC.
//!
//! On OpenBSD setting the system time also writes the RTC, so a resync is
//! "set the clock to what it already reads". Only done while the daemon
//! considers the system clock synchronised.

use super::local::{diff_timespecs, LocalClock};
use crate::config::DEFAULT_RTC_SYNC_INTERVAL;
use crate::kernel::KernelClockOps;
use nix::sys::time::TimeSpec;

#[derive(Debug, Clone)]
pub struct RealtimeClockSync {
    enabled: bool,
    interval: f64,
    last_sync: TimeSpec,
}

impl RealtimeClockSync {
    /// `last_sync` is the process start time; the first resync happens one
    /// interval after it.
    pub fn new(enabled: bool, last_sync: TimeSpec) -> Self {
        Self::with_interval(enabled, DEFAULT_RTC_SYNC_INTERVAL, last_sync)
    }

    pub fn with_interval(enabled: bool, interval: f64, last_sync: TimeSpec) -> Self {
        Self {
            enabled,
            interval,
            last_sync,
        }
    }

    pub fn last_sync(&self) -> TimeSpec {
        self.last_sync
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Resync the RTC if synchronised, enabled and an interval has passed.
    ///
    /// Elapsed time is taken as an absolute value so a backward step of the
    /// system clock cannot stall the schedule. `last_sync` advances even when
    /// the write fails; the next attempt is one interval later.
    ///
    /// Returns whether a resync was attempted.
    pub fn maybe_resync<K, C>(
        &mut self,
        synchronised: bool,
        _est_error: f64,
        _max_error: f64,
        now: TimeSpec,
        kernel: &mut K,
        clock: &mut C,
    ) -> bool
    where
        K: KernelClockOps,
        C: LocalClock,
    {
        if !synchronised || !self.enabled {
            return false;
        }

        let elapsed = diff_timespecs(&now, &self.last_sync);
        if elapsed.abs() < self.interval {
            return false;
        }

        perform_resync(kernel, clock);
        self.last_sync = now;
        log::debug!("rtc synchronised");
        true
    }
}

/// Step the clock to its own raw reading and report the latency of the write.
///
/// The residual between the readings before and after the write is error
/// the write itself introduced, so it is passed on as dispersion. A failed
/// write is not fatal; it only costs RTC accuracy at the next boot.
pub fn perform_resync<K, C>(kernel: &mut K, clock: &mut C) -> bool
where
    K: KernelClockOps,
    C: LocalClock,
{
    let ts = clock.read_raw_time();

    if let Err(e) = kernel.set_realtime(&ts) {
        log::debug!("settimeofday() failed: {}", e);
        return false;
    }

    let new_ts = clock.read_raw_time();
    let err = diff_timespecs(&new_ts, &ts);

    clock.notify_dispersion(err.abs());
    true
}
