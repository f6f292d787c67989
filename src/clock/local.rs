//! Local clock collaborator: raw time, scheduler event time and
//! dispersion notification.

use crate::config::types::{DriverError, OrFatal, Result};
use nix::sys::time::TimeSpec;
use nix::time::{clock_gettime, ClockId};

/// Access to the daemon's local clock layer.
pub trait LocalClock {
    /// Current system time, uncorrected by the daemon's pending offset
    fn read_raw_time(&self) -> TimeSpec;

    /// Time at which the scheduler dispatched the current event
    fn last_event_time(&self) -> TimeSpec;

    /// Report extra uncertainty (seconds) introduced into the clock
    fn notify_dispersion(&mut self, dispersion: f64);
}

/// `a - b` in seconds.
pub fn diff_timespecs(a: &TimeSpec, b: &TimeSpec) -> f64 {
    (a.tv_sec() - b.tv_sec()) as f64 + (a.tv_nsec() - b.tv_nsec()) as f64 * 1e-9
}

pub type DispersionHandler = Box<dyn FnMut(f64)>;

/// [`LocalClock`] reading `CLOCK_REALTIME` and fanning dispersion out to
/// registered handlers.
#[derive(Default)]
pub struct SystemClock {
    handlers: Vec<DispersionHandler>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dispersion_handler(&mut self, handler: DispersionHandler) {
        self.handlers.push(handler);
    }

    fn realtime() -> Result<TimeSpec> {
        clock_gettime(ClockId::CLOCK_REALTIME)
            .map_err(|e| DriverError::Kernel(format!("clock_gettime() failed: {}", e)))
    }
}

impl LocalClock for SystemClock {
    fn read_raw_time(&self) -> TimeSpec {
        Self::realtime().unwrap_or_fatal()
    }

    fn last_event_time(&self) -> TimeSpec {
        Self::realtime().unwrap_or_fatal()
    }

    fn notify_dispersion(&mut self, dispersion: f64) {
        for handler in self.handlers.iter_mut() {
            handler(dispersion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn diff_handles_nanosecond_borrow() {
        let a = TimeSpec::new(10, 100_000_000);
        let b = TimeSpec::new(9, 900_000_000);
        assert!((diff_timespecs(&a, &b) - 0.2).abs() < 1e-12);
        assert!((diff_timespecs(&b, &a) + 0.2).abs() < 1e-12);
    }

    #[test]
    fn system_clock_reads_realtime() {
        let clock = SystemClock::new();
        assert!(clock.read_raw_time().tv_sec() > 0);
        assert!(clock.last_event_time().tv_sec() > 0);
    }

    #[test]
    fn dispersion_reaches_every_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut clock = SystemClock::new();

        for _ in 0..2 {
            let seen = Rc::clone(&seen);
            clock.add_dispersion_handler(Box::new(move |d| seen.borrow_mut().push(d)));
        }

        clock.notify_dispersion(1.5e-6);
        assert_eq!(*seen.borrow(), vec![1.5e-6, 1.5e-6]);
    }
}
