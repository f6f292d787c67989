//! In-memory collaborators for exercising the driver without a kernel.
//!
//! Each fake is a cheap handle over shared state: clone it, hand one clone
//! to the code under test and inspect the other.

use crate::clock::local::LocalClock;
use crate::config::types::{DriverError, Result};
use crate::config::{DaemonConfig, DEFAULT_RTC_SYNC_INTERVAL};
use crate::driver::{DriverParams, DriverRegistry, FrequencyDriver};
use crate::kernel::pledge::PromiseEnforcer;
use crate::kernel::{ClockInfo, KernelClockOps};
use crate::sandbox::privdrop::HelperLauncher;
use nix::sys::time::{TimeSpec, TimeVal};
use std::cell::{RefCell, RefMut};
use std::rc::Rc;

#[derive(Debug)]
pub struct FakeKernelState {
    /// Raw kernel frequency in adjfreq units
    pub freq: i64,
    /// Granularity the fake kernel rounds written frequencies to
    pub freq_quantum: i64,
    pub hz: libc::c_int,
    pub fail_freq: bool,
    pub fail_adjtime: bool,
    pub fail_settime: bool,
    pub fail_clock_rate: bool,
    pub freq_writes: Vec<i64>,
    /// (seconds, microseconds) of every adjtime delta
    pub adjtime_calls: Vec<(i64, i64)>,
    pub settime_calls: Vec<TimeSpec>,
}

impl Default for FakeKernelState {
    fn default() -> Self {
        Self {
            freq: 0,
            freq_quantum: 1,
            hz: 100,
            fail_freq: false,
            fail_adjtime: false,
            fail_settime: false,
            fail_clock_rate: false,
            freq_writes: Vec::new(),
            adjtime_calls: Vec::new(),
            settime_calls: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeKernel {
    state: Rc<RefCell<FakeKernelState>>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RefMut<'_, FakeKernelState> {
        self.state.borrow_mut()
    }

    fn fail(call: &str) -> DriverError {
        DriverError::Kernel(format!("{}() failed: Operation not permitted", call))
    }
}

impl KernelClockOps for FakeKernel {
    fn read_freq(&mut self) -> Result<i64> {
        let state = self.state();
        if state.fail_freq {
            return Err(Self::fail("adjfreq"));
        }
        Ok(state.freq)
    }

    fn write_freq(&mut self, freq: i64) -> Result<()> {
        let mut state = self.state();
        if state.fail_freq {
            return Err(Self::fail("adjfreq"));
        }
        state.freq_writes.push(freq);
        let quantum = state.freq_quantum;
        state.freq = freq / quantum * quantum;
        Ok(())
    }

    fn adjust_time(&mut self, delta: &TimeVal) -> Result<()> {
        let mut state = self.state();
        if state.fail_adjtime {
            return Err(Self::fail("adjtime"));
        }
        state
            .adjtime_calls
            .push((delta.tv_sec() as i64, delta.tv_usec() as i64));
        Ok(())
    }

    fn set_realtime(&mut self, ts: &TimeSpec) -> Result<()> {
        let mut state = self.state();
        if state.fail_settime {
            return Err(Self::fail("settimeofday"));
        }
        state.settime_calls.push(*ts);
        Ok(())
    }

    fn clock_rate(&mut self) -> Result<ClockInfo> {
        let state = self.state();
        if state.fail_clock_rate {
            return Err(Self::fail("sysctl"));
        }
        Ok(ClockInfo {
            hz: state.hz,
            tick: if state.hz > 0 { 1_000_000 / state.hz } else { 0 },
            stathz: state.hz,
            profhz: state.hz,
        })
    }
}

#[derive(Debug)]
pub struct FakeClockState {
    /// Value returned by the next raw time read
    pub raw_time: TimeSpec,
    /// Amount the raw time advances after each read (may be negative)
    pub raw_time_step_nanos: i64,
    pub event_time: TimeSpec,
    pub dispersions: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FakeClock {
    state: Rc<RefCell<FakeClockState>>,
}

impl FakeClock {
    pub fn new(now: TimeSpec) -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeClockState {
                raw_time: now,
                raw_time_step_nanos: 0,
                event_time: now,
                dispersions: Vec::new(),
            })),
        }
    }

    pub fn state(&self) -> RefMut<'_, FakeClockState> {
        self.state.borrow_mut()
    }
}

fn add_nanos(ts: TimeSpec, nanos: i64) -> TimeSpec {
    const NANOS_PER_SEC: i64 = 1_000_000_000;
    let total = ts.tv_sec() as i64 * NANOS_PER_SEC + ts.tv_nsec() as i64 + nanos;
    TimeSpec::new(
        total.div_euclid(NANOS_PER_SEC) as _,
        total.rem_euclid(NANOS_PER_SEC) as _,
    )
}

impl LocalClock for FakeClock {
    fn read_raw_time(&self) -> TimeSpec {
        let mut state = self.state();
        let now = state.raw_time;
        state.raw_time = add_nanos(now, state.raw_time_step_nanos);
        now
    }

    fn last_event_time(&self) -> TimeSpec {
        self.state().event_time
    }

    fn notify_dispersion(&mut self, dispersion: f64) {
        self.state().dispersions.push(dispersion);
    }
}

/// Records every promise string instead of pledging.
#[derive(Debug, Clone, Default)]
pub struct RecordingEnforcer {
    pub applied: Vec<String>,
    pub fail: bool,
}

impl PromiseEnforcer for RecordingEnforcer {
    fn apply(&mut self, promises: &str) -> Result<()> {
        if self.fail {
            return Err(DriverError::Sandbox("pledge() failed: Operation not permitted".to_string()));
        }
        self.applied.push(promises.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingLauncher {
    pub started: u32,
    pub fail: bool,
}

impl HelperLauncher for RecordingLauncher {
    fn start_helper(&mut self) -> Result<()> {
        if self.fail {
            return Err(DriverError::Privilege("fork() failed".to_string()));
        }
        self.started += 1;
        Ok(())
    }
}

/// Driver framework stand-in holding the registered driver.
#[derive(Default)]
pub struct RecordingRegistry {
    pub params: Option<DriverParams>,
    pub driver: Option<Box<dyn FrequencyDriver>>,
    pub finalised: bool,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered driver; panics if initialisation did not register one.
    pub fn driver_mut(&mut self) -> &mut dyn FrequencyDriver {
        self.driver
            .as_deref_mut()
            .expect("no frequency driver registered")
    }
}

impl DriverRegistry for RecordingRegistry {
    fn complete_freq_driver(&mut self, params: DriverParams, driver: Box<dyn FrequencyDriver>) {
        self.params = Some(params);
        self.driver = Some(driver);
    }

    fn finalise(&mut self) {
        self.driver = None;
        self.finalised = true;
    }
}

/// Fixed answers for [`DaemonConfig`].
#[derive(Debug, Clone, Copy)]
pub struct StaticConfig {
    pub rtc_sync: bool,
    pub rtc_interval: f64,
    pub cert_key_pairs: usize,
    pub nts_processes: u32,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            rtc_sync: true,
            rtc_interval: DEFAULT_RTC_SYNC_INTERVAL,
            cert_key_pairs: 0,
            nts_processes: 1,
        }
    }
}

impl DaemonConfig for StaticConfig {
    fn rtc_sync(&self) -> bool {
        self.rtc_sync
    }

    fn rtc_sync_interval(&self) -> f64 {
        self.rtc_interval
    }

    fn nts_server_cert_key_pairs(&self) -> usize {
        self.cert_key_pairs
    }

    fn nts_server_processes(&self) -> u32 {
        self.nts_processes
    }
}
