//! Registration of the OpenBSD frequency driver with the daemon's generic
//! driver framework.
//!
//! The framework decides when and by how much to adjust the clock; this
//! driver only executes requests against the kernel. Callbacks return
//! [`Result`] and the framework is expected to finish them with
//! [`OrFatal::unwrap_or_fatal`](crate::config::types::OrFatal): there is no
//! safe way to continue with an unknown clock state.

use crate::clock::{KernelClock, LocalClock, RealtimeClockSync, MAX_FREQ_PPM};
use crate::config::types::Result;
use crate::config::{validate_rtc_sync_interval, DaemonConfig};
use crate::kernel::KernelClockOps;

/// Static driver properties reported at registration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverParams {
    /// Largest frequency offset (ppm) the framework may request
    pub max_frequency_ppm: f64,
    /// Kernel tick interval in seconds
    pub tick_interval: f64,
}

/// Callbacks the generic framework drives.
pub trait FrequencyDriver {
    fn read_frequency(&mut self) -> Result<f64>;

    /// Returns the frequency actually in effect afterwards
    fn set_frequency(&mut self, freq_ppm: f64) -> Result<f64>;

    fn set_sync_status(&mut self, synchronised: bool, est_error: f64, max_error: f64);
}

/// The generic driver framework.
pub trait DriverRegistry {
    fn complete_freq_driver(&mut self, params: DriverParams, driver: Box<dyn FrequencyDriver>);

    fn finalise(&mut self);
}

/// OpenBSD frequency driver state.
pub struct OpenBsdDriver<K: KernelClockOps, C: LocalClock> {
    clock: KernelClock<K>,
    local: C,
    rtc: RealtimeClockSync,
}

impl<K: KernelClockOps, C: LocalClock> OpenBsdDriver<K, C> {
    pub fn new(clock: KernelClock<K>, local: C, rtc: RealtimeClockSync) -> Self {
        Self { clock, local, rtc }
    }
}

impl<K: KernelClockOps, C: LocalClock> FrequencyDriver for OpenBsdDriver<K, C> {
    fn read_frequency(&mut self) -> Result<f64> {
        self.clock.read_frequency()
    }

    fn set_frequency(&mut self, freq_ppm: f64) -> Result<f64> {
        self.clock.set_frequency(freq_ppm)
    }

    fn set_sync_status(&mut self, synchronised: bool, est_error: f64, max_error: f64) {
        let now = self.local.last_event_time();
        self.rtc.maybe_resync(
            synchronised,
            est_error,
            max_error,
            now,
            self.clock.kernel_mut(),
            &mut self.local,
        );
    }
}

/// Prepare the kernel clock and register the driver.
///
/// Queries the tick rate, cancels any adjtime slew left by a previous run
/// and starts the RTC schedule from the current time. The RTC interval is
/// checked first, whatever [`DaemonConfig`] supplies it.
pub fn initialise<K, C, D, R>(kernel: K, local: C, config: &D, registry: &mut R) -> Result<()>
where
    K: KernelClockOps + 'static,
    C: LocalClock + 'static,
    D: DaemonConfig + ?Sized,
    R: DriverRegistry + ?Sized,
{
    validate_rtc_sync_interval(config.rtc_sync_interval())?;

    let mut clock = KernelClock::new(kernel);

    let tick_rate = clock.query_tick_rate()?;
    clock.reset_pending_adjustment()?;

    let rtc = RealtimeClockSync::with_interval(
        config.rtc_sync(),
        config.rtc_sync_interval(),
        local.read_raw_time(),
    );

    let params = DriverParams {
        max_frequency_ppm: MAX_FREQ_PPM,
        tick_interval: tick_rate.tick_interval(),
    };

    log::debug!(
        "Registering OpenBSD frequency driver: hz={}, max_freq={} ppm, rtc_sync={}",
        tick_rate.hz,
        params.max_frequency_ppm,
        config.rtc_sync()
    );

    registry.complete_freq_driver(params, Box::new(OpenBsdDriver::new(clock, local, rtc)));
    Ok(())
}

pub fn finalise<R: DriverRegistry + ?Sized>(registry: &mut R) {
    registry.finalise();
}
