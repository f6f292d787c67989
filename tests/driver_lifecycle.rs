//! End-to-end driver lifecycle against in-memory collaborators.

use clockshim::clock::{FREQ_SCALE, MAX_FREQ_PPM};
use clockshim::config::DriverConfig;
use clockshim::testing::{FakeClock, FakeKernel, RecordingRegistry, StaticConfig};
use clockshim::{finalise, initialise, DriverError};
use nix::sys::time::TimeSpec;

const BOOT: i64 = 1_700_000_000;

fn boot() -> TimeSpec {
    TimeSpec::new(BOOT, 0)
}

fn after(secs: i64) -> TimeSpec {
    TimeSpec::new(BOOT + secs, 0)
}

#[test]
fn tick_rate_of_100_registers_10ms_interval() {
    let kernel = FakeKernel::new();
    kernel.state().hz = 100;
    let mut registry = RecordingRegistry::new();

    initialise(kernel, FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();

    let params = registry.params.expect("driver registered");
    assert_eq!(params.tick_interval, 1.0 / 100.0);
    assert_eq!(params.max_frequency_ppm, MAX_FREQ_PPM);
}

#[test]
fn initialise_clears_stale_adjustment_before_registering() {
    let kernel = FakeKernel::new();
    let mut registry = RecordingRegistry::new();

    initialise(kernel.clone(), FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();

    assert_eq!(kernel.state().adjtime_calls, vec![(0, 0)]);
    assert!(kernel.state().freq_writes.is_empty());
}

#[test]
fn frequency_round_trip_through_registered_driver() {
    let kernel = FakeKernel::new();
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    for freq in [-MAX_FREQ_PPM, -73.123_456, -1e-4, 0.0, 2e-3, 31.25, 4_096.5, MAX_FREQ_PPM] {
        let actual = driver.set_frequency(freq).unwrap();
        let read = driver.read_frequency().unwrap();
        assert_eq!(actual, read);
        assert!((read - freq).abs() < 1e-9, "set {} read {}", freq, read);
    }

    // Sign convention: a positive offset is stored as a negative advance
    driver.set_frequency(1.0).unwrap();
    assert_eq!(kernel.state().freq, -(FREQ_SCALE as i64));
}

#[test]
fn zero_frequency_round_trips_exactly() {
    let mut registry = RecordingRegistry::new();
    initialise(FakeKernel::new(), FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    driver.set_frequency(250.0).unwrap();
    assert_eq!(driver.set_frequency(0.0).unwrap(), 0.0);
    assert_eq!(driver.read_frequency().unwrap(), 0.0);
}

#[test]
fn kernel_failure_after_registration_is_reported() {
    let kernel = FakeKernel::new();
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();

    kernel.state().fail_freq = true;
    let driver = registry.driver_mut();

    assert!(matches!(driver.read_frequency(), Err(DriverError::Kernel(_))));
    assert!(matches!(driver.set_frequency(5.0), Err(DriverError::Kernel(_))));
}

#[test]
fn unsynchronised_daemon_never_touches_rtc() {
    let kernel = FakeKernel::new();
    let clock = FakeClock::new(boot());
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), clock.clone(), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    for hour in 0..100 {
        clock.state().event_time = after(hour * 3600);
        driver.set_sync_status(false, 0.0, 0.0);
    }

    assert!(kernel.state().settime_calls.is_empty());
    assert!(clock.state().dispersions.is_empty());
}

#[test]
fn hourly_schedule_over_a_day() {
    let kernel = FakeKernel::new();
    let clock = FakeClock::new(boot());
    clock.state().raw_time_step_nanos = 40_000;
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), clock.clone(), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    // Scheduler fires every 64 s for 24 h
    let mut t = 0;
    while t <= 24 * 3600 {
        clock.state().event_time = after(t);
        driver.set_sync_status(true, 1e-4, 1e-3);
        t += 64;
    }

    let writes = kernel.state().settime_calls.len();
    assert!((23..=24).contains(&writes), "{} RTC writes", writes);

    let dispersions = clock.state().dispersions.clone();
    assert_eq!(dispersions.len(), writes);
    assert!(dispersions.iter().all(|d| (*d - 40e-6).abs() < 1e-12));
}

#[test]
fn backward_step_does_not_stall_rtc_schedule() {
    let kernel = FakeKernel::new();
    let clock = FakeClock::new(boot());
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), clock.clone(), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    // Clock stepped back by a day right after start
    let mut fired_at = None;
    for minute in 0..200 {
        clock.state().event_time = TimeSpec::new(BOOT - 86_400 + minute * 60, 0);
        driver.set_sync_status(true, 0.0, 0.0);
        if fired_at.is_none() && !kernel.state().settime_calls.is_empty() {
            fired_at = Some(minute);
        }
    }

    // First call is already a day away from the start time
    assert_eq!(fired_at, Some(0));
    // And then hourly from the new time base
    assert_eq!(kernel.state().settime_calls.len(), 4);
}

#[test]
fn rtc_write_failures_are_not_fatal() {
    let kernel = FakeKernel::new();
    kernel.state().fail_settime = true;
    let clock = FakeClock::new(boot());
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), clock.clone(), &StaticConfig::default(), &mut registry).unwrap();
    let driver = registry.driver_mut();

    clock.state().event_time = after(3600);
    driver.set_sync_status(true, 0.0, 0.0);

    assert!(clock.state().dispersions.is_empty());
    // Driver keeps working
    assert_eq!(driver.set_frequency(3.0).unwrap(), 3.0);
}

#[test]
fn config_file_controls_rtc_sync() {
    let config = DriverConfig::from_json(r#"{ "rtc_sync": true, "rtc_sync_interval_secs": 600.0 }"#).unwrap();
    let kernel = FakeKernel::new();
    let clock = FakeClock::new(boot());
    let mut registry = RecordingRegistry::new();
    initialise(kernel.clone(), clock.clone(), &config, &mut registry).unwrap();
    let driver = registry.driver_mut();

    clock.state().event_time = after(599);
    driver.set_sync_status(true, 0.0, 0.0);
    assert!(kernel.state().settime_calls.is_empty());

    clock.state().event_time = after(600);
    driver.set_sync_status(true, 0.0, 0.0);
    assert_eq!(kernel.state().settime_calls.len(), 1);
}

#[test]
fn finalise_unregisters_driver() {
    let mut registry = RecordingRegistry::new();
    initialise(FakeKernel::new(), FakeClock::new(boot()), &StaticConfig::default(), &mut registry).unwrap();

    finalise(&mut registry);

    assert!(registry.finalised);
    assert!(registry.driver.is_none());
}
