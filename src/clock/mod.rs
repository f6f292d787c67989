//! Clock control on top of the kernel primitives.
//!
//! - [`frequency`]: ppm <-> kernel unit conversion, read/set, tick rate
//! - [`rtc`]: hourly RTC resynchronisation while synchronised
//! - [`local`]: the daemon's local clock collaborator

pub mod frequency;
pub mod local;
pub mod rtc;

pub use frequency::{ClockTickRate, KernelClock, FREQ_SCALE, MAX_FREQ_PPM};
pub use local::{diff_timespecs, LocalClock, SystemClock};
pub use rtc::RealtimeClockSync;
