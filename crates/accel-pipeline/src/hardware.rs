//! Narrow interfaces to the sensor transport and system timer

use crate::{RangeSetting, Sample};
use std::time::Instant;

/// Source of raw samples, read from the periodic sensor interrupt
pub trait Transport {
    /// Read all axes and temperature. Must be fast enough for interrupt context.
    fn acquire_sample(&mut self) -> Sample;
}

/// Register-level side effects issued by the mode and range controllers
pub trait SensorControl {
    /// Program the full-scale range
    fn apply_range(&mut self, range: RangeSetting);

    /// Enable or disable the any-motion interrupt
    fn apply_motion_limit(&mut self, enabled: bool);

    /// Enable or disable the new-data interrupt
    fn apply_new_data_interrupt(&mut self, enabled: bool);

    /// Enable or disable the high-g and low-g limit interrupts
    fn apply_limit_checks(&mut self, _enabled: bool) {}
}

/// Monotonic tick source used only for diagnostics
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }
}
