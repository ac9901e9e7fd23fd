//! Simulated SMB380-style accelerometer
//!
//! Plays a repeating rest / shake / impact / rest profile. Axis values are
//! encoded into 10-bit registers with the range programmed into the
//! "hardware", then decoded with the pipeline's latched conversion range,
//! the same way a real transport reads the part.

use accel_pipeline::units::{decode_axis, decode_temperature, encode_axis};
use accel_pipeline::{Pipeline, RangeSetting, Sample, SensorControl, Transport};
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Length of one motion profile cycle (seconds)
const CYCLE_SECS: f64 = 12.0;

/// Resting gravity on the z axis (mg)
const GRAVITY_MG: f64 = 1000.0;

/// Temperature register value for 25 °C
const TEMPERATURE_RAW: u8 = 110;

/// Interrupt and range configuration written by the pipeline
#[derive(Debug)]
pub struct Registers {
    range_g: AtomicU8,
    motion_limit: AtomicBool,
    new_data: AtomicBool,
    limit_checks: AtomicBool,
}

impl Registers {
    fn new() -> Self {
        Self {
            range_g: AtomicU8::new(RangeSetting::G2.g()),
            motion_limit: AtomicBool::new(false),
            new_data: AtomicBool::new(false),
            limit_checks: AtomicBool::new(true),
        }
    }

    /// Programmed full-scale range
    pub fn range(&self) -> RangeSetting {
        RangeSetting::from_g(self.range_g.load(Ordering::Acquire))
    }

    /// Any-motion interrupt enabled
    pub fn motion_limit(&self) -> bool {
        self.motion_limit.load(Ordering::Acquire)
    }

    /// New-data interrupt enabled
    pub fn new_data(&self) -> bool {
        self.new_data.load(Ordering::Acquire)
    }

    /// Limit checks enabled
    pub fn limit_checks(&self) -> bool {
        self.limit_checks.load(Ordering::Acquire)
    }
}

/// Control handle writing into the simulated registers
#[derive(Debug, Clone)]
pub struct SimulatedControl {
    registers: Arc<Registers>,
}

impl SensorControl for SimulatedControl {
    fn apply_range(&mut self, range: RangeSetting) {
        self.registers.range_g.store(range.g(), Ordering::Release);
    }

    fn apply_motion_limit(&mut self, enabled: bool) {
        self.registers.motion_limit.store(enabled, Ordering::Release);
    }

    fn apply_new_data_interrupt(&mut self, enabled: bool) {
        self.registers.new_data.store(enabled, Ordering::Release);
    }

    fn apply_limit_checks(&mut self, enabled: bool) {
        self.registers.limit_checks.store(enabled, Ordering::Release);
    }
}

/// Motion profile phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Rest,
    Shake,
    Impact,
}

/// Simulated sensor driven once per interrupt period
pub struct SimulatedSensor {
    registers: Arc<Registers>,
    pipeline: Pipeline,
    interrupt_hz: u32,
    tick: u64,
}

impl SimulatedSensor {
    /// Create a sensor ticking at `interrupt_hz`
    pub fn new(pipeline: Pipeline, interrupt_hz: u32) -> Self {
        Self {
            registers: Arc::new(Registers::new()),
            pipeline,
            interrupt_hz: interrupt_hz.max(1),
            tick: 0,
        }
    }

    /// Handle for the pipeline's hardware side effects
    pub fn control(&self) -> SimulatedControl {
        SimulatedControl {
            registers: Arc::clone(&self.registers),
        }
    }

    /// Register view
    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    /// Advance simulated time by one interrupt period
    pub fn advance(&mut self) {
        self.tick += 1;
    }

    /// Seconds since start
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 / f64::from(self.interrupt_hz)
    }

    /// Phase of the motion profile at the current time
    pub fn phase(&self) -> Phase {
        match self.elapsed_secs() % CYCLE_SECS {
            t if t < 3.0 => Phase::Rest,
            t if t < 6.0 => Phase::Shake,
            t if t < 8.0 => Phase::Impact,
            _ => Phase::Rest,
        }
    }

    /// Whether an enabled interrupt source fires at the current time.
    ///
    /// With neither interrupt enabled the sensor is polled every period.
    pub fn interrupt_pending(&self) -> bool {
        let registers = &self.registers;
        if registers.new_data() {
            return true;
        }
        if registers.motion_limit() {
            return self.phase() != Phase::Rest;
        }
        true
    }

    /// Signal in mg per axis at the current time
    pub fn signal_mg(&self) -> [i32; 3] {
        let t = self.elapsed_secs();
        let jitter = ((self.tick.wrapping_mul(7919) % 7) as i32) - 3;
        let (amplitude, hz) = match self.phase() {
            Phase::Rest => (0.0, 0.0),
            Phase::Shake => (1500.0, 2.0),
            Phase::Impact => (4500.0, 5.0),
        };
        let wave = amplitude * (TAU * hz * t).sin();
        [
            wave as i32 + jitter,
            (wave * 0.5) as i32 - jitter,
            (GRAVITY_MG + wave * 0.2) as i32 + jitter,
        ]
    }
}

impl Transport for SimulatedSensor {
    fn acquire_sample(&mut self) -> Sample {
        let hardware_range = self.registers.range();
        let conversion_range = self.pipeline.conversion_range();
        let [x, y, z] = self
            .signal_mg()
            .map(|mg| decode_axis(encode_axis(mg, hardware_range), conversion_range));
        if hardware_range != conversion_range {
            debug!(
                "Range mismatch: hardware {} conversion {}",
                hardware_range, conversion_range
            );
        }
        Sample::new(x, y, z, decode_temperature(TEMPERATURE_RAW))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_pipeline::{Mailboxes, MonotonicClock};

    fn sensor_at(secs: u64) -> SimulatedSensor {
        let pipeline = Pipeline::init(16, 1).unwrap();
        let mut sensor = SimulatedSensor::new(pipeline, 100);
        for _ in 0..secs * 100 {
            sensor.advance();
        }
        sensor
    }

    #[test]
    fn test_profile_phases() {
        assert_eq!(sensor_at(1).phase(), Phase::Rest);
        assert_eq!(sensor_at(4).phase(), Phase::Shake);
        assert_eq!(sensor_at(7).phase(), Phase::Impact);
        assert_eq!(sensor_at(10).phase(), Phase::Rest);
        assert_eq!(sensor_at(13).phase(), Phase::Rest);
    }

    #[test]
    fn test_rest_sample_reads_gravity() {
        let mut sensor = sensor_at(1);
        let sample = sensor.acquire_sample();

        assert!((sample.z - 1000).abs() < 10);
        assert!(sample.x.abs() < 10);
        assert_eq!(sample.t, 25);
    }

    #[test]
    fn test_motion_interrupt_waits_for_movement() {
        let sensor = sensor_at(1);
        let mut control = sensor.control();
        control.apply_motion_limit(true);
        assert!(!sensor.interrupt_pending());

        let moving = sensor_at(4);
        let mut control = moving.control();
        control.apply_motion_limit(true);
        assert!(moving.interrupt_pending());

        control.apply_new_data_interrupt(true);
        assert!(moving.interrupt_pending());
    }

    #[test]
    fn test_producer_start_disables_limit_checks() {
        let pipeline = Pipeline::init(16, 1).unwrap();
        let sensor = SimulatedSensor::new(pipeline.clone(), 100);
        assert!(sensor.registers().limit_checks());

        let _producer = pipeline
            .producer(
                sensor.control(),
                MonotonicClock::new(),
                Arc::new(Mailboxes::new(1)),
            )
            .unwrap();

        assert!(!sensor.registers().limit_checks());
        assert_eq!(sensor.registers().range(), RangeSetting::G2);
    }

    #[test]
    fn test_control_programs_range() {
        let sensor = sensor_at(0);
        let mut control = sensor.control();
        control.apply_range(RangeSetting::G8);
        assert_eq!(sensor.registers().range(), RangeSetting::G8);
    }
}
