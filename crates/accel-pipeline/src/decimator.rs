//! Output rate decimation

use crate::Mode;
use std::sync::atomic::{AtomicU16, Ordering};
use tracing::info;

/// Fastest rate the sensor delivers new data (Hz)
pub const MAX_SAMPLE_RATE_HZ: u16 = 3000;

/// Ratio of raw samples per accepted sample for a target rate.
///
/// Zero or targets above `max_rate_hz` clamp to 1 (accept everything).
pub fn decimation_ratio(max_rate_hz: u16, target_hz: u16) -> u16 {
    if target_hz > 0 && target_hz <= max_rate_hz {
        (max_rate_hz / target_hz).max(1)
    } else {
        1
    }
}

/// Shared output-rate setting
#[derive(Debug)]
pub struct RateConfig {
    max_rate_hz: u16,
    ratio: AtomicU16,
}

impl RateConfig {
    /// Create a config that accepts every sample
    pub fn new(max_rate_hz: u16) -> Self {
        Self {
            max_rate_hz,
            ratio: AtomicU16::new(1),
        }
    }

    /// Set the target output rate and return the resulting ratio
    pub fn configure(&self, target_hz: u16) -> u16 {
        let ratio = decimation_ratio(self.max_rate_hz, target_hz);
        self.ratio.store(ratio, Ordering::Relaxed);
        info!(
            "Output rate set to {} Hz (requested {} Hz, ratio {})",
            self.max_rate_hz / ratio,
            target_hz,
            ratio
        );
        ratio
    }

    /// Current decimation ratio (always at least 1)
    pub fn ratio(&self) -> u16 {
        self.ratio.load(Ordering::Relaxed)
    }

    /// Effective output rate in Hz
    pub fn sample_rate(&self) -> u16 {
        self.max_rate_hz / self.ratio()
    }
}

/// Counts raw ticks between accepted samples
#[derive(Debug, Default)]
pub struct RateDecimator {
    tick: u16,
}

impl RateDecimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether the current raw sample goes downstream.
    ///
    /// In [`Mode::Threshold`] every sample is accepted.
    pub fn admit(&mut self, ratio: u16, mode: Mode) -> bool {
        if mode == Mode::Threshold || self.tick >= ratio.saturating_sub(1) {
            self.tick = 0;
            true
        } else {
            self.tick += 1;
            false
        }
    }

    /// Raw samples seen since the last acceptance
    pub fn tick(&self) -> u16 {
        self.tick
    }
}
