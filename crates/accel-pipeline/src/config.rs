//! Pipeline configuration

use crate::decimator::MAX_SAMPLE_RATE_HZ;
use crate::RangeSetting;
use ring_buffer::{DEFAULT_CAPACITY, DEFAULT_MAX_READERS};
use serde::{Deserialize, Serialize};

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ring buffer slots
    pub capacity: usize,

    /// Maximum simultaneously registered readers
    pub max_readers: usize,

    /// Fastest rate the sensor produces data (Hz)
    pub max_rate_hz: u16,

    /// Requested output rate (Hz); invalid values accept every sample
    pub target_rate_hz: u16,

    /// Let the range controller adjust the full-scale range
    pub adaptive_range: bool,

    /// Range programmed when the producer starts
    pub initial_range: RangeSetting,

    /// Pending wakeups each reader inbox can hold
    pub mailbox_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_readers: DEFAULT_MAX_READERS,
            max_rate_hz: MAX_SAMPLE_RATE_HZ,
            target_rate_hz: MAX_SAMPLE_RATE_HZ,
            adaptive_range: false,
            initial_range: RangeSetting::G2,
            mailbox_depth: 1,
        }
    }
}

impl PipelineConfig {
    /// Config with adaptive range switched on
    pub fn adaptive() -> Self {
        Self {
            adaptive_range: true,
            ..Default::default()
        }
    }
}
