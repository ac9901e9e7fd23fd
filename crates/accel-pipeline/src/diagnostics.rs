//! Effective sample ratio telemetry

use std::sync::atomic::{AtomicU64, Ordering};

/// Timing window over samples stored while streaming.
///
/// Reported as `(1 / ((t_last - t_start) / samples)) * 100000`. Only for
/// telemetry; nothing in the pipeline depends on it.
#[derive(Debug, Default)]
pub struct SampleRatio {
    start_us: AtomicU64,
    last_us: AtomicU64,
    samples: AtomicU64,
}

impl SampleRatio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new window at `now_us`
    pub fn restart(&self, now_us: u64) {
        self.samples.store(0, Ordering::Relaxed);
        self.start_us.store(now_us, Ordering::Relaxed);
        self.last_us.store(now_us, Ordering::Relaxed);
    }

    /// Count one sample stored at `now_us`
    pub fn record(&self, now_us: u64) {
        self.last_us.store(now_us, Ordering::Relaxed);
        self.samples.fetch_add(1, Ordering::Relaxed);
    }

    /// Samples counted in the current window
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    /// Scaled rate estimate; 0.0 until the window has samples and elapsed time
    pub fn ratio(&self) -> f32 {
        let samples = self.samples();
        let elapsed = self
            .last_us
            .load(Ordering::Relaxed)
            .saturating_sub(self.start_us.load(Ordering::Relaxed));
        if samples == 0 || elapsed == 0 {
            return 0.0;
        }
        (1.0 / (elapsed as f32 / samples as f32)) * 100_000.0
    }
}
