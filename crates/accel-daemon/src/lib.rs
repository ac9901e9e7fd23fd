//! Acceleration Pipeline Daemon
//!
//! Drives the sample pipeline from a simulated sensor interrupt and drains
//! it from mailbox-driven reader tasks.

pub mod reader;
pub mod settings;
pub mod simulate;

use accel_pipeline::{Clock, Notify, Outcome, Producer, SensorControl};
use simulate::SimulatedSensor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub use reader::{run_reader, ReaderStats};
pub use settings::{Settings, SettingsError, SimulationConfig};

/// Initialize logging
pub fn init_logging(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Per-outcome sample counts from the interrupt loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    pub interrupts: u64,
    pub stored: u64,
    pub dropped: u64,
    pub vetoed: u64,
}

impl ProducerStats {
    fn count(&mut self, outcome: Outcome) {
        self.interrupts += 1;
        match outcome {
            Outcome::Stored => self.stored += 1,
            Outcome::Dropped => self.dropped += 1,
            Outcome::Vetoed => self.vetoed += 1,
        }
    }
}

/// Run the interrupt loop until `stop` is set.
///
/// Each period advances simulated time and, when an enabled interrupt
/// fires, hands one sample to the producer. With `period` of zero the loop
/// runs as fast as possible.
pub fn drive<C, K, N>(
    mut producer: Producer<C, K, N>,
    mut sensor: SimulatedSensor,
    period: Duration,
    stop: Arc<AtomicBool>,
) -> ProducerStats
where
    C: SensorControl,
    K: Clock,
    N: Notify,
{
    let mut stats = ProducerStats::default();
    while !stop.load(Ordering::Acquire) {
        if sensor.interrupt_pending() {
            stats.count(producer.on_interrupt(&mut sensor));
        }
        sensor.advance();
        if !period.is_zero() {
            std::thread::sleep(period);
        }
    }
    info!(
        "Interrupt loop stopped after {:.1} s in {:?} mode",
        sensor.elapsed_secs(),
        producer.mode()
    );
    stats
}
