//! Owned pipeline handle shared by the producer and readers

use crate::decimator::RateConfig;
use crate::diagnostics::SampleRatio;
use crate::{
    Clock, ConsumerId, Mode, Notify, PipelineConfig, PipelineError, Producer, RangeSetting,
    RangeState, Sample, SensorControl,
};
use ring_buffer::MultiReader;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use tracing::info;

/// State reachable from both the producer and reader handles
pub(crate) struct Shared {
    pub(crate) buffer: MultiReader<Sample, ConsumerId>,
    pub(crate) rate: RateConfig,
    pub(crate) adaptive_range: AtomicBool,
    pub(crate) range: RangeState,
    pub(crate) diagnostics: SampleRatio,
    mode: AtomicU8,
    producer_claimed: AtomicBool,
}

impl Shared {
    pub(crate) fn publish_mode(&self, mode: Mode) {
        self.mode.store(mode as u8, Ordering::Release);
    }

    pub(crate) fn release_producer(&self) {
        self.producer_claimed.store(false, Ordering::Release);
    }
}

/// Sample pipeline handle.
///
/// Cheap to clone; every clone refers to the same buffer and registry.
#[derive(Clone)]
pub struct Pipeline {
    shared: Arc<Shared>,
}

impl Pipeline {
    /// Create a pipeline with `capacity` slots and room for `max_readers` readers
    pub fn init(capacity: usize, max_readers: usize) -> Result<Self, PipelineError> {
        Self::from_config(&PipelineConfig {
            capacity,
            max_readers,
            ..Default::default()
        })
    }

    /// Create a pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let shared = Shared {
            buffer: MultiReader::new(config.capacity, config.max_readers)?,
            rate: RateConfig::new(config.max_rate_hz),
            adaptive_range: AtomicBool::new(config.adaptive_range),
            range: RangeState::new(config.initial_range),
            diagnostics: SampleRatio::new(),
            mode: AtomicU8::new(Mode::Poll as u8),
            producer_claimed: AtomicBool::new(false),
        };
        shared.rate.configure(config.target_rate_hz);
        info!(
            "Pipeline initialised: {} slots, {} readers, range {}",
            config.capacity, config.max_readers, config.initial_range
        );
        Ok(Self {
            shared: Arc::new(shared),
        })
    }

    /// Claim the single producer for this pipeline.
    ///
    /// Fails while another producer is alive.
    pub fn producer<C, K, N>(
        &self,
        control: C,
        clock: K,
        notifier: N,
    ) -> Result<Producer<C, K, N>, PipelineError>
    where
        C: SensorControl,
        K: Clock,
        N: Notify,
    {
        self.shared
            .producer_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PipelineError::ProducerAlreadyClaimed)?;
        Ok(Producer::start(
            Arc::clone(&self.shared),
            control,
            clock,
            notifier,
        ))
    }

    /// Set the output rate; out-of-range targets accept every sample
    pub fn configure_rate(&self, target_hz: u16) {
        self.shared.rate.configure(target_hz);
    }

    /// Effective output rate in Hz
    pub fn sample_rate(&self) -> u16 {
        self.shared.rate.sample_rate()
    }

    /// Raw samples per accepted sample
    pub fn decimation_ratio(&self) -> u16 {
        self.shared.rate.ratio()
    }

    /// Switch adaptive range control on or off
    pub fn configure_adaptive_range(&self, enabled: bool) {
        self.shared.adaptive_range.store(enabled, Ordering::Relaxed);
        info!("Adaptive range {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Whether adaptive range control is on
    pub fn adaptive_range(&self) -> bool {
        self.shared.adaptive_range.load(Ordering::Relaxed)
    }

    /// Register a reader at the current write position
    pub fn register_reader(&self, id: ConsumerId) -> Result<(), PipelineError> {
        self.shared.buffer.register(id)?;
        Ok(())
    }

    /// Remove a reader; unknown ids are ignored
    pub fn deregister_reader(&self, id: ConsumerId) {
        self.shared.buffer.deregister(id);
    }

    /// Skip a reader's backlog and continue from the newest write
    pub fn resync_reader(&self, id: ConsumerId) {
        self.shared.buffer.resync(id);
    }

    /// Next unread sample for `id`; `Ok(None)` when nothing new arrived.
    ///
    /// Unknown readers are registered on the fly.
    pub fn read_next(&self, id: ConsumerId) -> Result<Option<Sample>, PipelineError> {
        Ok(self.shared.buffer.read(id)?)
    }

    /// Number of registered readers
    pub fn reader_count(&self) -> usize {
        self.shared.buffer.reader_count()
    }

    /// Ring buffer slots
    pub fn capacity(&self) -> usize {
        self.shared.buffer.ring().capacity()
    }

    /// Current sampling mode
    pub fn mode(&self) -> Mode {
        Mode::from_u8(self.shared.mode.load(Ordering::Acquire))
    }

    /// Range currently programmed into the sensor
    pub fn range(&self) -> RangeSetting {
        self.shared.range.live()
    }

    /// Whether conversion has caught up with the last range change
    pub fn range_stable(&self) -> bool {
        self.shared.range.is_stable()
    }

    /// Range to scale raw counts with; latches the live range after a change
    pub fn conversion_range(&self) -> RangeSetting {
        self.shared.range.conversion_range()
    }

    /// Diagnostic rate estimate over samples stored while streaming
    pub fn effective_sample_ratio(&self) -> f32 {
        let ratio = self.shared.diagnostics.ratio();
        metrics::gauge!("accel_effective_sample_ratio").set(f64::from(ratio));
        ratio
    }

    /// Samples written since init
    pub fn total_written(&self) -> usize {
        self.shared.buffer.ring().total_written()
    }

    /// Drop every reader registration and release this handle
    pub fn teardown(self) {
        let readers = self.shared.buffer.reader_count();
        self.shared.buffer.clear_readers();
        info!(
            "Pipeline torn down: {} samples written, {} readers released",
            self.shared.buffer.ring().total_written(),
            readers
        );
    }
}
