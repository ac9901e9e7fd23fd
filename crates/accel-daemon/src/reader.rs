//! Mailbox-driven reader task

use accel_pipeline::{ConsumerId, Pipeline, Sample, Wakeup};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What one reader consumed
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReaderStats {
    pub wakeups: u64,
    pub samples: u64,
    pub last: Option<Sample>,
}

/// Drain the pipeline for `id` on every wakeup until the inbox closes.
///
/// A wakeup only means "poll now", so each one drains until empty.
pub async fn run_reader(
    pipeline: Pipeline,
    id: ConsumerId,
    mut inbox: mpsc::Receiver<Wakeup>,
) -> ReaderStats {
    let mut stats = ReaderStats::default();
    while let Some(Wakeup) = inbox.recv().await {
        stats.wakeups += 1;
        loop {
            match pipeline.read_next(id) {
                Ok(Some(sample)) => {
                    stats.samples += 1;
                    stats.last = Some(sample);
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("{} stopped reading: {}", id, err);
                    return stats;
                }
            }
        }
        debug!("{} drained {} samples", id, stats.samples);
    }
    stats
}
