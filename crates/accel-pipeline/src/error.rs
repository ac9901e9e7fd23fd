//! Pipeline Error Types

use ring_buffer::RingError;
use thiserror::Error;

/// Errors surfaced to pipeline callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Every reader slot is in use
    #[error("Reader registry full: maximum of {max_readers} readers reached")]
    ReaderRegistryFull { max_readers: usize },

    /// Reader unknown and implicit registration failed
    #[error("Reader is not registered and no slot is free")]
    NotRegistered,

    /// Buffer capacity or reader count of zero
    #[error("Pipeline capacity and reader count must be greater than zero")]
    InvalidCapacity,

    /// A producer already feeds this pipeline
    #[error("Pipeline already has a producer")]
    ProducerAlreadyClaimed,
}

impl From<RingError> for PipelineError {
    fn from(err: RingError) -> Self {
        match err {
            RingError::RegistryFull { capacity } => PipelineError::ReaderRegistryFull {
                max_readers: capacity,
            },
            RingError::NotRegistered => PipelineError::NotRegistered,
            RingError::ZeroCapacity => PipelineError::InvalidCapacity,
        }
    }
}
