//! Ring Buffer Error Types

use thiserror::Error;

/// Errors raised by the ring buffer and its reader registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Every reader slot is taken
    #[error("Reader registry full: all {capacity} slots in use")]
    RegistryFull { capacity: usize },

    /// Reader is unknown and could not be registered implicitly
    #[error("Reader is not registered")]
    NotRegistered,

    /// Buffer or registry requested with zero slots
    #[error("Capacity must be greater than zero")]
    ZeroCapacity,
}
