//! Ring buffer shared between one writer and many cursor-owning readers

use crate::{ReaderRegistry, RingBuffer, RingError, Word};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Ring buffer plus reader registry.
///
/// Writes never touch the registry lock. Registry mutation and cursor
/// updates happen inside a short critical section.
pub struct MultiReader<T: Word, K> {
    ring: RingBuffer<T>,
    registry: Mutex<ReaderRegistry<K>>,
}

impl<T, K> MultiReader<T, K>
where
    T: Word,
    K: Copy + Eq + std::fmt::Debug,
{
    /// Create a buffer of `capacity` slots with room for `max_readers` readers
    pub fn new(capacity: usize, max_readers: usize) -> Result<Self, RingError> {
        Ok(Self {
            ring: RingBuffer::new(capacity)?,
            registry: Mutex::new(ReaderRegistry::new(max_readers)?),
        })
    }

    /// Producer side: store a sample. Never blocks.
    pub fn write(&self, value: T) {
        self.ring.write(value);
    }

    /// Register `owner` at the current write position.
    ///
    /// The new reader sees only samples written after this call.
    pub fn register(&self, owner: K) -> Result<(), RingError> {
        let mut registry = self.lock();
        let start = self.ring.write_cursor();
        registry.register(owner, start).map_err(|err| {
            warn!("Cannot register reader {:?}: {}", owner, err);
            err
        })?;
        debug!("Reader {:?} registered at cursor {}", owner, start);
        Ok(())
    }

    /// Remove `owner`. Unknown owners are ignored.
    pub fn deregister(&self, owner: K) {
        if self.lock().deregister(owner) {
            debug!("Reader {:?} deregistered", owner);
        }
    }

    /// Read the next sample for `owner`.
    ///
    /// Unknown owners are registered first; `Ok(None)` means no new data.
    pub fn read(&self, owner: K) -> Result<Option<T>, RingError> {
        let mut registry = self.lock();
        if registry.get(owner).is_none() {
            let start = self.ring.write_cursor();
            registry
                .register(owner, start)
                .map_err(|_| RingError::NotRegistered)?;
            debug!("Reader {:?} auto-registered at cursor {}", owner, start);
        }
        let entry = registry.cursor_mut(owner).ok_or(RingError::NotRegistered)?;
        Ok(self.ring.read_from(entry.read_cursor).map(|(value, next)| {
            entry.read_cursor = next;
            value
        }))
    }

    /// Move `owner`'s cursor to the write position, dropping its backlog
    pub fn resync(&self, owner: K) {
        let mut registry = self.lock();
        let cursor = self.ring.write_cursor();
        if let Some(entry) = registry.cursor_mut(owner) {
            entry.read_cursor = cursor;
        }
    }

    /// Visit every registered owner while holding the registry lock
    pub fn for_each_owner(&self, mut f: impl FnMut(K)) {
        self.lock().owners().for_each(&mut f);
    }

    /// Check whether `owner` holds a cursor
    pub fn is_registered(&self, owner: K) -> bool {
        self.lock().get(owner).is_some()
    }

    /// Number of registered readers
    pub fn reader_count(&self) -> usize {
        self.lock().len()
    }

    /// Drop every registration
    pub fn clear_readers(&self) {
        self.lock().clear();
    }

    /// Underlying ring
    pub fn ring(&self) -> &RingBuffer<T> {
        &self.ring
    }

    fn lock(&self) -> MutexGuard<'_, ReaderRegistry<K>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
