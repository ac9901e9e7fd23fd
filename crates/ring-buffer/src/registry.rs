//! Bounded Reader Registry

use crate::RingError;

/// Default number of reader slots
pub const DEFAULT_MAX_READERS: usize = 10;

/// A reader's private position in the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderCursor<K> {
    /// Identity of the consumer owning this cursor
    pub owner: K,
    /// Next slot this reader will consume
    pub read_cursor: usize,
}

/// Fixed table of reader cursors keyed by consumer identity.
///
/// Free slots are `None`, so no identity value doubles as an "unused" marker.
#[derive(Debug)]
pub struct ReaderRegistry<K> {
    slots: Box<[Option<ReaderCursor<K>>]>,
}

impl<K: Copy + Eq> ReaderRegistry<K> {
    /// Create a registry with `max_readers` slots
    pub fn new(max_readers: usize) -> Result<Self, RingError> {
        if max_readers == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(Self {
            slots: vec![None; max_readers].into_boxed_slice(),
        })
    }

    /// Register `owner` with its cursor at `start`.
    ///
    /// An owner that is already present keeps its current cursor.
    pub fn register(&mut self, owner: K, start: usize) -> Result<(), RingError> {
        if self.position(owner).is_some() {
            return Ok(());
        }
        let capacity = self.slots.len();
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(RingError::RegistryFull { capacity })?;
        *slot = Some(ReaderCursor {
            owner,
            read_cursor: start,
        });
        Ok(())
    }

    /// Remove `owner`. Returns whether an entry was removed.
    pub fn deregister(&mut self, owner: K) -> bool {
        match self.position(owner) {
            Some(idx) => {
                self.slots[idx] = None;
                true
            }
            None => false,
        }
    }

    /// Mutable access to the cursor owned by `owner`
    pub fn cursor_mut(&mut self, owner: K) -> Option<&mut ReaderCursor<K>> {
        self.slots
            .iter_mut()
            .flatten()
            .find(|entry| entry.owner == owner)
    }

    /// Cursor owned by `owner`
    pub fn get(&self, owner: K) -> Option<&ReaderCursor<K>> {
        self.slots.iter().flatten().find(|entry| entry.owner == owner)
    }

    /// Iterate over every registered owner
    pub fn owners(&self) -> impl Iterator<Item = K> + '_ {
        self.slots.iter().flatten().map(|entry| entry.owner)
    }

    /// Number of registered readers
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Check if no reader is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of readers
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    fn position(&self, owner: K) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(entry) if entry.owner == owner))
    }
}
