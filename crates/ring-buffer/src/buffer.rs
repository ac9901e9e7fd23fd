//! Fixed-Capacity Ring Buffer Implementation

use crate::RingError;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Default buffer capacity (256 samples)
pub const DEFAULT_CAPACITY: usize = 256;

/// A sample that fits in a single 64-bit word.
///
/// Slots are stored as atomic words so the writer never tears a sample a
/// reader is copying out, without taking a lock on the write path.
pub trait Word: Copy {
    /// Pack the value into a word
    fn to_word(self) -> u64;

    /// Unpack a value previously produced by [`Word::to_word`]
    fn from_word(word: u64) -> Self;
}

impl Word for u64 {
    fn to_word(self) -> u64 {
        self
    }

    fn from_word(word: u64) -> Self {
        word
    }
}

impl Word for i64 {
    fn to_word(self) -> u64 {
        self as u64
    }

    fn from_word(word: u64) -> Self {
        word as i64
    }
}

impl Word for u32 {
    fn to_word(self) -> u64 {
        u64::from(self)
    }

    fn from_word(word: u64) -> Self {
        word as u32
    }
}

impl Word for [i16; 4] {
    fn to_word(self) -> u64 {
        self.iter()
            .enumerate()
            .fold(0u64, |acc, (i, v)| acc | (u64::from(*v as u16) << (16 * i)))
    }

    fn from_word(word: u64) -> Self {
        let mut out = [0i16; 4];
        for (i, v) in out.iter_mut().enumerate() {
            *v = (word >> (16 * i)) as u16 as i16;
        }
        out
    }
}

/// Single-writer ring buffer with one shared write cursor
pub struct RingBuffer<T: Word> {
    /// Pre-allocated storage
    storage: Box<[AtomicU64]>,
    /// Write position, always in `[0, capacity)`
    write_cursor: AtomicUsize,
    /// Total samples written (for statistics)
    total_written: AtomicUsize,
    _marker: PhantomData<T>,
}

impl<T: Word> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        if capacity == 0 {
            return Err(RingError::ZeroCapacity);
        }
        Ok(Self::allocate(capacity))
    }

    /// Create a buffer with default capacity (256 samples)
    pub fn with_default_capacity() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    fn allocate(capacity: usize) -> Self {
        let storage: Vec<AtomicU64> = (0..capacity).map(|_| AtomicU64::new(0)).collect();
        Self {
            storage: storage.into_boxed_slice(),
            write_cursor: AtomicUsize::new(0),
            total_written: AtomicUsize::new(0),
            _marker: PhantomData,
        }
    }

    /// Store a sample at the write cursor and advance it.
    ///
    /// O(1), lock-free and allocation-free. Unread slots are overwritten.
    /// Must only be called from the single producer.
    pub fn write(&self, value: T) {
        let cursor = self.write_cursor.load(Ordering::Relaxed);
        self.storage[cursor].store(value.to_word(), Ordering::Relaxed);
        self.write_cursor
            .store((cursor + 1) % self.storage.len(), Ordering::Release);
        self.total_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Current write cursor
    pub fn write_cursor(&self) -> usize {
        self.write_cursor.load(Ordering::Acquire)
    }

    /// Read the slot at `cursor`. The index is reduced modulo capacity.
    pub fn read_at(&self, cursor: usize) -> T {
        T::from_word(self.storage[cursor % self.storage.len()].load(Ordering::Relaxed))
    }

    /// Read the slot at `cursor` if it differs from the write cursor.
    ///
    /// Returns the value and the advanced cursor, or `None` when the cursor
    /// has caught up with the writer.
    pub fn read_from(&self, cursor: usize) -> Option<(T, usize)> {
        if cursor == self.write_cursor() {
            return None;
        }
        Some((self.read_at(cursor), (cursor + 1) % self.storage.len()))
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Get total samples written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            RingBuffer::<u64>::new(0).err(),
            Some(RingError::ZeroCapacity)
        );
    }

    #[test]
    fn test_write_advances_and_wraps() {
        let buffer = RingBuffer::<u64>::new(4).unwrap();

        for i in 0..6 {
            buffer.write(i);
        }

        assert_eq!(buffer.write_cursor(), 2);
        assert_eq!(buffer.total_written(), 6);
        // Slots 0 and 1 were overwritten by the second lap
        assert_eq!(buffer.read_at(0), 4);
        assert_eq!(buffer.read_at(1), 5);
        assert_eq!(buffer.read_at(2), 2);
    }

    #[test]
    fn test_read_from_stops_at_writer() {
        let buffer = RingBuffer::<u64>::new(8).unwrap();
        assert!(buffer.read_from(0).is_none());

        buffer.write(7);
        assert_eq!(buffer.read_from(0), Some((7, 1)));
        assert!(buffer.read_from(1).is_none());
    }

    #[test]
    fn test_i16_quad_packing_keeps_signs() {
        let value = [-1i16, i16::MIN, i16::MAX, 0];
        assert_eq!(<[i16; 4]>::from_word(value.to_word()), value);
    }

    #[test]
    fn test_default_capacity() {
        let buffer = RingBuffer::<u32>::with_default_capacity();
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
        assert_eq!(buffer.write_cursor(), 0);
    }
}
