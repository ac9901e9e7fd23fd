//! Sample and consumer identity types

use ring_buffer::Word;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One acquisition: three axes plus temperature, in transport counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub t: i16,
}

impl Sample {
    /// Create a sample
    pub const fn new(x: i16, y: i16, z: i16, t: i16) -> Self {
        Self { x, y, z, t }
    }

    /// Largest of the three axes
    pub fn max_axis(&self) -> i16 {
        self.x.max(self.y).max(self.z)
    }

    /// Smallest of the three axes
    pub fn min_axis(&self) -> i16 {
        self.x.min(self.y).min(self.z)
    }

    /// Sum of absolute per-axis differences to `previous`
    pub fn motion_from(&self, previous: &Sample) -> i32 {
        (i32::from(self.x) - i32::from(previous.x)).abs()
            + (i32::from(self.y) - i32::from(previous.y)).abs()
            + (i32::from(self.z) - i32::from(previous.z)).abs()
    }
}

impl Word for Sample {
    fn to_word(self) -> u64 {
        [self.x, self.y, self.z, self.t].to_word()
    }

    fn from_word(word: u64) -> Self {
        let [x, y, z, t] = <[i16; 4]>::from_word(word);
        Self { x, y, z, t }
    }
}

/// Opaque consumer identity, e.g. a thread handle. Every value is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConsumerId(pub u32);

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reader-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_extremes_ignore_temperature() {
        let sample = Sample::new(-300, 20, 1800, 5000);
        assert_eq!(sample.max_axis(), 1800);
        assert_eq!(sample.min_axis(), -300);
    }

    #[test]
    fn test_motion_does_not_overflow() {
        let a = Sample::new(i16::MAX, i16::MAX, i16::MAX, 0);
        let b = Sample::new(i16::MIN, i16::MIN, i16::MIN, 0);
        assert_eq!(a.motion_from(&b), 3 * 65535);
    }

    #[test]
    fn test_word_packing() {
        let sample = Sample::new(-1, 2, -3, 24);
        assert_eq!(Sample::from_word(sample.to_word()), sample);
    }
}
