//! Adaptive full-scale range with hysteresis
//!
//! Range increases fire on a single out-of-range sample. Decreases need
//! [`DECREASE_DEBOUNCE`] consecutive samples inside a band that sits above
//! half the rising threshold, so a signal near a boundary cannot flap.

use crate::{Sample, SensorControl};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::info;

/// Rising threshold from 2 g to 4 g
pub const RISE_2G_TO_4G: i16 = 1800;
/// Rising threshold from 4 g to 8 g
pub const RISE_4G_TO_8G: i16 = 3800;
/// Band a 4 g signal must stay inside to drop to 2 g
pub const FALL_4G_TO_2G: i16 = 2000;
/// Band an 8 g signal must stay inside to drop to 4 g
pub const FALL_8G_TO_4G: i16 = 4000;
/// Consecutive in-band samples required before a decrease
pub const DECREASE_DEBOUNCE: u8 = 10;

/// Full-scale measurement range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum RangeSetting {
    #[default]
    #[serde(rename = "2g")]
    G2,
    #[serde(rename = "4g")]
    G4,
    #[serde(rename = "8g")]
    G8,
}

impl RangeSetting {
    /// Range in g
    pub fn g(self) -> u8 {
        match self {
            RangeSetting::G2 => 2,
            RangeSetting::G4 => 4,
            RangeSetting::G8 => 8,
        }
    }

    /// Inverse of [`RangeSetting::g`]; unknown values map to 4 g
    pub fn from_g(g: u8) -> Self {
        match g {
            2 => RangeSetting::G2,
            8 => RangeSetting::G8,
            _ => RangeSetting::G4,
        }
    }
}

impl fmt::Display for RangeSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} g", self.g())
    }
}

/// Range shared between the producer and unit conversion.
///
/// Conversion uses a latched copy that is refreshed from the live value the
/// first time it is read after a change.
#[derive(Debug)]
pub struct RangeState {
    live: AtomicU8,
    latched: AtomicU8,
    stable: AtomicBool,
}

impl RangeState {
    pub fn new(initial: RangeSetting) -> Self {
        Self {
            live: AtomicU8::new(initial.g()),
            latched: AtomicU8::new(initial.g()),
            stable: AtomicBool::new(false),
        }
    }

    /// Range currently programmed into the sensor
    pub fn live(&self) -> RangeSetting {
        RangeSetting::from_g(self.live.load(Ordering::Acquire))
    }

    /// Record a range change and invalidate the conversion latch
    pub fn set(&self, range: RangeSetting) {
        self.live.store(range.g(), Ordering::Release);
        self.stable.store(false, Ordering::Release);
    }

    /// Whether the conversion latch matches the last range change
    pub fn is_stable(&self) -> bool {
        self.stable.load(Ordering::Acquire)
    }

    /// Range to scale counts with, re-latching the live value if it changed
    pub fn conversion_range(&self) -> RangeSetting {
        if !self.stable.swap(true, Ordering::AcqRel) {
            self.latched
                .store(self.live.load(Ordering::Acquire), Ordering::Release);
        }
        RangeSetting::from_g(self.latched.load(Ordering::Acquire))
    }
}

/// Decides range changes from accepted samples
#[derive(Debug, Default)]
pub struct RangeController {
    decrease_streak: u8,
}

impl RangeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consecutive in-band samples counted toward a decrease
    pub fn decrease_streak(&self) -> u8 {
        self.decrease_streak
    }

    /// Evaluate one sample and apply a range change if one is due
    pub fn evaluate<C: SensorControl + ?Sized>(
        &mut self,
        sample: &Sample,
        state: &RangeState,
        control: &mut C,
    ) -> Option<RangeSetting> {
        let max = sample.max_axis();
        let min = sample.min_axis();
        let current = state.live();

        let increase = match current {
            RangeSetting::G2 if max > RISE_2G_TO_4G || min < -RISE_2G_TO_4G => {
                Some(RangeSetting::G4)
            }
            RangeSetting::G4 if max > RISE_4G_TO_8G || min < -RISE_4G_TO_8G => {
                Some(RangeSetting::G8)
            }
            _ => None,
        };
        if let Some(next) = increase {
            self.decrease_streak = 0;
            return Some(Self::apply(current, next, state, control));
        }

        let (band, lower) = match current {
            RangeSetting::G2 => return None,
            RangeSetting::G4 => (FALL_4G_TO_2G, RangeSetting::G2),
            RangeSetting::G8 => (FALL_8G_TO_4G, RangeSetting::G4),
        };

        if max < band && min > -band {
            if self.decrease_streak >= DECREASE_DEBOUNCE - 1 {
                self.decrease_streak = 0;
                return Some(Self::apply(current, lower, state, control));
            }
            self.decrease_streak += 1;
        } else {
            self.decrease_streak = 0;
        }
        None
    }

    fn apply<C: SensorControl + ?Sized>(
        from: RangeSetting,
        to: RangeSetting,
        state: &RangeState,
        control: &mut C,
    ) -> RangeSetting {
        control.apply_range(to);
        state.set(to);
        info!("Set range from {} to {}", from, to);
        to
    }
}
