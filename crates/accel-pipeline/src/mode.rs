//! Sampling mode state machine
//!
//! The sensor idles in [`Mode::Poll`]. Once it has been still for a while it
//! arms the any-motion interrupt ([`Mode::Threshold`]); the first sample
//! after motion switches to streaming ([`Mode::Continuous`]). Going still
//! again while streaming raises a [`Mode::FalseAlert`], which discards that
//! sample and re-arms motion detection.

use crate::{Sample, SensorControl};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Motion below this sum of absolute axis deltas counts as still
pub const STILLNESS_DELTA: i32 = 40;

/// Consecutive still samples that trigger a transition
pub const STILLNESS_STREAK: u8 = 100;

/// Sampling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Poll = 0,
    Threshold = 1,
    Continuous = 2,
    FalseAlert = 3,
}

impl Mode {
    /// Decode a value stored with `mode as u8`
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Mode::Threshold,
            2 => Mode::Continuous,
            3 => Mode::FalseAlert,
            _ => Mode::Poll,
        }
    }
}

/// Whether an accepted sample may continue downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Veto,
}

/// Mode tracking driven by a stillness heuristic on accepted samples
#[derive(Debug, Default)]
pub struct ModeStateMachine {
    mode: Mode,
    still_streak: u8,
    previous: Sample,
}

impl ModeStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Consecutive still samples seen so far
    pub fn still_streak(&self) -> u8 {
        self.still_streak
    }

    /// Feed one accepted sample, issuing interrupt changes through `control`
    pub fn observe<C: SensorControl + ?Sized>(
        &mut self,
        sample: &Sample,
        control: &mut C,
    ) -> Verdict {
        if sample.motion_from(&self.previous) < STILLNESS_DELTA {
            self.still_streak = self.still_streak.saturating_add(1);
        } else {
            self.still_streak = 0;
        }
        self.previous = *sample;

        match self.mode {
            Mode::Threshold => {
                control.apply_motion_limit(false);
                control.apply_new_data_interrupt(true);
                self.mode = Mode::Continuous;
                info!("Threshold: x={}, y={}, z={}", sample.x, sample.y, sample.z);
            }
            Mode::FalseAlert => {
                self.mode = Mode::Threshold;
                info!("False alert cleared, motion detection re-armed");
            }
            Mode::Poll | Mode::Continuous => {}
        }

        if self.still_streak < STILLNESS_STREAK {
            return Verdict::Keep;
        }
        self.still_streak = 0;

        if self.mode == Mode::Poll {
            control.apply_limit_checks(false);
            control.apply_motion_limit(true);
            self.mode = Mode::Threshold;
            info!("Sensor still, waiting for motion");
            Verdict::Keep
        } else {
            control.apply_new_data_interrupt(false);
            control.apply_motion_limit(true);
            self.mode = Mode::FalseAlert;
            info!("Sensor still while streaming, raising false alert");
            Verdict::Veto
        }
    }
}
