//! Interrupt-context producer
//!
//! Runs the per-sample path: decimation, mode tracking, buffer write, range
//! control and reader wakeups. Every step is O(1) and nothing here blocks on
//! a reader.

use crate::pipeline::Shared;
use crate::{
    Clock, Mode, ModeStateMachine, Notify, RangeController, RateDecimator, Sample,
    SensorControl, Transport, Verdict,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Post-write hook applied to every stored sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleHook {
    NoOp,
    AdaptiveRange,
}

/// What happened to one raw sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Skipped by rate decimation
    Dropped,
    /// Accepted but discarded by a false alert
    Vetoed,
    /// Written to the ring buffer
    Stored,
}

/// The single writer of a [`crate::Pipeline`]
pub struct Producer<C: SensorControl, K: Clock, N: Notify> {
    shared: Arc<Shared>,
    decimator: RateDecimator,
    mode: ModeStateMachine,
    range: RangeController,
    control: C,
    clock: K,
    notifier: N,
}

impl<C: SensorControl, K: Clock, N: Notify> Producer<C, K, N> {
    pub(crate) fn start(shared: Arc<Shared>, mut control: C, clock: K, notifier: N) -> Self {
        let mode = ModeStateMachine::new();
        control.apply_limit_checks(false);
        control.apply_range(shared.range.live());
        shared.publish_mode(mode.mode());
        info!("Producer started in {:?} mode", mode.mode());
        Self {
            shared,
            decimator: RateDecimator::new(),
            mode,
            range: RangeController::new(),
            control,
            clock,
            notifier,
        }
    }

    /// Handle a sensor interrupt: acquire one sample and push it
    pub fn on_interrupt<T: Transport + ?Sized>(&mut self, transport: &mut T) -> Outcome {
        let sample = transport.acquire_sample();
        self.push(sample)
    }

    /// Push one raw sample through the pipeline
    pub fn push(&mut self, sample: Sample) -> Outcome {
        let before = self.mode.mode();
        if !self.decimator.admit(self.shared.rate.ratio(), before) {
            metrics::counter!("accel_samples_dropped_total").increment(1);
            return Outcome::Dropped;
        }

        let verdict = self.mode.observe(&sample, &mut self.control);
        let after = self.mode.mode();
        self.shared.publish_mode(after);
        if before != Mode::Continuous && after == Mode::Continuous {
            self.shared.diagnostics.restart(self.clock.now_us());
        }

        if verdict == Verdict::Veto {
            metrics::counter!("accel_samples_vetoed_total").increment(1);
            return Outcome::Vetoed;
        }

        if after == Mode::Continuous {
            self.shared.diagnostics.record(self.clock.now_us());
        }
        self.shared.buffer.write(sample);
        metrics::counter!("accel_samples_stored_total").increment(1);

        match self.hook() {
            SampleHook::NoOp => {}
            SampleHook::AdaptiveRange => {
                self.range
                    .evaluate(&sample, &self.shared.range, &mut self.control);
            }
        }

        self.wake_readers();
        Outcome::Stored
    }

    /// Hook selected by the current adaptive-range setting
    pub fn hook(&self) -> SampleHook {
        if self.shared.adaptive_range.load(Ordering::Relaxed) {
            SampleHook::AdaptiveRange
        } else {
            SampleHook::NoOp
        }
    }

    /// Current sampling mode
    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    /// In-band samples counted toward the next range decrease
    pub fn decrease_streak(&self) -> u8 {
        self.range.decrease_streak()
    }

    /// Hardware control sink
    pub fn control(&self) -> &C {
        &self.control
    }

    fn wake_readers(&self) {
        let notifier = &self.notifier;
        let mut missed = 0u64;
        self.shared.buffer.for_each_owner(|owner| {
            if !notifier.try_notify(owner) {
                missed += 1;
            }
        });
        if missed > 0 {
            debug!("{} wakeups not delivered", missed);
            metrics::counter!("accel_wakeups_missed_total").increment(missed);
        }
    }
}

impl<C: SensorControl, K: Clock, N: Notify> Drop for Producer<C, K, N> {
    fn drop(&mut self) {
        self.shared.release_producer();
        debug!("Producer released");
    }
}
