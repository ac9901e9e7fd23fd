//! Acceleration Sample Pipeline
//!
//! Distributes samples from a single interrupt-context producer to many
//! thread-context consumers:
//! - Rate decimation down to a configured output rate
//! - Poll / Threshold / Continuous / FalseAlert motion modes
//! - Adaptive full-scale range with hysteresis and debounce
//! - Best-effort wakeup fan-out to registered readers

pub mod config;
pub mod decimator;
pub mod diagnostics;
pub mod hardware;
pub mod mode;
pub mod notifier;
pub mod range;
pub mod units;

mod error;
mod pipeline;
mod producer;
mod sample;

#[cfg(test)]
mod test_support;

pub use config::PipelineConfig;
pub use decimator::{RateConfig, RateDecimator, MAX_SAMPLE_RATE_HZ};
pub use error::PipelineError;
pub use hardware::{Clock, MonotonicClock, SensorControl, Transport};
pub use mode::{Mode, ModeStateMachine, Verdict};
pub use notifier::{Mailboxes, Notify, Wakeup};
pub use pipeline::Pipeline;
pub use producer::{Outcome, Producer, SampleHook};
pub use range::{RangeController, RangeSetting, RangeState};
pub use sample::{ConsumerId, Sample};
