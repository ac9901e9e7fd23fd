//! Recording fakes for unit tests

use crate::{ConsumerId, Notify, RangeSetting, SensorControl};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCall {
    Range(RangeSetting),
    MotionLimit(bool),
    NewData(bool),
    LimitChecks(bool),
}

#[derive(Debug, Default)]
pub struct RecordingControl {
    pub calls: Vec<ControlCall>,
}

impl SensorControl for RecordingControl {
    fn apply_range(&mut self, range: RangeSetting) {
        self.calls.push(ControlCall::Range(range));
    }

    fn apply_motion_limit(&mut self, enabled: bool) {
        self.calls.push(ControlCall::MotionLimit(enabled));
    }

    fn apply_new_data_interrupt(&mut self, enabled: bool) {
        self.calls.push(ControlCall::NewData(enabled));
    }

    fn apply_limit_checks(&mut self, enabled: bool) {
        self.calls.push(ControlCall::LimitChecks(enabled));
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub woken: Mutex<Vec<ConsumerId>>,
}

impl Notify for RecordingNotifier {
    fn try_notify(&self, owner: ConsumerId) -> bool {
        self.woken.lock().unwrap().push(owner);
        true
    }
}
