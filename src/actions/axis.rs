//! `axis(AXIS)` - drives a virtual output axis from analog input

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::error::ActionError;
use super::param::{ParamChecker, ParameterList};
use super::registry::ActionRegistry;
use super::{write_call, Action, ActionRef, ChangeCapable, SensitivityCapable};
use crate::input::{
    AxisValue, Mapper, PadStickTrigger, TriggerValue, STICK_PAD_MAX, TRIGGER_MAX,
};

pub const KW_AXIS: &str = "axis";

/// Maps stick, pad, trigger or relative input onto one output axis
///
/// Output is normalized (-1.0..=1.0 for sticks, 0.0..=1.0 for triggers) and
/// scaled by the X sensitivity pushed through `set_sensitivity`.
#[derive(Debug)]
pub struct AxisAction {
    axis: String,
    params: ParameterList,
    sensitivity: Mutex<(f32, f32, f32)>,
}

impl AxisAction {
    pub fn axis_name(&self) -> &str {
        &self.axis
    }

    pub fn sensitivity(&self) -> (f32, f32, f32) {
        *self.sensitivity.lock()
    }

    fn emit(&self, mapper: &mut dyn Mapper, value: f64) {
        let scale = f64::from(self.sensitivity.lock().0);
        mapper.set_axis(&self.axis, value * scale);
    }
}

impl fmt::Display for AxisAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, KW_AXIS, &self.params)
    }
}

impl Action for AxisAction {
    fn keyword(&self) -> &'static str {
        KW_AXIS
    }

    fn compress(self: Arc<Self>) -> ActionRef {
        self
    }

    fn axis(&self, mapper: &mut dyn Mapper, value: AxisValue, _what: PadStickTrigger) {
        self.emit(mapper, f64::from(value) / STICK_PAD_MAX);
    }

    fn whole(
        &self,
        mapper: &mut dyn Mapper,
        x: AxisValue,
        _y: AxisValue,
        _what: PadStickTrigger,
    ) {
        self.emit(mapper, f64::from(x) / STICK_PAD_MAX);
    }

    fn trigger(
        &self,
        mapper: &mut dyn Mapper,
        _old_pos: TriggerValue,
        pos: TriggerValue,
        _what: PadStickTrigger,
    ) {
        self.emit(mapper, f64::from(pos) / TRIGGER_MAX);
    }

    fn as_sensitivity(&self) -> Option<&dyn SensitivityCapable> {
        Some(self)
    }

    fn as_change(&self) -> Option<&dyn ChangeCapable> {
        Some(self)
    }
}

impl SensitivityCapable for AxisAction {
    fn set_sensitivity(&self, x: f32, y: f32, z: f32) {
        *self.sensitivity.lock() = (x, y, z);
    }
}

impl ChangeCapable for AxisAction {
    fn change(&self, mapper: &mut dyn Mapper, dx: f64, _dy: f64, _what: PadStickTrigger) {
        self.emit(mapper, dx);
    }
}

fn constructor(keyword: &str, params: &ParameterList) -> Result<ActionRef, ActionError> {
    let mut checker = ParamChecker::new(keyword, params);
    let axis = checker.next_string()?.to_string();
    checker.finish()?;

    Ok(Arc::new(AxisAction {
        axis,
        params: params.clone(),
        sensitivity: Mutex::new((1.0, 1.0, 1.0)),
    }))
}

pub fn register(registry: &mut ActionRegistry) {
    registry.register(KW_AXIS, constructor);
}
