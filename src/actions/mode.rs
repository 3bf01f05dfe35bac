//! Mode shift
//!
//! Binds several actions to one physical input and picks between them by
//! which other buttons are held at the moment an event is dispatched:
//!
//! ```text
//! mode(LB, button(KEY_LEFTSHIFT), RB, button(KEY_RIGHTSHIFT), button(KEY_A))
//! ```
//!
//! Parameters alternate condition / action; a final action with no condition
//! before it is the default branch.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;
use tracing::trace;

use super::error::ActionError;
use super::param::{Parameter, ParameterList, RangeParam};
use super::registry::ActionRegistry;
use super::{
    compress_slot, no_action, write_call, Action, ActionFlags, ActionRef, ChangeCapable,
    HapticCapable, SensitivityCapable,
};
use crate::input::{
    AxisValue, GyroSample, HapticData, Mapper, PadStickTrigger, SCButton, TriggerValue,
};

pub const KW_MODE: &str = "mode";

/// Trigger positions below this count as released
pub const MIN_TRIGGER: TriggerValue = 2;
/// Stick positions with both |x| and |y| below this count as released
pub const MIN_STICK: u16 = 2;

/// What selects a branch
#[derive(Debug, Clone, PartialEq)]
pub enum ModeCondition {
    /// Matches while the button is held
    Button(SCButton),
    /// Parsed and kept, but never matches
    Range(RangeParam),
    /// Matches when no conditional branch does
    Default,
}

/// One branch of a [`ModeModifier`]
#[derive(Debug)]
pub struct Mode {
    condition: ModeCondition,
    action: ActionRef,
    is_active: AtomicBool,
}

impl Mode {
    fn new(condition: ModeCondition, action: ActionRef) -> Self {
        Self {
            condition,
            action,
            is_active: AtomicBool::new(false),
        }
    }

    pub fn condition(&self) -> &ModeCondition {
        &self.condition
    }

    pub fn action(&self) -> &ActionRef {
        &self.action
    }

    /// Whether the branch is currently receiving continuous updates
    pub fn is_active(&self) -> bool {
        self.is_active.load(Ordering::Relaxed)
    }

    fn set_active(&self, active: bool) {
        self.is_active.store(active, Ordering::Relaxed);
    }
}

/// The `mode` action
#[derive(Debug)]
pub struct ModeModifier {
    params: ParameterList,
    modes: Vec<Mode>,
    held_sticks: AtomicU16,
    held_triggers: AtomicU16,
}

impl ModeModifier {
    /// Build from `condition, action, condition, action, ..., [default]`
    ///
    /// A condition is a button name or a range. An action in last position
    /// without a condition before it becomes the default branch. Any other
    /// shape fails without building anything.
    pub fn new(params: &ParameterList) -> Result<Self, ActionError> {
        let mut modes = Vec::new();
        modes
            .try_reserve(params.len() / 2 + 1)
            .map_err(|_| ActionError::OutOfMemory)?;

        let mut pending: Option<ModeCondition> = None;
        let mut iter = params.iter().peekable();
        while let Some(param) = iter.next() {
            match pending.take() {
                None => {
                    let condition = match param {
                        Parameter::String(name) => {
                            SCButton::from_name(name).map(ModeCondition::Button)
                        },
                        Parameter::Range(range) => Some(ModeCondition::Range(range.clone())),
                        Parameter::Action(action) if iter.peek().is_none() => {
                            modes.push(Mode::new(ModeCondition::Default, Arc::clone(action)));
                            break;
                        },
                        _ => None,
                    };
                    match condition {
                        Some(condition) => pending = Some(condition),
                        None => {
                            return Err(ActionError::invalid_type(
                                KW_MODE,
                                format!("{} cannot take {} as button/condition", KW_MODE, param),
                            ))
                        },
                    }
                },
                Some(condition) => match param {
                    Parameter::Action(action) => {
                        modes.push(Mode::new(condition, Arc::clone(action)));
                    },
                    _ => {
                        return Err(ActionError::invalid_type(
                            KW_MODE,
                            format!("{} cannot take {} as action parameter", KW_MODE, param),
                        ))
                    },
                },
            }
        }

        if pending.is_some() {
            return Err(ActionError::invalid_count(
                KW_MODE,
                "Expected action after last parameter",
            ));
        }

        Ok(Self {
            params: params.clone(),
            modes,
            held_sticks: AtomicU16::new(0),
            held_triggers: AtomicU16::new(0),
        })
    }

    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Bit set of `PadStickTrigger::bit` for sticks with an active branch
    pub fn held_sticks(&self) -> u16 {
        self.held_sticks.load(Ordering::Relaxed)
    }

    /// Bit set of `PadStickTrigger::bit` for triggers with an active branch
    pub fn held_triggers(&self) -> u16 {
        self.held_triggers.load(Ordering::Relaxed)
    }

    /// Branch to dispatch to, given the buttons currently held
    ///
    /// The first matching button branch wins; the default branch is the
    /// fallback wherever it was declared.
    pub fn choose(&self, mapper: &dyn Mapper) -> Option<&Mode> {
        let mut default = None;
        for mode in &self.modes {
            match &mode.condition {
                ModeCondition::Button(button) => {
                    if mapper.is_pressed(*button) {
                        return Some(mode);
                    }
                },
                ModeCondition::Range(_) => {},
                ModeCondition::Default => default = Some(mode),
            }
        }
        default
    }

    /// Send a release-style update to every active branch accepted by
    /// `predicate`, then mark it inactive
    pub fn deactivate_all<P, F>(&self, mut predicate: P, mut forward: F)
    where
        P: FnMut(&Mode) -> bool,
        F: FnMut(&ActionRef),
    {
        for mode in &self.modes {
            if predicate(mode) && mode.is_active() {
                forward(&mode.action);
                mode.set_active(false);
            }
        }
    }

    fn set_held(bits: &AtomicU16, what: PadStickTrigger, held: bool) {
        if held {
            bits.fetch_or(what.bit(), Ordering::Relaxed);
        } else {
            bits.fetch_and(!what.bit(), Ordering::Relaxed);
        }
    }
}

impl fmt::Display for ModeModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, KW_MODE, &self.params)
    }
}

impl Action for ModeModifier {
    fn keyword(&self) -> &'static str {
        KW_MODE
    }

    fn flags(&self) -> ActionFlags {
        ActionFlags::ACTION | ActionFlags::MODIFIER
    }

    fn compress(self: Arc<Self>) -> ActionRef {
        let mut this = self;
        if let Some(mm) = Arc::get_mut(&mut this) {
            // Drop the retained copies so each child is referenced by its
            // branch alone while it compresses
            for param in mm.params.iter_mut() {
                if let Parameter::Action(action) = param {
                    *action = no_action();
                }
            }
            for mode in mm.modes.iter_mut() {
                compress_slot(&mut mode.action);
            }
            // Action parameters map one to one, in order, onto branches
            let mut branches = mm.modes.iter();
            for param in mm.params.iter_mut() {
                if let Parameter::Action(action) = param {
                    if let Some(mode) = branches.next() {
                        *action = Arc::clone(&mode.action);
                    }
                }
            }
        } else {
            trace!("mode is shared, children left as they are");
        }
        this
    }

    fn button_press(&self, mapper: &mut dyn Mapper) {
        if let Some(mode) = self.choose(mapper) {
            mode.action.button_press(mapper);
            mode.set_active(true);
        }
    }

    fn button_release(&self, mapper: &mut dyn Mapper) {
        // Every active branch, not only the one matching the held buttons now
        self.deactivate_all(|_| true, |action| action.button_release(mapper));
    }

    fn axis(&self, mapper: &mut dyn Mapper, value: AxisValue, what: PadStickTrigger) {
        if let Some(mode) = self.choose(mapper) {
            mode.action.axis(mapper, value, what);
        }
    }

    fn whole(&self, mapper: &mut dyn Mapper, x: AxisValue, y: AxisValue, what: PadStickTrigger) {
        if what == PadStickTrigger::Stick {
            if x.unsigned_abs() < MIN_STICK && y.unsigned_abs() < MIN_STICK {
                self.deactivate_all(|_| true, |action| action.whole(mapper, 0, 0, what));
                Self::set_held(&self.held_sticks, what, false);
                return;
            }
            match self.choose(mapper) {
                None => {
                    self.deactivate_all(|_| true, |action| action.whole(mapper, 0, 0, what));
                    Self::set_held(&self.held_sticks, what, false);
                },
                Some(mode) => {
                    self.deactivate_all(
                        |other| !std::ptr::eq(other, mode),
                        |action| action.whole(mapper, 0, 0, what),
                    );
                    mode.action.whole(mapper, x, y, what);
                    mode.set_active(true);
                    Self::set_held(&self.held_sticks, what, true);
                },
            }
        } else {
            let chosen = self.choose(mapper);
            if !chosen.map_or(false, Mode::is_active) {
                self.deactivate_all(|_| true, |action| action.whole(mapper, 0, 0, what));
            }
            if let Some(mode) = chosen {
                mode.action.whole(mapper, x, y, what);
                mode.set_active(true);
            }
        }
    }

    fn gyro(&self, mapper: &mut dyn Mapper, sample: &GyroSample) {
        let chosen = self.choose(mapper);
        if !chosen.map_or(false, Mode::is_active) {
            let still = sample.without_rates();
            self.deactivate_all(|_| true, |action| action.gyro(mapper, &still));
        }
        if let Some(mode) = chosen {
            mode.action.gyro(mapper, sample);
            mode.set_active(true);
        }
    }

    fn trigger(
        &self,
        mapper: &mut dyn Mapper,
        old_pos: TriggerValue,
        pos: TriggerValue,
        what: PadStickTrigger,
    ) {
        if pos < MIN_TRIGGER {
            self.deactivate_all(|_| true, |action| action.trigger(mapper, old_pos, pos, what));
            Self::set_held(&self.held_triggers, what, false);
        } else if let Some(mode) = self.choose(mapper) {
            // Siblings stay active here, unlike the stick path
            mode.action.trigger(mapper, old_pos, pos, what);
            mode.set_active(true);
            Self::set_held(&self.held_triggers, what, true);
        }
    }

    fn as_haptic(&self) -> Option<&dyn HapticCapable> {
        Some(self)
    }

    fn as_sensitivity(&self) -> Option<&dyn SensitivityCapable> {
        Some(self)
    }

    fn as_change(&self) -> Option<&dyn ChangeCapable> {
        Some(self)
    }
}

impl HapticCapable for ModeModifier {
    fn set_haptic(&self, data: HapticData) {
        for mode in &self.modes {
            if let Some(target) = mode.action.as_haptic() {
                target.set_haptic(data);
            }
        }
    }
}

impl SensitivityCapable for ModeModifier {
    fn set_sensitivity(&self, x: f32, y: f32, z: f32) {
        for mode in &self.modes {
            if let Some(target) = mode.action.as_sensitivity() {
                target.set_sensitivity(x, y, z);
            }
        }
    }
}

impl ChangeCapable for ModeModifier {
    /// Relative input is not passed through mode shift
    fn change(&self, _mapper: &mut dyn Mapper, _dx: f64, _dy: f64, _what: PadStickTrigger) {}
}

fn constructor(_keyword: &str, params: &ParameterList) -> Result<ActionRef, ActionError> {
    Ok(Arc::new(ModeModifier::new(params)?))
}

/// Register `mode`
pub fn register(registry: &mut ActionRegistry) {
    registry.register(KW_MODE, constructor);
}

#[cfg(test)]
mod tests;
