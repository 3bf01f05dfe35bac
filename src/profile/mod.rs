//! Profile: the root action bound to every physical input
//!
//! A profile is a fixed table of [`ActionRef`]s, one per button, trigger and
//! analog channel. Unbound slots hold [`NoAction`](crate::actions::NoAction),
//! so a slot is never empty. Accessors hand out their own reference to the
//! bound action.
//!
//! Profiles are usually read from JSON through [`profile_from_json`].

pub mod loader;


use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::actions::{compress_slot, no_action, ActionRef};
use crate::input::{PadStickTrigger, SCButton, BUTTON_NAMES};

pub use loader::{profile_from_json, profile_from_reader, profile_from_str, ProfileError};

/// Button slots; slot 0 is never bound
pub const BUTTON_SLOTS: usize = BUTTON_NAMES.len() + 1;
/// Left and right trigger
pub const TRIGGER_SLOTS: usize = 2;
/// Axis slots, indexed by `PadStickTrigger` discriminant
pub const AXIS_SLOTS: usize = PadStickTrigger::Gyro as usize + 1;

/// Slot holding `button`, `None` for empty or combined sets
fn button_slot(button: SCButton) -> Option<usize> {
    BUTTON_NAMES
        .iter()
        .position(|(b, _)| *b == button)
        .map(|i| i + 1)
}

/// Same as [`button_slot`] with the two grips swapped
///
/// Some devices report left and right grip the other way around.
fn button_slot_fixed(button: SCButton) -> Option<usize> {
    if button == SCButton::LGRIP {
        button_slot(SCButton::RGRIP)
    } else if button == SCButton::RGRIP {
        button_slot(SCButton::LGRIP)
    } else {
        button_slot(button)
    }
}

fn trigger_slot(what: PadStickTrigger) -> Option<usize> {
    match what {
        PadStickTrigger::LTrigger => Some(0),
        PadStickTrigger::RTrigger => Some(1),
        _ => None,
    }
}

/// Channels with an axis slot of their own
pub fn axis_channels() -> impl Iterator<Item = PadStickTrigger> {
    PadStickTrigger::ALL.into_iter().filter(|c| !c.is_trigger())
}

/// Input slot to action mapping
#[derive(Debug, Clone)]
pub struct Profile {
    buttons: [ActionRef; BUTTON_SLOTS],
    triggers: [ActionRef; TRIGGER_SLOTS],
    axes: [ActionRef; AXIS_SLOTS],
    fixed_grip_indexing: bool,
    overrides_applied: bool,
    compressed: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            buttons: std::array::from_fn(|_| no_action()),
            triggers: std::array::from_fn(|_| no_action()),
            axes: std::array::from_fn(|_| no_action()),
            fixed_grip_indexing: false,
            overrides_applied: false,
            compressed: false,
        }
    }
}

/// Profile with every slot bound to `NoAction`
pub fn make_empty_profile() -> Profile {
    Profile::default()
}

impl Profile {
    /// Action bound to `button`
    ///
    /// With fixed grip indexing enabled, `LGRIP` and `RGRIP` read each
    /// other's slot.
    pub fn get_button(&self, button: SCButton) -> ActionRef {
        let slot = if self.fixed_grip_indexing {
            button_slot_fixed(button)
        } else {
            button_slot(button)
        };
        match slot {
            Some(i) => Arc::clone(&self.buttons[i]),
            None => no_action(),
        }
    }

    /// Action bound to a trigger; `NoAction` for non-trigger channels
    pub fn get_trigger(&self, what: PadStickTrigger) -> ActionRef {
        match trigger_slot(what) {
            Some(i) => Arc::clone(&self.triggers[i]),
            None => no_action(),
        }
    }

    pub fn get_pad(&self, what: PadStickTrigger) -> ActionRef {
        Arc::clone(&self.axes[what.index()])
    }

    pub fn get_stick(&self, what: PadStickTrigger) -> ActionRef {
        Arc::clone(&self.axes[what.index()])
    }

    pub fn get_gyro(&self) -> ActionRef {
        self.get_stick(PadStickTrigger::Gyro)
    }

    /// Bind `action` to `button`, returning whatever was bound before
    ///
    /// Uses the slot named by the button itself, regardless of grip
    /// indexing. Returns `None` if `button` is not a single button.
    pub fn set_button(&mut self, button: SCButton, action: ActionRef) -> Option<ActionRef> {
        let slot = button_slot(button)?;
        Some(std::mem::replace(&mut self.buttons[slot], action))
    }

    pub fn set_trigger(&mut self, what: PadStickTrigger, action: ActionRef) -> Option<ActionRef> {
        let slot = trigger_slot(what)?;
        Some(std::mem::replace(&mut self.triggers[slot], action))
    }

    /// Bind an axis slot; triggers have slots of their own and are rejected
    pub fn set_axis(&mut self, what: PadStickTrigger, action: ActionRef) -> Option<ActionRef> {
        if what.is_trigger() {
            return None;
        }
        Some(std::mem::replace(&mut self.axes[what.index()], action))
    }

    pub fn fixed_grip_indexing(&self) -> bool {
        self.fixed_grip_indexing
    }

    pub fn set_fixed_grip_indexing(&mut self, fixed: bool) {
        self.fixed_grip_indexing = fixed;
    }

    /// Whether the loader used at least one override entry
    pub fn overrides_applied(&self) -> bool {
        self.overrides_applied
    }

    pub(crate) fn set_overrides_applied(&mut self, applied: bool) {
        self.overrides_applied = applied;
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Let every bound action simplify itself
    ///
    /// Runs once; later calls do nothing.
    pub fn compress(&mut self) {
        if self.compressed {
            return;
        }
        self.buttons
            .iter_mut()
            .chain(self.triggers.iter_mut())
            .chain(self.axes.iter_mut())
            .for_each(compress_slot);
        self.compressed = true;
        debug!("Profile compressed");
    }

    /// Every bound slot with the profile key it is stored under
    pub fn bindings(&self) -> Vec<(&'static str, ActionRef)> {
        let mut out = Vec::new();
        for (i, (_, name)) in BUTTON_NAMES.iter().enumerate() {
            let action = &self.buttons[i + 1];
            if !action.is_none() {
                out.push((*name, Arc::clone(action)));
            }
        }
        for what in [PadStickTrigger::LTrigger, PadStickTrigger::RTrigger] {
            let action = self.get_trigger(what);
            if !action.is_none() {
                out.push((what.profile_key(), action));
            }
        }
        for what in axis_channels() {
            let action = &self.axes[what.index()];
            if !action.is_none() {
                out.push((what.profile_key(), Arc::clone(action)));
            }
        }
        out
    }

    /// Serialize bound slots into the persisted JSON layout
    ///
    /// Overrides are not kept apart; the result holds whatever is bound now.
    pub fn to_json(&self) -> Value {
        let mut buttons = Map::new();
        let mut root = Map::new();
        for (i, (_, name)) in BUTTON_NAMES.iter().enumerate() {
            let action = &self.buttons[i + 1];
            if !action.is_none() {
                buttons.insert(name.to_string(), json!({ "action": action.to_string() }));
            }
        }
        root.insert("buttons".to_string(), Value::Object(buttons));

        for what in [PadStickTrigger::LTrigger, PadStickTrigger::RTrigger] {
            let action = self.get_trigger(what);
            if !action.is_none() {
                root.insert(
                    what.profile_key().to_string(),
                    json!({ "action": action.to_string() }),
                );
            }
        }
        for what in axis_channels() {
            let action = &self.axes[what.index()];
            if !action.is_none() {
                root.insert(
                    what.profile_key().to_string(),
                    json!({ "action": action.to_string() }),
                );
            }
        }
        Value::Object(root)
    }
}
