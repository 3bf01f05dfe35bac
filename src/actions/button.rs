//! `button(KEY)` - presses a virtual key while the input is held

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::error::ActionError;
use super::param::{ParamChecker, ParameterList};
use super::registry::ActionRegistry;
use super::{write_call, Action, ActionRef, HapticCapable};
use crate::input::{HapticData, Mapper};

pub const KW_BUTTON: &str = "button";

/// Emits a key press on `button_press` and the matching release on
/// `button_release`
///
/// If a haptic effect has been pushed through `set_haptic`, it is played on
/// every press.
#[derive(Debug)]
pub struct ButtonAction {
    key: String,
    params: ParameterList,
    haptic: Mutex<Option<HapticData>>,
}

impl ButtonAction {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn haptic(&self) -> Option<HapticData> {
        *self.haptic.lock()
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_call(f, KW_BUTTON, &self.params)
    }
}

impl Action for ButtonAction {
    fn keyword(&self) -> &'static str {
        KW_BUTTON
    }

    fn compress(self: Arc<Self>) -> ActionRef {
        self
    }

    fn button_press(&self, mapper: &mut dyn Mapper) {
        mapper.key_press(&self.key);
        if let Some(data) = self.haptic() {
            mapper.haptic_effect(data);
        }
    }

    fn button_release(&self, mapper: &mut dyn Mapper) {
        mapper.key_release(&self.key);
    }

    fn as_haptic(&self) -> Option<&dyn HapticCapable> {
        Some(self)
    }
}

impl HapticCapable for ButtonAction {
    fn set_haptic(&self, data: HapticData) {
        *self.haptic.lock() = Some(data);
    }
}

fn constructor(keyword: &str, params: &ParameterList) -> Result<ActionRef, ActionError> {
    let mut checker = ParamChecker::new(keyword, params);
    let key = checker.next_string()?.to_string();
    checker.finish()?;

    Ok(Arc::new(ButtonAction {
        key,
        params: params.clone(),
        haptic: Mutex::new(None),
    }))
}

pub fn register(registry: &mut ActionRegistry) {
    registry.register(KW_BUTTON, constructor);
}
