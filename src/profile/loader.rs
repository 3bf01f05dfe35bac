//! JSON profile loader
//!
//! Reads the persisted profile layout:
//!
//! ```json
//! {
//!   "buttons": { "A": { "action": "button(KEY_A)" } },
//!   "trigger_left": { "action": "axis(ABS_Z)" },
//!   "stick": { "action": "mode(LB, axis(ABS_RX), axis(ABS_X))" },
//!   "deck_btn_overrides": { "A": { "action": "button(KEY_ENTER)" } },
//!   "deck_override_stick": { "action": "axis(ABS_HAT0X)" }
//! }
//! ```
//!
//! Structural problems (unreadable file, bad JSON, wrong root, no `buttons`)
//! fail the whole load. An individual action that does not parse only leaves
//! its slot unbound.

use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{axis_channels, make_empty_profile, Profile};
use crate::actions::{no_action, parse_action, ActionRef};
use crate::input::{PadStickTrigger, SCButton, BUTTON_NAMES};

const BUTTON_OVERRIDES_KEY: &str = "deck_btn_overrides";
const OVERRIDE_PREFIX: &str = "deck_override_";

/// Why a profile could not be loaded
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("out of memory while loading profile")]
    OutOfMemory,

    #[error("failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode '{origin}': {message}")]
    Parse { origin: String, message: String },

    #[error("failed to decode '{0}': root is not an object")]
    RootNotObject(String),

    #[error("failed to decode '{0}': root/buttons not found or not an object")]
    MissingButtons(String),
}

impl ProfileError {
    /// Stable numeric code, as reported to callers that only see integers
    pub fn code(&self) -> i32 {
        match self {
            ProfileError::OutOfMemory => 0,
            ProfileError::Open { .. } => 1,
            ProfileError::Parse { .. } => 2,
            ProfileError::RootNotObject(_) => 3,
            ProfileError::MissingButtons(_) => 4,
        }
    }
}

/// Load a profile from a JSON file
///
/// # Arguments
/// * `path` - Profile file
/// * `apply_overrides` - Prefer `deck_btn_overrides` / `deck_override_*`
///   entries over the base bindings where present
pub fn profile_from_json(
    path: impl AsRef<Path>,
    apply_overrides: bool,
) -> Result<Profile, ProfileError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        error!("Failed to open '{}': {}", path.display(), e);
        ProfileError::Open {
            path: path.display().to_string(),
            source: e,
        }
    })?;
    profile_from_reader(file, &path.display().to_string(), apply_overrides)
}

/// Load a profile from any reader
///
/// `origin` names the source in log messages and errors.
pub fn profile_from_reader<R: Read>(
    mut reader: R,
    origin: &str,
    apply_overrides: bool,
) -> Result<Profile, ProfileError> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| {
        if e.kind() == io::ErrorKind::OutOfMemory {
            error!("Out of memory reading '{}'", origin);
            return ProfileError::OutOfMemory;
        }
        error!("Failed to decode '{}': {}", origin, e);
        ProfileError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        }
    })?;
    load(&text, origin, apply_overrides)
}

/// Load a profile from JSON text
pub fn profile_from_str(text: &str, apply_overrides: bool) -> Result<Profile, ProfileError> {
    load(text, "<string>", apply_overrides)
}

fn load(text: &str, origin: &str, apply_overrides: bool) -> Result<Profile, ProfileError> {
    let document: Value = serde_json::from_str(text).map_err(|e| {
        error!("Failed to decode '{}': {}", origin, e);
        ProfileError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        }
    })?;

    let root = document.as_object().ok_or_else(|| {
        error!("Failed to decode '{}': root is not an object", origin);
        ProfileError::RootNotObject(origin.to_string())
    })?;
    let buttons = object_at(root, "buttons").ok_or_else(|| {
        error!("Failed to decode '{}': root/buttons not found or not an object", origin);
        ProfileError::MissingButtons(origin.to_string())
    })?;

    let mut profile = make_empty_profile();
    let mut overrides_applied = false;
    let button_overrides = if apply_overrides {
        object_at(root, BUTTON_OVERRIDES_KEY)
    } else {
        None
    };

    for (button, name) in BUTTON_NAMES.iter() {
        let overridden = button_overrides.and_then(|o| object_at(o, name));
        let mut action = match overridden {
            Some(node) => {
                overrides_applied = true;
                decode_action(Some(node))
            },
            None => decode_action(object_at(buttons, name)),
        };

        // Pad presses used to be stored as LPAD / RPAD
        let is_pad_press = *button == SCButton::LPADPRESS || *button == SCButton::RPADPRESS;
        if action.is_none() && is_pad_press {
            let legacy = &name[..4];
            action = decode_action(object_at(buttons, legacy));
            if !action.is_none() {
                debug!("Using legacy key '{}' for {}", legacy, name);
            }
        }
        profile.set_button(*button, action);
    }

    for what in axis_channels() {
        let action = layered(
            root,
            what.profile_key(),
            apply_overrides,
            &mut overrides_applied,
            "axis",
        );
        profile.set_axis(what, action);
    }
    for what in [PadStickTrigger::LTrigger, PadStickTrigger::RTrigger] {
        let action = layered(
            root,
            what.profile_key(),
            apply_overrides,
            &mut overrides_applied,
            "trigger",
        );
        profile.set_trigger(what, action);
    }

    if apply_overrides && !overrides_applied {
        info!("No deck overrides applied.");
    }
    profile.set_overrides_applied(overrides_applied);
    profile.compress();

    debug!("Loaded profile '{}' ({} bindings)", origin, profile.bindings().len());
    Ok(profile)
}

/// Base binding for a top-level key, replaced by `deck_override_<key>` when
/// overrides are requested and present
fn layered(
    root: &Map<String, Value>,
    key: &str,
    apply_overrides: bool,
    overrides_applied: &mut bool,
    kind: &str,
) -> ActionRef {
    if apply_overrides {
        if let Some(node) = object_at(root, &format!("{}{}", OVERRIDE_PREFIX, key)) {
            if node.is_empty() {
                warn!("Empty {} {} action applied.", kind, key);
            }
            *overrides_applied = true;
            return decode_action(Some(node));
        }
    }
    decode_action(object_at(root, key))
}

fn object_at<'a>(parent: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    parent.get(key).and_then(Value::as_object)
}

/// Action described by a slot's `action` string
///
/// Anything missing or unparseable decodes to `NoAction`.
fn decode_action(node: Option<&Map<String, Value>>) -> ActionRef {
    let Some(text) = node.and_then(|n| n.get("action")).and_then(Value::as_str) else {
        return no_action();
    };
    match parse_action(text) {
        Ok(action) => action,
        Err(e) => {
            warn!("Failed to decode: '{}': {}", text, e);
            no_action()
        },
    }
}
