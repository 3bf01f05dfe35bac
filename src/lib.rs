//! scc-core - SC-Controller action model and profile loader
//!
//! Physical controller input is mapped to output through *actions*, written
//! in a small language (`button(KEY_A)`, `mode(LB, axis(ABS_X), None)`) and
//! stored per input slot in JSON profiles.
//!
//! - [`actions`]: the action trait, parameters, registry, parser, and the
//!   built-in actions including the `mode` shifter
//! - [`profile`]: the slot table and the JSON loader
//! - [`input`]: buttons, analog channels and the [`Mapper`](input::Mapper)
//!   context actions dispatch through

pub mod actions;
pub mod config;
pub mod input;
pub mod profile;

pub use actions::{parse_action, Action, ActionError, ActionRef};
pub use profile::{make_empty_profile, profile_from_json, Profile, ProfileError};
