//! Action object model
//!
//! An action is a polymorphic unit of behavior bound to a physical input. The
//! event loop resolves an input to a root action through a
//! [`Profile`](crate::profile::Profile) and calls one of its capabilities;
//! composite actions such as [`mode`] forward to their children.
//!
//! # Ownership
//!
//! Actions are shared: the same child may be referenced by several parents
//! and by several profile slots. Every storage site holds its own
//! [`ActionRef`] (`Arc<dyn Action>`); acquiring a reference is an explicit
//! `Arc::clone`, and the last release drops the node. The [`NoAction`]
//! sentinel is held by a process-wide static and so is never dropped.
//!
//! # Capabilities
//!
//! Base capabilities (`button_press`, `button_release`, `axis`, `whole`,
//! `gyro`, `trigger`) default to no-ops. Extended capabilities are optional:
//! `as_haptic`, `as_sensitivity` and `as_change` return `None` when the
//! action does not support them, and callers must check before invoking.

pub mod axis;
pub mod button;
pub mod error;
pub mod mode;
pub mod param;
pub mod parser;
pub mod registry;

use bitflags::bitflags;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

use crate::input::{
    AxisValue, GyroSample, HapticData, Mapper, PadStickTrigger, TriggerValue,
};

pub use error::{ActionError, ActionErrorCode};
pub use mode::{Mode, ModeCondition, ModeModifier};
pub use param::{ParamChecker, ParamType, Parameter, ParameterList, RangeOp, RangeParam};
pub use parser::{parse_action, parse_action_with};
pub use registry::{ActionRegistry, Constructor};

/// Shared, reference-counted handle to an action
pub type ActionRef = Arc<dyn Action>;

bitflags! {
    /// Coarse classification of an action
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionFlags: u16 {
        /// Regular action
        const ACTION = 1 << 0;
        /// The "do nothing" sentinel
        const NONE = 1 << 1;
        /// Wraps and dispatches to other actions
        const MODIFIER = 1 << 2;
    }
}

/// Optional capability: accept haptic feedback settings
pub trait HapticCapable {
    fn set_haptic(&self, data: HapticData);
}

/// Optional capability: accept per-axis sensitivity
pub trait SensitivityCapable {
    fn set_sensitivity(&self, x: f32, y: f32, z: f32);
}

/// Optional capability: accept relative (delta) axis input
pub trait ChangeCapable {
    fn change(&self, mapper: &mut dyn Mapper, dx: f64, dy: f64, what: PadStickTrigger);
}

/// Capability interface implemented by every action
///
/// `Display` must produce the canonical action text, built from the keyword
/// and the parameters the action was constructed with, so that it parses
/// back to an equivalent action.
pub trait Action: fmt::Display + fmt::Debug + Send + Sync {
    /// Keyword the action was constructed from
    fn keyword(&self) -> &'static str;

    fn flags(&self) -> ActionFlags {
        ActionFlags::ACTION
    }

    /// Whether this is the "do nothing" sentinel
    fn is_none(&self) -> bool {
        self.flags().contains(ActionFlags::NONE)
    }

    /// Simplify the tree rooted here once construction is finished
    ///
    /// Returns the action that should replace this one in its slot, usually
    /// `self`. Must be idempotent, and may only rewrite children when this
    /// node is exclusively owned.
    fn compress(self: Arc<Self>) -> ActionRef;

    fn button_press(&self, _mapper: &mut dyn Mapper) {}

    fn button_release(&self, _mapper: &mut dyn Mapper) {}

    /// Single axis update
    fn axis(&self, _mapper: &mut dyn Mapper, _value: AxisValue, _what: PadStickTrigger) {}

    /// Combined two-axis update for a pad or stick
    fn whole(
        &self,
        _mapper: &mut dyn Mapper,
        _x: AxisValue,
        _y: AxisValue,
        _what: PadStickTrigger,
    ) {
    }

    fn gyro(&self, _mapper: &mut dyn Mapper, _sample: &GyroSample) {}

    fn trigger(
        &self,
        _mapper: &mut dyn Mapper,
        _old_pos: TriggerValue,
        _pos: TriggerValue,
        _what: PadStickTrigger,
    ) {
    }

    fn as_haptic(&self) -> Option<&dyn HapticCapable> {
        None
    }

    fn as_sensitivity(&self) -> Option<&dyn SensitivityCapable> {
        None
    }

    fn as_change(&self) -> Option<&dyn ChangeCapable> {
        None
    }
}

/// Keyword of the "do nothing" action
pub const KW_NONE: &str = "None";

/// The "do nothing" sentinel bound to every unassigned input
#[derive(Debug)]
pub struct NoAction;

impl fmt::Display for NoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(KW_NONE)
    }
}

impl Action for NoAction {
    fn keyword(&self) -> &'static str {
        KW_NONE
    }

    fn flags(&self) -> ActionFlags {
        ActionFlags::NONE
    }

    fn compress(self: Arc<Self>) -> ActionRef {
        self
    }
}

/// Holds one reference for the whole process lifetime
static NO_ACTION: Lazy<ActionRef> = Lazy::new(|| Arc::new(NoAction) as ActionRef);

/// Acquire a reference to the shared [`NoAction`] instance
pub fn no_action() -> ActionRef {
    Arc::clone(&NO_ACTION)
}

fn none_constructor(keyword: &str, params: &ParameterList) -> Result<ActionRef, ActionError> {
    ParamChecker::new(keyword, params).finish()?;
    Ok(no_action())
}

/// Register the `None` keyword
pub fn register_none(registry: &mut ActionRegistry) {
    registry.register(KW_NONE, none_constructor);
}

/// Run `compress` on the action stored in `slot` and store the result
///
/// The slot is emptied (set to `NoAction`) while its action compresses, so an
/// action referenced from nowhere else sees itself as exclusively owned.
pub fn compress_slot(slot: &mut ActionRef) {
    let current = std::mem::replace(slot, no_action());
    *slot = current.compress();
}

/// Write `keyword(p1, p2, ...)`
pub(crate) fn write_call(
    f: &mut fmt::Formatter<'_>,
    keyword: &str,
    params: &[Parameter],
) -> fmt::Result {
    write!(f, "{}(", keyword)?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", param)?;
    }
    f.write_str(")")
}
