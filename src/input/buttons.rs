//! Controller button set
//!
//! `SCButton` is a bit set: a single flag names one physical button, a
//! combination describes which buttons are currently held. Canonical names are
//! the upper-case identifiers used both by profiles (`buttons` object keys)
//! and by the action language (`mode(A, ...)`).

use bitflags::bitflags;

bitflags! {
    /// Physical controller buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SCButton: u32 {
        const RPADTOUCH = 1 << 0;
        const LPADTOUCH = 1 << 1;
        const RPADPRESS = 1 << 2;
        const LPADPRESS = 1 << 3;
        const RGRIP = 1 << 4;
        const LGRIP = 1 << 5;
        const START = 1 << 6;
        const C = 1 << 7;
        const BACK = 1 << 8;
        const A = 1 << 9;
        const X = 1 << 10;
        const B = 1 << 11;
        const Y = 1 << 12;
        const LB = 1 << 13;
        const RB = 1 << 14;
        const LT = 1 << 15;
        const RT = 1 << 16;
        const CPADTOUCH = 1 << 17;
        const CPADPRESS = 1 << 18;
        const STICKPRESS = 1 << 19;
        const RSTICKPRESS = 1 << 20;
        const DOTS = 1 << 21;
        const RGRIP2 = 1 << 22;
        const LGRIP2 = 1 << 23;
    }
}

/// Every named button, in profile slot order (slot = position + 1)
pub const BUTTON_NAMES: [(SCButton, &str); 24] = [
    (SCButton::RPADTOUCH, "RPADTOUCH"),
    (SCButton::LPADTOUCH, "LPADTOUCH"),
    (SCButton::RPADPRESS, "RPADPRESS"),
    (SCButton::LPADPRESS, "LPADPRESS"),
    (SCButton::RGRIP, "RGRIP"),
    (SCButton::LGRIP, "LGRIP"),
    (SCButton::START, "START"),
    (SCButton::C, "C"),
    (SCButton::BACK, "BACK"),
    (SCButton::A, "A"),
    (SCButton::X, "X"),
    (SCButton::B, "B"),
    (SCButton::Y, "Y"),
    (SCButton::LB, "LB"),
    (SCButton::RB, "RB"),
    (SCButton::LT, "LT"),
    (SCButton::RT, "RT"),
    (SCButton::CPADTOUCH, "CPADTOUCH"),
    (SCButton::CPADPRESS, "CPADPRESS"),
    (SCButton::STICKPRESS, "STICKPRESS"),
    (SCButton::RSTICKPRESS, "RSTICKPRESS"),
    (SCButton::DOTS, "DOTS"),
    (SCButton::RGRIP2, "RGRIP2"),
    (SCButton::LGRIP2, "LGRIP2"),
];

// Lookup by name uses the `from_name` that `bitflags!` generates. It matches
// flag identifiers exactly, and those are the names listed above.
impl SCButton {
    /// Canonical name of a single button, `None` for empty or combined sets
    pub fn name(self) -> Option<&'static str> {
        BUTTON_NAMES
            .iter()
            .find(|(button, _)| *button == self)
            .map(|(_, n)| *n)
    }
}
