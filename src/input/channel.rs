//! Analog channels and the value types delivered with them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw stick/pad axis position
pub type AxisValue = i16;
/// Raw trigger position (0 = released, 255 = fully pulled)
pub type TriggerValue = u8;
/// Raw gyro rate or quaternion component
pub type GyroValue = i16;

/// Largest magnitude an axis can report
pub const STICK_PAD_MAX: f64 = 32767.0;
/// Largest trigger position
pub const TRIGGER_MAX: f64 = 255.0;

/// Pad, stick, trigger or gyro channel an analog event arrived on
///
/// Discriminants are stable: profiles store axis bindings in a table indexed
/// by them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PadStickTrigger {
    LPad = 1,
    RPad = 2,
    LTrigger = 3,
    RTrigger = 4,
    CPad = 5,
    DPad = 6,
    Stick = 7,
    RStick = 8,
    Gyro = 9,
}

impl PadStickTrigger {
    /// All channels in discriminant order
    pub const ALL: [PadStickTrigger; 9] = [
        PadStickTrigger::LPad,
        PadStickTrigger::RPad,
        PadStickTrigger::LTrigger,
        PadStickTrigger::RTrigger,
        PadStickTrigger::CPad,
        PadStickTrigger::DPad,
        PadStickTrigger::Stick,
        PadStickTrigger::RStick,
        PadStickTrigger::Gyro,
    ];

    /// Table index of this channel
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit used when tracking held channels in a set
    pub fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Key under which a profile stores the binding for this channel
    ///
    /// Triggers are stored separately (`trigger_left`/`trigger_right`) and
    /// return their own key here as well.
    pub fn profile_key(self) -> &'static str {
        match self {
            PadStickTrigger::LPad => "pad_left",
            PadStickTrigger::RPad => "pad_right",
            PadStickTrigger::LTrigger => "trigger_left",
            PadStickTrigger::RTrigger => "trigger_right",
            PadStickTrigger::CPad => "cpad",
            PadStickTrigger::DPad => "dpad",
            PadStickTrigger::Stick => "stick",
            PadStickTrigger::RStick => "rstick",
            PadStickTrigger::Gyro => "gyro",
        }
    }

    /// Whether this channel is one of the two triggers
    pub fn is_trigger(self) -> bool {
        matches!(self, PadStickTrigger::LTrigger | PadStickTrigger::RTrigger)
    }
}

impl fmt::Display for PadStickTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile_key())
    }
}

/// One gyro report: angular rates plus orientation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GyroSample {
    pub pitch: GyroValue,
    pub yaw: GyroValue,
    pub roll: GyroValue,
    pub q1: GyroValue,
    pub q2: GyroValue,
    pub q3: GyroValue,
    pub q4: GyroValue,
}

impl GyroSample {
    /// Same orientation with all rates zeroed, sent to actions being released
    pub fn without_rates(&self) -> GyroSample {
        GyroSample {
            pitch: 0,
            yaw: 0,
            roll: 0,
            ..*self
        }
    }
}

/// Which haptic actuator an effect is played on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticPos {
    Right,
    Left,
    #[default]
    Both,
}

/// Haptic effect parameters pushed to actions as configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticData {
    pub position: HapticPos,
    /// Signal amplitude, 0 to 65535
    pub amplitude: u16,
    /// Signal period, 0 to 65535
    pub period: u16,
    /// Number of periods to play
    pub count: u16,
}

impl Default for HapticData {
    fn default() -> Self {
        Self {
            position: HapticPos::Both,
            amplitude: 128,
            period: 0,
            count: 1,
        }
    }
}
