//! Input model shared by actions and profiles
//!
//! Buttons, analog channels, the values delivered with them, and the `Mapper`
//! context through which actions query held buttons and emit output.

pub mod buttons;
pub mod channel;
pub mod mapper;

pub use buttons::{SCButton, BUTTON_NAMES};
pub use channel::{
    AxisValue, GyroSample, GyroValue, HapticData, HapticPos, PadStickTrigger, TriggerValue,
    STICK_PAD_MAX, TRIGGER_MAX,
};
pub use mapper::{Mapper, OutputEvent, RecordingMapper};
