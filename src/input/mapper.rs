//! Dispatch context handed to actions
//!
//! The event loop that polls hardware owns a `Mapper`. It answers "is this
//! button held" for condition matching and receives whatever output the
//! actions produce (virtual keys, axes, haptic effects).

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::buttons::SCButton;
use super::channel::HapticData;

/// Per-event context passed to every action capability
///
/// Only `is_pressed` is required; output hooks default to no-ops so a caller
/// that only cares about part of the output does not need to stub the rest.
pub trait Mapper {
    /// Whether `button` is currently held on the input device
    fn is_pressed(&self, button: SCButton) -> bool;

    /// Press a virtual output key
    fn key_press(&mut self, _key: &str) {}

    /// Release a virtual output key
    fn key_release(&mut self, _key: &str) {}

    /// Set a virtual output axis, normalized to -1.0..=1.0
    fn set_axis(&mut self, _axis: &str, _value: f64) {}

    /// Play a haptic effect on the device
    fn haptic_effect(&mut self, _data: HapticData) {}
}

/// Output produced by actions while dispatching
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    KeyPress { key: String },
    KeyRelease { key: String },
    Axis { axis: String, value: f64 },
    Haptic { data: HapticData },
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputEvent::KeyPress { key } => write!(f, "press {}", key),
            OutputEvent::KeyRelease { key } => write!(f, "release {}", key),
            OutputEvent::Axis { axis, value } => write!(f, "axis {} = {:.4}", axis, value),
            OutputEvent::Haptic { data } => write!(
                f,
                "haptic {:?} amplitude={} period={} count={}",
                data.position, data.amplitude, data.period, data.count
            ),
        }
    }
}

/// In-memory mapper that records output instead of emitting it
///
/// Used by the `simulate` command and by tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingMapper {
    held: SCButton,
    events: Vec<OutputEvent>,
}

impl RecordingMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mapper reporting `held` as the currently pressed buttons
    pub fn with_held(held: SCButton) -> Self {
        Self {
            held,
            events: Vec::new(),
        }
    }

    /// Mark buttons as held
    pub fn hold(&mut self, buttons: SCButton) {
        self.held |= buttons;
    }

    /// Mark buttons as no longer held
    pub fn release(&mut self, buttons: SCButton) {
        self.held.remove(buttons);
    }

    pub fn held(&self) -> SCButton {
        self.held
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    /// Drain everything recorded so far
    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    fn record(&mut self, event: OutputEvent) {
        debug!("Output: {}", event);
        self.events.push(event);
    }
}

impl Mapper for RecordingMapper {
    fn is_pressed(&self, button: SCButton) -> bool {
        !button.is_empty() && self.held.contains(button)
    }

    fn key_press(&mut self, key: &str) {
        self.record(OutputEvent::KeyPress {
            key: key.to_string(),
        });
    }

    fn key_release(&mut self, key: &str) {
        self.record(OutputEvent::KeyRelease {
            key: key.to_string(),
        });
    }

    fn set_axis(&mut self, axis: &str, value: f64) {
        self.record(OutputEvent::Axis {
            axis: axis.to_string(),
            value,
        });
    }

    fn haptic_effect(&mut self, data: HapticData) {
        self.record(OutputEvent::Haptic { data });
    }
}
