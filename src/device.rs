//! Input device classification and gamepad enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The physical device the user is currently steering with.
///
/// Exactly one is active at a time. Only
/// [`DeviceDetector`](crate::detector::DeviceDetector) changes it, in response
/// to observed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputDevice {
    #[default]
    Mouse,
    Gamepad,
    Keyboard,
}

impl fmt::Display for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputDevice::Mouse => "mouse",
            InputDevice::Gamepad => "gamepad",
            InputDevice::Keyboard => "keyboard",
        };
        f.write_str(name)
    }
}

/// Point-in-time reading of one connected game controller.
///
/// Axes follow the usual convention of `[-1.0, 1.0]` per stick axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    pub id: String,
    pub name: String,
    pub axes: Vec<f32>,
}

impl GamepadState {
    /// Largest absolute axis value, `0.0` for a pad with no axes.
    pub fn max_axis_magnitude(&self) -> f32 {
        self.axes.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()))
    }
}

/// Enumerates connected game controllers.
///
/// Implemented by the host over whatever gamepad facility the platform has.
/// See [`VirtualGamepads`](crate::backends::virtual_input::VirtualGamepads)
/// for an in-memory source.
pub trait GamepadSource {
    fn gamepads(&mut self) -> Vec<GamepadState>;
}
