//! Slider-to-multiplier mapping.
//!
//! Gamepad sticks produce much smaller per-frame deltas than a mouse, so the
//! remote camera script needs a multiplier around `x.0` for sticks and `0.x`
//! for the mouse. Keyboard steering shares the gamepad scale.

use crate::device::InputDevice;
use serde::{Deserialize, Serialize};

/// Slider value, clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8")]
pub struct SensitivitySetting(u8);

impl SensitivitySetting {
    pub const MAX: u8 = 100;

    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Multiplier pushed to the remote behavior for `device`.
    pub fn for_device(self, device: InputDevice) -> f32 {
        sensitivity(self.0, device)
    }
}

impl Default for SensitivitySetting {
    fn default() -> Self {
        Self(50)
    }
}

impl From<u8> for SensitivitySetting {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

/// `v / 100` for the mouse, `v / 5` for gamepad and keyboard.
pub fn sensitivity(raw: u8, device: InputDevice) -> f32 {
    let raw = f32::from(raw.min(SensitivitySetting::MAX));
    match device {
        InputDevice::Mouse => raw / 100.0,
        InputDevice::Gamepad | InputDevice::Keyboard => raw / 5.0,
    }
}
