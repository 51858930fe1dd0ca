//! Settings panel state.
//!
//! The panel only tracks whether it is open and the slider value. What
//! happens around opening and closing it (inputs toggled, pointer released
//! and re-locked, sensitivity pushed) is sequenced by
//! [`ControllerSession`](crate::session::ControllerSession).

use crate::sensitivity::SensitivitySetting;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsPanel {
    open: bool,
    slider: SensitivitySetting,
}

/// Result of toggling the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelChange {
    Opened,
    Closed,
}

impl SettingsPanel {
    pub fn new(slider: SensitivitySetting) -> Self {
        Self {
            open: false,
            slider,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn slider(&self) -> SensitivitySetting {
        self.slider
    }

    pub fn set_slider(&mut self, value: impl Into<SensitivitySetting>) {
        self.slider = value.into();
    }

    pub fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }

    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    pub fn toggle(&mut self) -> PanelChange {
        if self.close() {
            PanelChange::Closed
        } else {
            self.open = true;
            PanelChange::Opened
        }
    }
}
