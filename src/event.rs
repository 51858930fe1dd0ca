//! Events fed into the input pipeline.
//!
//! Hosts translate platform events (DOM, winit, SDL, ...) into [`InputKind`]
//! values and wrap them in a timestamped [`InputEvent`]. Every state machine in
//! this crate reads "now" from [`InputEvent::at`], so replaying a recorded
//! event stream reproduces the same transitions.
//!
//! ## Conventions
//! - Gamepad ids are opaque strings chosen by the host (e.g. `"pad:0"`).
//! - [`KeyEvent::key`] is the *logical* key (what the layout produces),
//!   [`KeyEvent::code`] is the *physical* key position (`"KeyW"`), and
//!   [`KeyEvent::key_code`] is the legacy numeric code.

use std::time::Instant;

/// Mouse button identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
    Other(u16),
}

/// A single key press as reported by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical key, e.g. `"z"`, `"Escape"`, `"ArrowLeft"`.
    pub key: String,
    /// Physical key code, e.g. `"KeyW"`. `None` when the platform has none.
    pub code: Option<String>,
    /// Raw numeric key code.
    pub key_code: u32,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, code: Option<&str>, key_code: u32) -> Self {
        Self {
            key: key.into(),
            code: code.map(str::to_owned),
            key_code,
        }
    }

    /// A letter key whose logical and physical identity agree (QWERTY-like).
    pub fn letter(letter: char) -> Self {
        let upper = letter.to_ascii_uppercase();
        Self::new(
            letter.to_ascii_lowercase().to_string(),
            Some(&format!("Key{upper}")),
            upper as u32,
        )
    }

    pub fn escape() -> Self {
        Self::new("Escape", Some("Escape"), 27)
    }

    pub fn is_escape(&self) -> bool {
        self.key == "Escape"
    }

    /// Left/right arrow: the proxy for "steering with the keyboard".
    pub fn is_horizontal_arrow(&self) -> bool {
        matches!(self.key.as_str(), "ArrowLeft" | "ArrowRight")
    }
}

/// Device-agnostic input change.
#[derive(Clone, Debug, PartialEq)]
pub enum InputKind {
    GamepadConnected { id: String },
    GamepadDisconnected { id: String },
    MouseButtonPressed { button: MouseButton },
    KeyPressed(KeyEvent),
    /// The platform granted (`true`) or released (`false`) pointer lock.
    PointerLockChanged { locked: bool },
    /// The platform refused a pointer-lock request.
    PointerLockError,
}

/// Timestamped input event.
#[derive(Clone, Debug)]
pub struct InputEvent {
    /// Capture time (monotonic).
    pub at: Instant,
    pub kind: InputKind,
}

impl InputEvent {
    pub fn new(at: Instant, kind: InputKind) -> Self {
        Self { at, kind }
    }

    pub fn is_key(&self) -> bool {
        matches!(self.kind, InputKind::KeyPressed(_))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(
            self.kind,
            InputKind::MouseButtonPressed { .. }
                | InputKind::PointerLockChanged { .. }
                | InputKind::PointerLockError
        )
    }

    pub fn is_gamepad(&self) -> bool {
        matches!(
            self.kind,
            InputKind::GamepadConnected { .. } | InputKind::GamepadDisconnected { .. }
        )
    }
}
