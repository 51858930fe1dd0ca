//! Input backends for `stickshift`.
//!
//! Implementations of [`GamepadSource`](crate::device::GamepadSource).
//! Platform backends (browser Gamepad API, SDL, XInput) live in the host
//! application; this crate ships only the in-memory source.

pub mod virtual_input;

pub use virtual_input::VirtualGamepads;
