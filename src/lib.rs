//! stickshift: input device detection and key rebinding for remotely
//! simulated character controllers.
//!
//! Tracks whether the user steers with the mouse, a gamepad or the keyboard,
//! keeps the remote behavior's sensitivity in step with it, and runs a timed
//! capture flow for rebinding action keys. Everything is single-threaded and
//! driven by [`InputEvent`]s plus periodic [`ControllerSession::tick`] calls;
//! remote calls are fire-and-forget through [`RemoteParameterSink`] and
//! [`ActionMapConsumer`].

pub mod backends;
pub mod binding;
pub mod camera;
pub mod config;
pub mod detector;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod keys;
pub mod logger;
pub mod pointer;
pub mod rebind;
pub mod sensitivity;
pub mod session;
pub mod settings;
pub mod sink;

pub use binding::*;
pub use config::Config;
pub use detector::{DeviceDetector, Remote};
pub use device::*;
pub use error::{Error, Result};
pub use event::*;
pub use eventbus::*;
pub use keys::{ActionKey, KeyLabelResolver};
pub use rebind::{CaptureOutcome, CaptureStep, KeyRebinder};
pub use sensitivity::{sensitivity, SensitivitySetting};
pub use session::ControllerSession;
pub use sink::*;
