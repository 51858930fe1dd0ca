//! Top-level input session for a remotely simulated character.
//!
//! [`ControllerSession`] owns the detector, rebinder, pointer lock, settings
//! panel and binding table, and routes every [`InputEvent`] to the right one:
//!
//! | event                         | capture active | panel open  | otherwise                |
//! |-------------------------------|----------------|-------------|--------------------------|
//! | key press                     | rebinder       | Escape only | Escape: panel, else detector |
//! | primary mouse press           | detector       | ignored     | pointer lock + detector  |
//! | pointer lock granted/refused  | pointer lock   | pointer lock| pointer lock             |
//! | gamepad connect/disconnect    | detector       | detector    | detector                 |
//!
//! Timers (gamepad poll, capture deadline, pointer-lock retry) advance in
//! [`ControllerSession::tick`].

use crate::binding::{ActionMap, ActionSlot};
use crate::camera::CameraOrientation;
use crate::config::Config;
use crate::detector::{DeviceDetector, Remote};
use crate::device::{GamepadSource, InputDevice};
use crate::event::{InputEvent, InputKind, MouseButton};
use crate::eventbus::InputListener;
use crate::keys::KeyLabelResolver;
use crate::pointer::{LockState, PointerCapture, PointerLock};
use crate::rebind::{CaptureOutcome, CaptureStep, KeyRebinder};
use crate::sensitivity::SensitivitySetting;
use crate::settings::{PanelChange, SettingsPanel};
use crate::sink::{ActionMapConsumer, RemoteParameterSink};
use std::time::Instant;
use tracing::{debug, warn};

pub struct ControllerSession<R, P, C> {
    detector: DeviceDetector,
    rebinder: KeyRebinder,
    pointer: PointerLock,
    settings: SettingsPanel,
    actions: ActionMap,
    remote: R,
    capture: P,
    camera: C,
    last_outcome: Option<CaptureOutcome>,
}

impl<R, P, C> ControllerSession<R, P, C>
where
    R: RemoteParameterSink + ActionMapConsumer,
    P: PointerCapture,
    C: CameraOrientation,
{
    pub fn new(
        config: &Config,
        actions: ActionMap,
        resolver: Box<dyn KeyLabelResolver>,
        remote: R,
        capture: P,
        camera: C,
    ) -> Self {
        Self {
            detector: DeviceDetector::new(config),
            rebinder: KeyRebinder::new(config, resolver),
            pointer: PointerLock::new(config),
            settings: SettingsPanel::new(SensitivitySetting::new(config.sensitivity)),
            actions,
            remote,
            capture,
            camera,
            last_outcome: None,
        }
    }

    /// Starts device detection and pushes the initial sensitivity.
    pub fn start(&mut self, now: Instant, gamepads: &mut dyn GamepadSource) {
        let connected: Vec<String> = gamepads.gamepads().into_iter().map(|p| p.id).collect();
        self.detector.start(now, connected);
        let mut remote = Remote {
            sink: &mut self.remote,
            camera: &self.camera,
        };
        self.detector.push_sensitivity(&mut remote);
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        let now = event.at;
        match &event.kind {
            InputKind::KeyPressed(key) if self.rebinder.is_capturing() => {
                if let CaptureStep::Added { display: label, .. } =
                    self.rebinder.on_key_down(key, now)
                {
                    debug!(%label, "capture display updated");
                }
            }
            InputKind::KeyPressed(key) if key.is_escape() => self.toggle_settings(now),
            InputKind::KeyPressed(_) | InputKind::MouseButtonPressed { .. }
                if self.settings.is_open() => {}
            InputKind::MouseButtonPressed {
                button: MouseButton::Primary,
            } => {
                self.pointer.request(now, &mut self.capture);
                self.route_to_detector(event);
            }
            InputKind::PointerLockChanged { locked } => self.pointer.on_lock_changed(*locked),
            InputKind::PointerLockError => self.pointer.on_lock_error(now),
            _ => self.route_to_detector(event),
        }
    }

    /// Advances the gamepad poll, capture deadline and pointer-lock retry.
    pub fn tick(&mut self, now: Instant, gamepads: &mut dyn GamepadSource) {
        let mut remote = Remote {
            sink: &mut self.remote,
            camera: &self.camera,
        };
        self.detector.tick(now, gamepads, &mut remote);

        if let Some(outcome) = self.rebinder.tick(now, &mut self.actions, &mut self.remote) {
            self.last_outcome = Some(outcome);
        }

        self.pointer.tick(now, &mut self.capture);
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        let poll = self.detector.watchers().gamepad_poll().map(|t| t.next_due());
        let capture = self.rebinder.session().map(|s| s.deadline());
        let retry = match self.pointer.state() {
            LockState::RetryPending { at } => Some(at),
            _ => None,
        };
        [poll, capture, retry].into_iter().flatten().min()
    }

    pub fn open_settings(&mut self) {
        if !self.settings.open() {
            return;
        }
        self.on_settings_opened();
    }

    pub fn close_settings(&mut self, now: Instant) {
        if !self.settings.close() {
            return;
        }
        self.on_settings_closed(now);
    }

    /// Slider moved. Device switches use the new value right away; the remote
    /// behavior gets it when the panel closes.
    pub fn set_sensitivity(&mut self, value: impl Into<SensitivitySetting>) {
        let value = value.into();
        self.settings.set_slider(value);
        self.detector.set_sensitivity_setting(value);
    }

    pub fn start_rebind(&mut self, slot: ActionSlot, now: Instant) {
        self.rebinder.start_capture(slot, now);
    }

    pub fn cancel_rebind(&mut self) -> bool {
        self.rebinder.cancel()
    }

    /// Takes the result of the last finished capture, if any.
    pub fn take_capture_outcome(&mut self) -> Option<CaptureOutcome> {
        self.last_outcome.take()
    }

    pub fn active_device(&self) -> InputDevice {
        self.detector.active_device()
    }

    pub fn detector(&self) -> &DeviceDetector {
        &self.detector
    }

    pub fn rebinder(&self) -> &KeyRebinder {
        &self.rebinder
    }

    pub fn pointer(&self) -> &PointerLock {
        &self.pointer
    }

    pub fn settings(&self) -> &SettingsPanel {
        &self.settings
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Labels for every bound slot.
    pub fn binding_labels(&self) -> Vec<(ActionSlot, String)> {
        self.actions.describe(self.rebinder.resolver())
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    pub fn capture(&self) -> &P {
        &self.capture
    }

    fn route_to_detector(&mut self, event: &InputEvent) {
        let mut remote = Remote {
            sink: &mut self.remote,
            camera: &self.camera,
        };
        self.detector.handle(event, &mut remote);
    }

    fn toggle_settings(&mut self, now: Instant) {
        match self.settings.toggle() {
            PanelChange::Opened => self.on_settings_opened(),
            PanelChange::Closed => self.on_settings_closed(now),
        }
    }

    fn on_settings_opened(&mut self) {
        debug!("settings opened");
        if let Err(err) = self.remote.set_inputs_enabled(false) {
            warn!(%err, "failed to disable remote inputs");
        }
        self.pointer.release(&mut self.capture);
    }

    fn on_settings_closed(&mut self, now: Instant) {
        debug!(slider = self.settings.slider().value(), "settings closed");
        self.detector.set_sensitivity_setting(self.settings.slider());
        let mut remote = Remote {
            sink: &mut self.remote,
            camera: &self.camera,
        };
        self.detector.push_sensitivity(&mut remote);
        self.pointer.request(now, &mut self.capture);
        if let Err(err) = self.remote.set_inputs_enabled(true) {
            warn!(%err, "failed to enable remote inputs");
        }
    }
}

impl<R, P, C> InputListener for ControllerSession<R, P, C>
where
    R: RemoteParameterSink + ActionMapConsumer,
    P: PointerCapture,
    C: CameraOrientation,
{
    fn on_input(&mut self, event: &InputEvent) {
        self.handle_event(event);
    }
}
