//! Active input device detection.
//!
//! [`DeviceDetector`] decides whether the user is steering with the mouse, a
//! gamepad or the keyboard, and keeps the remote behavior's `sensitivity`
//! input in step with that decision.
//!
//! # Signals
//! - primary mouse button press: **Mouse** (always listened for)
//! - any connected gamepad axis beyond the deadzone, sampled by a poll timer:
//!   **Gamepad**
//! - `ArrowLeft` / `ArrowRight`: **Keyboard**
//!
//! # Watchers
//! Besides the permanent mouse listener, two alternate-device watchers exist,
//! each held in its own slot: the gamepad poll timer and the arrow-key
//! subscription. A slot holds at most one handle; arming always cancels the
//! previous handle of that kind first. After every transition the slots are
//! re-armed from the current state:
//! - gamepad poll: armed iff the active device is Mouse and at least one
//!   gamepad is connected;
//! - arrow keys: armed iff the active device is not Keyboard.
//!
//! Keyboard therefore only leaves through a mouse-down.
//!
//! A signal for the device that is already active is a no-op: no remote push
//! and no re-arm.

use crate::camera::{recover_pitch_yaw, CameraOrientation};
use crate::config::Config;
use crate::device::{GamepadSource, InputDevice};
use crate::event::{InputEvent, InputKind, MouseButton};
use crate::sensitivity::SensitivitySetting;
use crate::sink::{RemoteParameterSink, ScriptInputs};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Remote collaborators a sensitivity push needs.
pub struct Remote<'a> {
    pub sink: &'a mut dyn RemoteParameterSink,
    pub camera: &'a dyn CameraOrientation,
}

/// Cancelable repeating timer driving gamepad axis sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTimer {
    id: u64,
    interval: Duration,
    next_due: Instant,
}

impl PollTimer {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }

    fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }
}

/// One-shot listener registration for arrow-key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// The two alternate-device watcher slots.
#[derive(Debug, Default)]
pub struct Watchers {
    next_id: u64,
    gamepad_poll: Option<PollTimer>,
    arrow_keys: Option<Subscription>,
}

impl Watchers {
    pub fn gamepad_poll(&self) -> Option<&PollTimer> {
        self.gamepad_poll.as_ref()
    }

    pub fn arrow_keys(&self) -> Option<&Subscription> {
        self.arrow_keys.as_ref()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn arm_gamepad_poll(&mut self, now: Instant, interval: Duration) {
        self.cancel_gamepad_poll();
        let id = self.next_id();
        trace!(id, ?interval, "arming gamepad poll");
        self.gamepad_poll = Some(PollTimer {
            id,
            interval,
            next_due: now + interval,
        });
    }

    fn cancel_gamepad_poll(&mut self) {
        if let Some(timer) = self.gamepad_poll.take() {
            trace!(id = timer.id, "cancelled gamepad poll");
        }
    }

    fn arm_arrow_keys(&mut self) {
        self.cancel_arrow_keys();
        let id = self.next_id();
        trace!(id, "arming arrow-key listener");
        self.arrow_keys = Some(Subscription { id });
    }

    fn cancel_arrow_keys(&mut self) {
        if let Some(sub) = self.arrow_keys.take() {
            trace!(id = sub.id, "cancelled arrow-key listener");
        }
    }
}

pub struct DeviceDetector {
    device: InputDevice,
    setting: SensitivitySetting,
    behavior_id: String,
    deadzone: f32,
    poll_interval: Duration,
    gamepads: BTreeSet<String>,
    watchers: Watchers,
}

impl DeviceDetector {
    pub fn new(config: &Config) -> Self {
        Self {
            device: InputDevice::Mouse,
            setting: SensitivitySetting::new(config.sensitivity),
            behavior_id: config.behavior_id.clone(),
            deadzone: config.deadzone,
            poll_interval: config.poll_interval(),
            gamepads: BTreeSet::new(),
            watchers: Watchers::default(),
        }
    }

    /// Starts detection. Gamepads already connected are watched right away.
    pub fn start<I, S>(&mut self, now: Instant, connected: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gamepads.extend(connected.into_iter().map(Into::into));
        debug!(
            device = %self.device,
            gamepads = self.gamepads.len(),
            "starting device detection"
        );
        self.rearm_watchers(now);
    }

    pub fn active_device(&self) -> InputDevice {
        self.device
    }

    pub fn sensitivity_setting(&self) -> SensitivitySetting {
        self.setting
    }

    /// Stores a new slider value. Takes effect on the next push.
    pub fn set_sensitivity_setting(&mut self, setting: impl Into<SensitivitySetting>) {
        self.setting = setting.into();
    }

    pub fn watchers(&self) -> &Watchers {
        &self.watchers
    }

    pub fn connected_gamepads(&self) -> impl Iterator<Item = &str> {
        self.gamepads.iter().map(String::as_str)
    }

    /// Feeds one event. Returns the new device when a transition happened.
    pub fn handle(&mut self, event: &InputEvent, remote: &mut Remote<'_>) -> Option<InputDevice> {
        match &event.kind {
            InputKind::MouseButtonPressed {
                button: MouseButton::Primary,
            } => self.transition(InputDevice::Mouse, event.at, remote),
            InputKind::KeyPressed(key)
                if key.is_horizontal_arrow() && self.watchers.arrow_keys.is_some() =>
            {
                self.transition(InputDevice::Keyboard, event.at, remote)
            }
            InputKind::GamepadConnected { id } => {
                self.on_gamepad_connected(id, event.at);
                None
            }
            InputKind::GamepadDisconnected { id } => {
                self.on_gamepad_disconnected(id);
                None
            }
            _ => None,
        }
    }

    /// Runs the gamepad poll if it is armed and due.
    ///
    /// `source` is not touched at all while no poll is armed.
    pub fn tick(
        &mut self,
        now: Instant,
        source: &mut dyn GamepadSource,
        remote: &mut Remote<'_>,
    ) -> Option<InputDevice> {
        let timer = self.watchers.gamepad_poll.as_mut()?;
        if !timer.is_due(now) {
            return None;
        }
        timer.next_due = now + timer.interval;

        let moved = source
            .gamepads()
            .into_iter()
            .find(|pad| pad.max_axis_magnitude() > self.deadzone);

        match moved {
            Some(pad) => {
                debug!(id = %pad.id, magnitude = pad.max_axis_magnitude(), "gamepad axis past deadzone");
                self.transition(InputDevice::Gamepad, now, remote)
            }
            None => None,
        }
    }

    /// Pushes the sensitivity for the active device.
    ///
    /// Fire-and-forget: remote failures are logged and otherwise ignored.
    pub fn push_sensitivity(&self, remote: &mut Remote<'_>) {
        let mut inputs = ScriptInputs::sensitivity(self.setting.for_device(self.device));

        if self.device == InputDevice::Mouse {
            if let Some(orientation) = remote.camera.orientation() {
                let angles = recover_pitch_yaw(orientation);
                inputs.pitch = Some(angles.pitch);
                inputs.yaw = Some(angles.yaw);
            }
        }

        debug!(device = %self.device, sensitivity = inputs.sensitivity, "pushing sensitivity");

        if let Err(err) = remote
            .sink
            .set_script_input_values(&self.behavior_id, &inputs)
        {
            warn!(%err, behavior = %self.behavior_id, "failed to set script inputs");
        }
        if let Err(err) = remote.sink.assign_client_to_scripts() {
            warn!(%err, "failed to reassign client to scripts");
        }
    }

    fn transition(
        &mut self,
        to: InputDevice,
        now: Instant,
        remote: &mut Remote<'_>,
    ) -> Option<InputDevice> {
        if self.device == to {
            trace!(device = %to, "device already active");
            return None;
        }
        info!(from = %self.device, to = %to, "input device changed");
        self.device = to;
        self.push_sensitivity(remote);
        self.rearm_watchers(now);
        Some(to)
    }

    fn on_gamepad_connected(&mut self, id: &str, now: Instant) {
        let first = self.gamepads.is_empty();
        if !self.gamepads.insert(id.to_string()) {
            return;
        }
        debug!(id, total = self.gamepads.len(), "gamepad connected");
        if first && self.watchers.gamepad_poll.is_none() && self.device == InputDevice::Mouse {
            self.watchers.arm_gamepad_poll(now, self.poll_interval);
        }
    }

    fn on_gamepad_disconnected(&mut self, id: &str) {
        if !self.gamepads.remove(id) {
            warn!(id, "disconnect for unknown gamepad");
            return;
        }
        debug!(id, remaining = self.gamepads.len(), "gamepad disconnected");
        if self.gamepads.is_empty() {
            self.watchers.cancel_gamepad_poll();
        }
    }

    fn rearm_watchers(&mut self, now: Instant) {
        if self.device == InputDevice::Mouse && !self.gamepads.is_empty() {
            self.watchers.arm_gamepad_poll(now, self.poll_interval);
        } else {
            self.watchers.cancel_gamepad_poll();
        }

        if self.device != InputDevice::Keyboard {
            self.watchers.arm_arrow_keys();
        } else {
            self.watchers.cancel_arrow_keys();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{FixedCamera, Quat};
    use crate::device::GamepadState;
    use crate::event::KeyEvent;
    use crate::error::SinkError;
    use crate::sink::{QueuedSink, RemoteCommand};

    #[derive(Default)]
    struct CountingPads {
        axes: Vec<f32>,
        reads: usize,
    }

    impl GamepadSource for CountingPads {
        fn gamepads(&mut self) -> Vec<GamepadState> {
            self.reads += 1;
            vec![GamepadState {
                id: "pad:0".into(),
                name: "Pad".into(),
                axes: self.axes.clone(),
            }]
        }
    }

    /// Remote that refuses every call but records it.
    #[derive(Default)]
    struct UnreachableSink {
        calls: Vec<&'static str>,
    }

    impl RemoteParameterSink for UnreachableSink {
        fn set_script_input_values(
            &mut self,
            behavior_id: &str,
            _inputs: &ScriptInputs,
        ) -> Result<(), SinkError> {
            self.calls.push("set");
            Err(SinkError::UnknownBehavior(behavior_id.to_string()))
        }

        fn assign_client_to_scripts(&mut self) -> Result<(), SinkError> {
            self.calls.push("assign");
            Err(SinkError::Disconnected)
        }

        fn set_inputs_enabled(&mut self, _enabled: bool) -> Result<(), SinkError> {
            self.calls.push("enable");
            Err(SinkError::Disconnected)
        }
    }

    fn config() -> Config {
        Config {
            behavior_id: "fpc".into(),
            ..Config::default()
        }
    }

    fn click(at: Instant) -> InputEvent {
        InputEvent::new(
            at,
            InputKind::MouseButtonPressed {
                button: MouseButton::Primary,
            },
        )
    }

    fn arrow(at: Instant) -> InputEvent {
        InputEvent::new(
            at,
            InputKind::KeyPressed(KeyEvent::new("ArrowLeft", Some("ArrowLeft"), 37)),
        )
    }

    fn sensitivities(sink: &mut QueuedSink) -> Vec<f32> {
        sink.drain()
            .into_iter()
            .filter_map(|cmd| match cmd {
                RemoteCommand::SetScriptInputs { inputs, .. } => Some(inputs.sensitivity),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn starts_on_mouse_with_only_arrow_watcher() {
        let mut det = DeviceDetector::new(&config());
        det.start(Instant::now(), Vec::<String>::new());
        assert_eq!(det.active_device(), InputDevice::Mouse);
        assert!(det.watchers().gamepad_poll().is_none());
        assert!(det.watchers().arrow_keys().is_some());
    }

    #[test]
    fn already_connected_gamepad_is_polled_immediately() {
        let mut det = DeviceDetector::new(&config());
        det.start(Instant::now(), ["pad:0"]);
        assert!(det.watchers().gamepad_poll().is_some());
    }

    #[test]
    fn axis_past_deadzone_switches_to_gamepad() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let mut pads = CountingPads {
            axes: vec![0.1, 0.15],
            ..Default::default()
        };
        let t0 = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(t0, ["pad:0"]);

        // Not due yet.
        assert_eq!(det.tick(t0, &mut pads, &mut remote), None);
        assert_eq!(pads.reads, 0);

        // Inside deadzone.
        let t1 = t0 + Duration::from_millis(100);
        assert_eq!(det.tick(t1, &mut pads, &mut remote), None);
        assert_eq!(pads.reads, 1);

        pads.axes = vec![0.0, -0.6];
        let t2 = t1 + Duration::from_millis(100);
        assert_eq!(
            det.tick(t2, &mut pads, &mut remote),
            Some(InputDevice::Gamepad)
        );
        assert!(det.watchers().gamepad_poll().is_none());
        assert!(det.watchers().arrow_keys().is_some());

        let pushed = sensitivities(&mut sink);
        assert_eq!(pushed.len(), 1);
        assert!((pushed[0] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn repeated_clicks_on_mouse_push_nothing() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, Vec::<String>::new());
        assert_eq!(det.handle(&click(now), &mut remote), None);
        assert_eq!(det.handle(&click(now), &mut remote), None);
        assert!(sink.is_empty());
    }

    #[test]
    fn mouse_push_carries_camera_angles() {
        let mut sink = QueuedSink::new();
        let camera = FixedCamera(Quat::IDENTITY);
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, Vec::<String>::new());

        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        det.handle(&arrow(now), &mut remote);
        sink.drain();

        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        assert_eq!(
            det.handle(&click(now), &mut remote),
            Some(InputDevice::Mouse)
        );

        let cmds = sink.drain();
        match &cmds[0] {
            RemoteCommand::SetScriptInputs {
                behavior_id,
                inputs,
            } => {
                assert_eq!(behavior_id, "fpc");
                assert!((inputs.sensitivity - 0.5).abs() < 1e-6);
                assert_eq!(inputs.pitch, Some(0.0));
                assert_eq!(inputs.yaw, Some(180.0));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cmds[1], RemoteCommand::AssignClientToScripts);
    }

    #[test]
    fn arrow_keys_switch_to_keyboard_once() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, ["pad:0"]);

        assert_eq!(
            det.handle(&arrow(now), &mut remote),
            Some(InputDevice::Keyboard)
        );
        assert!(det.watchers().arrow_keys().is_none());
        assert!(det.watchers().gamepad_poll().is_none());
        assert_eq!(det.handle(&arrow(now), &mut remote), None);

        let pushed = sensitivities(&mut sink);
        assert_eq!(pushed.len(), 1);
        assert!((pushed[0] - 10.0).abs() < 1e-6);
    }

    #[test]
    fn remote_failures_do_not_block_transition() {
        let mut sink = UnreachableSink::default();
        let camera = FixedCamera::default();
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, ["pad:0"]);

        assert_eq!(
            det.handle(&arrow(now), &mut remote),
            Some(InputDevice::Keyboard)
        );
        assert_eq!(det.active_device(), InputDevice::Keyboard);
        assert!(det.watchers().arrow_keys().is_none());

        assert_eq!(
            det.handle(&click(now), &mut remote),
            Some(InputDevice::Mouse)
        );
        assert!(det.watchers().gamepad_poll().is_some());
        assert_eq!(sink.calls, vec!["set", "assign", "set", "assign"]);
    }

    #[test]
    fn stick_motion_on_keyboard_needs_a_click_first() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let mut pads = CountingPads {
            axes: vec![0.9],
            ..Default::default()
        };
        let t0 = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(t0, ["pad:0"]);
        det.handle(&arrow(t0), &mut remote);

        let t1 = t0 + Duration::from_millis(200);
        assert_eq!(det.tick(t1, &mut pads, &mut remote), None);
        assert_eq!(det.active_device(), InputDevice::Keyboard);
        assert_eq!(pads.reads, 0);

        // Gamepad connects while on Keyboard: still not polled.
        let connect = InputEvent::new(t1, InputKind::GamepadConnected { id: "pad:1".into() });
        det.handle(&connect, &mut remote);
        assert!(det.watchers().gamepad_poll().is_none());

        det.handle(&click(t1), &mut remote);
        let t2 = t1 + Duration::from_millis(100);
        assert_eq!(
            det.tick(t2, &mut pads, &mut remote),
            Some(InputDevice::Gamepad)
        );
    }

    #[test]
    fn rearming_replaces_watchers() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, ["pad:0"]);

        let mut polls = vec![det.watchers().gamepad_poll().map(PollTimer::id)];
        let mut subs = vec![det.watchers().arrow_keys().map(Subscription::id)];
        for _ in 0..5 {
            det.handle(&arrow(now), &mut remote);
            assert!(det.watchers().gamepad_poll().is_none());
            assert!(det.watchers().arrow_keys().is_none());

            det.handle(&click(now), &mut remote);
            polls.push(det.watchers().gamepad_poll().map(PollTimer::id));
            subs.push(det.watchers().arrow_keys().map(Subscription::id));
        }

        // Every re-arm replaced the single handle of its kind with a fresh one.
        for ids in [&polls, &subs] {
            assert!(ids.iter().all(Option::is_some));
            let mut unique = ids.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), ids.len());
        }
    }

    #[test]
    fn disconnecting_last_gamepad_stops_polling() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let mut pads = CountingPads::default();
        let t0 = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(t0, Vec::<String>::new());

        let connect = InputEvent::new(t0, InputKind::GamepadConnected { id: "pad:0".into() });
        det.handle(&connect, &mut remote);
        assert!(det.watchers().gamepad_poll().is_some());

        let disconnect =
            InputEvent::new(t0, InputKind::GamepadDisconnected { id: "pad:0".into() });
        det.handle(&disconnect, &mut remote);
        assert!(det.watchers().gamepad_poll().is_none());

        for step in 1..10 {
            det.tick(t0 + Duration::from_millis(100 * step), &mut pads, &mut remote);
        }
        assert_eq!(pads.reads, 0);
    }

    #[test]
    fn second_gamepad_keeps_single_poll() {
        let (mut sink, camera) = (QueuedSink::new(), FixedCamera::default());
        let mut remote = Remote {
            sink: &mut sink,
            camera: &camera,
        };
        let now = Instant::now();
        let mut det = DeviceDetector::new(&config());
        det.start(now, ["pad:0"]);
        let poll = det.watchers().gamepad_poll().map(PollTimer::id);

        let connect = InputEvent::new(now, InputKind::GamepadConnected { id: "pad:1".into() });
        det.handle(&connect, &mut remote);
        assert_eq!(det.watchers().gamepad_poll().map(PollTimer::id), poll);

        let disconnect =
            InputEvent::new(now, InputKind::GamepadDisconnected { id: "pad:0".into() });
        det.handle(&disconnect, &mut remote);
        assert!(det.watchers().gamepad_poll().is_some());
        assert_eq!(det.connected_gamepads().collect::<Vec<_>>(), vec!["pad:1"]);
    }
}
