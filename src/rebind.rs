//! Timed, cancelable key capture for rebinding an action slot.
//!
//! A capture runs as an explicit [`CaptureSession`] advanced by
//! [`KeyRebinder::on_key_down`] and [`KeyRebinder::tick`]:
//!
//! 1. [`KeyRebinder::start_capture`] opens the session with an outer deadline
//!    (`capture_timeout`, 5 minutes by default).
//! 2. Each key press pushes the normalized key into the session's combo
//!    (duplicates are ignored) and moves the deadline to `idle_window`
//!    (3 seconds) from now.
//! 3. When the deadline passes, a non-empty combo replaces the slot's binding
//!    and the whole map is propagated. An empty combo just closes the session.
//!
//! Escape, or [`KeyRebinder::cancel`], closes the session without touching the
//! binding table.

use crate::binding::{ActionMap, ActionSlot, KeyCombo};
use crate::config::Config;
use crate::event::KeyEvent;
use crate::keys::{ActionKey, KeyLabelResolver};
use crate::sink::ActionMapConsumer;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// In-progress rebind of one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSession {
    slot: ActionSlot,
    keys: KeyCombo,
    deadline: Instant,
}

impl CaptureSession {
    pub fn slot(&self) -> &ActionSlot {
        &self.slot
    }

    pub fn keys(&self) -> &KeyCombo {
        &self.keys
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

/// What a key press did to the capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStep {
    /// No capture in progress.
    Idle,
    /// Escape: session discarded.
    Cancelled,
    /// Key added; carries the refreshed live display.
    Added { key: ActionKey, display: String },
    /// Key already in the combo; only the idle window was restarted.
    Repeated { key: ActionKey },
}

/// How a capture session ended on its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The slot now holds `keys`; `display` is its new label.
    Committed {
        slot: ActionSlot,
        keys: KeyCombo,
        display: String,
    },
    /// Deadline passed with nothing pressed.
    Empty { slot: ActionSlot },
    /// The binding table rejected the slot; nothing changed.
    Rejected { slot: ActionSlot },
}

pub struct KeyRebinder {
    resolver: Box<dyn KeyLabelResolver>,
    capture_timeout: Duration,
    idle_window: Duration,
    session: Option<CaptureSession>,
}

impl KeyRebinder {
    pub fn new(config: &Config, resolver: Box<dyn KeyLabelResolver>) -> Self {
        Self {
            resolver,
            capture_timeout: config.capture_timeout(),
            idle_window: config.idle_window(),
            session: None,
        }
    }

    pub fn resolver(&self) -> &dyn KeyLabelResolver {
        self.resolver.as_ref()
    }

    /// `true` while the capture modal should be shown.
    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Live label of the keys accumulated so far (empty when idle).
    pub fn live_display(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.keys.display(self.resolver.as_ref()))
            .unwrap_or_default()
    }

    /// Opens a capture for `slot`, discarding any capture already running.
    pub fn start_capture(&mut self, slot: ActionSlot, now: Instant) {
        if let Some(previous) = self.session.take() {
            debug!(slot = %previous.slot, "replacing unfinished capture");
        }
        debug!(%slot, "capture started");
        self.session = Some(CaptureSession {
            slot,
            keys: KeyCombo::new(),
            deadline: now + self.capture_timeout,
        });
    }

    /// Explicit cancel control. Never mutates bindings.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!(slot = %session.slot, "capture cancelled");
                true
            }
            None => false,
        }
    }

    pub fn on_key_down(&mut self, event: &KeyEvent, now: Instant) -> CaptureStep {
        if self.session.is_none() {
            return CaptureStep::Idle;
        }
        if event.is_escape() {
            self.cancel();
            return CaptureStep::Cancelled;
        }

        let key = ActionKey::from_event(event);
        let idle_window = self.idle_window;
        let Some(session) = self.session.as_mut() else {
            return CaptureStep::Idle;
        };
        session.deadline = now + idle_window;

        if session.keys.push(key) {
            let label = session.keys.display(self.resolver.as_ref());
            debug!(%key, %label, "captured key");
            CaptureStep::Added {
                key,
                display: label,
            }
        } else {
            CaptureStep::Repeated { key }
        }
    }

    /// Closes the session if its deadline has passed, committing non-empty
    /// combos into `map` and propagating the result.
    pub fn tick(
        &mut self,
        now: Instant,
        map: &mut ActionMap,
        consumer: &mut dyn ActionMapConsumer,
    ) -> Option<CaptureOutcome> {
        if now < self.session.as_ref()?.deadline {
            return None;
        }
        let CaptureSession { slot, keys, .. } = self.session.take()?;

        if keys.is_empty() {
            debug!(%slot, "capture closed with no keys");
            return Some(CaptureOutcome::Empty { slot });
        }

        if let Err(err) = map.replace(&slot, keys.clone()) {
            warn!(%err, "keeping previous binding");
            return Some(CaptureOutcome::Rejected { slot });
        }

        let label = keys.display(self.resolver.as_ref());
        info!(%slot, %label, "binding updated");

        if let Err(err) = consumer.propagate(map) {
            warn!(%err, "failed to propagate action map");
        }

        Some(CaptureOutcome::Committed {
            slot,
            keys,
            display: label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::keys::LayoutAgnosticResolver;
    use crate::sink::{QueuedSink, RemoteCommand};

    #[derive(Default)]
    struct OfflineConsumer {
        attempts: usize,
    }

    impl ActionMapConsumer for OfflineConsumer {
        fn propagate(&mut self, _map: &ActionMap) -> Result<(), SinkError> {
            self.attempts += 1;
            Err(SinkError::Other("session closed".into()))
        }
    }

    fn rebinder() -> KeyRebinder {
        KeyRebinder::new(&Config::default(), Box::new(LayoutAgnosticResolver))
    }

    fn map() -> ActionMap {
        let mut map = ActionMap::new();
        map.insert(
            "MOVE_FORWARD",
            vec![vec!["KEY_Z".parse::<ActionKey>().unwrap()].into()],
        );
        map
    }

    #[test]
    fn keys_outside_capture_are_ignored() {
        let mut r = rebinder();
        assert_eq!(r.on_key_down(&KeyEvent::letter('w'), Instant::now()), CaptureStep::Idle);
        assert!(!r.is_capturing());
    }

    #[test]
    fn repeated_key_is_kept_once() {
        let mut r = rebinder();
        let t0 = Instant::now();
        r.start_capture(ActionSlot::new("MOVE_FORWARD", 0), t0);

        assert!(matches!(
            r.on_key_down(&KeyEvent::letter('w'), t0),
            CaptureStep::Added { .. }
        ));
        assert!(matches!(
            r.on_key_down(&KeyEvent::letter('w'), t0),
            CaptureStep::Repeated { .. }
        ));
        assert_eq!(r.session().unwrap().keys().len(), 1);
        assert_eq!(r.live_display(), "W");
    }

    #[test]
    fn idle_window_restarts_on_each_key() {
        let mut r = rebinder();
        let (mut m, mut sink) = (map(), QueuedSink::new());
        let t0 = Instant::now();
        r.start_capture(ActionSlot::new("MOVE_FORWARD", 0), t0);
        assert_eq!(
            r.session().unwrap().deadline(),
            t0 + Duration::from_secs(300)
        );

        r.on_key_down(&KeyEvent::letter('w'), t0);
        let t1 = t0 + Duration::from_secs(2);
        r.on_key_down(&KeyEvent::new("Shift", Some("ShiftLeft"), 16), t1);
        assert_eq!(r.live_display(), "W + SHIFT");

        // 4s after the first key but only 2s after the second.
        assert_eq!(r.tick(t0 + Duration::from_secs(4), &mut m, &mut sink), None);
        assert!(r.is_capturing());

        let outcome = r.tick(t1 + Duration::from_secs(3), &mut m, &mut sink);
        assert!(matches!(outcome, Some(CaptureOutcome::Committed { .. })));
        assert!(!r.is_capturing());
    }

    #[test]
    fn commit_replaces_slot_and_propagates() {
        let mut r = rebinder();
        let (mut m, mut sink) = (map(), QueuedSink::new());
        let t0 = Instant::now();
        let slot = ActionSlot::new("MOVE_FORWARD", 0);
        r.start_capture(slot.clone(), t0);
        r.on_key_down(&KeyEvent::letter('w'), t0);
        r.on_key_down(&KeyEvent::letter('w'), t0);

        let outcome = r
            .tick(t0 + Duration::from_secs(3), &mut m, &mut sink)
            .unwrap();
        let expected: KeyCombo = vec!["KEY_W".parse::<ActionKey>().unwrap()].into();
        assert_eq!(
            outcome,
            CaptureOutcome::Committed {
                slot: slot.clone(),
                keys: expected.clone(),
                display: "W".into(),
            }
        );
        assert_eq!(m.get(&slot), Some(&expected));
        assert_eq!(
            sink.drain(),
            vec![RemoteCommand::PropagateActionMap { actions: m.clone() }]
        );
    }

    #[test]
    fn commit_survives_failed_propagation() {
        let mut r = rebinder();
        let (mut m, mut consumer) = (map(), OfflineConsumer::default());
        let t0 = Instant::now();
        let slot = ActionSlot::new("MOVE_FORWARD", 0);
        r.start_capture(slot.clone(), t0);
        r.on_key_down(&KeyEvent::letter('w'), t0);

        let outcome = r.tick(t0 + Duration::from_secs(3), &mut m, &mut consumer);
        assert!(matches!(outcome, Some(CaptureOutcome::Committed { .. })));
        assert_eq!(consumer.attempts, 1);
        let expected: KeyCombo = vec!["KEY_W".parse::<ActionKey>().unwrap()].into();
        assert_eq!(m.get(&slot), Some(&expected));
        assert!(!r.is_capturing());
    }

    #[test]
    fn escape_discards_without_mutation() {
        let mut r = rebinder();
        let (mut m, mut sink) = (map(), QueuedSink::new());
        let before = m.clone();
        let t0 = Instant::now();
        r.start_capture(ActionSlot::new("MOVE_FORWARD", 0), t0);
        r.on_key_down(&KeyEvent::letter('w'), t0);
        assert_eq!(r.on_key_down(&KeyEvent::escape(), t0), CaptureStep::Cancelled);
        assert!(!r.is_capturing());

        assert_eq!(r.tick(t0 + Duration::from_secs(600), &mut m, &mut sink), None);
        assert_eq!(m, before);
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_capture_times_out_without_mutation() {
        let mut r = rebinder();
        let (mut m, mut sink) = (map(), QueuedSink::new());
        let before = m.clone();
        let t0 = Instant::now();
        let slot = ActionSlot::new("MOVE_FORWARD", 0);
        r.start_capture(slot.clone(), t0);

        assert_eq!(r.tick(t0 + Duration::from_secs(299), &mut m, &mut sink), None);
        assert_eq!(
            r.tick(t0 + Duration::from_secs(300), &mut m, &mut sink),
            Some(CaptureOutcome::Empty { slot })
        );
        assert_eq!(m, before);
        assert!(sink.is_empty());
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let mut r = rebinder();
        let (mut m, mut sink) = (map(), QueuedSink::new());
        let t0 = Instant::now();
        let slot = ActionSlot::new("MOVE_FORWARD", 4);
        r.start_capture(slot.clone(), t0);
        r.on_key_down(&KeyEvent::letter('a'), t0);
        assert_eq!(
            r.tick(t0 + Duration::from_secs(3), &mut m, &mut sink),
            Some(CaptureOutcome::Rejected { slot })
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn explicit_cancel() {
        let mut r = rebinder();
        assert!(!r.cancel());
        r.start_capture(ActionSlot::new("MOVE_FORWARD", 0), Instant::now());
        assert!(r.cancel());
        assert_eq!(r.live_display(), "");
    }
}
