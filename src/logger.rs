//! Logging setup and an event-tracing listener.
use crate::event::{InputEvent, InputKind};
use crate::eventbus::InputListener;
use tracing::Level;

/// Installs a `tracing-subscriber` fmt subscriber at `level`.
///
/// Returns `false` when a global subscriber was already set (e.g. by the
/// host application), in which case the existing one is kept.
pub fn init(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// A listener that traces every input event.
#[derive(Debug, Default)]
pub struct EventLogger {
    seen: u64,
}

impl EventLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl InputListener for EventLogger {
    fn on_input(&mut self, event: &InputEvent) {
        self.seen += 1;
        match &event.kind {
            InputKind::KeyPressed(key) => {
                tracing::trace!(key = %key.key, code = ?key.code, key_code = key.key_code, "key pressed");
            }
            other => tracing::trace!(event = ?other, "input"),
        }
    }
}
