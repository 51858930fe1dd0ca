use crate::event::InputEvent;
use crate::eventbus::InputListener;

/// Wraps a listener and filters events based on a user-supplied predicate.
///
/// Useful when [`EventFilter`](crate::eventbus::EventFilter) is too coarse,
/// e.g. to only see presses of one key, or one gamepad's connect/disconnect.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&InputEvent) -> bool>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&InputEvent) -> bool + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &InputEvent) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}
