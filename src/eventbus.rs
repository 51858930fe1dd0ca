use crate::event::InputEvent;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Trait for reacting to input events.
pub trait InputListener {
    fn on_input(&mut self, event: &InputEvent);
}

/// Shared listeners: the bus dispatches while the owner keeps a handle to
/// query state between events.
impl<L: InputListener + ?Sized> InputListener for Rc<RefCell<L>> {
    fn on_input(&mut self, event: &InputEvent) {
        self.borrow_mut().on_input(event);
    }
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    KeysOnly,
    PointerOnly,
    GamepadOnly,
    Custom(fn(&InputEvent) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &InputEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::KeysOnly => event.is_key(),
            EventFilter::PointerOnly => event.is_pointer(),
            EventFilter::GamepadOnly => event.is_gamepad(),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Handle returned by [`InputEventBus::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
}

/// Dispatches events to listeners in registration order.
#[derive(Default)]
pub struct InputEventBus {
    next_id: u64,
    listeners: BTreeMap<ListenerId, ListenerEntry>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
            },
        );
        tracing::trace!(?id, ?filter, "listener added");
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one event to all active and matching listeners.
    pub fn emit(&mut self, event: &InputEvent) {
        for entry in self.listeners.values_mut() {
            if entry.enabled && entry.filter.accepts(event) {
                entry.listener.on_input(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[InputEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
