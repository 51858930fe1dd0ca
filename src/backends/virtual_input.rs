use crate::device::{GamepadSource, GamepadState};
use crate::event::{InputEvent, InputKind};
use std::collections::BTreeMap;
use std::time::Instant;

/// In-memory gamepads.
///
/// Hosts with their own controller plumbing can mirror it here; tests and
/// demos use it to script stick motion. Connecting and disconnecting return
/// the matching [`InputEvent`] so it can be fed straight into the pipeline.
#[derive(Debug, Default)]
pub struct VirtualGamepads {
    pads: BTreeMap<String, GamepadState>,
}

impl VirtualGamepads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, id: &str, name: &str, axes: usize, at: Instant) -> InputEvent {
        self.pads.insert(
            id.to_string(),
            GamepadState {
                id: id.to_string(),
                name: name.to_string(),
                axes: vec![0.0; axes],
            },
        );
        InputEvent::new(at, InputKind::GamepadConnected { id: id.to_string() })
    }

    pub fn disconnect(&mut self, id: &str, at: Instant) -> Option<InputEvent> {
        self.pads
            .remove(id)
            .map(|_| InputEvent::new(at, InputKind::GamepadDisconnected { id: id.to_string() }))
    }

    /// Sets an axis value; out-of-range axes and unknown pads are ignored.
    pub fn set_axis(&mut self, id: &str, axis: usize, value: f32) {
        if let Some(slot) = self.pads.get_mut(id).and_then(|p| p.axes.get_mut(axis)) {
            *slot = value.clamp(-1.0, 1.0);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.pads.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }
}

impl GamepadSource for VirtualGamepads {
    fn gamepads(&mut self) -> Vec<GamepadState> {
        self.pads.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_set_disconnect() {
        let now = Instant::now();
        let mut pads = VirtualGamepads::new();
        let ev = pads.connect("pad:0", "Virtual Pad", 4, now);
        assert_eq!(ev.kind, InputKind::GamepadConnected { id: "pad:0".into() });

        pads.set_axis("pad:0", 1, -3.0);
        pads.set_axis("pad:0", 9, 1.0);
        pads.set_axis("pad:9", 0, 1.0);
        let state = pads.gamepads();
        assert_eq!(state[0].axes, vec![0.0, -1.0, 0.0, 0.0]);

        assert!(pads.disconnect("pad:0", now).is_some());
        assert!(pads.disconnect("pad:0", now).is_none());
        assert!(pads.is_empty());
    }
}
