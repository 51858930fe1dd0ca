//! Action bindings: named actions mapped to physical key combos.
use crate::error::{BindingError, Result};
use crate::keys::{format_keys, ActionKey, KeyLabelResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Identifies one alternative binding of an action (`MOVE_FORWARD`, slot 0).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionSlot {
    pub action: String,
    pub index: usize,
}

impl ActionSlot {
    pub fn new(action: impl Into<String>, index: usize) -> Self {
        Self {
            action: action.into(),
            index,
        }
    }
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.action, self.index)
    }
}

/// Ordered set of keys pressed together for one slot.
///
/// Keys are unique; order is entry order and only matters for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ActionKey>", into = "Vec<ActionKey>")]
pub struct KeyCombo(Vec<ActionKey>);

impl KeyCombo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `key` unless already present. Returns whether it was added.
    pub fn push(&mut self, key: ActionKey) -> bool {
        if self.0.contains(&key) {
            return false;
        }
        self.0.push(key);
        true
    }

    pub fn contains(&self, key: &ActionKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionKey> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ActionKey] {
        &self.0
    }

    /// Labels joined by `" + "`.
    pub fn display(&self, resolver: &dyn KeyLabelResolver) -> String {
        format_keys(&self.0, resolver)
    }
}

impl FromIterator<ActionKey> for KeyCombo {
    fn from_iter<T: IntoIterator<Item = ActionKey>>(iter: T) -> Self {
        let mut combo = KeyCombo::new();
        for key in iter {
            combo.push(key);
        }
        combo
    }
}

impl From<Vec<ActionKey>> for KeyCombo {
    fn from(keys: Vec<ActionKey>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<KeyCombo> for Vec<ActionKey> {
    fn from(combo: KeyCombo) -> Self {
        combo.0
    }
}

/// In-memory binding table: action name to its slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionMap {
    values: BTreeMap<String, Vec<KeyCombo>>,
}

impl ActionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the full slot list of `action`, creating it if needed.
    pub fn insert(&mut self, action: impl Into<String>, slots: Vec<KeyCombo>) {
        self.values.insert(action.into(), slots);
    }

    pub fn get(&self, slot: &ActionSlot) -> Option<&KeyCombo> {
        self.values.get(&slot.action)?.get(slot.index)
    }

    pub fn slots(&self, action: &str) -> Option<&[KeyCombo]> {
        self.values.get(action).map(Vec::as_slice)
    }

    /// Replaces the keys bound to an existing slot.
    ///
    /// On error the map is left untouched.
    pub fn replace(&mut self, slot: &ActionSlot, combo: KeyCombo) -> std::result::Result<(), BindingError> {
        if combo.is_empty() {
            return Err(BindingError::EmptyCombo(slot.to_string()));
        }
        let slots = self
            .values
            .get_mut(&slot.action)
            .ok_or_else(|| BindingError::UnknownAction(slot.action.clone()))?;
        let len = slots.len();
        let target = slots
            .get_mut(slot.index)
            .ok_or_else(|| BindingError::SlotOutOfRange {
                action: slot.action.clone(),
                index: slot.index,
                len,
            })?;
        *target = combo;
        Ok(())
    }

    /// Iterates every `(slot, combo)` pair in action-name order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionSlot, &KeyCombo)> {
        self.values.iter().flat_map(|(action, slots)| {
            slots
                .iter()
                .enumerate()
                .map(move |(index, combo)| (ActionSlot::new(action.clone(), index), combo))
        })
    }

    /// Label of every slot, for populating a key-settings panel.
    pub fn describe(&self, resolver: &dyn KeyLabelResolver) -> Vec<(ActionSlot, String)> {
        self.iter()
            .map(|(slot, combo)| (slot, combo.display(resolver)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Serializable profile of action bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingProfile {
    pub name: String,
    pub description: Option<String>,
    pub actions: ActionMap,
}

impl BindingProfile {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a profile, picking the format from the file extension
    /// (`.json`, anything else is TOML).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| crate::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_toml_str(&text),
        }
    }
}
