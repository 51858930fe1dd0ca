//! Layout-agnostic key identifiers and their human-readable labels.
//!
//! An [`ActionKey`] names a *physical* key, independent of the user's keyboard
//! layout, and is written `KEY_<token>`:
//! - letter keys use their physical letter: pressing the key at the QWERTY `W`
//!   position gives `KEY_W` even on AZERTY, where it types `z`;
//! - every other key uses its raw numeric key code: Space is `KEY_32`.
//!
//! Numeric codes `65..=90` are the letter keys, so `KEY_87` parses to the same
//! value as `KEY_W`.
//!
//! Labels go the other way, for display: special keys come from a fixed
//! table, digits render as themselves, and letters are asked of a
//! [`KeyLabelResolver`] so that the user sees what their layout prints on the
//! keycap.

use crate::error::KeyParseError;
use crate::event::KeyEvent;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Placeholder label when the layout has no mapping for a key.
pub const UNKNOWN_KEY: &str = "Unknown Key";

const PREFIX: &str = "KEY_";

/// Non-printable keys with fixed labels, by raw key code.
const SPECIAL_KEYS: &[(u32, &str)] = &[
    (32, "SPACE"),
    (13, "ENTER"),
    (8, "BACKSPACE"),
    (9, "TAB"),
    (16, "SHIFT"),
    (17, "CTRL"),
    (18, "ALT"),
    (20, "CAPSLOCK"),
    (38, "ARROW UP"),
    (40, "ARROW DOWN"),
    (37, "ARROW LEFT"),
    (39, "ARROW RIGHT"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Token {
    /// Always an ASCII uppercase letter.
    Letter(char),
    Code(u32),
}

/// Physical key identifier used in bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActionKey(Token);

impl ActionKey {
    /// Letter key by physical letter. `None` for non-ASCII-letters.
    pub fn letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self(Token::Letter(c.to_ascii_uppercase())))
    }

    /// Key by raw key code; letter codes canonicalize to their letter form.
    pub fn from_code(code: u32) -> Self {
        match code {
            65..=90 => Self(Token::Letter(char::from(code as u8))),
            _ => Self(Token::Code(code)),
        }
    }

    /// Normalizes a key press to its layout-agnostic identity.
    ///
    /// The physical code wins over the logical key whenever it names a letter
    /// position. Without a usable code, the raw key code is used.
    pub fn from_event(event: &KeyEvent) -> Self {
        event
            .code
            .as_deref()
            .and_then(physical_letter)
            .and_then(Self::letter)
            .unwrap_or_else(|| Self::from_code(event.key_code))
    }

    /// Raw numeric key code (letters map back to `65..=90`).
    pub fn code(&self) -> u32 {
        match self.0 {
            Token::Letter(c) => c as u32,
            Token::Code(n) => n,
        }
    }

    /// Human-readable label for this key under `resolver`'s layout.
    pub fn label(&self, resolver: &dyn KeyLabelResolver) -> String {
        match self.0 {
            Token::Letter(c) => resolver
                .label(&format!("Key{c}"))
                .map(|s| s.to_uppercase())
                .unwrap_or_else(|| UNKNOWN_KEY.to_string()),
            Token::Code(n) => {
                if let Some((_, name)) = SPECIAL_KEYS.iter().find(|(code, _)| *code == n) {
                    return (*name).to_string();
                }
                match n {
                    48..=57 => (n - 48).to_string(),
                    _ => UNKNOWN_KEY.to_string(),
                }
            }
        }
    }
}

/// `"KeyW"` -> `'W'`. Anything else (`"Digit1"`, `"Space"`) -> `None`.
fn physical_letter(code: &str) -> Option<char> {
    let rest = code.strip_prefix("Key")?;
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Token::Letter(c) => write!(f, "{PREFIX}{c}"),
            Token::Code(n) => write!(f, "{PREFIX}{n}"),
        }
    }
}

impl FromStr for ActionKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| KeyParseError::MissingPrefix(s.to_string()))?;

        if let Ok(code) = token.parse::<u32>() {
            return Ok(Self::from_code(code));
        }

        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::letter(c).ok_or_else(|| KeyParseError::BadToken(s.to_string())),
            _ => Err(KeyParseError::BadToken(s.to_string())),
        }
    }
}

impl TryFrom<String> for ActionKey {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionKey> for String {
    fn from(key: ActionKey) -> Self {
        key.to_string()
    }
}

/// Renders keys as their labels joined by `" + "`, e.g. `"Z + SHIFT"`.
pub fn format_keys<'a>(
    keys: impl IntoIterator<Item = &'a ActionKey>,
    resolver: &dyn KeyLabelResolver,
) -> String {
    keys.into_iter()
        .map(|k| k.label(resolver))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Resolves a physical key code (`"KeyW"`) to the label the active keyboard
/// layout prints for it.
pub trait KeyLabelResolver {
    fn label(&self, physical_code: &str) -> Option<String>;
}

/// Layout-aware resolver backed by a platform layout map.
#[derive(Clone, Debug, Default)]
pub struct LayoutMapResolver {
    map: HashMap<String, String>,
}

impl LayoutMapResolver {
    pub fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl FromIterator<(String, String)> for LayoutMapResolver {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl KeyLabelResolver for LayoutMapResolver {
    fn label(&self, physical_code: &str) -> Option<String> {
        self.map.get(physical_code).cloned()
    }
}

/// Fallback for platforms without a layout facility: a letter key is
/// labelled with its physical letter.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutAgnosticResolver;

impl KeyLabelResolver for LayoutAgnosticResolver {
    fn label(&self, physical_code: &str) -> Option<String> {
        physical_letter(physical_code).map(String::from)
    }
}

/// Picks the resolver once, from whatever the platform layout lookup returned.
pub fn select_resolver(layout: Option<HashMap<String, String>>) -> Box<dyn KeyLabelResolver> {
    match layout {
        Some(map) => {
            tracing::debug!(entries = map.len(), "using keyboard layout map for key labels");
            Box::new(LayoutMapResolver::new(map))
        }
        None => {
            tracing::debug!("no keyboard layout facility, using physical key labels");
            Box::new(LayoutAgnosticResolver)
        }
    }
}
