//! Error types.
//!
//! Nothing in this crate is fatal at runtime: remote pushes, pointer-lock
//! requests and layout lookups degrade by logging and keeping the previous
//! state. The typed errors below exist so callers (and tests) can see *why*
//! something was skipped, and for the fallible setup paths (config and
//! binding-profile loading).

use std::path::PathBuf;
use thiserror::Error;

/// Crate-level error for setup and persistence paths.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Key(#[from] KeyParseError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to edit the action map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("action `{action}` has no slot {index} ({len} slots)")]
    SlotOutOfRange {
        action: String,
        index: usize,
        len: usize,
    },

    #[error("refusing to bind `{0}` to an empty key list")]
    EmptyCombo(String),
}

/// Failure to parse an `ActionKey` from its `KEY_<token>` form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("action key `{0}` is missing the KEY_ prefix")]
    MissingPrefix(String),

    #[error("action key `{0}` has an unrecognized token")]
    BadToken(String),
}

/// Failure reported by a remote collaborator. Always logged, never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("remote behavior `{0}` not found")]
    UnknownBehavior(String),

    #[error("remote session unavailable")]
    Disconnected,

    #[error("{0}")]
    Other(String),
}

/// Failure to acquire exclusive pointer capture.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointerLockError {
    /// The platform refuses to re-lock right after a lock was exited.
    #[error("pointer lock is cooling down")]
    Cooldown,

    #[error("pointer lock not supported")]
    Unsupported,
}
