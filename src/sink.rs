//! Remote collaborators.
//!
//! The remote simulation exposes a handful of fire-and-forget calls: write
//! named inputs onto a behavior, (re)attach the local client to the
//! character's behaviors, toggle whether client inputs are forwarded at all,
//! and push a new action map. Nothing here waits for an acknowledgement.
//! Implementations must return promptly; an `Err` is logged by the caller and
//! otherwise ignored.

use crate::binding::ActionMap;
use crate::error::SinkError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Named inputs written onto a remote behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptInputs {
    pub sensitivity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
}

impl ScriptInputs {
    pub fn sensitivity(value: f32) -> Self {
        Self {
            sensitivity: value,
            pitch: None,
            yaw: None,
        }
    }
}

pub trait RemoteParameterSink {
    fn set_script_input_values(
        &mut self,
        behavior_id: &str,
        inputs: &ScriptInputs,
    ) -> Result<(), SinkError>;

    /// Rebinds local input capture to the character's behaviors so freshly
    /// written inputs take effect.
    fn assign_client_to_scripts(&mut self) -> Result<(), SinkError>;

    fn set_inputs_enabled(&mut self, enabled: bool) -> Result<(), SinkError>;
}

/// Receives the binding table after a rebind is committed.
pub trait ActionMapConsumer {
    fn propagate(&mut self, map: &ActionMap) -> Result<(), SinkError>;
}

/// Command recorded by [`QueuedSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RemoteCommand {
    SetScriptInputs {
        behavior_id: String,
        inputs: ScriptInputs,
    },
    AssignClientToScripts,
    SetInputsEnabled {
        enabled: bool,
    },
    PropagateActionMap {
        actions: ActionMap,
    },
}

/// Outbox implementation of both remote traits.
///
/// Calls are queued and returned by [`QueuedSink::drain`]; the host forwards
/// them to the real service on its own schedule. Queueing never fails.
#[derive(Debug, Default)]
pub struct QueuedSink {
    outbox: VecDeque<RemoteCommand>,
}

impl QueuedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.outbox.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outbox.is_empty()
    }

    pub fn drain(&mut self) -> Vec<RemoteCommand> {
        self.outbox.drain(..).collect()
    }

    /// Drains the outbox as newline-delimited JSON.
    pub fn drain_json(&mut self) -> crate::Result<Vec<String>> {
        self.drain()
            .iter()
            .map(|cmd| serde_json::to_string(cmd).map_err(Into::into))
            .collect()
    }

    fn push(&mut self, cmd: RemoteCommand) {
        tracing::trace!(?cmd, "queued remote command");
        self.outbox.push_back(cmd);
    }
}

impl RemoteParameterSink for QueuedSink {
    fn set_script_input_values(
        &mut self,
        behavior_id: &str,
        inputs: &ScriptInputs,
    ) -> Result<(), SinkError> {
        self.push(RemoteCommand::SetScriptInputs {
            behavior_id: behavior_id.to_string(),
            inputs: *inputs,
        });
        Ok(())
    }

    fn assign_client_to_scripts(&mut self) -> Result<(), SinkError> {
        self.push(RemoteCommand::AssignClientToScripts);
        Ok(())
    }

    fn set_inputs_enabled(&mut self, enabled: bool) -> Result<(), SinkError> {
        self.push(RemoteCommand::SetInputsEnabled { enabled });
        Ok(())
    }
}

impl ActionMapConsumer for QueuedSink {
    fn propagate(&mut self, map: &ActionMap) -> Result<(), SinkError> {
        self.push(RemoteCommand::PropagateActionMap {
            actions: map.clone(),
        });
        Ok(())
    }
}
