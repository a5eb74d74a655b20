//! Single-command execution for the slash-delimited wire form.
//!
//! A request body looks like `"<slot>/<COMMAND>/<arg>/<arg>/..."`. There is
//! no escaping, so a key or member containing `/` cannot be expressed.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use slotgate_core::{CommandName, CoreError, Reply, Slot};
use slotgate_store::SlotPool;

use crate::{error::GatewayError, registry::Registry};

/// Successful single-command result, serialized as `{"<COMMAND>": <reply>}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleReply {
    pub command: CommandName,
    pub reply: Reply,
}

impl Serialize for SingleReply {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.command.wire_token(), &self.reply)?;
        map.end()
    }
}

/// Validates and runs one command against its slot.
///
/// Validation happens in full before the pool is touched, so a rejected
/// request never opens or uses a backend connection.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    pool: Arc<SlotPool>,
    registry: Arc<Registry>,
}

impl CommandExecutor {
    #[must_use]
    pub fn new(pool: Arc<SlotPool>, registry: Arc<Registry>) -> Self {
        Self { pool, registry }
    }

    /// Execute a raw wire-form request body.
    ///
    /// # Errors
    /// - [`GatewayError::InvalidRequest`] if the body is not ASCII, the slot is
    ///   not an integer, the command token is missing, or the arguments do
    ///   not fit the command.
    /// - [`GatewayError::SlotOutOfRange`] if the slot is outside `[0, 16)`.
    /// - [`GatewayError::UnknownCommand`] if the command is not whitelisted.
    /// - [`GatewayError::Store`] if the backend is unreachable or rejects the
    ///   command.
    pub async fn execute(&self, body: &[u8]) -> Result<SingleReply, GatewayError> {
        if !body.is_ascii() {
            return Err(GatewayError::InvalidRequest("request body must be ASCII".to_owned()));
        }
        let text = std::str::from_utf8(body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let mut tokens = text.split('/');
        let slot = Slot::parse(tokens.next().unwrap_or_default())?;
        let command_token = tokens.next().ok_or(CoreError::MissingCommand)?;
        let handler = self
            .registry
            .lookup_wire(command_token)
            .ok_or_else(|| GatewayError::UnknownCommand(command_token.to_owned()))?;
        let args: Vec<&str> = tokens.collect();
        let command = handler.parse_wire(&args)?;

        tracing::debug!(%slot, command = %handler.name(), args = args.len(), "dispatching command");
        let conn = self.pool.connection(slot).await?;
        let reply = conn.execute(&command).await.inspect_err(|e| {
            tracing::warn!(%slot, command = %handler.name(), error = %e, "command failed");
        })?;

        Ok(SingleReply {
            command: handler.name(),
            reply,
        })
    }
}
