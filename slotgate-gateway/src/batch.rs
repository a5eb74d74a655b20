//! Atomic batch execution for JSON requests.
//!
//! Commands are staged into one [`Pipeline`] without touching the backend,
//! then sent together as a single transaction. Entries whose `cmd` is not
//! whitelisted are skipped rather than rejected, unlike the single-command
//! path, and callers must not rely on unknown entries being reported.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use slotgate_core::{CoreError, Pipeline, Reply, Slot};
use slotgate_store::SlotPool;

use crate::{error::GatewayError, registry::Registry};

/// The `db` field: an integer or a string holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SlotToken {
    Number(i64),
    Text(String),
}

impl SlotToken {
    /// Resolve to a validated slot.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSlot`] or [`CoreError::SlotOutOfRange`].
    pub fn resolve(&self) -> Result<Slot, CoreError> {
        match self {
            SlotToken::Number(n) => Slot::new(*n),
            SlotToken::Text(s) => Slot::parse(s),
        }
    }
}

/// One `{ "cmd": ..., "args": {...} }` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEntry {
    pub cmd: String,
    #[serde(default)]
    pub args: Value,
}

/// A batch request body.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub db: SlotToken,
    pub cmds: Vec<BatchEntry>,
}

/// Stages and runs ordered command batches against one slot.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    pool: Arc<SlotPool>,
    registry: Arc<Registry>,
}

impl BatchExecutor {
    #[must_use]
    pub fn new(pool: Arc<SlotPool>, registry: Arc<Registry>) -> Self {
        Self { pool, registry }
    }

    /// Decode a JSON body and execute it.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidRequest`] if the body is not a valid
    /// batch request; otherwise as [`BatchExecutor::execute`].
    pub async fn execute_body(&self, body: &[u8]) -> Result<Vec<Reply>, GatewayError> {
        let request: BatchRequest =
            serde_json::from_slice(body).map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        self.execute(request).await
    }

    /// Execute a batch. Replies are in the order the commands were staged.
    ///
    /// # Errors
    /// - [`GatewayError::InvalidRequest`] if the slot is invalid (for any
    ///   reason, including out of range) or an entry's arguments are invalid.
    /// - [`GatewayError::Store`] if the backend is unreachable or the
    ///   transaction fails. No partial replies are returned.
    pub async fn execute(&self, request: BatchRequest) -> Result<Vec<Reply>, GatewayError> {
        let slot = request
            .db
            .resolve()
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;

        let mut pipeline = Pipeline::new();
        for (position, entry) in request.cmds.into_iter().enumerate() {
            match self.registry.lookup_batch(&entry.cmd) {
                Some(handler) => pipeline.stage(handler.parse_batch(entry.args)?),
                None => tracing::debug!(%slot, position, cmd = %entry.cmd, "skipping unknown batch command"),
            }
        }

        if pipeline.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(%slot, staged = pipeline.len(), "executing batch");
        let conn = self.pool.connection(slot).await?;
        let replies = conn.execute_atomic(&pipeline).await.inspect_err(|e| {
            tracing::warn!(%slot, staged = pipeline.len(), error = %e, "batch failed");
        })?;
        Ok(replies)
    }
}
