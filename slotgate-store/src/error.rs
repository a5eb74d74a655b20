//! Error types for the store crate.

use slotgate_core::{CommandName, Slot};

/// Errors raised while reaching or talking to the backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A connection for the slot could not be established.
    #[error("cannot connect to backend for slot {slot}: {reason}")]
    Connect { slot: Slot, reason: String },

    /// The backend rejected a command. The text is the backend's own.
    #[error("{0}")]
    Backend(String),

    /// The backend answered with a reply the command cannot produce.
    #[error("unexpected reply to {command}: {reason}")]
    UnexpectedReply { command: CommandName, reason: String },

    /// Error reported by the Redis client.
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
