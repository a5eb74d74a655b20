//! Backend abstraction traits.
//!
//! Allows swapping between Redis and the in-memory store without changing
//! the pool or the executors.

use std::sync::Arc;

use async_trait::async_trait;
use slotgate_core::{Command, Pipeline, Reply, Slot};

use crate::StoreError;

/// An open connection bound to one slot.
///
/// Implementations must tolerate concurrent calls from many requests; the
/// pool hands the same connection to every request targeting its slot.
#[async_trait]
pub trait SlotConnection: Send + Sync {
    /// Run one command and return its reply.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] or [`StoreError::Redis`] if the backend
    /// rejects the command or the connection fails.
    async fn execute(&self, command: &Command) -> Result<Reply, StoreError>;

    /// Run every staged command as one atomic unit, in one round trip.
    ///
    /// On success the replies match the staging order one to one. On failure
    /// no replies are returned.
    ///
    /// # Errors
    /// Same as [`SlotConnection::execute`], plus
    /// [`StoreError::UnexpectedReply`] if the reply count does not match.
    async fn execute_atomic(&self, pipeline: &Pipeline) -> Result<Vec<Reply>, StoreError>;
}

/// Opens connections for slots.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection bound to `slot`.
    ///
    /// # Errors
    /// Returns [`StoreError::Connect`] if the backend is unreachable or
    /// refuses the credentials.
    async fn connect(&self, slot: Slot) -> Result<Arc<dyn SlotConnection>, StoreError>;
}
