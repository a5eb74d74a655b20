//! Per-slot connection pool.
//!
//! One lazily opened connection per slot, shared by every request that
//! targets the slot for the rest of the process lifetime.

use std::fmt;
use std::sync::Arc;

use slotgate_core::{Slot, SLOT_COUNT};
use tokio::sync::OnceCell;

use crate::{Connector, SlotConnection, StoreError};

/// Owns the connection for each of the 16 slots.
///
/// All 16 cells exist from construction. A cell is filled on the first
/// request for its slot; concurrent first requests open a single connection.
/// A failed open leaves the cell empty and is not retried in the background.
/// Dropping the pool closes every open connection.
pub struct SlotPool {
    connector: Arc<dyn Connector>,
    slots: [OnceCell<Arc<dyn SlotConnection>>; SLOT_COUNT],
}

impl SlotPool {
    /// Create a pool with every slot unopened.
    #[must_use]
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slots: std::array::from_fn(|_| OnceCell::new()),
        }
    }

    /// Return the connection for `slot`, opening it on first use.
    ///
    /// # Errors
    /// Returns [`StoreError::Connect`] if the connection cannot be opened.
    pub async fn connection(&self, slot: Slot) -> Result<Arc<dyn SlotConnection>, StoreError> {
        let cell = &self.slots[slot.index()];
        let conn = cell
            .get_or_try_init(|| async {
                let conn = self.connector.connect(slot).await.inspect_err(|e| {
                    tracing::warn!(%slot, error = %e, "backend connection failed");
                })?;
                tracing::info!(%slot, "backend connection established");
                Ok::<_, StoreError>(conn)
            })
            .await?;
        Ok(Arc::clone(conn))
    }

    /// Slots whose connection has been opened, in ascending order.
    #[must_use]
    pub fn connected_slots(&self) -> Vec<Slot> {
        Slot::all()
            .filter(|slot| self.slots[slot.index()].initialized())
            .collect()
    }
}

impl fmt::Debug for SlotPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotPool")
            .field("connected_slots", &self.connected_slots())
            .finish_non_exhaustive()
    }
}
