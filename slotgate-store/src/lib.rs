//! Backend access for the slotgate command gateway.
//!
//! Owns the per-slot connection pool and the backends behind it: Redis for
//! production and an in-memory store for tests and local runs.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod pool;
pub mod redis_backend;

pub use backend::{Connector, SlotConnection};
pub use config::RedisConfig;
pub use error::StoreError;
pub use memory::MemoryConnector;
pub use pool::SlotPool;
pub use redis_backend::RedisConnector;
