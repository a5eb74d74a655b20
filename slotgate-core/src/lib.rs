//! Core types for the slotgate command gateway.
//!
//! Defines the validated slot index, the closed command whitelist, command
//! descriptors, the staging pipeline for atomic batches, and backend replies.
//! Nothing in this crate performs I/O.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod command;
pub mod error;
pub mod reply;
pub mod slot;

pub use command::{Command, CommandName, Pipeline, RangeMode};
pub use error::CoreError;
pub use reply::Reply;
pub use slot::{Slot, SLOT_COUNT};
