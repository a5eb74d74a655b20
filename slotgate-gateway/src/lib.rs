//! HTTP command gateway in front of a 16-slot key-value store.
//!
//! Authenticates callers with HTTP Basic, then forwards a whitelisted set of
//! commands to one slot, either singly or as an atomic batch.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod routes;
