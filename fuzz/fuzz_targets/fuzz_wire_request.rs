//! Fuzz target: validation of slash-delimited single-command bodies.
//!
//! Runs the same slot parsing, whitelist lookup and argument checks the
//! single-command executor performs before it touches the backend.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slotgate_core::{CoreError, Slot};
use slotgate_gateway::registry::Registry;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let registry = Registry::new();
    let mut tokens = text.split('/');

    let slot = match Slot::parse(tokens.next().unwrap_or_default()) {
        Ok(slot) => slot,
        Err(CoreError::InvalidSlot { .. } | CoreError::SlotOutOfRange { .. }) => return,
        Err(other) => panic!("slot parsing produced unexpected error: {other:?}"),
    };
    assert!(slot.index() < 16, "parsed slot must be in range");

    let Some(handler) = tokens.next().and_then(|t| registry.lookup_wire(t)) else {
        return;
    };
    let args: Vec<&str> = tokens.collect();
    if let Ok(command) = handler.parse_wire(&args) {
        assert_eq!(command.name(), handler.name());
        assert_eq!(command.key(), args[0], "the key is always the first argument");
    }
});
