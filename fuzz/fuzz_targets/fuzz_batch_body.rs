//! Fuzz target: JSON batch bodies.
//!
//! Arbitrary bytes go through batch deserialization, slot resolution and
//! per-entry argument parsing. Errors are expected; panics are not.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slotgate_gateway::{batch::BatchRequest, registry::Registry};

fuzz_target!(|data: &[u8]| {
    let Ok(request) = serde_json::from_slice::<BatchRequest>(data) else {
        return;
    };
    if let Ok(slot) = request.db.resolve() {
        assert!(slot.index() < 16, "resolved slot must be in range");
    }

    let registry = Registry::new();
    for entry in request.cmds {
        if let Some(handler) = registry.lookup_batch(&entry.cmd) {
            if let Ok(command) = handler.parse_batch(entry.args) {
                assert_eq!(command.name(), handler.name());
            }
        }
    }
});
