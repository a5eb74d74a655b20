/// Errors produced by the `slotgate-core` crate.
///
/// These cover request validation only. Nothing here implies a backend was
/// contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// The slot token is not an integer.
    #[error("invalid slot '{token}': expected an integer")]
    InvalidSlot { token: String },

    /// The slot is an integer outside `[0, 16)`.
    #[error("slot {slot} out of range: must be in [0, 16)")]
    SlotOutOfRange { slot: String },

    /// The request names no command at all.
    #[error("missing command")]
    MissingCommand,

    /// The command received the wrong number of arguments.
    #[error("{command} expects {expected} arguments, got {got}")]
    Arity {
        command: &'static str,
        expected: &'static str,
        got: usize,
    },
}
