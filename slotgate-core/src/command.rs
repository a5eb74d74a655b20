//! The command whitelist and validated command descriptors.
//!
//! [`CommandName`] is the closed set of commands the gateway forwards. A
//! [`Command`] is one validated invocation, and a [`Pipeline`] is an ordered
//! group of them staged for a single atomic round trip.

use std::fmt;

use crate::CoreError;

/// A whitelisted command.
///
/// Each command has two spellings: the upper-case token used by the
/// slash-delimited wire form and the lower-case token used in batch bodies.
/// Both are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// Add members to a set.
    Sadd,
    /// Read a range of a sorted set.
    Zrange,
}

impl CommandName {
    /// Every whitelisted command.
    pub const ALL: [CommandName; 2] = [CommandName::Sadd, CommandName::Zrange];

    /// Token used by the single-command wire form, e.g. `"SADD"`.
    #[must_use]
    pub fn wire_token(self) -> &'static str {
        match self {
            CommandName::Sadd => "SADD",
            CommandName::Zrange => "ZRANGE",
        }
    }

    /// Token used inside batch bodies, e.g. `"sadd"`.
    #[must_use]
    pub fn batch_token(self) -> &'static str {
        match self {
            CommandName::Sadd => "sadd",
            CommandName::Zrange => "zrange",
        }
    }

    /// Look up a wire token. Returns `None` for anything outside the whitelist.
    #[must_use]
    pub fn from_wire_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.wire_token() == token)
    }

    /// Look up a batch token. Returns `None` for anything outside the whitelist.
    #[must_use]
    pub fn from_batch_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.batch_token() == token)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_token())
    }
}

/// How ZRANGE interprets its start and end bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RangeMode {
    /// Bounds are rank indices; negative values count from the end.
    #[default]
    Index,
    /// Bounds are scores; `-inf`, `+inf` and `(` exclusive prefixes apply.
    Score,
}

impl RangeMode {
    /// The only flag token that selects score ranging on the wire form.
    pub const SCORE_FLAG: &'static str = "BYSCORE";

    /// Interpret an optional wire flag. Anything but an exact
    /// [`Self::SCORE_FLAG`] match, including a missing flag, is index ranging.
    #[must_use]
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(Self::SCORE_FLAG) => RangeMode::Score,
            _ => RangeMode::Index,
        }
    }

    /// Interpret the batch `byscore` boolean.
    #[must_use]
    pub fn from_byscore(byscore: bool) -> Self {
        if byscore {
            RangeMode::Score
        } else {
            RangeMode::Index
        }
    }
}

/// A validated command ready to run against one slot's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `SADD key member [member ...]`
    Sadd { key: String, members: Vec<String> },
    /// `ZRANGE key start end [BYSCORE]`
    Zrange {
        key: String,
        start: String,
        end: String,
        mode: RangeMode,
    },
}

impl Command {
    /// Build an SADD command.
    ///
    /// # Errors
    /// Returns [`CoreError::Arity`] if `members` is empty.
    pub fn sadd(key: impl Into<String>, members: Vec<String>) -> Result<Self, CoreError> {
        if members.is_empty() {
            return Err(CoreError::Arity {
                command: CommandName::Sadd.wire_token(),
                expected: "at least 2",
                got: 1,
            });
        }
        Ok(Command::Sadd { key: key.into(), members })
    }

    /// Build a ZRANGE command. Bounds are forwarded verbatim.
    #[must_use]
    pub fn zrange(
        key: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        mode: RangeMode,
    ) -> Self {
        Command::Zrange {
            key: key.into(),
            start: start.into(),
            end: end.into(),
            mode,
        }
    }

    /// The whitelisted name this command was built for.
    #[must_use]
    pub fn name(&self) -> CommandName {
        match self {
            Command::Sadd { .. } => CommandName::Sadd,
            Command::Zrange { .. } => CommandName::Zrange,
        }
    }

    /// The key this command targets.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Command::Sadd { key, .. } | Command::Zrange { key, .. } => key,
        }
    }
}

/// An ordered group of commands staged against one slot.
///
/// Staging never touches the backend. The whole pipeline is sent once, as a
/// single atomic unit, and yields one reply per staged command in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    commands: Vec<Command>,
}

impl Pipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command; staging order is execution order.
    pub fn stage(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// The staged commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
