//! The command registry: whitelisted tokens mapped to argument parsers.
//!
//! The registry is built once at startup from [`CommandName::ALL`] and never
//! changes. Each handler turns raw request arguments into a validated
//! [`Command`]; executing it against a slot is the executors' job.

use serde::Deserialize;
use serde_json::Value;
use slotgate_core::{Command, CommandName, CoreError, RangeMode};

use crate::error::GatewayError;

type WireParser = fn(&[&str]) -> Result<Command, CoreError>;
type BatchParser = fn(Value) -> Result<Command, GatewayError>;

/// Argument validation for one whitelisted command.
#[derive(Clone, Copy)]
pub struct Handler {
    name: CommandName,
    from_wire: WireParser,
    from_batch: BatchParser,
}

impl Handler {
    fn for_command(name: CommandName) -> Self {
        match name {
            CommandName::Sadd => Self {
                name,
                from_wire: sadd_from_wire,
                from_batch: sadd_from_batch,
            },
            CommandName::Zrange => Self {
                name,
                from_wire: zrange_from_wire,
                from_batch: zrange_from_batch,
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> CommandName {
        self.name
    }

    /// Validate positional arguments from the slash-delimited wire form.
    ///
    /// # Errors
    /// Returns [`CoreError::Arity`] when the argument count does not fit the
    /// command.
    pub fn parse_wire(&self, args: &[&str]) -> Result<Command, CoreError> {
        (self.from_wire)(args)
    }

    /// Validate a batch entry's `args` object.
    ///
    /// # Errors
    /// Returns [`GatewayError::InvalidRequest`] when the object is missing
    /// fields, has unknown fields, or has values of the wrong type.
    pub fn parse_batch(&self, args: Value) -> Result<Command, GatewayError> {
        (self.from_batch)(args)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Closed mapping from command token to [`Handler`].
#[derive(Debug, Clone)]
pub struct Registry {
    handlers: [Handler; CommandName::ALL.len()],
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: CommandName::ALL.map(Handler::for_command),
        }
    }

    /// Find the handler for an upper-case wire token such as `"SADD"`.
    #[must_use]
    pub fn lookup_wire(&self, token: &str) -> Option<&Handler> {
        CommandName::from_wire_token(token).and_then(|name| self.get(name))
    }

    /// Find the handler for a lower-case batch token such as `"sadd"`.
    #[must_use]
    pub fn lookup_batch(&self, token: &str) -> Option<&Handler> {
        CommandName::from_batch_token(token).and_then(|name| self.get(name))
    }

    fn get(&self, name: CommandName) -> Option<&Handler> {
        self.handlers.iter().find(|handler| handler.name == name)
    }
}

// ── Wire form ─────────────────────────────────────────────────────────────────

fn sadd_from_wire(args: &[&str]) -> Result<Command, CoreError> {
    let Some((key, members)) = args.split_first() else {
        return Err(CoreError::Arity {
            command: CommandName::Sadd.wire_token(),
            expected: "at least 2",
            got: 0,
        });
    };
    Command::sadd(*key, members.iter().map(|m| (*m).to_owned()).collect())
}

fn zrange_from_wire(args: &[&str]) -> Result<Command, CoreError> {
    match *args {
        [key, start, end] => Ok(Command::zrange(key, start, end, RangeMode::Index)),
        [key, start, end, flag] => Ok(Command::zrange(key, start, end, RangeMode::from_flag(Some(flag)))),
        _ => Err(CoreError::Arity {
            command: CommandName::Zrange.wire_token(),
            expected: "3 or 4",
            got: args.len(),
        }),
    }
}

// ── Batch form ────────────────────────────────────────────────────────────────

/// A JSON scalar forwarded to the backend as text.
///
/// Numbers keep their JSON rendering, so `1.0` reaches the backend as `1.0`
/// and is rejected there as an index bound, not silently read as `1`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_arg(self) -> String {
        match self {
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SaddArgs {
    name: String,
    values: Vec<Scalar>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ZrangeArgs {
    name: String,
    start: Scalar,
    end: Scalar,
    /// Score ranging only for a literal `true`; any other value, present or
    /// not, means index ranging.
    #[serde(default)]
    byscore: Value,
}

fn batch_args<T: for<'de> Deserialize<'de>>(name: CommandName, args: Value) -> Result<T, GatewayError> {
    serde_json::from_value(args)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid arguments for {}: {e}", name.batch_token())))
}

fn sadd_from_batch(args: Value) -> Result<Command, GatewayError> {
    let args: SaddArgs = batch_args(CommandName::Sadd, args)?;
    let members = args.values.into_iter().map(Scalar::into_arg).collect();
    Ok(Command::sadd(args.name, members)?)
}

fn zrange_from_batch(args: Value) -> Result<Command, GatewayError> {
    let args: ZrangeArgs = batch_args(CommandName::Zrange, args)?;
    Ok(Command::zrange(
        args.name,
        args.start.into_arg(),
        args.end.into_arg(),
        RangeMode::from_byscore(matches!(args.byscore, Value::Bool(true))),
    ))
}
