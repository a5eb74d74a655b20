//! In-memory implementation of the backend traits.
//!
//! Keeps a set and sorted-set keyspace per slot. A pipeline runs under the
//! slot lock, so no other request interleaves with it. Like Redis `EXEC`, a
//! command that fails at run time does not undo the commands around it; the
//! caller gets the first error and no replies. Used by the test suites and
//! for running the gateway without a Redis server.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use slotgate_core::{Command, Pipeline, RangeMode, Reply, Slot, SLOT_COUNT};
use tokio::sync::Mutex;

use crate::{Connector, SlotConnection, StoreError};

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";
const NOT_AN_INTEGER: &str = "ERR value is not an integer or out of range";
const NOT_A_FLOAT: &str = "ERR min or max is not a float";

#[derive(Debug, Clone, Default)]
struct Keyspace {
    sets: HashMap<String, BTreeSet<String>>,
    /// Members kept ordered by `(score, member)`.
    sorted_sets: HashMap<String, Vec<(f64, String)>>,
}

#[derive(Debug)]
struct MemoryState {
    slots: [Mutex<Keyspace>; SLOT_COUNT],
    connects: AtomicUsize,
    round_trips: AtomicUsize,
    unreachable: AtomicBool,
}

/// Connector for the in-memory store. Clones share the same data.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    state: Arc<MemoryState>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConnector {
    /// Create an empty store with all 16 slots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(MemoryState {
                slots: std::array::from_fn(|_| Mutex::new(Keyspace::default())),
                connects: AtomicUsize::new(0),
                round_trips: AtomicUsize::new(0),
                unreachable: AtomicBool::new(false),
            }),
        }
    }

    /// Make subsequent `connect` calls fail, as if the server were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of connections opened so far.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    /// Number of command round trips served so far (a pipeline counts once).
    #[must_use]
    pub fn round_trip_count(&self) -> usize {
        self.state.round_trips.load(Ordering::SeqCst)
    }

    /// Replace a sorted set's contents. There is no whitelisted command that
    /// writes sorted sets, so tests seed them here.
    pub async fn seed_sorted_set(&self, slot: Slot, key: &str, members: &[(f64, &str)]) {
        let mut entries: Vec<(f64, String)> =
            members.iter().map(|(score, m)| (*score, (*m).to_owned())).collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        let mut keyspace = self.state.slots[slot.index()].lock().await;
        keyspace.sets.remove(key);
        keyspace.sorted_sets.insert(key.to_owned(), entries);
    }

    /// Members of a set, sorted. Empty if the key does not exist.
    pub async fn set_members(&self, slot: Slot, key: &str) -> Vec<String> {
        let keyspace = self.state.slots[slot.index()].lock().await;
        keyspace
            .sets
            .get(key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, slot: Slot) -> Result<Arc<dyn SlotConnection>, StoreError> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Connect {
                slot,
                reason: "connection refused".to_owned(),
            });
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            slot,
            state: Arc::clone(&self.state),
        }))
    }
}

/// A connection to one slot of the in-memory store.
#[derive(Debug)]
pub struct MemoryConnection {
    slot: Slot,
    state: Arc<MemoryState>,
}

#[async_trait]
impl SlotConnection for MemoryConnection {
    async fn execute(&self, command: &Command) -> Result<Reply, StoreError> {
        self.state.round_trips.fetch_add(1, Ordering::SeqCst);
        let mut keyspace = self.state.slots[self.slot.index()].lock().await;
        apply(&mut keyspace, command)
    }

    async fn execute_atomic(&self, pipeline: &Pipeline) -> Result<Vec<Reply>, StoreError> {
        self.state.round_trips.fetch_add(1, Ordering::SeqCst);
        let mut keyspace = self.state.slots[self.slot.index()].lock().await;
        let mut replies = Vec::with_capacity(pipeline.commands().len());
        let mut first_error = None;
        for command in pipeline.commands() {
            match apply(&mut keyspace, command) {
                Ok(reply) => replies.push(reply),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(replies),
        }
    }
}

fn apply(keyspace: &mut Keyspace, command: &Command) -> Result<Reply, StoreError> {
    match command {
        Command::Sadd { key, members } => {
            if keyspace.sorted_sets.contains_key(key) {
                return Err(StoreError::Backend(WRONGTYPE.to_owned()));
            }
            let set = keyspace.sets.entry(key.clone()).or_default();
            let added = members.iter().filter(|m| set.insert((*m).clone())).count();
            Ok(Reply::Integer(i64::try_from(added).unwrap_or(i64::MAX)))
        }
        Command::Zrange { key, start, end, mode } => {
            if keyspace.sets.contains_key(key) {
                return Err(StoreError::Backend(WRONGTYPE.to_owned()));
            }
            let entries = keyspace.sorted_sets.get(key).map_or(&[][..], Vec::as_slice);
            let members = match mode {
                RangeMode::Index => range_by_index(entries, start, end)?,
                RangeMode::Score => range_by_score(entries, start, end)?,
            };
            Ok(Reply::Members(members))
        }
    }
}

fn range_by_index(entries: &[(f64, String)], start: &str, end: &str) -> Result<Vec<String>, StoreError> {
    let parse = |token: &str| {
        token
            .parse::<i64>()
            .map_err(|_| StoreError::Backend(NOT_AN_INTEGER.to_owned()))
    };
    let (start, end) = (parse(start)?, parse(end)?);
    let len = i64::try_from(entries.len()).unwrap_or(i64::MAX);

    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if start > end || start >= len {
        return Ok(Vec::new());
    }

    let (Ok(from), Ok(to)) = (usize::try_from(start), usize::try_from(end)) else {
        return Ok(Vec::new());
    };
    Ok(entries[from..=to].iter().map(|(_, m)| m.clone()).collect())
}

/// A score bound: value plus whether it is exclusive.
fn parse_score_bound(token: &str) -> Result<(f64, bool), StoreError> {
    let (raw, exclusive) = match token.strip_prefix('(') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    let value = match raw {
        "-inf" => f64::NEG_INFINITY,
        "+inf" | "inf" => f64::INFINITY,
        other => other
            .parse::<f64>()
            .ok()
            .filter(|v| !v.is_nan())
            .ok_or_else(|| StoreError::Backend(NOT_A_FLOAT.to_owned()))?,
    };
    Ok((value, exclusive))
}

fn range_by_score(entries: &[(f64, String)], min: &str, max: &str) -> Result<Vec<String>, StoreError> {
    let (min, min_exclusive) = parse_score_bound(min)?;
    let (max, max_exclusive) = parse_score_bound(max)?;
    Ok(entries
        .iter()
        .filter(|(score, _)| if min_exclusive { *score > min } else { *score >= min })
        .filter(|(score, _)| if max_exclusive { *score < max } else { *score <= max })
        .map(|(_, m)| m.clone())
        .collect())
}
