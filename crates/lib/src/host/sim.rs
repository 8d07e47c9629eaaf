//! In-memory host stack with browser-like semantics.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use serde_json::Value;

use crate::host::{HostError, HostSignal, HostStack, SignalHandler};
use crate::node::EntryRecord;

/// One native entry: opaque state plus an optional location.
///
/// Managed entries hold a serialized [`EntryRecord`]; entries committed by
/// outside code hold whatever that code supplied, which is exactly how the
/// host stack round-trips managed state through serialization.
#[derive(Debug, Clone)]
struct SimEntry {
    state: Value,
    url: Option<String>,
}

#[derive(Debug, Default)]
struct SimState {
    entries: Vec<SimEntry>,
    cursor: usize,
}

#[derive(Default)]
struct Dispatch {
    queue: VecDeque<HostSignal>,
    delivering: bool,
}

/// A linear in-memory navigation stack with browser semantics.
///
/// - commits truncate forward history;
/// - `travel` beyond either boundary is a no-op;
/// - signals are queued and delivered one at a time, so a `travel` issued
///   from inside the handler (a corrective move) produces a later, distinct
///   delivery rather than a nested one.
///
/// `external_push`/`external_replace` simulate code outside Waymark
/// committing directly against the stack; these are relayed as
/// [`HostSignal::CommittedOutside`].
pub struct SimHost {
    state: Mutex<SimState>,
    dispatch: Mutex<Dispatch>,
    handler: RwLock<Option<SignalHandler>>,
}

impl std::fmt::Debug for SimHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("SimHost")
            .field("len", &state.entries.len())
            .field("cursor", &state.cursor)
            .finish()
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    /// Creates a new, empty host stack.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
            dispatch: Mutex::new(Dispatch::default()),
            handler: RwLock::new(None),
        }
    }

    /// Number of entries currently on the native stack.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    /// True when the native stack holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().unwrap().entries.is_empty()
    }

    /// The host's own cursor index.
    pub fn cursor(&self) -> usize {
        self.state.lock().unwrap().cursor
    }

    /// The location of the active entry, if one was committed.
    pub fn active_url(&self) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .get(state.cursor)
            .and_then(|entry| entry.url.clone())
    }

    /// Simulates outside code pushing raw state directly onto the stack.
    pub fn external_push(&self, payload: Value, url: Option<&str>) {
        {
            let mut state = self.state.lock().unwrap();
            let insert_at = if state.entries.is_empty() {
                0
            } else {
                state.cursor + 1
            };
            state.entries.truncate(insert_at);
            state.entries.push(SimEntry {
                state: payload.clone(),
                url: url.map(str::to_owned),
            });
            state.cursor = insert_at;
        }
        self.emit(HostSignal::CommittedOutside {
            payload,
            url: url.map(str::to_owned),
            replace: false,
        });
    }

    /// Simulates outside code replacing the active entry's state directly.
    pub fn external_replace(&self, payload: Value, url: Option<&str>) {
        {
            let mut state = self.state.lock().unwrap();
            let cursor = state.cursor;
            match state.entries.get_mut(cursor) {
                Some(entry) => {
                    entry.state = payload.clone();
                    if url.is_some() {
                        entry.url = url.map(str::to_owned);
                    }
                }
                None => {
                    state.entries.push(SimEntry {
                        state: payload.clone(),
                        url: url.map(str::to_owned),
                    });
                    state.cursor = 0;
                }
            }
        }
        self.emit(HostSignal::CommittedOutside {
            payload,
            url: url.map(str::to_owned),
            replace: true,
        });
    }

    /// Outside-code back/forward input arrives through the same move
    /// primitive as managed calls.
    pub fn external_travel(&self, delta: isize) -> Result<(), HostError> {
        self.travel(delta)
    }

    fn encode(record: &EntryRecord) -> Result<Value, HostError> {
        serde_json::to_value(record).map_err(|source| HostError::EncodeFailed { source })
    }

    fn decode(state: &Value) -> Option<EntryRecord> {
        serde_json::from_value(state.clone()).ok()
    }

    /// Queues a signal and drains the queue unless a delivery is already in
    /// progress higher up the call stack.
    fn emit(&self, signal: HostSignal) {
        {
            let mut dispatch = self.dispatch.lock().unwrap();
            dispatch.queue.push_back(signal);
            if dispatch.delivering {
                return;
            }
            dispatch.delivering = true;
        }
        loop {
            let next = self.dispatch.lock().unwrap().queue.pop_front();
            match next {
                Some(signal) => {
                    if let Some(handler) = self.handler.read().unwrap().as_ref() {
                        handler(signal);
                    }
                }
                None => break,
            }
        }
        self.dispatch.lock().unwrap().delivering = false;
    }
}

impl HostStack for SimHost {
    fn commit(&self, record: &EntryRecord, url: Option<&str>) -> Result<(), HostError> {
        let encoded = Self::encode(record)?;
        let mut state = self.state.lock().unwrap();
        let insert_at = if state.entries.is_empty() {
            0
        } else {
            state.cursor + 1
        };
        state.entries.truncate(insert_at);
        state.entries.push(SimEntry {
            state: encoded,
            url: url.map(str::to_owned),
        });
        state.cursor = insert_at;
        Ok(())
    }

    fn commit_in_place(&self, record: &EntryRecord, url: Option<&str>) -> Result<(), HostError> {
        let encoded = Self::encode(record)?;
        let mut state = self.state.lock().unwrap();
        let cursor = state.cursor;
        match state.entries.get_mut(cursor) {
            Some(entry) => {
                entry.state = encoded;
                if url.is_some() {
                    entry.url = url.map(str::to_owned);
                }
            }
            None => {
                state.entries.push(SimEntry {
                    state: encoded,
                    url: url.map(str::to_owned),
                });
                state.cursor = 0;
            }
        }
        Ok(())
    }

    fn travel(&self, delta: isize) -> Result<(), HostError> {
        let record = {
            let mut state = self.state.lock().unwrap();
            if state.entries.is_empty() {
                return Ok(());
            }
            let target = state.cursor as isize + delta;
            if target < 0 || target as usize >= state.entries.len() {
                // Browser-style boundary behavior: the move is dropped.
                return Ok(());
            }
            state.cursor = target as usize;
            Self::decode(&state.entries[state.cursor].state)
        };
        self.emit(HostSignal::Traversed(record));
        Ok(())
    }

    fn active(&self) -> Option<EntryRecord> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .get(state.cursor)
            .and_then(|entry| Self::decode(&entry.state))
    }

    fn on_signal(&self, handler: SignalHandler) {
        *self.handler.write().unwrap() = Some(handler);
    }
}
