//! Outcome values returned by the reconciliation engine.
//!
//! The engine is a pure state machine: it decides, the caller acts. These
//! types carry the decision across that boundary so that a corrective move
//! is "decide delta" (here, synchronous) followed by "request host move"
//! (issued by the facade, then awaited via the next inbound traversal),
//! never a recursive call back into the same reconciliation pass.

use crate::event::TraversalEvent;
use crate::node::EntryRecord;

/// Result of restoring the engine from persisted state.
#[derive(Debug, Clone, PartialEq)]
pub enum Bootstrap {
    /// Warm start: a persisted array was adopted verbatim and the host's
    /// active entry was found inside it. No host-side mutation is needed.
    Resumed,
    /// Cold start: a single fresh `initial` node was created. The caller
    /// must commit this record to the host in place so the host entry and
    /// the shadow entry are the same object going forward.
    Fresh(EntryRecord),
}

/// Result of reconciling the engine against a host traversal notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    /// The landing node is unsealed; the cursor moved and this event should
    /// be dispatched to subscribers.
    Settled(TraversalEvent),
    /// The host re-announced the entry the engine already considers
    /// current. Nothing to do; covers the settle of a fully reverted jump.
    Unmoved,
    /// The host landed on an entry the engine never created. Best-effort
    /// event with no current node; the cursor is left untouched.
    Unmanaged(TraversalEvent),
    /// The landing node is sealed. The caller must request a host move of
    /// this delta; the cursor stays put until the resulting traversal
    /// notification arrives and reconciles on its own.
    Corrective { delta: isize },
}
