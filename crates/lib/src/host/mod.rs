//! Host stack boundary.
//!
//! The [`HostStack`] trait wraps the host environment's native navigation
//! primitives: commit an entry, commit in place, move the cursor by a
//! delta, and notify on traversal. A conforming shim must also detect
//! push/replace calls performed by code outside Waymark and relay them as
//! [`HostSignal::CommittedOutside`], so the engine can mirror them with
//! intercepted nodes.
//!
//! [`SimHost`] is the in-memory implementation with browser-like semantics,
//! used in tests and host environments without a native stack.

use serde_json::Value;

use crate::node::EntryRecord;

mod errors;
pub use errors::HostError;

mod sim;
pub use sim::SimHost;

/// A notification from the host stack shim.
#[derive(Debug, Clone)]
pub enum HostSignal {
    /// The host cursor moved, whatever caused it. Carries the managed
    /// record of the entry the host settled on, or `None` when that entry
    /// holds no parseable record (an entry Waymark never created).
    Traversed(Option<EntryRecord>),
    /// Outside code pushed or replaced directly against the host stack.
    /// The receiver is expected to mirror the commit with an intercepted
    /// node and stamp it back in place.
    CommittedOutside {
        /// The raw state the outside code committed.
        payload: Value,
        /// The location the outside code committed to, if any.
        url: Option<String>,
        /// True for a replace, false for a push.
        replace: bool,
    },
}

/// Handler invoked by the shim after any cursor change or outside commit.
pub type SignalHandler = Box<dyn Fn(HostSignal) + Send + Sync>;

/// The host environment's linear, single-cursor navigation stack.
///
/// Implementations must deliver signals one at a time: a `travel` issued
/// from inside a handler produces a later, distinct delivery, never a
/// nested one. `SimHost` does this with a queued dispatch loop; a browser
/// shim gets it from the event loop.
pub trait HostStack: Send + Sync {
    /// Push a managed entry onto the native stack, truncating forward
    /// history. Does not signal; the host's own commits are synchronous
    /// with the request.
    fn commit(&self, record: &EntryRecord, url: Option<&str>) -> Result<(), HostError>;

    /// Replace the host's current entry with a managed entry. Also used to
    /// stamp a record onto an entry created by outside code or by a cold
    /// start.
    fn commit_in_place(&self, record: &EntryRecord, url: Option<&str>) -> Result<(), HostError>;

    /// Request the host to move its cursor by `delta` steps. Boundary
    /// behavior is host-defined (typically a no-op).
    fn travel(&self, delta: isize) -> Result<(), HostError>;

    /// The managed record of the entry the host currently considers
    /// active, or `None` when the stack is empty or the entry carries no
    /// parseable record. The bootstrap anchor.
    fn active(&self) -> Option<EntryRecord>;

    /// Registers the signal handler. A shim supports exactly one receiver:
    /// the navigator that owns it.
    fn on_signal(&self, handler: SignalHandler);
}
