//!
//! Waymark: a structured, replayable navigation model layered over a linear,
//! single-cursor host navigation stack (e.g. a browser session history).
//!
//! The host stack only knows how to push an entry, replace the current entry,
//! move its cursor by N steps, and report that the cursor moved. Waymark
//! mirrors that stack with a richer shadow model and keeps the two in sync.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::Node`)**: One shadow entry per host entry, carrying an
//!   opaque id, an affinity group, a sealed flag, and caller metadata.
//! * **NodeManager (`engine::NodeManager`)**: The reconciliation engine. Owns
//!   the node array and cursor, computes multi-step traversal paths, and
//!   decides corrective moves away from sealed landing nodes. Pure state
//!   machine; performs no I/O.
//! * **Navigator (`navigator::Navigator`)**: The facade. Translates public
//!   push/replace/back/forward/go calls into engine updates plus host
//!   commits, relays host traversal signals back into the engine, and
//!   dispatches traversal events to subscribers.
//! * **HostStack (`host::HostStack`)**: The boundary to the host's native
//!   navigation primitives, including detection of commits performed by
//!   outside code. `host::SimHost` is an in-memory implementation with
//!   browser-like semantics.
//! * **SessionStore (`store::SessionStore`)**: Pluggable persistence for the
//!   node array, used to restore the shadow stack across reloads anchored on
//!   the host's active entry.
//! * **Sealing**: A sealed node is never a valid landing target; traversals
//!   that land on one are silently redirected to the nearest reachable node
//!   in the direction of travel.
//! * **Affinity groups**: Nodes sharing an affinity identifier (e.g. a chain
//!   of stacked modals) can be sealed and unsealed as a unit.

pub mod clock;
pub mod engine;
pub mod event;
pub mod host;
pub mod navigator;
pub mod node;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use engine::NodeManager;
pub use event::{TraversalEvent, TraversalKind};
pub use navigator::{Navigator, SubscriptionId};
pub use node::{EntryRecord, Node, NodeId, NodeSource, PushOptions};

/// Result type used throughout the Waymark library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Waymark library.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured persistence errors from the store module
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// Structured host stack errors from the host module
    #[error(transparent)]
    Host(#[from] host::HostError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Store(_) => "store",
            Error::Host(_) => "host",
        }
    }

    /// Check if this error came from the session store boundary.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error came from the host stack boundary.
    pub fn is_host_error(&self) -> bool {
        matches!(self, Error::Host(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Store(store_err) => store_err.is_serialization_error(),
            _ => false,
        }
    }
}
