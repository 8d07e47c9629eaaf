//! Session persistence for the shadow stack.
//!
//! The [`SessionStore`] trait abstracts the key-value medium the node array
//! is persisted to, so the engine and facade stay independent of where the
//! data actually lives (session storage in a browser shim, a file, memory).
//! The store holds the array as an opaque ordered list; the cursor is
//! re-derived on restore from the host's active entry, so it is not stored.
//!
//! Store failures are an explicit degrade-gracefully boundary: the
//! [`Navigator`](crate::navigator::Navigator) logs them and continues with
//! in-memory state only, accepting that a later reload may cold-start.

use crate::node::Node;

mod errors;
pub use errors::StoreError;

mod in_memory;
pub use in_memory::InMemory;

/// Pluggable persistence for the node array, scoped to one execution
/// context (never shared across independent contexts).
///
/// Serialization must round-trip every [`Node`] field losslessly; all field
/// types are JSON-compatible by construction.
pub trait SessionStore: Send + Sync {
    /// Persists the full node array, replacing whatever was stored before.
    fn save(&self, nodes: &[Node]) -> Result<(), StoreError>;

    /// Restores the previously persisted node array. An empty vector means
    /// nothing was stored.
    fn restore(&self) -> Result<Vec<Node>, StoreError>;

    /// Discards any persisted array.
    fn clear(&self) -> Result<(), StoreError>;
}
