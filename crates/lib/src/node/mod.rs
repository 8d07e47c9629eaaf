//! Shadow-stack node types.
//!
//! A [`Node`] is one entry in the shadow stack maintained in parallel with
//! the host's native navigation stack. Nodes are created only by managed
//! push/replace, by relayed outside-code commits, or by bootstrap/restore,
//! and are destroyed only by truncation on a later push.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::clock::Clock;

mod id;
pub use id::NodeId;


/// How a node came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeSource {
    /// Created through Waymark's own push/replace.
    #[default]
    Managed,
    /// Created in reaction to a push/replace performed directly against the
    /// host stack by outside code.
    Intercepted,
}

/// One entry in the shadow stack.
///
/// The authoritative position of a node is its index in the live array, not
/// the `position` field, which only records the cursor value at creation
/// time and is not updated by later truncation or splicing.
///
/// All fields round-trip losslessly through JSON; the host stack and the
/// session store both serialize nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Opaque unique identifier, stable for the node's lifetime.
    pub id: NodeId,
    /// Creation time in milliseconds since epoch (diagnostic only).
    pub timestamp: u64,
    /// Cursor value at creation time. Diagnostic; see type docs.
    pub position: usize,
    /// Logical location associated with the entry (diagnostics/grouping).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathname: Option<String>,
    /// Optional group identifier for bulk seal/unseal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affinity: Option<String>,
    /// A sealed node is never a valid landing target.
    #[serde(default)]
    pub sealed: bool,
    /// Free-form key space opaque to the engine; lets callers re-identify
    /// "their" node without seeing the generated id up front.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    /// Marks the bootstrap node created when no prior shadow state exists.
    #[serde(default)]
    pub initial: bool,
    /// Managed vs intercepted origin.
    #[serde(default)]
    pub source: NodeSource,
}

impl Node {
    /// Builds a fresh node at the given position with a generated id.
    pub(crate) fn create(
        position: usize,
        source: NodeSource,
        initial: bool,
        options: &PushOptions,
        clock: &Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: NodeId::generate(),
            timestamp: clock.now_millis(),
            position,
            pathname: options.pathname.clone(),
            affinity: options.affinity.clone(),
            sealed: false,
            metadata: options.metadata.clone(),
            initial,
            source,
        }
    }
}

/// Caller-supplied attributes for a new node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PushOptions {
    /// Affinity group for the new node.
    pub affinity: Option<String>,
    /// Opaque caller metadata attached to the new node.
    pub metadata: Map<String, Value>,
    /// Logical location associated with the new node.
    pub pathname: Option<String>,
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the affinity group.
    pub fn with_affinity(mut self, affinity: impl Into<String>) -> Self {
        self.affinity = Some(affinity.into());
        self
    }

    /// Adds one metadata key.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Sets the pathname.
    pub fn with_pathname(mut self, pathname: impl Into<String>) -> Self {
        self.pathname = Some(pathname.into());
        self
    }
}

/// The envelope committed to the host stack for every entry.
///
/// A single explicit shape regardless of what the caller's payload looks
/// like: the payload rides alongside the bookkeeping node, so the host entry
/// and the shadow entry always refer to each other by `node.id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// The caller's data, opaque to Waymark.
    pub payload: Value,
    /// The shadow node bound to this host entry.
    pub node: Node,
}

impl EntryRecord {
    pub fn new(payload: Value, node: Node) -> Self {
        Self { payload, node }
    }
}
