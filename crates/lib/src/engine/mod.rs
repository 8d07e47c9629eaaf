//! Node reconciliation engine.
//!
//! [`NodeManager`] owns the shadow stack: an ordered node array plus an
//! integer cursor kept in sync with the host stack's own cursor. All
//! decisions here are pure functions of (array, cursor, incoming event);
//! host commits, persistence writes, and subscriber dispatch belong to the
//! [`Navigator`](crate::navigator::Navigator).
//!
//! ## Invariants
//!
//! After every operation, whenever the array is non-empty:
//! 1. `0 <= cursor < nodes.len()`
//! 2. `nodes[cursor]` is the host's current entry (transiently untrue while
//!    a corrective move is in flight; the cursor only moves on settle).
//! 3. Indices are contiguous; "node at position P" means `nodes[P]`.
//! 4. A push truncates every node above the old cursor before appending,
//!    mirroring host-stack forward-history truncation.
//! 5. A traversal is never reported settled while the landing node is
//!    sealed.

use std::sync::Arc;

use crate::clock::Clock;
use crate::event::{TraversalEvent, TraversalKind};
use crate::node::{EntryRecord, Node, NodeId, NodeSource, PushOptions};

mod outcome;
pub use outcome::{Bootstrap, Reconciliation};


/// The node reconciliation engine.
///
/// Stateless with respect to the host beyond the single cursor integer.
/// Constructed only through [`NodeManager::bootstrap`], which guarantees a
/// non-empty array, so `nodes[cursor]` indexing is always in bounds.
pub struct NodeManager {
    nodes: Vec<Node>,
    cursor: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for NodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeManager")
            .field("len", &self.nodes.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl NodeManager {
    /// Restores the engine from persisted state, anchored on the entry the
    /// host stack currently considers active.
    ///
    /// Warm start requires both a persisted array and the host's active
    /// entry id present inside it; anything else (including an id that is
    /// missing from the restored array) discards the persisted state and
    /// cold-starts with a single `initial` node. The lookup goes by `id`
    /// only; `position` fields are never trusted for it.
    ///
    /// On a cold start over a live host entry, the fresh record preserves
    /// that entry's payload so committing it in place loses no caller data.
    pub fn bootstrap(
        persisted: Vec<Node>,
        host_active: Option<&EntryRecord>,
        clock: Arc<dyn Clock>,
    ) -> (Self, Bootstrap) {
        if !persisted.is_empty() {
            if let Some(record) = host_active {
                if let Some(index) = persisted.iter().position(|n| n.id == record.node.id) {
                    tracing::debug!(
                        len = persisted.len(),
                        cursor = index,
                        "resumed shadow stack from persisted state"
                    );
                    let manager = Self {
                        nodes: persisted,
                        cursor: index,
                        clock,
                    };
                    return (manager, Bootstrap::Resumed);
                }
                tracing::debug!(
                    active = %record.node.id,
                    "host active entry not in persisted array; cold starting"
                );
            }
        }

        let node = Node::create(0, NodeSource::Managed, true, &PushOptions::default(), &clock);
        let payload = host_active
            .map(|record| record.payload.clone())
            .unwrap_or(serde_json::Value::Null);
        let record = EntryRecord::new(payload, node.clone());
        let manager = Self {
            nodes: vec![node],
            cursor: 0,
            clock,
        };
        (manager, Bootstrap::Fresh(record))
    }

    /// Appends a new managed node after the cursor, truncating any forward
    /// history, and returns the record to commit to the host plus the push
    /// event to dispatch.
    pub fn request_push(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
    ) -> (EntryRecord, TraversalEvent) {
        self.push_with_source(payload, options, NodeSource::Managed)
    }

    /// Overwrites the node at the cursor with a fresh managed node. Length
    /// and cursor are unchanged.
    pub fn request_replace(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
    ) -> (EntryRecord, TraversalEvent) {
        self.replace_with_source(payload, options, NodeSource::Managed)
    }

    /// Push relayed from an outside-code commit detected by the host shim.
    /// Same algorithm as [`request_push`](Self::request_push) but the node
    /// is tagged intercepted.
    pub fn intercepted_push(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
    ) -> (EntryRecord, TraversalEvent) {
        self.push_with_source(payload, options, NodeSource::Intercepted)
    }

    /// Replace relayed from an outside-code commit detected by the host shim.
    pub fn intercepted_replace(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
    ) -> (EntryRecord, TraversalEvent) {
        self.replace_with_source(payload, options, NodeSource::Intercepted)
    }

    fn push_with_source(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
        source: NodeSource,
    ) -> (EntryRecord, TraversalEvent) {
        let next = self.cursor + 1;
        let previous = self.nodes[self.cursor].clone();
        let node = Node::create(next, source, false, options, &self.clock);

        // Mirrors host-stack forward-history truncation semantics.
        self.nodes.truncate(next);
        self.nodes.push(node.clone());
        self.cursor = next;

        tracing::debug!(cursor = next, id = %node.id, ?source, "pushed node");
        let event = TraversalEvent {
            kind: TraversalKind::Push,
            delta: 1,
            traversal: vec![previous, node.clone()],
            current: Some(node.clone()),
        };
        (EntryRecord::new(payload, node), event)
    }

    fn replace_with_source(
        &mut self,
        payload: serde_json::Value,
        options: &PushOptions,
        source: NodeSource,
    ) -> (EntryRecord, TraversalEvent) {
        let node = Node::create(self.cursor, source, false, options, &self.clock);
        self.nodes[self.cursor] = node.clone();

        tracing::debug!(cursor = self.cursor, id = %node.id, ?source, "replaced node");
        let event = TraversalEvent {
            kind: TraversalKind::Replace,
            delta: 0,
            traversal: vec![node.clone()],
            current: Some(node.clone()),
        };
        (EntryRecord::new(payload, node), event)
    }

    /// Reconciles the engine against a host traversal notification. This
    /// is the core algorithm.
    ///
    /// `host_active` is the node id carried by the entry the host settled
    /// on, or `None` when the entry carries no managed record at all.
    ///
    /// Recomputes everything from live state on each call, so rapid
    /// repeated host notifications and concurrent seals between a
    /// corrective move being issued and settling re-apply the same bypass
    /// logic instead of stalling.
    pub fn reconcile(&mut self, host_active: Option<&NodeId>) -> Reconciliation {
        let previous = self.cursor;

        let landing = match host_active.and_then(|id| self.index_of(id)) {
            Some(index) => index,
            None => {
                // The host is outside managed territory; a design
                // limitation, not an error.
                tracing::debug!(previous, "host landed on an unmanaged entry");
                return Reconciliation::Unmanaged(TraversalEvent::unmanaged());
            }
        };

        if landing == previous {
            return Reconciliation::Unmoved;
        }

        let delta = landing as isize - previous as isize;

        if !self.nodes[landing].sealed {
            self.cursor = landing;
            tracing::debug!(previous, landing, delta, "traversal settled");
            let current = self.nodes[landing].clone();
            return Reconciliation::Settled(TraversalEvent {
                kind: TraversalKind::Pop,
                delta,
                traversal: self.travel_path(previous, landing),
                current: Some(current),
            });
        }

        // Sealed landing: leave the cursor alone and redirect to the
        // nearest unsealed node in the travel direction, or fully revert
        // the jump when that direction is sealed through the end.
        let forward = delta > 0;
        let target = if forward {
            self.nodes[landing + 1..]
                .iter()
                .position(|n| !n.sealed)
                .map(|offset| landing + 1 + offset)
        } else {
            self.nodes[..landing].iter().rposition(|n| !n.sealed)
        };

        let corrective = match target {
            Some(t) => t as isize - landing as isize,
            None => previous as isize - landing as isize,
        };
        tracing::debug!(
            previous,
            landing,
            corrective,
            reverted = target.is_none(),
            "sealed landing; issuing corrective move"
        );
        Reconciliation::Corrective { delta: corrective }
    }

    /// Marks the node with the given id as sealed. Unknown ids are a silent
    /// no-op. Returns whether anything changed so the caller knows to
    /// persist.
    pub fn seal(&mut self, id: &NodeId) -> bool {
        self.set_sealed_by_id(id, true)
    }

    /// Clears the sealed flag on the node with the given id.
    pub fn unseal(&mut self, id: &NodeId) -> bool {
        self.set_sealed_by_id(id, false)
    }

    /// Seals every node whose affinity equals `group`. Returns the number
    /// of nodes whose flag changed.
    pub fn seal_affinity(&mut self, group: &str) -> usize {
        self.set_sealed_by_affinity(group, true)
    }

    /// Unseals every node whose affinity equals `group`.
    pub fn unseal_affinity(&mut self, group: &str) -> usize {
        self.set_sealed_by_affinity(group, false)
    }

    fn set_sealed_by_id(&mut self, id: &NodeId, sealed: bool) -> bool {
        match self.nodes.iter_mut().find(|n| &n.id == id) {
            Some(node) if node.sealed != sealed => {
                node.sealed = sealed;
                true
            }
            _ => false,
        }
    }

    fn set_sealed_by_affinity(&mut self, group: &str, sealed: bool) -> usize {
        let mut changed = 0;
        for node in &mut self.nodes {
            if node.affinity.as_deref() == Some(group) && node.sealed != sealed {
                node.sealed = sealed;
                changed += 1;
            }
        }
        changed
    }

    /// Finds the first node matching a predicate.
    pub fn find(&self, predicate: impl Fn(&Node) -> bool) -> Option<&Node> {
        self.nodes.iter().find(|n| predicate(n))
    }

    /// Finds a node by id.
    pub fn find_by_id(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Returns the node at the given live index.
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Returns the first node of an affinity group, the "jump back to
    /// group origin" target.
    pub fn affinity_origin(&self, group: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.affinity.as_deref() == Some(group))
    }

    /// The live node array.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The engine's cursor into the node array.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The node the engine currently considers current.
    pub fn current(&self) -> &Node {
        &self.nodes[self.cursor]
    }

    fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| &n.id == id)
    }

    /// Every node from `from` to `to` inclusive, in travel order.
    fn travel_path(&self, from: usize, to: usize) -> Vec<Node> {
        if to >= from {
            self.nodes[from..=to].to_vec()
        } else {
            let mut path = self.nodes[to..=from].to_vec();
            path.reverse();
            path
        }
    }
}
