//! Traversal notification types.
//!
//! A [`TraversalEvent`] describes a completed cursor movement, including the
//! full path of intermediate nodes crossed when a single host jump skips
//! over several entries.

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// What kind of stack mutation a traversal event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalKind {
    /// A new entry was appended (after truncating forward history).
    Push,
    /// The current entry was swapped in place.
    Replace,
    /// The host cursor moved across existing entries.
    Pop,
}

/// The event emitted to subscribers after a cursor movement completes.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalEvent {
    pub kind: TraversalKind,
    /// Signed distance the cursor moved. `+1` for push, `0` for replace,
    /// the full (bypass-corrected) jump distance for pop.
    pub delta: isize,
    /// Every node crossed between the old and new cursor positions,
    /// inclusive, in travel order. Sealed intermediates are included so
    /// callers still see their enter/exit transitions.
    pub traversal: Vec<Node>,
    /// The node now under the cursor. `None` when the host landed on an
    /// entry Waymark never created.
    pub current: Option<Node>,
}

impl TraversalEvent {
    /// Best-effort event for a landing outside managed territory.
    pub(crate) fn unmanaged() -> Self {
        Self {
            kind: TraversalKind::Pop,
            delta: 0,
            traversal: Vec::new(),
            current: None,
        }
    }
}
