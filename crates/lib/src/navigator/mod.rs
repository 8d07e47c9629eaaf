//! The Navigator facade.
//!
//! Thin orchestration over the [`NodeManager`] engine and a [`HostStack`]
//! shim: public push/replace calls update the engine first, persist, then
//! commit to the host (engine state must be consistent before any
//! synchronous re-entry from the commit); back/forward/go delegate to the
//! host's move primitive only, and the engine catches up through the
//! resulting traversal signal. The facade also owns the traversal-event
//! subscriber registry and the degrade-gracefully persistence boundary.
//!
//! There is no process-wide singleton: construct one `Navigator` per
//! execution context at the application boundary and clone the handle to
//! every caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::engine::{Bootstrap, NodeManager, Reconciliation};
use crate::event::TraversalEvent;
use crate::host::{HostSignal, HostStack};
use crate::node::{Node, NodeId, PushOptions};
use crate::store::SessionStore;
use crate::Result;


/// Callback invoked synchronously for every dispatched traversal event.
pub type TraversalCallback = Arc<dyn Fn(&TraversalEvent) + Send + Sync>;

/// Identifies one traversal-event subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Internal state for Navigator.
///
/// Navigator itself is a cheap-to-clone handle wrapping
/// `Arc<NavigatorInternal>`; the host signal handler holds a `Weak` to this
/// to avoid a reference cycle through the shim.
pub(crate) struct NavigatorInternal {
    engine: Mutex<NodeManager>,
    host: Arc<dyn HostStack>,
    store: Arc<dyn SessionStore>,
    subscribers: Mutex<HashMap<u64, TraversalCallback>>,
    next_subscription: AtomicU64,
}

impl std::fmt::Debug for NavigatorInternal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigatorInternal")
            .field("engine", &*self.engine.lock().unwrap())
            .field(
                "subscribers",
                &format!("<{} callbacks>", self.subscribers.lock().unwrap().len()),
            )
            .finish()
    }
}

/// The public entry point to Waymark.
///
/// ## Example
///
/// ```
/// # use std::sync::Arc;
/// # use waymark::{host::SimHost, store::InMemory, Navigator, PushOptions};
/// # fn main() -> waymark::Result<()> {
/// let host = Arc::new(SimHost::new());
/// let store = Arc::new(InMemory::new());
/// let nav = Navigator::open(host, store)?;
///
/// let modal = nav.push(
///     serde_json::json!({"modal": "settings"}),
///     Some("/settings"),
///     PushOptions::new().with_affinity("settings-modals"),
/// )?;
/// nav.seal(&modal.id);
/// nav.back()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Navigator {
    inner: Arc<NavigatorInternal>,
}

impl Navigator {
    /// Restores or initializes the shadow stack over the given host and
    /// store, and wires up traversal signal handling.
    ///
    /// Warm start adopts the persisted array anchored on the host's active
    /// entry; anything else cold-starts with a single `initial` node
    /// committed back to the host in place. A failing store is logged and
    /// degraded to in-memory-only operation, never surfaced to the caller.
    pub fn open(host: Arc<dyn HostStack>, store: Arc<dyn SessionStore>) -> Result<Self> {
        Self::open_impl(host, store, Arc::new(SystemClock))
    }

    /// Same as [`Navigator::open`] but with an injected clock for
    /// controllable node timestamps in tests.
    #[cfg(any(test, feature = "testing"))]
    pub fn open_with_clock(
        host: Arc<dyn HostStack>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::open_impl(host, store, clock)
    }

    fn open_impl(
        host: Arc<dyn HostStack>,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let persisted = match store.restore() {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!(%err, "session store read failed; cold starting in memory");
                Vec::new()
            }
        };
        let host_active = host.active();
        let (engine, bootstrap) = NodeManager::bootstrap(persisted, host_active.as_ref(), clock);

        let inner = Arc::new(NavigatorInternal {
            engine: Mutex::new(engine),
            host: Arc::clone(&host),
            store,
            subscribers: Mutex::new(HashMap::new()),
            next_subscription: AtomicU64::new(0),
        });

        if let Bootstrap::Fresh(record) = bootstrap {
            // Discard whatever was persisted, then make the host entry and
            // the shadow entry the same object going forward.
            if let Err(err) = inner.store.clear() {
                tracing::warn!(%err, "session store clear failed");
            }
            inner.persist();
            host.commit_in_place(&record, record.node.pathname.as_deref())?;
        }

        let weak: Weak<NavigatorInternal> = Arc::downgrade(&inner);
        host.on_signal(Box::new(move |signal| {
            if let Some(internal) = weak.upgrade() {
                internal.handle_signal(signal);
            }
        }));

        Ok(Self { inner })
    }

    /// Pushes a new entry after the current one, truncating any forward
    /// history, and returns the created node.
    pub fn push(
        &self,
        payload: impl Serialize,
        url: Option<&str>,
        options: PushOptions,
    ) -> Result<Node> {
        let payload = serde_json::to_value(payload)?;
        let (record, event) = {
            let mut engine = self.inner.engine.lock().unwrap();
            engine.request_push(payload, &options)
        };
        self.inner.persist();
        self.inner.host.commit(&record, url)?;
        self.inner.notify(&event);
        Ok(record.node)
    }

    /// Replaces the current entry in place and returns the created node.
    pub fn replace(
        &self,
        payload: impl Serialize,
        url: Option<&str>,
        options: PushOptions,
    ) -> Result<Node> {
        let payload = serde_json::to_value(payload)?;
        let (record, event) = {
            let mut engine = self.inner.engine.lock().unwrap();
            engine.request_replace(payload, &options)
        };
        self.inner.persist();
        self.inner.host.commit_in_place(&record, url)?;
        self.inner.notify(&event);
        Ok(record.node)
    }

    /// Requests the host to move one entry back. State catches up through
    /// the resulting traversal signal.
    pub fn back(&self) -> Result<()> {
        self.go(-1)
    }

    /// Requests the host to move one entry forward.
    pub fn forward(&self) -> Result<()> {
        self.go(1)
    }

    /// Requests the host to move its cursor by `delta` steps.
    pub fn go(&self, delta: isize) -> Result<()> {
        self.inner.host.travel(delta)?;
        Ok(())
    }

    /// Marks a node as a dead-end that will be silently bypassed the next
    /// time a traversal lands on it. Unknown ids are a silent no-op.
    pub fn seal(&self, id: &NodeId) {
        let changed = self.inner.engine.lock().unwrap().seal(id);
        if changed {
            self.inner.persist();
        }
    }

    /// Clears the sealed flag on a node. Unknown ids are a silent no-op.
    pub fn unseal(&self, id: &NodeId) {
        let changed = self.inner.engine.lock().unwrap().unseal(id);
        if changed {
            self.inner.persist();
        }
    }

    /// Seals every node in an affinity group; returns how many changed.
    pub fn seal_affinity(&self, group: &str) -> usize {
        let changed = self.inner.engine.lock().unwrap().seal_affinity(group);
        if changed > 0 {
            self.inner.persist();
        }
        changed
    }

    /// Unseals every node in an affinity group; returns how many changed.
    pub fn unseal_affinity(&self, group: &str) -> usize {
        let changed = self.inner.engine.lock().unwrap().unseal_affinity(group);
        if changed > 0 {
            self.inner.persist();
        }
        changed
    }

    /// Registers a traversal-event callback, dispatched synchronously after
    /// every completed cursor movement.
    pub fn subscribe(
        &self,
        callback: impl Fn(&TraversalEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .lock()
            .unwrap()
            .insert(id, Arc::new(callback));
        SubscriptionId(id)
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.lock().unwrap().remove(&id.0).is_some()
    }

    /// An immutable snapshot of the node array.
    pub fn nodes(&self) -> Vec<Node> {
        self.inner.engine.lock().unwrap().nodes().to_vec()
    }

    /// The engine's cursor into the node array.
    pub fn cursor(&self) -> usize {
        self.inner.engine.lock().unwrap().cursor()
    }

    /// The node currently under the cursor.
    pub fn current_node(&self) -> Node {
        self.inner.engine.lock().unwrap().current().clone()
    }

    /// Finds the first node matching a predicate.
    pub fn find_node(&self, predicate: impl Fn(&Node) -> bool) -> Option<Node> {
        self.inner.engine.lock().unwrap().find(predicate).cloned()
    }

    /// Finds a node by id.
    pub fn find_by_id(&self, id: &NodeId) -> Option<Node> {
        self.inner.engine.lock().unwrap().find_by_id(id).cloned()
    }

    /// Returns the node at a live index.
    pub fn node_at(&self, index: usize) -> Option<Node> {
        self.inner.engine.lock().unwrap().get(index).cloned()
    }

    /// The first node of an affinity group, the "jump back to group
    /// origin" target.
    pub fn affinity_origin(&self, group: &str) -> Option<Node> {
        self.inner
            .engine
            .lock()
            .unwrap()
            .affinity_origin(group)
            .cloned()
    }
}

impl NavigatorInternal {
    /// Processes one host signal to completion. A corrective move issued
    /// here is queued by the shim and arrives as a later, distinct call.
    fn handle_signal(&self, signal: HostSignal) {
        match signal {
            HostSignal::Traversed(record) => {
                let outcome = {
                    let mut engine = self.engine.lock().unwrap();
                    engine.reconcile(record.as_ref().map(|r| &r.node.id))
                };
                match outcome {
                    Reconciliation::Settled(event) => self.notify(&event),
                    Reconciliation::Unmoved => {}
                    Reconciliation::Unmanaged(event) => self.notify(&event),
                    Reconciliation::Corrective { delta } => {
                        if let Err(err) = self.host.travel(delta) {
                            tracing::warn!(%err, delta, "corrective move rejected by host");
                        }
                    }
                }
            }
            HostSignal::CommittedOutside {
                payload,
                url,
                replace,
            } => {
                let (record, event) = {
                    let mut engine = self.engine.lock().unwrap();
                    if replace {
                        engine.intercepted_replace(payload, &PushOptions::default())
                    } else {
                        engine.intercepted_push(payload, &PushOptions::default())
                    }
                };
                self.persist();
                // Stamp the shadow node onto the foreign entry so later
                // traversals can resolve it.
                if let Err(err) = self.host.commit_in_place(&record, url.as_deref()) {
                    tracing::warn!(%err, "failed to stamp intercepted entry");
                }
                self.notify(&event);
            }
        }
    }

    /// Persists the node array, degrading to in-memory-only on failure.
    fn persist(&self) {
        let nodes = self.engine.lock().unwrap().nodes().to_vec();
        if let Err(err) = self.store.save(&nodes) {
            tracing::warn!(%err, "session store write failed; continuing with in-memory state only");
        }
    }

    /// Dispatches an event to every subscriber. Callbacks run outside the
    /// registry lock so they may subscribe/unsubscribe freely.
    fn notify(&self, event: &TraversalEvent) {
        let callbacks: Vec<TraversalCallback> =
            self.subscribers.lock().unwrap().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }
}
