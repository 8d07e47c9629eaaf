//! Shared setup factories for the integration suite.

use std::sync::{Arc, Mutex};

use serde_json::json;
use waymark::host::SimHost;
use waymark::store::InMemory;
use waymark::{Navigator, NodeId, PushOptions, TraversalEvent};

/// Opens a navigator over a fresh simulated host and in-memory store.
pub fn open_navigator() -> (Navigator, Arc<SimHost>, Arc<InMemory>) {
    let host = Arc::new(SimHost::new());
    let store = Arc::new(InMemory::new());
    let nav = Navigator::open(host.clone(), store.clone()).expect("navigator should open");
    (nav, host, store)
}

/// Subscribes a collector and returns the shared event log.
pub fn record_events(nav: &Navigator) -> Arc<Mutex<Vec<TraversalEvent>>> {
    let events: Arc<Mutex<Vec<TraversalEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    nav.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

/// Pushes one entry per label and returns all node ids, initial node first.
pub fn push_chain(nav: &Navigator, labels: &[&str]) -> Vec<NodeId> {
    let mut ids = vec![nav.node_at(0).expect("initial node").id];
    for label in labels {
        let node = nav
            .push(json!({ "label": label }), None, PushOptions::new())
            .expect("push should succeed");
        ids.push(node.id);
    }
    ids
}
