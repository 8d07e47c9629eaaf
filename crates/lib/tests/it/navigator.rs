//! End-to-end flows through the facade, host, and store

use serde_json::json;
use waymark::host::HostStack;
use waymark::{PushOptions, TraversalKind};

use crate::helpers::{open_navigator, push_chain, record_events};

#[test]
fn test_push_chain_builds_stack() {
    // Cold start then push A, B, C: four nodes, cursor on the last.
    let (nav, host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C"]);

    assert_eq!(nav.nodes().len(), 4);
    assert_eq!(nav.cursor(), 3);
    assert_eq!(nav.current_node().id, ids[3]);
    assert_eq!(host.len(), 4);
    assert_eq!(host.cursor(), 3);
}

#[test]
fn test_multi_step_jump_reports_full_path() {
    let (nav, _host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C"]);
    let events = record_events(&nav);

    // Host jumps two entries back in one move, landing on A.
    nav.go(-2).unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.kind, TraversalKind::Pop);
    assert_eq!(event.delta, -2);
    let path: Vec<_> = event.traversal.iter().map(|n| n.id.clone()).collect();
    assert_eq!(path, vec![ids[3].clone(), ids[2].clone(), ids[1].clone()]);
    assert_eq!(event.current.as_ref().unwrap().id, ids[1]);
    assert_eq!(nav.cursor(), 1);
}

#[test]
fn test_push_after_back_truncates_forward_history() {
    let (nav, host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C"]);

    nav.go(-2).unwrap();
    let d = nav.push(json!("D"), None, PushOptions::new()).unwrap();

    assert_eq!(nav.nodes().len(), 3);
    assert_eq!(nav.cursor(), 2);
    assert_eq!(nav.current_node().id, d.id);
    assert!(nav.find_by_id(&ids[2]).is_none());
    assert!(nav.find_by_id(&ids[3]).is_none());
    // Host history truncated the same way.
    assert_eq!(host.len(), 3);
    assert_eq!(host.active().unwrap().node.id, d.id);
}

#[test]
fn test_intercepted_push_is_mirrored_and_stamped() {
    let (nav, host, _store) = open_navigator();
    push_chain(&nav, &["A"]);
    let events = record_events(&nav);

    // Outside code pushes raw state directly against the host.
    host.external_push(json!({"foreign": true}), Some("/foreign"));

    assert_eq!(nav.cursor(), 2);
    assert_eq!(nav.nodes().len(), 3);
    let current = nav.current_node();
    assert_eq!(current.source, waymark::NodeSource::Intercepted);

    // The shadow node was stamped back onto the foreign entry.
    let active = host.active().expect("entry should carry a record now");
    assert_eq!(active.node.id, current.id);
    assert_eq!(active.payload, json!({"foreign": true}));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TraversalKind::Push);
    assert_eq!(events[0].delta, 1);
}

#[test]
fn test_intercepted_replace_keeps_length() {
    let (nav, host, _store) = open_navigator();
    push_chain(&nav, &["A"]);
    let before = nav.current_node();
    let events = record_events(&nav);

    host.external_replace(json!({"patched": 1}), None);

    assert_eq!(nav.nodes().len(), 2);
    assert_eq!(nav.cursor(), 1);
    let current = nav.current_node();
    assert_ne!(current.id, before.id, "replace creates a fresh node");
    assert_eq!(host.active().unwrap().node.id, current.id);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, TraversalKind::Replace);
    assert_eq!(events[0].delta, 0);
}

#[test]
fn test_landing_on_foreign_entry_degrades_to_anonymous_event() {
    let host = std::sync::Arc::new(waymark::host::SimHost::new());
    let store = std::sync::Arc::new(waymark::store::InMemory::new());

    // Two entries exist before Waymark attaches; only the active one gets
    // adopted by the cold start.
    host.external_push(json!({"legacy": 1}), None);
    host.external_push(json!({"legacy": 2}), None);
    let nav = waymark::Navigator::open(host.clone(), store).unwrap();
    let events = record_events(&nav);

    // Back onto the never-adopted entry.
    nav.back().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert!(events[0].current.is_none());
    assert!(events[0].traversal.is_empty());
    // The engine's cursor did not chase the unmanaged entry.
    assert_eq!(nav.cursor(), 0);
}

#[test]
fn test_affinity_group_bulk_operations() {
    let (nav, _host, _store) = open_navigator();
    let opts = PushOptions::new().with_affinity("modals");
    let first = nav.push(json!("m1"), None, opts.clone()).unwrap();
    nav.push(json!("m2"), None, opts).unwrap();
    nav.push(json!("other"), None, PushOptions::new()).unwrap();

    assert_eq!(nav.seal_affinity("modals"), 2);
    assert_eq!(nav.seal_affinity("modals"), 0);
    assert_eq!(nav.affinity_origin("modals").unwrap().id, first.id);
    assert_eq!(nav.unseal_affinity("modals"), 2);
    assert_eq!(nav.seal_affinity("nothing"), 0);
}

#[test]
fn test_metadata_lookup_finds_callers_node() {
    // Callers re-identify "their" node through metadata, without having
    // seen the generated id up front.
    let (nav, _host, _store) = open_navigator();
    let pushed = nav
        .push(
            json!("data"),
            None,
            PushOptions::new().with_metadata("dialog", json!("confirm-delete")),
        )
        .unwrap();

    let found = nav
        .find_node(|n| n.metadata.get("dialog") == Some(&json!("confirm-delete")))
        .expect("metadata lookup should find the node");
    assert_eq!(found.id, pushed.id);
}
