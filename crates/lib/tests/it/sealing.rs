//! Sealed-bypass scenarios driven through a real host stack

use serde_json::json;
use waymark::{PushOptions, TraversalKind};

use crate::helpers::{open_navigator, push_chain, record_events};

#[test]
fn test_forward_bypass_skips_sealed_entries() {
    // [N0, A*, B*, C], cursor 0; moving forward onto sealed A redirects
    // to C with a single bypass-corrected notification.
    let (nav, host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C"]);
    nav.go(-3).unwrap();
    nav.seal(&ids[1]);
    nav.seal(&ids[2]);
    let events = record_events(&nav);

    nav.forward().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1, "bypass produces exactly one notification");
    let event = &events[0];
    assert_eq!(event.kind, TraversalKind::Pop);
    assert_eq!(event.delta, 3);
    assert_eq!(event.traversal.len(), 4);
    assert_eq!(event.current.as_ref().unwrap().id, ids[3]);
    assert_eq!(nav.cursor(), 3);
    assert_eq!(host.cursor(), 3);
}

#[test]
fn test_backward_bypass_lands_on_nearest_unsealed() {
    let (nav, host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C"]);
    nav.seal(&ids[1]);
    nav.seal(&ids[2]);
    let events = record_events(&nav);

    // From C, one step back lands on sealed B; nearest unsealed in the
    // travel direction is N0.
    nav.back().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].delta, -3);
    assert_eq!(events[0].current.as_ref().unwrap().id, ids[0]);
    assert_eq!(nav.cursor(), 0);
    assert_eq!(host.cursor(), 0);
}

#[test]
fn test_fully_sealed_direction_reverts_the_jump() {
    // [N0, A*], cursor 0; nothing unsealed forward of A: the jump is
    // exactly reversed and the user never sees a notification for A.
    let (nav, host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A"]);
    nav.go(-1).unwrap();
    nav.seal(&ids[1]);
    let events = record_events(&nav);

    nav.forward().unwrap();

    assert!(events.lock().unwrap().is_empty());
    assert_eq!(nav.cursor(), 0);
    assert_eq!(host.cursor(), 0);
    assert_eq!(nav.current_node().id, ids[0]);
}

#[test]
fn test_sealed_node_never_hosts_the_settled_cursor() {
    // Sealed-bypass law over a longer stack and both directions.
    let (nav, _host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B", "C", "D"]);
    nav.seal(&ids[2]);
    nav.seal(&ids[3]);

    nav.go(-2).unwrap(); // onto sealed B, backward: lands on A
    assert_eq!(nav.current_node().id, ids[1]);
    assert!(!nav.current_node().sealed);

    nav.go(2).unwrap(); // onto sealed C, forward: lands on D
    assert_eq!(nav.current_node().id, ids[4]);
    assert!(!nav.current_node().sealed);
}

#[test]
fn test_sealed_affinity_chain_is_bypassed_as_a_unit() {
    // A chain of stacked modals sealed in bulk behaves like a single
    // dead-end region: backing out of the chain crosses all of it.
    let (nav, _host, _store) = open_navigator();
    let base = push_chain(&nav, &["page"]);
    let opts = PushOptions::new().with_affinity("wizard");
    nav.push(json!("step-1"), None, opts.clone()).unwrap();
    nav.push(json!("step-2"), None, opts.clone()).unwrap();
    nav.push(json!("step-3"), None, opts).unwrap();

    nav.seal_affinity("wizard");
    let events = record_events(&nav);

    nav.back().unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].delta, -3);
    assert_eq!(events[0].current.as_ref().unwrap().id, base[1]);
    assert_eq!(nav.cursor(), 1);
}

#[test]
fn test_unseal_restores_landing_target() {
    let (nav, _host, _store) = open_navigator();
    let ids = push_chain(&nav, &["A", "B"]);
    nav.seal(&ids[1]);

    nav.go(-1).unwrap(); // sealed A: bypassed down to N0
    assert_eq!(nav.cursor(), 0);

    nav.unseal(&ids[1]);
    nav.forward().unwrap();
    assert_eq!(nav.current_node().id, ids[1], "unsealed node is reachable again");
}
