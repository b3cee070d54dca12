use crate::topology::node::{NodeCategory, NodeKey, NodeRegistry};
use crate::topology_error::TopologyError;

#[test]
fn new_id_is_one_past_largest_in_category() {
    let mut reg = NodeRegistry::new();
    assert_eq!(reg.new_id(NodeCategory::Permanent), 0);
    reg.permanent_or_insert(7);
    reg.permanent_or_insert(3);
    assert_eq!(reg.new_id(NodeCategory::Permanent), 8);
    // categories count independently
    assert_eq!(reg.new_id(NodeCategory::Embedded), 0);
    let e = reg.create(NodeCategory::Embedded, None);
    assert_eq!(reg.id(e).unwrap(), 0);
    assert_eq!(reg.new_id(NodeCategory::Embedded), 1);
}

#[test]
fn permanent_or_insert_reuses_existing_node() {
    let mut reg = NodeRegistry::new();
    let a = reg.permanent_or_insert(4);
    let b = reg.permanent_or_insert(4);
    assert_eq!(a, b);
    assert_eq!(reg.count(NodeCategory::Permanent), 1);
    assert_eq!(reg.lookup(NodeCategory::Permanent, 4), Some(a));
}

#[test]
fn create_records_parent() {
    let mut reg = NodeRegistry::new();
    let p = reg.permanent_or_insert(0);
    let t = reg.create(NodeCategory::Temp, Some(p));
    assert_eq!(reg.category(t).unwrap(), NodeCategory::Temp);
    assert_eq!(reg.parent(t), Some(p));
    reg.clear_parent(t).unwrap();
    assert_eq!(reg.parent(t), None);
}

#[test]
fn removed_key_stays_addressable() {
    let mut reg = NodeRegistry::new();
    let e = reg.create(NodeCategory::Embedded, None);
    assert!(reg.is_live(e));
    reg.remove(e).unwrap();
    assert!(!reg.is_live(e));
    assert_eq!(reg.node(e).unwrap().category(), NodeCategory::Embedded);
    assert_eq!(reg.count(NodeCategory::Embedded), 0);
    // the freed id is handed out again, under a fresh key
    let again = reg.create(NodeCategory::Embedded, None);
    assert_eq!(reg.id(again).unwrap(), reg.id(e).unwrap());
    assert_ne!(again, e);
}

#[test]
fn promotion_keeps_id_and_key() {
    let mut reg = NodeRegistry::new();
    let n = reg.permanent_or_insert(2);
    reg.promote_to_embedded_permanent(n).unwrap();
    assert_eq!(reg.category(n).unwrap(), NodeCategory::EmbeddedPermanent);
    assert_eq!(reg.id(n).unwrap(), 2);
    assert_eq!(reg.lookup(NodeCategory::Permanent, 2), None);
    assert_eq!(reg.lookup(NodeCategory::EmbeddedPermanent, 2), Some(n));
    // promoting twice is a no-op
    reg.promote_to_embedded_permanent(n).unwrap();
    assert_eq!(reg.count(NodeCategory::EmbeddedPermanent), 1);
}

#[test]
fn reset_keeps_embedded_nodes() {
    let mut reg = NodeRegistry::new();
    reg.permanent_or_insert(0);
    let p = reg.permanent_or_insert(1);
    reg.create(NodeCategory::Temp, Some(p));
    let e = reg.create(NodeCategory::Embedded, None);
    reg.reset();
    assert_eq!(reg.count(NodeCategory::Permanent), 0);
    assert_eq!(reg.count(NodeCategory::Temp), 0);
    assert!(reg.is_live(e));
}

#[test]
fn local_keys_are_not_in_the_arena() {
    let reg = NodeRegistry::new();
    let local = NodeKey::Local(3);
    assert_eq!(reg.category(local).unwrap(), NodeCategory::LocalIndex);
    assert_eq!(reg.id(local).unwrap(), 3);
    assert!(matches!(
        reg.node(local),
        Err(TopologyError::NodeNotFound { node }) if node == local
    ));
}

#[test]
fn id_cat_string_appends_suffix() {
    let mut reg = NodeRegistry::new();
    let p = reg.permanent_or_insert(5);
    let e = reg.create(NodeCategory::Embedded, None);
    assert_eq!(reg.id_cat_string(p).unwrap(), "5 ");
    assert_eq!(reg.id_cat_string(e).unwrap(), "0e");
    assert_eq!(reg.id_cat_string(NodeKey::Local(1)).unwrap(), "1l");
    assert_eq!(NodeKey::Global(9).to_string(), "@9");
}

#[test]
fn unknown_slot_is_reported() {
    let reg = NodeRegistry::new();
    let ghost = NodeKey::Global(7);
    assert_eq!(reg.id(ghost), Err(TopologyError::NodeNotFound { node: ghost }));
    assert_eq!(reg.category(ghost), Err(TopologyError::NodeNotFound { node: ghost }));
    assert!(reg.id_cat_string(ghost).is_err());
}

#[test]
fn temp_slots_are_recycled_after_clear_temp() {
    let mut reg = NodeRegistry::new();
    let p = reg.permanent_or_insert(0);
    let t0 = reg.create(NodeCategory::Temp, Some(p));
    let t1 = reg.create(NodeCategory::Temp, Some(p));
    assert_eq!(reg.capacity(), 3);

    reg.clear_temp();
    let e = reg.create(NodeCategory::Embedded, None);
    let t = reg.create(NodeCategory::Temp, Some(p));
    assert!([t0, t1].contains(&e) && [t0, t1].contains(&t));
    assert_eq!(reg.capacity(), 3);
    assert_eq!(reg.category(e).unwrap(), NodeCategory::Embedded);
    assert_eq!(reg.parent(t), Some(p));
    // the permanent node is never recycled
    reg.clear_temp();
    assert_eq!(reg.category(p).unwrap(), NodeCategory::Permanent);
}
