//! Test inserting records and finding them again.

use crate::e2e_tests::helpers::TestSession;
use crate::session::SessionError;
use crate::tree::{TraversalOrder, TreeError};

#[test]
fn test_insert_then_find() {
    let mut t = TestSession::new();

    assert_eq!(t.ok("insert abc q1w2"), "inserted abc");
    assert_eq!(t.ok("insert xyz e3r4"), "inserted xyz");
    assert_eq!(t.ok("find abc"), "abc = q1w2");
    assert_eq!(t.ok("find xyz"), "xyz = e3r4");
    assert_eq!(t.ok("size"), "2");
    t.assert_valid();
}

#[test]
fn test_find_missing_key() {
    let mut t = TestSession::new();
    t.ok("insert abc q1w2");

    assert!(matches!(
        t.run("find zzz"),
        Err(SessionError::Tree(TreeError::NotFound))
    ));
}

#[test]
fn test_insert_existing_key_overwrites() {
    let mut t = TestSession::new();
    t.ok("insert abc first");

    assert_eq!(t.ok("insert abc second"), "inserted abc (replaced first)");
    assert_eq!(t.ok("find abc"), "abc = second");
    assert_eq!(t.ok("size"), "1");
}

#[test]
fn test_values_may_contain_spaces() {
    let mut t = TestSession::new();
    t.ok("insert key a longer value");
    assert_eq!(t.ok("find key"), "key = a longer value");
}

#[test]
fn test_list_orders() {
    let mut t = TestSession::new();
    for key in ["d", "b", "f", "a", "c", "e", "g"] {
        t.ok(&format!("insert {key} {key}{key}"));
    }

    assert_eq!(t.keys(TraversalOrder::InOrder), ["a", "b", "c", "d", "e", "f", "g"]);
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["d", "b", "a", "c", "f", "e", "g"]);
    assert_eq!(t.keys(TraversalOrder::LevelOrder), ["d", "b", "f", "a", "c", "e", "g"]);
    assert_eq!(t.ok("list rev").lines().next(), Some("g gg"));
    assert_eq!(t.ok("height"), "2");
}
