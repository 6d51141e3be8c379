//! Test deleting records.

use crate::e2e_tests::helpers::TestSession;
use crate::session::SessionError;
use crate::tree::{TraversalOrder, TreeError};

#[test]
fn test_delete_missing_key_changes_nothing() {
    let mut t = TestSession::new();
    for key in ["m", "f", "t", "b"] {
        t.ok(&format!("insert {key} x"));
    }
    let before = t.keys(TraversalOrder::LevelOrder);

    assert!(matches!(
        t.run("delete zzz"),
        Err(SessionError::Tree(TreeError::NotFound))
    ));
    assert_eq!(t.keys(TraversalOrder::LevelOrder), before);
    assert_eq!(t.ok("size"), "4");
}

#[test]
fn test_delete_until_empty() {
    let mut t = TestSession::new();
    let keys: Vec<String> = (0..40).map(|i| format!("k{i:02}")).collect();
    for key in &keys {
        t.ok(&format!("insert {key} v"));
    }

    for key in keys.iter().rev() {
        t.ok(&format!("delete {key}"));
        t.assert_valid();
    }

    assert_eq!(t.ok("size"), "0");
    assert_eq!(t.ok("height"), "empty");
    assert_eq!(t.ok("list"), "(empty)");
    assert!(t.ok("show").contains("- EMPTY"));
}

#[test]
fn test_delete_inner_node_keeps_order() {
    let mut t = TestSession::new();
    for key in ["d", "b", "f", "a", "c", "e", "g"] {
        t.ok(&format!("insert {key} x"));
    }

    t.ok("delete b");
    t.ok("delete f");
    assert_eq!(t.keys(TraversalOrder::InOrder), ["a", "c", "d", "e", "g"]);
    t.assert_valid();
}
