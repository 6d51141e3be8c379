//! Test changing a record's value and moving it to a new key.

use crate::e2e_tests::helpers::TestSession;
use crate::session::SessionError;
use crate::tree::{TraversalOrder, TreeError};

#[test]
fn test_update_existing_value() {
    let mut t = TestSession::new();
    t.ok("insert abc old");

    assert_eq!(t.ok("update abc new"), "updated abc (was old)");
    assert_eq!(t.ok("find abc"), "abc = new");
}

#[test]
fn test_update_missing_key_is_rejected() {
    let mut t = TestSession::new();
    assert!(matches!(
        t.run("update abc new"),
        Err(SessionError::Tree(TreeError::NotFound))
    ));
    assert_eq!(t.ok("size"), "0");
}

#[test]
fn test_rekey_moves_record() {
    let mut t = TestSession::new();
    for key in ["b", "a", "c"] {
        t.ok(&format!("insert {key} v{key}"));
    }

    assert_eq!(t.ok("rekey a z"), "moved a to z");
    assert_eq!(t.ok("find z"), "z = va");
    assert_eq!(t.keys(TraversalOrder::InOrder), ["b", "c", "z"]);
    t.assert_valid();
}

#[test]
fn test_rekey_conflicts_leave_tree_unchanged() {
    let mut t = TestSession::new();
    for key in ["b", "a", "c"] {
        t.ok(&format!("insert {key} v{key}"));
    }

    assert!(matches!(
        t.run("rekey a c"),
        Err(SessionError::Tree(TreeError::KeyExists))
    ));
    assert!(matches!(
        t.run("rekey q r"),
        Err(SessionError::Tree(TreeError::NotFound))
    ));
    assert_eq!(t.ok("find a"), "a = va");
    assert_eq!(t.ok("find c"), "c = vc");
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["b", "a", "c"]);
}
