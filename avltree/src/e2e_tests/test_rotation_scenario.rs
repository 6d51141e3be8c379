//! Test the rotation triggered by ascending inserts and the successor
//! promotion on deleting the root.

use crate::e2e_tests::helpers::TestSession;
use crate::tree::TraversalOrder;

#[test]
fn test_ascending_inserts_then_delete_root() {
    let mut t = TestSession::new();
    for key in ["10", "20", "30"] {
        t.ok(&format!("insert {key} v{key}"));
    }

    assert_eq!(t.keys(TraversalOrder::PreOrder), ["20", "10", "30"]);
    assert_eq!(t.ok("height"), "1");

    assert_eq!(t.ok("delete 20"), "deleted 20 (v20)");
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["30", "10"]);
    assert_eq!(t.ok("height"), "1");
    assert_eq!(t.ok("size"), "2");
    t.assert_valid();
}

#[test]
fn test_show_draws_rotated_tree() {
    let mut t = TestSession::new();
    for key in ["10", "20", "30"] {
        t.ok(&format!("insert {key} v{key}"));
    }

    let drawing = t.ok("show");
    let lines: Vec<&str> = drawing.lines().collect();
    assert_eq!(
        lines,
        [
            "+----UPPER-+",
            "|     /-30 |",
            "| -20      |",
            "|     \\-10 |",
            "+----LOWER-+",
        ]
    );
}

#[test]
fn test_descending_inserts_rotate_right() {
    let mut t = TestSession::new();
    for key in ["c", "b", "a"] {
        t.ok(&format!("insert {key} x"));
    }
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["b", "a", "c"]);
}

#[test]
fn test_double_rotations() {
    let mut t = TestSession::new();
    for key in ["a", "c", "b"] {
        t.ok(&format!("insert {key} x"));
    }
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["b", "a", "c"]);

    let mut t = TestSession::new();
    for key in ["c", "a", "b"] {
        t.ok(&format!("insert {key} x"));
    }
    assert_eq!(t.keys(TraversalOrder::PreOrder), ["b", "a", "c"]);
}
