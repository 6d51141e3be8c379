//! Test the random record generator.

use crate::e2e_tests::helpers::TestSession;
use crate::tree::TraversalOrder;

#[test]
fn test_generate_builds_valid_tree() {
    let mut t = TestSession::new();
    let output = t.ok("generate 199");
    assert!(output.starts_with("generated 199 records"), "{output}");

    t.assert_valid();
    let size: usize = t.ok("size").parse().expect("size is a number");
    assert!(size > 150 && size <= 199, "size {size}");
}

#[test]
fn test_generate_is_reproducible() {
    let mut a = TestSession::new();
    let mut b = TestSession::new();
    a.ok("generate 50");
    b.ok("generate 50");
    assert_eq!(a.keys(TraversalOrder::LevelOrder), b.keys(TraversalOrder::LevelOrder));
}

#[test]
fn test_generated_tree_survives_save_and_load() {
    let mut t = TestSession::new();
    t.ok("generate 120");
    let before = t.keys(TraversalOrder::LevelOrder);

    t.ok("save");
    t.ok("generate 10");
    t.ok("load");

    assert_eq!(t.keys(TraversalOrder::LevelOrder), before);
    t.assert_valid();
}
