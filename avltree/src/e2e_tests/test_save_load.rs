//! Test saving a tree to disk and loading it back.

use crate::e2e_tests::helpers::TestSession;
use crate::session::{Command, SessionError};
use crate::snapshot::SnapshotError;
use crate::tree::TraversalOrder;

#[test]
fn test_save_then_load_in_new_session() {
    let mut t = TestSession::new();
    for i in 1..=31 {
        t.ok(&format!("insert {i:03} value{i}"));
    }
    let saved = t.ok("save");
    assert!(saved.starts_with("saved 31 records"), "{saved}");

    let mut other = t.sibling();
    let loaded = other.execute(Command::Load(None)).expect("load");
    assert!(loaded.starts_with("loaded 31 records"), "{loaded}");

    let original: Vec<_> = t.session.tree().traverse(TraversalOrder::PreOrder).collect();
    let restored: Vec<_> = other.tree().traverse(TraversalOrder::PreOrder).collect();
    assert_eq!(original, restored);
    other.tree().check_invariants().expect("invariants");
}

#[test]
fn test_save_to_explicit_path() {
    let mut t = TestSession::new();
    t.ok("insert abc q1w2");
    let path = t.path("elsewhere.bst");

    t.ok(&format!("save {}", path.display()));
    assert!(path.is_file());

    t.ok("insert xyz e3r4");
    t.ok(&format!("load {}", path.display()));
    assert_eq!(t.ok("size"), "1");
}

#[test]
fn test_load_missing_file_keeps_tree() {
    let mut t = TestSession::new();
    t.ok("insert abc q1w2");

    assert!(matches!(
        t.run("load"),
        Err(SessionError::Snapshot(SnapshotError::Io(_)))
    ));
    assert_eq!(t.ok("find abc"), "abc = q1w2");
}

#[test]
fn test_corrupt_snapshot_is_rejected() {
    let mut t = TestSession::new();
    for key in ["m", "f", "t"] {
        t.ok(&format!("insert {key} x"));
    }
    let path = t.path("corrupt.bst");
    t.ok(&format!("save {}", path.display()));

    let mut bytes = std::fs::read(&path).expect("read snapshot");
    let last = bytes.len() - 1;
    bytes[last] ^= 0xff;
    std::fs::write(&path, &bytes).expect("write snapshot");

    t.ok("insert z y");
    assert!(matches!(
        t.run(&format!("load {}", path.display())),
        Err(SessionError::Snapshot(SnapshotError::RecordChecksum { index: 2, .. }))
    ));
    assert_eq!(t.ok("size"), "4");
}
