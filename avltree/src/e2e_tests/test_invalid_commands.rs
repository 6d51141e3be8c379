//! Test that malformed input is rejected without touching the tree.

use crate::e2e_tests::helpers::TestSession;
use crate::session::{HELP, SessionError};

#[test]
fn test_invalid_commands_are_reported() {
    let mut t = TestSession::new();
    t.ok("insert abc q1w2");

    for line in ["", "frobnicate", "insert onlykey", "delete", "list upside-down", "generate -3"] {
        assert!(
            matches!(t.run(line), Err(SessionError::InvalidCommand(_))),
            "{line:?} should be invalid"
        );
    }
    assert_eq!(t.ok("size"), "1");
}

#[test]
fn test_help_lists_commands() {
    let mut t = TestSession::new();
    assert_eq!(t.ok("help"), HELP);
    assert!(HELP.contains("rekey <old> <new>"));
}
