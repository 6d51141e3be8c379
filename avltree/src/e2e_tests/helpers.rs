//! Common helpers for end-to-end tests.

use std::path::PathBuf;

use tempfile::TempDir;

use crate::config::Config;
use crate::session::{Command, Session, SessionError};
use crate::tree::TraversalOrder;

/// A session whose snapshot path lives in a private temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TestSession {
    pub session: Session,
    dir: TempDir,
}

impl TestSession {
    /// Create a session with a fixed seed and a fresh snapshot directory.
    #[must_use]
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            snapshot_path: dir.path().join("data").join("saved_tree.bst"),
            seed: Some(2024),
            ..Config::default()
        };
        Self {
            session: Session::new(config),
            dir,
        }
    }

    /// Create a second session sharing this one's snapshot path.
    #[must_use]
    pub fn sibling(&self) -> Session {
        Session::new(self.session.config().clone())
    }

    /// Path of a file inside the temporary directory.
    #[must_use]
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Parse and execute one command line.
    pub fn run(&mut self, line: &str) -> Result<String, SessionError> {
        let command = Command::parse(line)?;
        self.session.execute(command)
    }

    /// Parse and execute one command line that must succeed.
    pub fn ok(&mut self, line: &str) -> String {
        self.run(line)
            .unwrap_or_else(|e| panic!("{line:?} failed: {e}"))
    }

    /// Keys in the given order.
    #[must_use]
    pub fn keys(&self, order: TraversalOrder) -> Vec<String> {
        self.session
            .tree()
            .traverse(order)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Assert the tree is a valid AVL tree.
    pub fn assert_valid(&self) {
        self.session
            .tree()
            .check_invariants()
            .expect("tree invariants must hold");
    }
}
