//! Line-oriented command interpreter over a string-keyed tree.
//!
//! The binary reads one command per line and hands it to [`Session`]; the
//! session owns the tree and answers with the text to print.

use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::render::render;
use crate::snapshot::{self, SnapshotError};
use crate::tree::{AvlTree, TraversalOrder, TreeError};

/// Alphabet for generated keys.
const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
/// Alphabet for generated values.
const VALUE_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const GENERATED_KEY_LEN: usize = 3;
const GENERATED_VALUE_LEN: usize = 4;

/// Snapshot order used by `save`.
const SAVE_ORDER: TraversalOrder = TraversalOrder::LevelOrder;

pub const HELP: &str = "\
commands:
  insert <key> <value>    add a record, or overwrite the value of an existing key
  delete <key>            remove a record
  find <key>              look up a value
  update <key> <value>    overwrite the value of an existing key
  rekey <old> <new>       move a record to a new key
  list [in|rev|pre|level] print records in the given order (default: in)
  show                    draw the tree
  size                    number of records
  height                  height of the tree
  save [path]             write a snapshot (default: configured path)
  load [path]             replace the tree with a snapshot
  generate <count>        insert random records
  help                    print this message
  quit                    leave the shell";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert { key: String, value: String },
    Delete { key: String },
    Find { key: String },
    Update { key: String, value: String },
    Rekey { from: String, to: String },
    List(TraversalOrder),
    Show,
    Size,
    Height,
    Save(Option<PathBuf>),
    Load(Option<PathBuf>),
    Generate(usize),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line.
    ///
    /// Words are separated by whitespace. The value of `insert` and `update`
    /// is the rest of the line, so it may contain spaces.
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "insert" => {
                let (key, value) = key_and_value(rest, "insert <key> <value>")?;
                Self::Insert { key, value }
            }
            "update" => {
                let (key, value) = key_and_value(rest, "update <key> <value>")?;
                Self::Update { key, value }
            }
            "delete" => Self::Delete {
                key: single(rest, "delete <key>")?,
            },
            "find" => Self::Find {
                key: single(rest, "find <key>")?,
            },
            "rekey" => match words(rest).as_slice() {
                [from, to] => Self::Rekey {
                    from: (*from).to_string(),
                    to: (*to).to_string(),
                },
                _ => return Err(usage("rekey <old> <new>")),
            },
            "list" => Self::List(match words(rest).as_slice() {
                [] | ["in"] => TraversalOrder::InOrder,
                ["rev"] => TraversalOrder::ReverseInOrder,
                ["pre"] => TraversalOrder::PreOrder,
                ["level"] => TraversalOrder::LevelOrder,
                _ => return Err(usage("list [in|rev|pre|level]")),
            }),
            "save" => Self::Save(optional_path(rest, "save [path]")?),
            "load" => Self::Load(optional_path(rest, "load [path]")?),
            "generate" => match single(rest, "generate <count>")?.parse::<usize>() {
                Ok(count) if count > 0 => Self::Generate(count),
                _ => return Err(usage("generate <count>")),
            },
            "show" | "size" | "height" | "help" | "quit" | "exit" if !rest.is_empty() => {
                return Err(SessionError::InvalidCommand(format!(
                    "'{word}' takes no arguments"
                )));
            }
            "show" => Self::Show,
            "size" => Self::Size,
            "height" => Self::Height,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "" => return Err(SessionError::InvalidCommand("empty command".to_string())),
            other => {
                return Err(SessionError::InvalidCommand(format!(
                    "unknown command '{other}', type 'help' for a list"
                )));
            }
        };
        Ok(command)
    }

    /// Whether executing this command can change the tree.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Insert { .. }
                | Self::Delete { .. }
                | Self::Update { .. }
                | Self::Rekey { .. }
                | Self::Load(_)
                | Self::Generate(_)
        )
    }
}

fn words(rest: &str) -> Vec<&str> {
    rest.split_whitespace().collect()
}

fn usage(form: &str) -> SessionError {
    SessionError::InvalidCommand(format!("usage: {form}"))
}

fn single(rest: &str, form: &str) -> Result<String, SessionError> {
    match words(rest).as_slice() {
        [only] => Ok((*only).to_string()),
        _ => Err(usage(form)),
    }
}

fn key_and_value(rest: &str, form: &str) -> Result<(String, String), SessionError> {
    rest.split_once(char::is_whitespace)
        .map(|(key, value)| (key.to_string(), value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .ok_or_else(|| usage(form))
}

fn optional_path(rest: &str, form: &str) -> Result<Option<PathBuf>, SessionError> {
    match words(rest).as_slice() {
        [] => Ok(None),
        [path] => Ok(Some(PathBuf::from(path))),
        _ => Err(usage(form)),
    }
}

/// Error returned by [`Command::parse`] and [`Session::execute`].
#[derive(Debug)]
pub enum SessionError {
    /// The input line is not a valid command.
    InvalidCommand(String),
    /// The tree rejected the operation.
    Tree(TreeError),
    /// Saving or loading a snapshot failed.
    Snapshot(SnapshotError),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCommand(message) => write!(f, "invalid command: {message}"),
            Self::Tree(e) => write!(f, "{e}"),
            Self::Snapshot(e) => write!(f, "snapshot error: {e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCommand(_) => None,
            Self::Tree(e) => Some(e),
            Self::Snapshot(e) => Some(e),
        }
    }
}

impl From<TreeError> for SessionError {
    fn from(e: TreeError) -> Self {
        Self::Tree(e)
    }
}

impl From<SnapshotError> for SessionError {
    fn from(e: SnapshotError) -> Self {
        Self::Snapshot(e)
    }
}

/// An interactive session over one tree.
#[derive(Debug)]
pub struct Session {
    tree: AvlTree<String, String>,
    config: Config,
    rng: StdRng,
}

impl Session {
    /// Create a session with an empty tree.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
        Self {
            tree: AvlTree::new(),
            config,
            rng,
        }
    }

    /// The tree this session operates on.
    #[must_use]
    pub const fn tree(&self) -> &AvlTree<String, String> {
        &self.tree
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Draw the tree with the configured render options.
    #[must_use]
    pub fn render(&self) -> String {
        render(&self.tree, &self.config.render_options())
    }

    /// Execute one command and return the text to print.
    ///
    /// A failed command leaves the tree unchanged.
    pub fn execute(&mut self, command: Command) -> Result<String, SessionError> {
        match command {
            Command::Insert { key, value } => {
                let message = format!("inserted {key}");
                Ok(match self.tree.insert(key, value) {
                    Some(previous) => format!("{message} (replaced {previous})"),
                    None => message,
                })
            }
            Command::Delete { key } => {
                let value = self.tree.delete(key.as_str())?;
                Ok(format!("deleted {key} ({value})"))
            }
            Command::Find { key } => {
                let start = Instant::now();
                let found = self.tree.find(key.as_str());
                tracing::debug!(key = %key, elapsed = ?start.elapsed(), "lookup");
                Ok(format!("{key} = {}", found?))
            }
            Command::Update { key, value } => {
                let previous = self.tree.update(key.as_str(), value)?;
                Ok(format!("updated {key} (was {previous})"))
            }
            Command::Rekey { from, to } => {
                let message = format!("moved {from} to {to}");
                self.tree.rekey(from.as_str(), to)?;
                Ok(message)
            }
            Command::List(order) => Ok(self.list(order)),
            Command::Show => Ok(self.render()),
            Command::Size => Ok(self.tree.len().to_string()),
            Command::Height => Ok(self
                .tree
                .height()
                .map_or_else(|| "empty".to_string(), |h| h.to_string())),
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.config.snapshot_path.clone());
                snapshot::save_to_path(&self.tree, &path, SAVE_ORDER)?;
                Ok(format!("saved {} records to {}", self.tree.len(), path.display()))
            }
            Command::Load(path) => {
                let path = path.unwrap_or_else(|| self.config.snapshot_path.clone());
                self.tree = snapshot::load_from_path(&path)?;
                Ok(format!("loaded {} records from {}", self.tree.len(), path.display()))
            }
            Command::Generate(count) => Ok(self.generate(count)),
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok("bye".to_string()),
        }
    }

    fn list(&self, order: TraversalOrder) -> String {
        if self.tree.is_empty() {
            return "(empty)".to_string();
        }
        self.tree
            .traverse(order)
            .map(|(key, value)| format!("{key} {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Insert `count` random records. Keys that collide overwrite.
    fn generate(&mut self, count: usize) -> String {
        let before = self.tree.len();
        for _ in 0..count {
            let key = random_word(&mut self.rng, KEY_ALPHABET, GENERATED_KEY_LEN);
            let value = random_word(&mut self.rng, VALUE_ALPHABET, GENERATED_VALUE_LEN);
            self.tree.insert(key, value);
        }
        let added = self.tree.len() - before;
        tracing::info!(count, added, "generated records");
        format!("generated {count} records ({added} new keys)")
    }
}

fn random_word(rng: &mut StdRng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| char::from(alphabet[rng.random_range(0..alphabet.len())]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Session {
        Session::new(Config {
            seed: Some(7),
            ..Config::default()
        })
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("insert abc q1w2").expect("insert"),
            Command::Insert {
                key: "abc".to_string(),
                value: "q1w2".to_string()
            }
        );
        assert_eq!(
            Command::parse("  update abc two words ").expect("update"),
            Command::Update {
                key: "abc".to_string(),
                value: "two words".to_string()
            }
        );
        assert_eq!(
            Command::parse("REKEY abc xyz").expect("rekey"),
            Command::Rekey {
                from: "abc".to_string(),
                to: "xyz".to_string()
            }
        );
        assert_eq!(
            Command::parse("list").expect("list"),
            Command::List(TraversalOrder::InOrder)
        );
        assert_eq!(
            Command::parse("list level").expect("list level"),
            Command::List(TraversalOrder::LevelOrder)
        );
        assert_eq!(Command::parse("save").expect("save"), Command::Save(None));
        assert_eq!(
            Command::parse("load /tmp/t.bst").expect("load"),
            Command::Load(Some(PathBuf::from("/tmp/t.bst")))
        );
        assert_eq!(
            Command::parse("generate 25").expect("generate"),
            Command::Generate(25)
        );
        assert_eq!(Command::parse("quit").expect("quit"), Command::Quit);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for line in [
            "",
            "   ",
            "fly away",
            "insert abc",
            "delete",
            "delete a b",
            "rekey abc",
            "list sideways",
            "generate zero",
            "generate 0",
            "size 3",
            "save a b",
        ] {
            assert!(
                matches!(Command::parse(line), Err(SessionError::InvalidCommand(_))),
                "{line:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_mutating_commands() {
        assert!(Command::Delete { key: "a".to_string() }.is_mutation());
        assert!(Command::Generate(1).is_mutation());
        assert!(!Command::Show.is_mutation());
        assert!(!Command::Save(None).is_mutation());
    }

    #[test]
    fn test_execute_basic_commands() {
        let mut session = seeded();
        for key in ["mmm", "ccc", "xxx"] {
            let command = Command::parse(&format!("insert {key} v{key}")).expect("parse");
            session.execute(command).expect("insert");
        }

        assert_eq!(session.execute(Command::Size).expect("size"), "3");
        assert_eq!(session.execute(Command::Height).expect("height"), "1");
        assert_eq!(
            session
                .execute(Command::Find { key: "ccc".to_string() })
                .expect("find"),
            "ccc = vccc"
        );
        assert_eq!(
            session
                .execute(Command::List(TraversalOrder::ReverseInOrder))
                .expect("list"),
            "xxx vxxx\nmmm vmmm\nccc vccc"
        );
    }

    #[test]
    fn test_failed_commands_report_tree_errors() {
        let mut session = seeded();
        assert!(matches!(
            session.execute(Command::Find { key: "nope".to_string() }),
            Err(SessionError::Tree(TreeError::NotFound))
        ));
        session
            .execute(Command::Insert {
                key: "a".to_string(),
                value: "1".to_string(),
            })
            .expect("insert");
        session
            .execute(Command::Insert {
                key: "b".to_string(),
                value: "2".to_string(),
            })
            .expect("insert");
        assert!(matches!(
            session.execute(Command::Rekey {
                from: "a".to_string(),
                to: "b".to_string()
            }),
            Err(SessionError::Tree(TreeError::KeyExists))
        ));
        assert_eq!(session.tree().len(), 2);
    }

    #[test]
    fn test_generate_is_deterministic_with_seed() {
        let mut first = seeded();
        let mut second = seeded();
        first.execute(Command::Generate(50)).expect("generate");
        second.execute(Command::Generate(50)).expect("generate");

        let a: Vec<_> = first.tree().iter().collect();
        let b: Vec<_> = second.tree().iter().collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
        for (key, value) in first.tree() {
            assert_eq!(key.len(), GENERATED_KEY_LEN);
            assert!(key.bytes().all(|b| b.is_ascii_lowercase()));
            assert_eq!(value.len(), GENERATED_VALUE_LEN);
            assert!(value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
        }
        first.tree().check_invariants().expect("invariants");
    }

    #[test]
    fn test_empty_tree_output() {
        let mut session = seeded();
        assert_eq!(session.execute(Command::Height).expect("height"), "empty");
        assert_eq!(
            session
                .execute(Command::List(TraversalOrder::InOrder))
                .expect("list"),
            "(empty)"
        );
        assert!(session.render().contains("- EMPTY"));
    }
}
