//! Deterministic simulation testing.
//!
//! Drives an [`AvlTree`](crate::tree::AvlTree) with seeded random operation
//! sequences and checks it against a `BTreeMap` model:
//! - every operation's outcome must match the model's
//! - the structural invariants hold after every operation
//! - the in-order contents equal the model's entries
//! - snapshot round trips preserve contents
//!
//! Given the same seed, execution is identical, so a failing seed reproduces.
//!
//! # Usage
//!
//! ```
//! use avltree::simulation::{Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::new(12345));
//! let result = sim.run(1000);
//!
//! assert!(result.passed(), "{:?}", result.divergence);
//! ```

mod operation_gen;
mod simulator;

pub use operation_gen::{Operation, OperationGenConfig, OperationGenerator};
pub use simulator::{Divergence, SimulationResult, Simulator, SimulatorConfig};
