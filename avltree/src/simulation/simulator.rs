//! Main simulator harness for deterministic simulation testing.
//!
//! Applies generated operations to an [`AvlTree`] and to a `BTreeMap` model
//! side by side. After every operation the simulator compares the outcome
//! with the model, runs the structural invariant checker, and compares the
//! full in-order contents.

use std::collections::BTreeMap;

use crate::snapshot::{decode_snapshot, encode_snapshot};
use crate::tree::{AvlTree, TraversalOrder, TreeError};

use super::operation_gen::{Operation, OperationGenConfig, OperationGenerator};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Operation generation configuration.
    pub operation_config: OperationGenConfig,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            operation_config: OperationGenConfig::default(),
        }
    }

    /// Set the operation configuration.
    #[must_use]
    pub const fn with_operation_config(mut self, config: OperationGenConfig) -> Self {
        self.operation_config = config;
        self
    }
}

/// A point where the tree disagreed with the model or broke an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// Index of the operation that exposed the problem.
    pub operation_index: u64,
    pub operation: Operation,
    pub description: String,
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations applied.
    pub operations_processed: u64,
    /// Operations that succeeded on the tree.
    pub successful_operations: u64,
    /// Operations the tree rejected, such as deleting a missing key.
    pub failed_operations: u64,
    /// Largest number of records held at once.
    pub peak_len: usize,
    /// The first divergence found; the run stops there.
    pub divergence: Option<Divergence>,
}

impl SimulationResult {
    /// Check if the simulation passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.divergence.is_none()
    }
}

/// The simulator harness.
#[derive(Debug)]
pub struct Simulator {
    config: SimulatorConfig,
    generator: OperationGenerator,
    tree: AvlTree<u64, u64>,
    model: BTreeMap<u64, u64>,
    successful_operations: u64,
    failed_operations: u64,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let generator =
            OperationGenerator::with_config(config.seed, config.operation_config.clone());
        Self {
            config,
            generator,
            tree: AvlTree::new(),
            model: BTreeMap::new(),
            successful_operations: 0,
            failed_operations: 0,
        }
    }

    /// The tree under test.
    #[must_use]
    pub const fn tree(&self) -> &AvlTree<u64, u64> {
        &self.tree
    }

    /// Run the simulation for `operation_count` operations, stopping at the
    /// first divergence.
    pub fn run(&mut self, operation_count: u64) -> SimulationResult {
        let mut peak_len = 0;
        let mut processed = 0;
        let mut divergence = None;

        for index in 0..operation_count {
            let operation = self.generator.next_operation();
            processed += 1;

            if let Err(description) = self.apply(operation).and_then(|()| self.verify()) {
                tracing::warn!(seed = self.config.seed, index, ?operation, "{description}");
                divergence = Some(Divergence {
                    operation_index: index,
                    operation,
                    description,
                });
                break;
            }
            peak_len = peak_len.max(self.tree.len());
        }

        SimulationResult {
            seed: self.config.seed,
            operations_processed: processed,
            successful_operations: self.successful_operations,
            failed_operations: self.failed_operations,
            peak_len,
            divergence,
        }
    }

    fn record<T>(&mut self, outcome: &Result<T, TreeError>) {
        if outcome.is_ok() {
            self.successful_operations += 1;
        } else {
            self.failed_operations += 1;
        }
    }

    /// Apply one operation to both the tree and the model and compare their
    /// direct outcomes.
    fn apply(&mut self, operation: Operation) -> Result<(), String> {
        match operation {
            Operation::Insert { key, value } => {
                let got = self.tree.insert(key, value);
                let expected = self.model.insert(key, value);
                self.successful_operations += 1;
                check_eq("insert returned", got, expected)
            }
            Operation::Delete { key } => {
                let got = self.tree.delete(&key);
                self.record(&got);
                let expected = self.model.remove(&key).ok_or(TreeError::NotFound);
                check_eq("delete returned", got, expected)
            }
            Operation::Find { key } => {
                let got = self.tree.find(&key).copied();
                self.record(&got);
                let expected = self.model.get(&key).copied().ok_or(TreeError::NotFound);
                check_eq("find returned", got, expected)
            }
            Operation::Update { key, value } => {
                let got = self.tree.update(&key, value);
                self.record(&got);
                let expected = match self.model.get_mut(&key) {
                    Some(slot) => Ok(std::mem::replace(slot, value)),
                    None => Err(TreeError::NotFound),
                };
                check_eq("update returned", got, expected)
            }
            Operation::Rekey { from, to } => {
                let got = self.tree.rekey(&from, to);
                self.record(&got);
                let expected = match self.model.get(&from).copied() {
                    None => Err(TreeError::NotFound),
                    Some(_) if from == to => Ok(()),
                    Some(_) if self.model.contains_key(&to) => Err(TreeError::KeyExists),
                    Some(value) => {
                        self.model.remove(&from);
                        self.model.insert(to, value);
                        Ok(())
                    }
                };
                check_eq("rekey returned", got, expected)
            }
            Operation::SnapshotRoundTrip { level_order } => {
                let order = if level_order {
                    TraversalOrder::LevelOrder
                } else {
                    TraversalOrder::PreOrder
                };
                let bytes = encode_snapshot(&self.tree, order)
                    .map_err(|e| format!("encode failed: {e}"))?;
                let restored: AvlTree<u64, u64> =
                    decode_snapshot(&bytes).map_err(|e| format!("decode failed: {e}"))?;
                if level_order && restored.height() != self.tree.height() {
                    return Err(format!(
                        "level-order rebuild changed height from {:?} to {:?}",
                        self.tree.height(),
                        restored.height()
                    ));
                }
                self.tree = restored;
                self.successful_operations += 1;
                Ok(())
            }
        }
    }

    /// Check the tree's structure and contents against the model.
    fn verify(&self) -> Result<(), String> {
        self.tree
            .check_invariants()
            .map_err(|violation| format!("invariant violated: {violation}"))?;

        check_eq("len", self.tree.len(), self.model.len())?;

        let contents: Vec<(u64, u64)> = self.tree.iter().map(|(k, v)| (*k, *v)).collect();
        let expected: Vec<(u64, u64)> = self.model.iter().map(|(k, v)| (*k, *v)).collect();
        if contents != expected {
            return Err("in-order contents differ from the model".to_string());
        }

        let bound = height_bound(self.tree.len());
        match self.tree.height() {
            Some(height) if f64::from(height) > bound => Err(format!(
                "height {height} exceeds the AVL bound {bound:.2} for {} records",
                self.tree.len()
            )),
            _ => Ok(()),
        }
    }
}

/// Upper bound on the height of an AVL tree holding `len` records.
#[allow(clippy::cast_precision_loss)]
fn height_bound(len: usize) -> f64 {
    1.4405f64.mul_add((len as f64 + 2.0).log2(), -0.3277)
}

fn check_eq<T: PartialEq + std::fmt::Debug>(what: &str, got: T, expected: T) -> Result<(), String> {
    if got == expected {
        Ok(())
    } else {
        Err(format!("{what} {got:?}, model expected {expected:?}"))
    }
}
