//! Operation generator for deterministic simulation testing.
//!
//! Produces random but reproducible sequences of tree operations. Keys are
//! drawn from a bounded pool so inserts collide with existing records and
//! deletes, updates and rekeys hit present keys often.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Configuration for operation generation.
///
/// Weights are relative; an operation with weight 0 is never generated.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Keys are drawn from `0..key_space`.
    pub key_space: u64,
    pub insert_weight: u32,
    pub delete_weight: u32,
    pub find_weight: u32,
    pub update_weight: u32,
    pub rekey_weight: u32,
    /// Weight of a snapshot round trip.
    pub snapshot_weight: u32,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            key_space: 256,
            insert_weight: 40,
            delete_weight: 25,
            find_weight: 15,
            update_weight: 8,
            rekey_weight: 10,
            snapshot_weight: 2,
        }
    }
}

impl OperationGenConfig {
    /// Workload dominated by inserts, so the tree grows large.
    #[must_use]
    pub fn insert_heavy() -> Self {
        Self {
            insert_weight: 80,
            delete_weight: 5,
            ..Self::default()
        }
    }

    /// Workload that repeatedly grows and drains the tree.
    #[must_use]
    pub fn delete_heavy() -> Self {
        Self {
            key_space: 64,
            insert_weight: 35,
            delete_weight: 45,
            ..Self::default()
        }
    }

    const fn total_weight(&self) -> u32 {
        self.insert_weight
            + self.delete_weight
            + self.find_weight
            + self.update_weight
            + self.rekey_weight
            + self.snapshot_weight
    }
}

/// One generated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert { key: u64, value: u64 },
    Delete { key: u64 },
    Find { key: u64 },
    Update { key: u64, value: u64 },
    Rekey { from: u64, to: u64 },
    /// Export the tree to snapshot bytes and rebuild it from them.
    SnapshotRoundTrip { level_order: bool },
}

/// Generator for random [`Operation`]s.
///
/// Produces the same sequence for the same seed and configuration.
#[derive(Debug)]
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
}

impl OperationGenerator {
    /// Create a new generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OperationGenConfig::default())
    }

    /// Create a new generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &OperationGenConfig {
        &self.config
    }

    fn key(&mut self) -> u64 {
        self.rng.random_range(0..self.config.key_space.max(1))
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> Operation {
        let total = self.config.total_weight().max(1);
        let mut pick = self.rng.random_range(0..total);

        let weights = [
            self.config.insert_weight,
            self.config.delete_weight,
            self.config.find_weight,
            self.config.update_weight,
            self.config.rekey_weight,
        ];
        let mut slot = weights.len();
        for (i, weight) in weights.into_iter().enumerate() {
            if pick < weight {
                slot = i;
                break;
            }
            pick -= weight;
        }

        match slot {
            0 => Operation::Insert {
                key: self.key(),
                value: self.rng.random(),
            },
            1 => Operation::Delete { key: self.key() },
            2 => Operation::Find { key: self.key() },
            3 => Operation::Update {
                key: self.key(),
                value: self.rng.random(),
            },
            4 => Operation::Rekey {
                from: self.key(),
                to: self.key(),
            },
            _ => Operation::SnapshotRoundTrip {
                level_order: self.rng.random::<bool>(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = OperationGenerator::new(99);
        let mut b = OperationGenerator::new(99);
        for _ in 0..200 {
            assert_eq!(a.next_operation(), b.next_operation());
        }
    }

    #[test]
    fn test_keys_stay_in_key_space() {
        let config = OperationGenConfig {
            key_space: 8,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(3, config);
        for _ in 0..500 {
            match generator.next_operation() {
                Operation::Insert { key, .. }
                | Operation::Delete { key }
                | Operation::Find { key }
                | Operation::Update { key, .. } => assert!(key < 8),
                Operation::Rekey { from, to } => assert!(from < 8 && to < 8),
                Operation::SnapshotRoundTrip { .. } => {}
            }
        }
    }

    #[test]
    fn test_zero_weight_is_never_generated() {
        let config = OperationGenConfig {
            delete_weight: 0,
            rekey_weight: 0,
            snapshot_weight: 0,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(11, config);
        for _ in 0..1000 {
            let op = generator.next_operation();
            assert!(
                !matches!(
                    op,
                    Operation::Delete { .. }
                        | Operation::Rekey { .. }
                        | Operation::SnapshotRoundTrip { .. }
                ),
                "unexpected {op:?}"
            );
        }
    }
}
