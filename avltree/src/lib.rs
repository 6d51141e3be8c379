// Test code is allowed to use expect() and unwrap() for convenience.
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

//! A height-balanced (AVL) binary search tree with snapshot persistence,
//! a text renderer, and an interactive command shell.
//!
//! - [`tree`]: the balancing engine and ordered traversals
//! - [`snapshot`]: checksummed on-disk snapshots of a tree
//! - [`render`]: sideways text diagrams
//! - [`session`]: the command interpreter behind the binary
//! - [`config`]: environment-variable configuration
//! - [`simulation`]: seeded randomized testing against a model map

pub mod config;
pub mod render;
pub mod session;
pub mod simulation;
pub mod snapshot;
pub mod tree;

mod e2e_tests;
