// src/snapshot/mod.rs
// =============================================================================
// This module turns a repository into one bounded block of text.
//
// Submodules:
// - budget: Size limits and char-accurate truncation helpers
// - tree: Walks the directory structure and picks candidate files
// - assemble: Puts README, tree and file bodies together under the limits
// =============================================================================

mod assemble;
mod budget;
mod tree;

pub use assemble::{build_snapshot, Snapshot, SnapshotOptions};
pub use budget::Budgets;
