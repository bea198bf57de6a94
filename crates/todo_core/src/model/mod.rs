//! Domain model for to-do items.
//!
//! # Invariants
//! - Every item is identified by a store-allocated `TodoId`.
//! - Deletion is permanent; there are no tombstones.

pub mod todo;
