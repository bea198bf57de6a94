//! Substring search helpers shared by repositories.
//!
//! # Responsibility
//! - Define the case-insensitive containment rule used by todo search.
//! - Expose that rule to SQL as a scalar function.

pub mod substring;
