//! Remote seed source contracts.
//!
//! # Responsibility
//! - Describe the one-time initial batch pulled from a remote API.
//! - Keep transport details behind the [`SeedSource`] trait.
//!
//! # Invariants
//! - A source either returns the complete first page or fails; it never
//!   yields partial batches.

pub mod http;

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SeedResult<T> = Result<T, SeedError>;

/// Failure kinds surfaced by seed sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    /// Transport failure, timeout, non-success status or unreadable body.
    Network(String),
    /// Response body does not match the expected envelope.
    MalformedResponse(String),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "seed request failed: {message}"),
            Self::MalformedResponse(message) => write!(f, "malformed seed response: {message}"),
        }
    }
}

impl Error for SeedError {}

/// One remote record as delivered by the seed API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedItem {
    pub id: i64,
    pub todo: String,
    pub completed: bool,
    pub user_id: i64,
}

/// Source of the initial item batch.
pub trait SeedSource: Send + Sync {
    fn fetch_seed_items(&self) -> SeedResult<Vec<SeedItem>>;
}

impl<T: SeedSource + ?Sized> SeedSource for &T {
    fn fetch_seed_items(&self) -> SeedResult<Vec<SeedItem>> {
        (**self).fetch_seed_items()
    }
}
