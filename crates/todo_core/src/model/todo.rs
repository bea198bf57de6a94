//! To-do item domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted by the store and shown by lists.
//! - Provide constructors carrying the model defaults.
//!
//! # Invariants
//! - `id` never changes after creation.
//! - Absent `title`/`description` are represented by empty strings.
//! - `created_at` is Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store identifier of a to-do item.
pub type TodoId = i64;

/// Canonical to-do record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_completed: bool,
}

impl Todo {
    /// Creates an open item with empty description, stamped with the current time.
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            created_at: now_epoch_ms(),
            is_completed: false,
        }
    }

    /// Returns a copy with `is_completed` flipped; other fields untouched.
    pub fn toggled(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }
}

/// Caller input for a brand-new item; the store picks the id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Materializes the draft under an allocated id.
    pub fn into_todo(self, id: TodoId, created_at: i64) -> Todo {
        Todo {
            id,
            title: self.title,
            description: self.description,
            created_at,
            is_completed: false,
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
///
/// Clocks set before 1970 collapse to `0` instead of failing.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
