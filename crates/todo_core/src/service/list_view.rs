//! Transient list state held by a list screen.
//!
//! # Invariants
//! - Items are a display copy only; `refresh` always re-reads the store.
//! - An empty search query means "show everything".

use crate::model::todo::{Todo, TodoId};
use crate::repo::launch_flag::LaunchFlag;
use crate::repo::todo_repo::TodoRepository;
use crate::seed::SeedSource;
use crate::service::todo_list_service::{ServiceResult, TodoListService};

/// Items currently displayed plus the active search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListView {
    items: Vec<Todo>,
    search_query: String,
}

impl TodoListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn todo_at(&self, index: usize) -> Option<&Todo> {
        self.items.get(index)
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    pub fn replace_all(&mut self, items: Vec<Todo>) {
        self.items = items;
    }

    /// Replaces the displayed copy of `todo` and returns its row index.
    ///
    /// Returns `None` when the item is not on screen.
    pub fn apply_updated(&mut self, todo: Todo) -> Option<usize> {
        let index = self.index_of(todo.id)?;
        self.items[index] = todo;
        Some(index)
    }

    /// Drops the row for `id` and returns its former index.
    pub fn apply_deleted(&mut self, id: TodoId) -> Option<usize> {
        let index = self.index_of(id)?;
        self.items.remove(index);
        Some(index)
    }

    /// Re-reads the list for the active query and replaces the items.
    ///
    /// On failure the previous items are kept.
    pub fn refresh<R, F, S>(&mut self, service: &TodoListService<R, F, S>) -> ServiceResult<()>
    where
        R: TodoRepository,
        F: LaunchFlag,
        S: SeedSource,
    {
        let items = if self.search_query.is_empty() {
            service.fetch_todos()?
        } else {
            service.search_todos(&self.search_query)?
        };
        self.items = items;
        Ok(())
    }

    fn index_of(&self, id: TodoId) -> Option<usize> {
        self.items.iter().position(|todo| todo.id == id)
    }
}
