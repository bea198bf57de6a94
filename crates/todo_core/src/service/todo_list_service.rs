//! Todo list use-case service.
//!
//! # Responsibility
//! - Run the one-time remote seed on first launch.
//! - Expose fetch/search/toggle/delete/create/update with one outcome each.
//! - Tag failures with the channel a UI reports them on.
//!
//! # Invariants
//! - A failed seed persists nothing and leaves the launch flag unset.
//! - The seed runs at most once per database, even under concurrent callers.
//! - The service keeps no item cache; every read goes to the repository.
//! - Titles blank after trimming are rejected before reaching the store.

use crate::model::todo::{now_epoch_ms, NewTodo, Todo, TodoId};
use crate::repo::launch_flag::LaunchFlag;
use crate::repo::todo_repo::{RepoError, TodoRepository};
use crate::seed::{SeedError, SeedItem, SeedSource};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Which UI channel a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureChannel {
    /// The list could not be loaded.
    Fetch,
    /// A list action (toggle/delete) failed.
    Operation,
    /// A detail create/update failed.
    Save,
    /// Caller input was rejected before any storage call.
    Input,
}

impl FailureChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Operation => "operation",
            Self::Save => "save",
            Self::Input => "input",
        }
    }
}

/// Underlying cause wrapped by a [`ServiceError`].
#[derive(Debug)]
pub enum FailureCause {
    Store(RepoError),
    Seed(SeedError),
}

impl Display for FailureCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Seed(err) => write!(f, "{err}"),
        }
    }
}

impl From<RepoError> for FailureCause {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

impl From<SeedError> for FailureCause {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

/// Service error for list/detail use-cases.
#[derive(Debug)]
pub enum ServiceError {
    FetchFailed(FailureCause),
    OperationFailed(FailureCause),
    SaveFailed(FailureCause),
    /// Title is empty after trimming surrounding whitespace.
    EmptyTitle,
}

impl ServiceError {
    pub fn channel(&self) -> FailureChannel {
        match self {
            Self::FetchFailed(_) => FailureChannel::Fetch,
            Self::OperationFailed(_) => FailureChannel::Operation,
            Self::SaveFailed(_) => FailureChannel::Save,
            Self::EmptyTitle => FailureChannel::Input,
        }
    }

    /// Returns whether the failure came from an unknown item id.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.cause(),
            Some(FailureCause::Store(RepoError::NotFound(_)))
        )
    }

    pub fn cause(&self) -> Option<&FailureCause> {
        match self {
            Self::FetchFailed(cause) | Self::OperationFailed(cause) | Self::SaveFailed(cause) => {
                Some(cause)
            }
            Self::EmptyTitle => None,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed(cause) => write!(f, "failed to load todos: {cause}"),
            Self::OperationFailed(cause) => write!(f, "todo action failed: {cause}"),
            Self::SaveFailed(cause) => write!(f, "failed to save todo: {cause}"),
            Self::EmptyTitle => write!(f, "todo title cannot be empty"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.cause()? {
            FailureCause::Store(err) => Some(err),
            FailureCause::Seed(err) => Some(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case service over a todo repository, launch flag and seed source.
pub struct TodoListService<R, F, S>
where
    R: TodoRepository,
    F: LaunchFlag,
    S: SeedSource,
{
    repo: R,
    launch_flag: F,
    seed_source: S,
    seed_gate: Mutex<()>,
}

impl<R, F, S> TodoListService<R, F, S>
where
    R: TodoRepository,
    F: LaunchFlag,
    S: SeedSource,
{
    pub fn new(repo: R, launch_flag: F, seed_source: S) -> Self {
        Self {
            repo,
            launch_flag,
            seed_source,
            seed_gate: Mutex::new(()),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Loads the list, seeding from the remote source on first launch.
    ///
    /// # Contract
    /// - Not first launch: same as [`fetch_todos`](Self::fetch_todos).
    /// - First launch: fetch seed, persist it and set the flag in one
    ///   transaction, then read back from the store.
    /// - Any seed/storage failure returns `FetchFailed` with nothing persisted
    ///   and the flag still unset, so the next call retries.
    pub fn load_initial(&self) -> ServiceResult<Vec<Todo>> {
        if !self.first_launch()? {
            return self.fetch_todos();
        }

        {
            let _gate = self
                .seed_gate
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // Another caller may have finished the seed while we waited.
            if self.first_launch()? {
                self.run_seed()?;
            }
        }

        self.fetch_todos()
    }

    /// Returns every stored item, most recent first.
    pub fn fetch_todos(&self) -> ServiceResult<Vec<Todo>> {
        self.repo.fetch_all().map_err(|err| {
            error!("event=todos_fetch module=service status=error error={err}");
            ServiceError::FetchFailed(err.into())
        })
    }

    /// Returns items whose title or description contains `query`.
    ///
    /// An empty query is the same as [`fetch_todos`](Self::fetch_todos).
    pub fn search_todos(&self, query: &str) -> ServiceResult<Vec<Todo>> {
        if query.is_empty() {
            return self.fetch_todos();
        }
        self.repo.search(query).map_err(|err| {
            error!("event=todos_search module=service status=error error={err}");
            ServiceError::FetchFailed(err.into())
        })
    }

    /// Flips completion on a copy of `todo` and persists it.
    pub fn toggle_complete(&self, todo: &Todo) -> ServiceResult<Todo> {
        let updated = todo.toggled();
        self.repo.update(&updated).map_err(|err| {
            warn!(
                "event=todo_toggle module=service status=error id={} error={err}",
                todo.id
            );
            ServiceError::OperationFailed(err.into())
        })?;
        Ok(updated)
    }

    /// Deletes one item permanently and echoes its id.
    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<TodoId> {
        self.repo.delete(id).map_err(|err| {
            warn!("event=todo_delete module=service status=error id={id} error={err}");
            ServiceError::OperationFailed(err.into())
        })?;
        Ok(id)
    }

    /// Creates one item under the next free id.
    pub fn create_todo(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> ServiceResult<Todo> {
        let draft = NewTodo::new(title, description);
        validate_title(&draft.title)?;

        let todo = self
            .repo
            .create_next(&draft, now_epoch_ms())
            .map_err(|err| {
                error!("event=todo_create module=service status=error error={err}");
                ServiceError::SaveFailed(err.into())
            })?;
        info!("event=todo_create module=service status=ok id={}", todo.id);
        Ok(todo)
    }

    /// Replaces the mutable fields of an existing item.
    pub fn update_todo(&self, todo: &Todo) -> ServiceResult<Todo> {
        validate_title(&todo.title)?;
        self.repo.update(todo).map_err(|err| {
            error!(
                "event=todo_update module=service status=error id={} error={err}",
                todo.id
            );
            ServiceError::SaveFailed(err.into())
        })?;
        Ok(todo.clone())
    }

    fn first_launch(&self) -> ServiceResult<bool> {
        self.launch_flag
            .is_first_launch()
            .map_err(|err| ServiceError::FetchFailed(err.into()))
    }

    fn run_seed(&self) -> ServiceResult<()> {
        info!("event=seed_run module=service status=start");
        let items = self.seed_source.fetch_seed_items().map_err(|err| {
            error!("event=seed_run module=service status=error stage=fetch error={err}");
            ServiceError::FetchFailed(err.into())
        })?;

        let created_at = now_epoch_ms();
        let todos = items
            .into_iter()
            .map(|item| seed_item_to_todo(item, created_at))
            .collect::<Vec<_>>();

        self.repo.create_seed_batch(&todos).map_err(|err| {
            error!("event=seed_run module=service status=error stage=persist error={err}");
            ServiceError::FetchFailed(err.into())
        })?;

        info!(
            "event=seed_run module=service status=ok count={}",
            todos.len()
        );
        Ok(())
    }
}

/// Rejects titles that are empty after trimming surrounding whitespace.
pub fn validate_title(title: &str) -> ServiceResult<()> {
    if title.trim().is_empty() {
        return Err(ServiceError::EmptyTitle);
    }
    Ok(())
}

/// Maps a remote record onto a local item, keeping the remote id.
pub fn seed_item_to_todo(item: SeedItem, created_at: i64) -> Todo {
    Todo {
        id: item.id,
        title: item.todo,
        description: String::new(),
        created_at,
        is_completed: item.completed,
    }
}

#[cfg(test)]
mod tests {
    use super::{seed_item_to_todo, validate_title, FailureChannel, ServiceError};
    use crate::seed::SeedItem;

    #[test]
    fn validate_title_rejects_whitespace_only() {
        assert!(matches!(
            validate_title(" \n\t "),
            Err(ServiceError::EmptyTitle)
        ));
        assert!(validate_title("  Buy milk ").is_ok());
    }

    #[test]
    fn seed_mapping_keeps_remote_id_and_clears_description() {
        let item = SeedItem {
            id: 42,
            todo: "Water plants".to_string(),
            completed: true,
            user_id: 7,
        };

        let todo = seed_item_to_todo(item, 1_700_000_000_000);
        assert_eq!(todo.id, 42);
        assert_eq!(todo.title, "Water plants");
        assert_eq!(todo.description, "");
        assert_eq!(todo.created_at, 1_700_000_000_000);
        assert!(todo.is_completed);
    }

    #[test]
    fn empty_title_is_reported_on_input_channel() {
        assert_eq!(ServiceError::EmptyTitle.channel(), FailureChannel::Input);
        assert_eq!(FailureChannel::Operation.as_str(), "operation");
    }
}
