//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list/detail use-cases to Dart via FRB as plain envelopes.
//! - Own the process-wide service instance and its database path.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Store-backed functions are non-`sync`: FRB runs them on its worker pool
//!   and Dart awaits a future, so the UI isolate never blocks on SQLite or HTTP.
//! - One `DbHandle` per process; every call goes through the same service.

use once_cell::sync::OnceCell;
use std::path::PathBuf;
use todo_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DbHandle, HttpSeedConfig, HttpSeedSource, ServiceError, SqliteLaunchFlag,
    SqliteTodoRepository, Todo, TodoListService,
};

const DB_FILE_NAME: &str = "todo_core.sqlite3";
const DB_PATH_ENV: &str = "TODO_DB_PATH";

type AppService = TodoListService<SqliteTodoRepository, SqliteLaunchFlag, HttpSeedSource>;

static DB_PATH: OnceCell<PathBuf> = OnceCell::new();
static SERVICE: OnceCell<AppService> = OnceCell::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat item shape handed to Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub created_at_ms: i64,
    pub is_completed: bool,
}

impl From<Todo> for TodoItemView {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title,
            description: todo.description,
            created_at_ms: todo.created_at,
            is_completed: todo.is_completed,
        }
    }
}

impl From<TodoItemView> for Todo {
    fn from(view: TodoItemView) -> Self {
        Self {
            id: view.id,
            title: view.title,
            description: view.description,
            created_at: view.created_at_ms,
            is_completed: view.is_completed,
        }
    }
}

/// List response envelope for load/fetch/search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoListResponse {
    pub ok: bool,
    pub items: Vec<TodoItemView>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Failure channel (`fetch|operation|save|input`); `None` on success.
    pub failure: Option<String>,
}

impl TodoListResponse {
    fn from_service(result: Result<Vec<Todo>, FfiFailure>) -> Self {
        match result {
            Ok(todos) => {
                let message = if todos.is_empty() {
                    "No todos.".to_string()
                } else {
                    format!("Loaded {} todo(s).", todos.len())
                };
                Self {
                    ok: true,
                    items: todos.into_iter().map(TodoItemView::from).collect(),
                    message,
                    failure: None,
                }
            }
            Err(failure) => Self {
                ok: false,
                items: Vec::new(),
                message: failure.to_string(),
                failure: Some(failure.channel().to_string()),
            },
        }
    }
}

/// Action response envelope for toggle/delete/create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoActionResponse {
    pub ok: bool,
    /// Created or updated item.
    pub item: Option<TodoItemView>,
    /// Id removed by a delete.
    pub deleted_id: Option<i64>,
    pub message: String,
    pub failure: Option<String>,
}

impl TodoActionResponse {
    fn item(message: &str, todo: Todo) -> Self {
        Self {
            ok: true,
            item: Some(todo.into()),
            deleted_id: None,
            message: message.to_string(),
            failure: None,
        }
    }

    fn deleted(id: i64) -> Self {
        Self {
            ok: true,
            item: None,
            deleted_id: Some(id),
            message: "Todo deleted.".to_string(),
            failure: None,
        }
    }

    fn failure(failure: FfiFailure) -> Self {
        Self {
            ok: false,
            item: None,
            deleted_id: None,
            message: failure.to_string(),
            failure: Some(failure.channel().to_string()),
        }
    }
}

/// Loads the list, seeding from the remote API on the first launch.
pub fn todos_load_initial() -> TodoListResponse {
    TodoListResponse::from_service(with_service(|service| service.load_initial()))
}

/// Reads every stored todo, most recent first.
pub fn todos_fetch() -> TodoListResponse {
    TodoListResponse::from_service(with_service(|service| service.fetch_todos()))
}

/// Case-insensitive substring search over title and description.
pub fn todos_search(query: String) -> TodoListResponse {
    TodoListResponse::from_service(with_service(|service| service.search_todos(&query)))
}

/// Flips completion of `item`.
pub fn todo_toggle_complete(item: TodoItemView) -> TodoActionResponse {
    let todo = Todo::from(item);
    match with_service(|service| service.toggle_complete(&todo)) {
        Ok(updated) => TodoActionResponse::item("Todo updated.", updated),
        Err(failure) => TodoActionResponse::failure(failure),
    }
}

/// Deletes one todo by id.
pub fn todo_delete(id: i64) -> TodoActionResponse {
    match with_service(|service| service.delete_todo(id)) {
        Ok(deleted_id) => TodoActionResponse::deleted(deleted_id),
        Err(failure) => TodoActionResponse::failure(failure),
    }
}

/// Creates a todo from the detail screen.
pub fn todo_create(title: String, description: String) -> TodoActionResponse {
    match with_service(|service| service.create_todo(title, description)) {
        Ok(created) => TodoActionResponse::item("Todo created.", created),
        Err(failure) => TodoActionResponse::failure(failure),
    }
}

/// Saves edits to an existing todo from the detail screen.
pub fn todo_update(item: TodoItemView) -> TodoActionResponse {
    let todo = Todo::from(item);
    match with_service(|service| service.update_todo(&todo)) {
        Ok(updated) => TodoActionResponse::item("Todo saved.", updated),
        Err(failure) => TodoActionResponse::failure(failure),
    }
}

/// Failure surfaced through envelopes.
enum FfiFailure {
    /// The database could not be opened.
    Setup(String),
    Service(ServiceError),
}

impl FfiFailure {
    fn channel(&self) -> &'static str {
        match self {
            Self::Setup(_) => "fetch",
            Self::Service(err) => err.channel().as_str(),
        }
    }
}

impl std::fmt::Display for FfiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup(message) => write!(f, "{message}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

fn with_service<T>(
    f: impl FnOnce(&AppService) -> Result<T, ServiceError>,
) -> Result<T, FfiFailure> {
    let service = SERVICE
        .get_or_try_init(open_service)
        .map_err(FfiFailure::Setup)?;
    f(service).map_err(FfiFailure::Service)
}

fn open_service() -> Result<AppService, String> {
    let db_path = resolve_db_path();
    let db = DbHandle::open(&db_path).map_err(|err| {
        log::error!("event=ffi_db_open module=ffi status=error error={err}");
        format!("todo DB open failed: {err}")
    })?;
    Ok(TodoListService::new(
        SqliteTodoRepository::new(db.clone()),
        SqliteLaunchFlag::new(db),
        HttpSeedSource::new(HttpSeedConfig::from_env()),
    ))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}
