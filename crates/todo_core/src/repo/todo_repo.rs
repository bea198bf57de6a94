//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and substring search over the `todos` table.
//! - Allocate monotonically increasing ids for new items.
//!
//! # Invariants
//! - List/search results are ordered by `created_at DESC, id DESC`.
//! - Batch inserts are all-or-nothing.
//! - A seed batch and the seed-completed flag commit together or not at all.
//! - `update`/`delete` on an unknown id fail with `NotFound` and change nothing.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{DbError, DbHandle};
use crate::model::todo::{NewTodo, Todo, TodoId};
use crate::repo::launch_flag::set_seed_completed;
use crate::search::substring::CONTAINS_FN;
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    created_at,
    is_completed
FROM todos";

const TODO_ORDER_SQL: &str = "ORDER BY created_at DESC, id DESC";

const TODO_INSERT_SQL: &str = "INSERT INTO todos (
    id,
    title,
    description,
    created_at,
    is_completed
) VALUES (?1, ?2, ?3, ?4, ?5);";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying storage failure (I/O, constraint, corruption, lock).
    Db(DbError),
    /// Update/delete target does not exist.
    NotFound(TodoId),
    InvalidData(String),
    /// The largest stored id is `i64::MAX`; no successor exists.
    IdOverflow,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::IdOverflow => write!(f, "todo id space exhausted"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::IdOverflow => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for todo CRUD and search.
pub trait TodoRepository: Send + Sync {
    /// Returns every item, most recently created first.
    fn fetch_all(&self) -> RepoResult<Vec<Todo>>;
    /// Inserts one item using its caller-supplied id.
    fn create(&self, todo: &Todo) -> RepoResult<()>;
    /// Inserts all items or none of them.
    fn create_batch(&self, todos: &[Todo]) -> RepoResult<()>;
    /// Inserts the first-launch batch and marks the seed completed in one step.
    ///
    /// Either every item is stored and the launch flag is set, or neither.
    /// The flag written here is the one read by the `LaunchFlag` sharing this
    /// repository's database.
    fn create_seed_batch(&self, todos: &[Todo]) -> RepoResult<()>;
    /// Replaces all mutable fields of the item with `todo.id`.
    fn update(&self, todo: &Todo) -> RepoResult<()>;
    /// Removes the item permanently.
    fn delete(&self, id: TodoId) -> RepoResult<()>;
    /// Case-insensitive substring search over title and description.
    ///
    /// An empty query behaves like [`TodoRepository::fetch_all`].
    fn search(&self, query: &str) -> RepoResult<Vec<Todo>>;
    /// Returns `max(id) + 1`, or `1` for an empty store.
    ///
    /// Read failures (including an exhausted id space) fall back to `1`
    /// instead of erroring.
    fn next_id(&self) -> TodoId;

    /// Allocates an id for `draft` and inserts it.
    ///
    /// The default runs [`next_id`](Self::next_id) then [`create`](Self::create)
    /// as two steps; implementations backed by shared storage should override
    /// it to run both under one lock.
    fn create_next(&self, draft: &NewTodo, created_at: i64) -> RepoResult<Todo> {
        let todo = draft.clone().into_todo(self.next_id(), created_at);
        self.create(&todo)?;
        Ok(todo)
    }
}

/// SQLite-backed todo repository.
#[derive(Clone)]
pub struct SqliteTodoRepository {
    db: DbHandle,
}

impl SqliteTodoRepository {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }
}

impl TodoRepository for SqliteTodoRepository {
    fn fetch_all(&self) -> RepoResult<Vec<Todo>> {
        let sql = format!("{TODO_SELECT_SQL} {TODO_ORDER_SQL};");
        self.db.with_conn(|conn| query_todos(conn, &sql, []))
    }

    fn create(&self, todo: &Todo) -> RepoResult<()> {
        self.db.with_conn(|conn| insert_todo(conn, todo))?;
        debug!("event=todo_create module=repo status=ok id={}", todo.id);
        Ok(())
    }

    fn create_batch(&self, todos: &[Todo]) -> RepoResult<()> {
        self.db.with_conn(|conn| -> RepoResult<()> {
            let tx = conn.transaction()?;
            for todo in todos {
                insert_todo(&tx, todo)?;
            }
            tx.commit()?;
            Ok(())
        })?;
        debug!(
            "event=todo_create_batch module=repo status=ok count={}",
            todos.len()
        );
        Ok(())
    }

    fn create_seed_batch(&self, todos: &[Todo]) -> RepoResult<()> {
        self.db.with_conn(|conn| -> RepoResult<()> {
            let tx = conn.transaction()?;
            for todo in todos {
                insert_todo(&tx, todo)?;
            }
            set_seed_completed(&tx)?;
            tx.commit()?;
            Ok(())
        })?;
        debug!(
            "event=todo_create_seed_batch module=repo status=ok count={}",
            todos.len()
        );
        Ok(())
    }

    fn update(&self, todo: &Todo) -> RepoResult<()> {
        let changed = self.db.with_conn(|conn| -> RepoResult<usize> {
            Ok(conn.execute(
                "UPDATE todos
                 SET
                    title = ?1,
                    description = ?2,
                    created_at = ?3,
                    is_completed = ?4
                 WHERE id = ?5;",
                params![
                    todo.title.as_str(),
                    todo.description.as_str(),
                    todo.created_at,
                    todo.is_completed,
                    todo.id,
                ],
            )?)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }
        Ok(())
    }

    fn delete(&self, id: TodoId) -> RepoResult<()> {
        let changed = self.db.with_conn(|conn| -> RepoResult<usize> {
            Ok(conn.execute("DELETE FROM todos WHERE id = ?1;", [id])?)
        })?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn search(&self, query: &str) -> RepoResult<Vec<Todo>> {
        if query.is_empty() {
            return self.fetch_all();
        }

        let sql = format!(
            "{TODO_SELECT_SQL}
             WHERE {CONTAINS_FN}(title, ?1) OR {CONTAINS_FN}(description, ?1)
             {TODO_ORDER_SQL};"
        );
        self.db.with_conn(|conn| query_todos(conn, &sql, [query]))
    }

    fn next_id(&self) -> TodoId {
        match self.db.with_conn(|conn| max_id_plus_one(conn)) {
            Ok(id) => id,
            Err(err) => {
                warn!("event=todo_next_id module=repo status=fallback next_id=1 error={err}");
                1
            }
        }
    }

    fn create_next(&self, draft: &NewTodo, created_at: i64) -> RepoResult<Todo> {
        let todo = self.db.with_conn(|conn| -> RepoResult<Todo> {
            let tx = conn.transaction()?;
            let id = match max_id_plus_one(&tx) {
                Ok(id) => id,
                Err(RepoError::IdOverflow) => return Err(RepoError::IdOverflow),
                Err(err) => {
                    warn!("event=todo_next_id module=repo status=fallback next_id=1 error={err}");
                    1
                }
            };
            let todo = draft.clone().into_todo(id, created_at);
            insert_todo(&tx, &todo)?;
            tx.commit()?;
            Ok(todo)
        })?;
        debug!("event=todo_create module=repo status=ok id={}", todo.id);
        Ok(todo)
    }
}

fn insert_todo(conn: &Connection, todo: &Todo) -> RepoResult<()> {
    conn.execute(
        TODO_INSERT_SQL,
        params![
            todo.id,
            todo.title.as_str(),
            todo.description.as_str(),
            todo.created_at,
            todo.is_completed,
        ],
    )?;
    Ok(())
}

fn max_id_plus_one(conn: &Connection) -> RepoResult<TodoId> {
    let max_id: Option<TodoId> =
        conn.query_row("SELECT MAX(id) FROM todos;", [], |row| row.get(0))?;
    match max_id {
        None => Ok(1),
        Some(id) => id.checked_add(1).ok_or(RepoError::IdOverflow),
    }
}

fn query_todos(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> RepoResult<Vec<Todo>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut todos = Vec::new();

    while let Some(row) = rows.next()? {
        todos.push(parse_todo_row(row)?);
    }

    Ok(todos)
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in todos.is_completed"
            )));
        }
    };

    Ok(Todo {
        id: row.get("id")?,
        title: row.get::<_, Option<String>>("title")?.unwrap_or_default(),
        description: row
            .get::<_, Option<String>>("description")?
            .unwrap_or_default(),
        created_at: row.get("created_at")?,
        is_completed,
    })
}
