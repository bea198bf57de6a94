//! Core domain logic for the todo app.
//! This crate is the single source of truth for item storage and seeding.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbHandle};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::todo::{now_epoch_ms, NewTodo, Todo, TodoId};
pub use repo::launch_flag::{LaunchFlag, SqliteLaunchFlag};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use seed::http::{HttpSeedConfig, HttpSeedSource};
pub use seed::{SeedError, SeedItem, SeedResult, SeedSource};
pub use service::list_view::TodoListView;
pub use service::todo_list_service::{
    FailureCause, FailureChannel, ServiceError, ServiceResult, TodoListService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
