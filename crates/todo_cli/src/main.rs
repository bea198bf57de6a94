//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `todo_core` linkage.
//! - With a database path argument, open it and print stored todos.

use std::process::ExitCode;
use todo_core::{DbHandle, SqliteTodoRepository, TodoRepository};

fn main() -> ExitCode {
    println!("todo_core ping={}", todo_core::ping());
    println!("todo_core version={}", todo_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let todos = DbHandle::open(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|db| {
            SqliteTodoRepository::new(db)
                .fetch_all()
                .map_err(|err| err.to_string())
        });
    match todos {
        Ok(todos) => {
            println!("todos count={}", todos.len());
            for todo in todos {
                let mark = if todo.is_completed { "x" } else { " " };
                println!("[{mark}] {} {}", todo.id, todo.title);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("todo_core db={db_path} error={err}");
            ExitCode::FAILURE
        }
    }
}
