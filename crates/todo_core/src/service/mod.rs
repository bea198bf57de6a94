//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and seed-source calls into list/detail use-cases.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod list_view;
pub mod todo_list_service;
