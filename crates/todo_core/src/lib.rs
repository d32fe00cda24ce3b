//! Core of the todo list: record store, handlers and client state controller.
//! Presentation layers call into this crate and render what it returns.

pub mod app;
pub mod client;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use app::{AppError, AppResult, TodoApp};
pub use client::{
    ActionOutcome, ClientAction, ClientFailure, EditState, TodoApi, TodoController, TodoFilter,
    TodoStats,
};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{Todo, TodoId, TodoPatch, TodoValidationError, TITLE_MAX_CHARS};
pub use repo::todo_repo::{RepoError, RepoResult, SqliteTodoRepository, TodoRepository};
pub use service::todo_service::{
    CreateTodoInput, DeleteTodoInput, DeleteTodoResult, GetTodosInput, ServiceResult, TodoService,
    TodoServiceError, UpdateTodoInput,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
