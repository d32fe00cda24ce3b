//! Todo handlers: create, list, update and delete.
//!
//! # Responsibility
//! - Expose one validate-then-delegate operation per client request.
//! - Map storage failures to `ValidationError`, `NotFound` or
//!   `StorageUnavailable`.
//!
//! # Invariants
//! - Invalid input never reaches the repository.
//! - Deleting a missing todo is a successful call with `success=false`.
//! - Titles are never written to logs; only ids and lengths are.

use crate::model::todo::{validate_title, Todo, TodoId, TodoPatch, TodoValidationError};
use crate::repo::todo_repo::{RepoError, TodoRepository};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Request body for `CreateTodo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoInput {
    pub title: String,
}

/// Request body for `GetTodos`. An absent `completed` lists every todo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetTodosInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Request body for `UpdateTodo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoInput {
    pub id: TodoId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodoInput {
    fn patch(&self) -> TodoPatch {
        TodoPatch {
            title: self.title.clone(),
            completed: self.completed,
        }
    }
}

/// Request body for `DeleteTodo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoInput {
    pub id: TodoId,
}

/// Response body for `DeleteTodo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoResult {
    /// `false` when no todo had the requested id.
    pub success: bool,
}

/// Failure returned by a todo handler.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Malformed input; nothing was persisted.
    Validation(TodoValidationError),
    /// Referenced todo does not exist.
    NotFound(TodoId),
    /// Underlying store failed or is unreachable.
    StorageUnavailable(RepoError),
}

impl TodoServiceError {
    /// Stable error kind used in log events and client failure reports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid todo input: {err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::StorageUnavailable(err) => write!(f, "todo storage unavailable: {err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::StorageUnavailable(err) => Some(err),
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::StorageUnavailable(other),
        }
    }
}

/// Handler layer over any `TodoRepository`.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// `CreateTodo`: validates the title and inserts a new, open todo.
    ///
    /// # Errors
    /// - `Validation` when the title is empty or longer than 255 characters.
    /// - `StorageUnavailable` when the insert fails.
    pub fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo> {
        if let Err(err) = validate_title(&input.title) {
            warn!(
                "event=todo_create module=service status=error error_code=validation_error title_chars={}",
                input.title.chars().count()
            );
            return Err(err.into());
        }

        let todo = self
            .repo
            .insert(&input.title)
            .map_err(|err| log_failure("todo_create", None, err.into()))?;
        info!(
            "event=todo_create module=service status=ok id={} title_chars={}",
            todo.id,
            todo.title.chars().count()
        );
        Ok(todo)
    }

    /// `GetTodos`: lists todos in id order, optionally filtered by `completed`.
    pub fn get_todos(&self, input: &GetTodosInput) -> ServiceResult<Vec<Todo>> {
        let todos = self
            .repo
            .select_all(input.completed)
            .map_err(|err| log_failure("todo_list", None, err.into()))?;
        debug!(
            "event=todo_list module=service status=ok filter={} count={}",
            filter_label(input.completed),
            todos.len()
        );
        Ok(todos)
    }

    /// Loads one todo by id. Not part of the client-facing handler set.
    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo
            .select_by_id(id)?
            .ok_or(TodoServiceError::NotFound(id))
    }

    /// `UpdateTodo`: applies the provided fields and bumps `updated_at`.
    ///
    /// # Errors
    /// - `Validation` when neither field is set or the title is out of bounds.
    /// - `NotFound` when no todo has `input.id`.
    pub fn update_todo(&self, input: &UpdateTodoInput) -> ServiceResult<Todo> {
        let patch = input.patch();
        if let Err(err) = patch.validate() {
            warn!(
                "event=todo_update module=service status=error id={} error_code=validation_error",
                input.id
            );
            return Err(err.into());
        }

        let todo = self
            .repo
            .update(input.id, &patch)
            .map_err(|err| log_failure("todo_update", Some(input.id), err.into()))?;
        info!(
            "event=todo_update module=service status=ok id={} title_changed={} completed={}",
            todo.id,
            patch.title.is_some(),
            todo.completed
        );
        Ok(todo)
    }

    /// `DeleteTodo`: hard-deletes one todo.
    ///
    /// A missing id yields `success=false`, not an error.
    pub fn delete_todo(&self, input: &DeleteTodoInput) -> ServiceResult<DeleteTodoResult> {
        let success = self
            .repo
            .delete(input.id)
            .map_err(|err| log_failure("todo_delete", Some(input.id), err.into()))?;
        info!(
            "event=todo_delete module=service status=ok id={} removed={success}",
            input.id
        );
        Ok(DeleteTodoResult { success })
    }
}

fn log_failure(event: &str, id: Option<TodoId>, err: TodoServiceError) -> TodoServiceError {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match &err {
        TodoServiceError::StorageUnavailable(_) => error!(
            "event={event} module=service status=error id={id} error_code={} error={err}",
            err.code()
        ),
        _ => warn!(
            "event={event} module=service status=error id={id} error_code={}",
            err.code()
        ),
    }
    err
}

fn filter_label(completed: Option<bool>) -> &'static str {
    match completed {
        None => "all",
        Some(false) => "active",
        Some(true) => "completed",
    }
}
