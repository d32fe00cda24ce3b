//! Todo list controller: local cache plus transient UI state.
//!
//! # Responsibility
//! - Turn user intents (filter, create, toggle, edit, delete) into handler calls.
//! - Patch or replace the local cache from confirmed responses only.
//! - Record the last handler failure for the presentation layer.
//!
//! # Invariants
//! - A failed call leaves cache, filter and edit state untouched.
//! - `is_loading()` is `false` whenever no call is in flight.
//! - Created todos are prepended; toggled and edited todos are replaced by
//!   the server copy.

use super::api::TodoApi;
use crate::model::todo::{Todo, TodoId};
use crate::service::todo_service::{
    CreateTodoInput, DeleteTodoInput, GetTodosInput, TodoServiceError, UpdateTodoInput,
};
use log::{debug, error};

/// View restriction selected by the filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TodoFilter {
    /// Maps the tab to the `completed` value sent to `GetTodos`.
    pub fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }

    pub fn matches(self, todo: &Todo) -> bool {
        self.completed()
            .map_or(true, |completed| todo.completed == completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// In-progress inline edit of one todo title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TodoId,
    pub title: String,
}

/// Counts shown next to the filter tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

/// User intent that triggered a handler call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    Load,
    Create,
    Toggle,
    Edit,
    Delete,
}

impl ClientAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Create => "create",
            Self::Toggle => "toggle",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

/// Report of the most recent failed handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientFailure {
    pub action: ClientAction,
    /// Error kind from `TodoServiceError::code`.
    pub code: &'static str,
    pub message: String,
}

/// Result of one controller action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The handler succeeded and local state was reconciled.
    Applied,
    /// Nothing to do; no handler was called.
    Ignored,
    /// The handler failed; see `TodoController::last_failure`.
    Failed,
}

/// Client state controller over a `TodoApi`.
pub struct TodoController<A: TodoApi> {
    api: A,
    todos: Vec<Todo>,
    filter: TodoFilter,
    draft_title: String,
    editing: Option<EditState>,
    loading: bool,
    last_failure: Option<ClientFailure>,
}

impl<A: TodoApi> TodoController<A> {
    /// Creates an empty controller. Call `mount` to load the first list.
    pub fn new(api: A) -> Self {
        Self {
            api,
            todos: Vec::new(),
            filter: TodoFilter::All,
            draft_title: String::new(),
            editing: None,
            loading: false,
            last_failure: None,
        }
    }

    /// Initial load with the current filter.
    pub fn mount(&mut self) -> ActionOutcome {
        self.reload()
    }

    /// Switches the filter and reloads the cache from the handlers.
    pub fn set_filter(&mut self, filter: TodoFilter) -> ActionOutcome {
        self.filter = filter;
        self.reload()
    }

    /// Replaces the cache with `GetTodos` for the current filter.
    pub fn reload(&mut self) -> ActionOutcome {
        let input = GetTodosInput {
            completed: self.filter.completed(),
        };
        match self.call(ClientAction::Load, |api| api.get_todos(&input)) {
            Some(todos) => {
                debug!(
                    "event=client_load module=client status=ok filter={} count={}",
                    self.filter.as_str(),
                    todos.len()
                );
                self.todos = todos;
                ActionOutcome::Applied
            }
            None => ActionOutcome::Failed,
        }
    }

    /// Updates the add-form input buffer.
    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft_title = title.into();
    }

    /// Whether the add control is enabled: the trimmed draft is not blank.
    ///
    /// Handler calls borrow the controller mutably, so a second submission
    /// cannot start while one is in flight.
    pub fn can_submit(&self) -> bool {
        !self.draft_title.trim().is_empty()
    }

    /// Creates a todo from the trimmed draft title and prepends it.
    ///
    /// Blank drafts are ignored.
    pub fn submit_draft(&mut self) -> ActionOutcome {
        if !self.can_submit() {
            return ActionOutcome::Ignored;
        }

        let input = CreateTodoInput {
            title: self.draft_title.trim().to_string(),
        };
        match self.call(ClientAction::Create, |api| api.create_todo(&input)) {
            Some(todo) => {
                self.todos.insert(0, todo);
                self.draft_title.clear();
                ActionOutcome::Applied
            }
            None => ActionOutcome::Failed,
        }
    }

    /// Flips `completed` of a cached todo via `UpdateTodo`.
    pub fn toggle(&mut self, id: TodoId) -> ActionOutcome {
        let Some(current) = self.find(id) else {
            return ActionOutcome::Ignored;
        };

        let input = UpdateTodoInput {
            id,
            title: None,
            completed: Some(!current.completed),
        };
        match self.call(ClientAction::Toggle, |api| api.update_todo(&input)) {
            Some(todo) => {
                self.replace(todo);
                ActionOutcome::Applied
            }
            None => ActionOutcome::Failed,
        }
    }

    /// Opens inline edit for a cached todo, seeded with its current title.
    pub fn start_edit(&mut self, id: TodoId) -> ActionOutcome {
        let Some(todo) = self.find(id) else {
            return ActionOutcome::Ignored;
        };
        self.editing = Some(EditState {
            id,
            title: todo.title.clone(),
        });
        ActionOutcome::Applied
    }

    /// Updates the inline edit buffer. No-op when nothing is being edited.
    pub fn set_edit_title(&mut self, title: impl Into<String>) {
        if let Some(editing) = self.editing.as_mut() {
            editing.title = title.into();
        }
    }

    /// Saves the inline edit (Enter, blur or explicit save).
    ///
    /// A blank title sends nothing and keeps the edit open. Edit state is
    /// cleared only once the handler confirms.
    pub fn commit_edit(&mut self) -> ActionOutcome {
        let Some(editing) = self.editing.as_ref() else {
            return ActionOutcome::Ignored;
        };
        let title = editing.title.trim();
        if title.is_empty() {
            return ActionOutcome::Ignored;
        }

        let input = UpdateTodoInput {
            id: editing.id,
            title: Some(title.to_string()),
            completed: None,
        };
        match self.call(ClientAction::Edit, |api| api.update_todo(&input)) {
            Some(todo) => {
                self.replace(todo);
                self.editing = None;
                ActionOutcome::Applied
            }
            None => ActionOutcome::Failed,
        }
    }

    /// Discards the inline edit (Escape) without calling any handler.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Deletes a todo and drops it from the cache.
    ///
    /// `success=false` means the row was already gone, so it is dropped too.
    pub fn delete(&mut self, id: TodoId) -> ActionOutcome {
        let input = DeleteTodoInput { id };
        match self.call(ClientAction::Delete, |api| api.delete_todo(&input)) {
            Some(result) => {
                if !result.success {
                    debug!(
                        "event=client_delete module=client status=ok id={id} removed=false"
                    );
                }
                self.todos.retain(|todo| todo.id != id);
                if self.editing.as_ref().map(|editing| editing.id) == Some(id) {
                    self.editing = None;
                }
                ActionOutcome::Applied
            }
            None => ActionOutcome::Failed,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// Cached todos that match the active filter, in cache order.
    pub fn visible_todos(&self) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|todo| self.filter.matches(todo))
            .collect()
    }

    pub fn stats(&self) -> TodoStats {
        let completed = self.todos.iter().filter(|todo| todo.completed).count();
        TodoStats {
            active: self.todos.len() - completed,
            completed,
            total: self.todos.len(),
        }
    }

    pub fn filter(&self) -> TodoFilter {
        self.filter
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    /// `true` only inside a handler call.
    ///
    /// Calls are synchronous and take `&mut self`, so any caller that can
    /// read this observes `false` once the action returns.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_failure(&self) -> Option<&ClientFailure> {
        self.last_failure.as_ref()
    }

    fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    fn replace(&mut self, updated: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|todo| todo.id == updated.id) {
            *slot = updated;
        }
    }

    fn call<T>(
        &mut self,
        action: ClientAction,
        request: impl FnOnce(&A) -> Result<T, TodoServiceError>,
    ) -> Option<T> {
        self.loading = true;
        let result = request(&self.api);
        self.loading = false;

        match result {
            Ok(value) => {
                self.last_failure = None;
                Some(value)
            }
            Err(err) => {
                error!(
                    "event=client_{} module=client status=error error_code={} error={err}",
                    action.as_str(),
                    err.code()
                );
                self.last_failure = Some(ClientFailure {
                    action,
                    code: err.code(),
                    message: err.to_string(),
                });
                None
            }
        }
    }
}
