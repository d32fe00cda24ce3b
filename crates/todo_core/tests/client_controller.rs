use rusqlite::Connection;
use std::cell::Cell;
use todo_core::db::open_db_in_memory;
use todo_core::{
    ActionOutcome, ClientAction, CreateTodoInput, DeleteTodoInput, DeleteTodoResult, GetTodosInput,
    RepoError, ServiceResult, SqliteTodoRepository, Todo, TodoApi, TodoController, TodoFilter,
    TodoService, TodoServiceError, TodoStats, UpdateTodoInput,
};

/// Delegates to a real service, or fails every call while `failing` is set.
struct SwitchableApi<A: TodoApi> {
    inner: A,
    failing: Cell<bool>,
    calls: Cell<usize>,
}

impl<A: TodoApi> SwitchableApi<A> {
    fn new(inner: A) -> Self {
        Self {
            inner,
            failing: Cell::new(false),
            calls: Cell::new(0),
        }
    }

    fn guard(&self) -> ServiceResult<()> {
        self.calls.set(self.calls.get() + 1);
        if self.failing.get() {
            return Err(TodoServiceError::StorageUnavailable(
                RepoError::InvalidData("store offline".to_string()),
            ));
        }
        Ok(())
    }
}

impl<A: TodoApi> TodoApi for SwitchableApi<A> {
    fn create_todo(&self, input: &CreateTodoInput) -> ServiceResult<Todo> {
        self.guard()?;
        self.inner.create_todo(input)
    }

    fn get_todos(&self, input: &GetTodosInput) -> ServiceResult<Vec<Todo>> {
        self.guard()?;
        self.inner.get_todos(input)
    }

    fn update_todo(&self, input: &UpdateTodoInput) -> ServiceResult<Todo> {
        self.guard()?;
        self.inner.update_todo(input)
    }

    fn delete_todo(&self, input: &DeleteTodoInput) -> ServiceResult<DeleteTodoResult> {
        self.guard()?;
        self.inner.delete_todo(input)
    }
}

type Api<'conn> = SwitchableApi<TodoService<SqliteTodoRepository<'conn>>>;

fn api(conn: &Connection) -> Api<'_> {
    SwitchableApi::new(TodoService::new(
        SqliteTodoRepository::try_new(conn).unwrap(),
    ))
}

fn add(controller: &mut TodoController<&Api<'_>>, title: &str) -> Todo {
    controller.set_draft_title(title);
    assert_eq!(controller.submit_draft(), ActionOutcome::Applied);
    controller.todos()[0].clone()
}

#[test]
fn mount_loads_existing_todos() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    api.create_todo(&CreateTodoInput {
        title: "from server".to_string(),
    })
    .unwrap();

    let mut controller = TodoController::new(&api);
    assert_eq!(controller.mount(), ActionOutcome::Applied);

    assert_eq!(controller.todos().len(), 1);
    assert_eq!(controller.todos()[0].title, "from server");
    assert!(!controller.is_loading());
}

#[test]
fn submit_trims_prepends_and_clears_draft() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    controller.mount();

    let first = add(&mut controller, "first");
    let second = add(&mut controller, "  second  ");

    assert_eq!(second.title, "second");
    let ids: Vec<_> = controller.todos().iter().map(|todo| todo.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert_eq!(controller.draft_title(), "");
}

#[test]
fn blank_draft_is_ignored_without_a_call() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);

    controller.set_draft_title("   ");
    assert!(!controller.can_submit());
    assert_eq!(controller.submit_draft(), ActionOutcome::Ignored);
    assert_eq!(api.calls.get(), 0);
}

#[test]
fn submit_enablement_follows_the_draft_across_calls() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    assert!(!controller.can_submit());

    controller.set_draft_title("retry me");
    assert!(controller.can_submit());

    api.failing.set(true);
    assert_eq!(controller.submit_draft(), ActionOutcome::Failed);
    assert!(!controller.is_loading());
    assert!(controller.can_submit());

    api.failing.set(false);
    assert_eq!(controller.submit_draft(), ActionOutcome::Applied);
    assert!(!controller.is_loading());
    assert!(!controller.can_submit());
    assert_eq!(api.calls.get(), 2);
}

#[test]
fn failed_create_keeps_cache_and_draft_and_reports() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let existing = add(&mut controller, "existing");

    api.failing.set(true);
    controller.set_draft_title("lost?");
    assert_eq!(controller.submit_draft(), ActionOutcome::Failed);

    assert_eq!(controller.todos(), &[existing][..]);
    assert_eq!(controller.draft_title(), "lost?");
    assert!(!controller.is_loading());
    let failure = controller.last_failure().unwrap();
    assert_eq!(failure.action, ClientAction::Create);
    assert_eq!(failure.code, "storage_unavailable");

    api.failing.set(false);
    assert_eq!(controller.submit_draft(), ActionOutcome::Applied);
    assert!(controller.last_failure().is_none());
}

#[test]
fn toggle_replaces_todo_with_server_copy() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "toggle me");

    assert_eq!(controller.toggle(todo.id), ActionOutcome::Applied);
    let toggled = &controller.todos()[0];
    assert!(toggled.completed);
    assert!(toggled.updated_at > todo.updated_at);

    assert_eq!(controller.toggle(todo.id), ActionOutcome::Applied);
    assert!(!controller.todos()[0].completed);
}

#[test]
fn toggle_of_uncached_id_is_ignored() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);

    assert_eq!(controller.toggle(12), ActionOutcome::Ignored);
    assert_eq!(api.calls.get(), 0);
}

#[test]
fn failed_toggle_leaves_cache_untouched() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "stable");

    api.failing.set(true);
    assert_eq!(controller.toggle(todo.id), ActionOutcome::Failed);
    assert_eq!(controller.todos()[0], todo);
    assert_eq!(
        controller.last_failure().map(|failure| failure.action),
        Some(ClientAction::Toggle)
    );
}

#[test]
fn edit_commit_sends_trimmed_title_and_clears_edit_state() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "old title");

    assert_eq!(controller.start_edit(todo.id), ActionOutcome::Applied);
    assert_eq!(controller.editing().unwrap().title, "old title");

    controller.set_edit_title("  new title ");
    assert_eq!(controller.commit_edit(), ActionOutcome::Applied);

    assert!(controller.editing().is_none());
    assert_eq!(controller.todos()[0].title, "new title");
    assert_eq!(controller.todos()[0].id, todo.id);
}

#[test]
fn blank_edit_commit_is_ignored_and_keeps_editing() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "keep");
    let calls_before = api.calls.get();

    controller.start_edit(todo.id);
    controller.set_edit_title("   ");
    assert_eq!(controller.commit_edit(), ActionOutcome::Ignored);

    assert_eq!(api.calls.get(), calls_before);
    assert!(controller.editing().is_some());
    assert_eq!(controller.todos()[0].title, "keep");
}

#[test]
fn failed_edit_keeps_edit_state_for_retry() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "before");

    controller.start_edit(todo.id);
    controller.set_edit_title("after");
    api.failing.set(true);
    assert_eq!(controller.commit_edit(), ActionOutcome::Failed);

    assert_eq!(controller.editing().unwrap().title, "after");
    assert_eq!(controller.todos()[0].title, "before");
}

#[test]
fn cancel_edit_discards_without_a_call() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let todo = add(&mut controller, "untouched");
    let calls_before = api.calls.get();

    controller.start_edit(todo.id);
    controller.set_edit_title("changed");
    controller.cancel_edit();

    assert!(controller.editing().is_none());
    assert_eq!(api.calls.get(), calls_before);
    assert_eq!(controller.todos()[0].title, "untouched");
}

#[test]
fn delete_removes_from_cache_only_after_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let first = add(&mut controller, "first");
    let second = add(&mut controller, "second");

    api.failing.set(true);
    assert_eq!(controller.delete(first.id), ActionOutcome::Failed);
    assert_eq!(controller.todos().len(), 2);

    api.failing.set(false);
    assert_eq!(controller.delete(first.id), ActionOutcome::Applied);
    assert_eq!(controller.todos(), &[second][..]);
}

#[test]
fn filter_change_reloads_from_handlers() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let open = add(&mut controller, "open");
    let done = add(&mut controller, "done");
    controller.toggle(done.id);

    assert_eq!(
        controller.set_filter(TodoFilter::Completed),
        ActionOutcome::Applied
    );
    assert_eq!(controller.todos().len(), 1);
    assert_eq!(controller.todos()[0].id, done.id);

    controller.set_filter(TodoFilter::Active);
    let visible: Vec<_> = controller
        .visible_todos()
        .iter()
        .map(|todo| todo.id)
        .collect();
    assert_eq!(visible, vec![open.id]);

    controller.set_filter(TodoFilter::All);
    assert_eq!(controller.todos().len(), 2);
}

#[test]
fn visible_todos_and_stats_derive_from_cache() {
    let conn = open_db_in_memory().unwrap();
    let api = api(&conn);
    let mut controller = TodoController::new(&api);
    let first = add(&mut controller, "one");
    add(&mut controller, "two");
    add(&mut controller, "three");
    controller.toggle(first.id);

    assert_eq!(
        controller.stats(),
        TodoStats {
            active: 2,
            completed: 1,
            total: 3,
        }
    );
    assert_eq!(controller.visible_todos().len(), 3);
}

#[test]
fn filter_maps_to_completed_query() {
    assert_eq!(TodoFilter::All.completed(), None);
    assert_eq!(TodoFilter::Active.completed(), Some(false));
    assert_eq!(TodoFilter::Completed.completed(), Some(true));
}
