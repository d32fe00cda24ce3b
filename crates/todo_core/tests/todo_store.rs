use rusqlite::Connection;
use todo_core::db::migrations::latest_version;
use todo_core::db::open_db_in_memory;
use todo_core::{RepoError, SqliteTodoRepository, TodoPatch, TodoRepository};

#[test]
fn insert_assigns_id_and_equal_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let todo = repo.insert("water plants").unwrap();
    assert!(todo.id > 0);
    assert_eq!(todo.title, "water plants");
    assert!(!todo.completed);
    assert_eq!(todo.created_at, todo.updated_at);

    let loaded = repo.select_by_id(todo.id).unwrap().unwrap();
    assert_eq!(loaded, todo);
}

#[test]
fn select_all_returns_id_order_and_filters_by_completed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let a = repo.insert("a").unwrap();
    let b = repo.insert("b").unwrap();
    let c = repo.insert("c").unwrap();
    repo.update(
        b.id,
        &TodoPatch {
            completed: Some(true),
            ..TodoPatch::default()
        },
    )
    .unwrap();

    let all: Vec<_> = repo
        .select_all(None)
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(all, vec![a.id, b.id, c.id]);

    let done: Vec<_> = repo
        .select_all(Some(true))
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(done, vec![b.id]);

    let open: Vec<_> = repo
        .select_all(Some(false))
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(open, vec![a.id, c.id]);
}

#[test]
fn update_applies_only_provided_fields_and_bumps_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let original = repo.insert("draft").unwrap();

    let completed = repo
        .update(
            original.id,
            &TodoPatch {
                title: None,
                completed: Some(true),
            },
        )
        .unwrap();
    assert_eq!(completed.title, "draft");
    assert!(completed.completed);
    assert!(completed.updated_at > original.updated_at);
    assert_eq!(completed.created_at, original.created_at);

    let renamed = repo
        .update(
            original.id,
            &TodoPatch {
                title: Some("final".to_string()),
                completed: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.title, "final");
    assert!(renamed.completed);
    assert!(renamed.updated_at > completed.updated_at);
}

#[test]
fn update_missing_row_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo
        .update(
            42,
            &TodoPatch {
                title: Some("ghost".to_string()),
                completed: None,
            },
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let todo = repo.insert("temporary").unwrap();

    assert!(repo.delete(todo.id).unwrap());
    assert!(!repo.delete(todo.id).unwrap());
    assert!(repo.select_by_id(todo.id).unwrap().is_none());
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let first = repo.insert("first").unwrap();
    repo.delete(first.id).unwrap();
    let second = repo.insert("second").unwrap();

    assert!(second.id > first.id);
}

#[test]
fn corrupt_completed_value_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO todos (title, completed, created_at, updated_at) VALUES ('bad', 7, 1, 1);",
    )
    .unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let err = repo.select_all(None).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTodoRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_todos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTodoRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("todos"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteTodoRepository::try_new(&conn),
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "updated_at"
        })
    ));
}
