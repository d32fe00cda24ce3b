//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Insert, list, fetch, patch and hard-delete rows of the `todos` table.
//! - Own timestamp assignment for `created_at` and `updated_at`.
//!
//! # Invariants
//! - Each operation is a single SQL statement, so it commits atomically.
//! - `updated_at` strictly increases on every successful update.
//! - Rows read back are validated; corrupt data is reported, not masked.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::todo::{Todo, TodoId, TodoPatch, TodoValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

const TODO_COLUMNS: &str = "id, title, completed, created_at, updated_at";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "title", "completed", "created_at", "updated_at"];

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
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

/// Record store operations over todo rows.
pub trait TodoRepository {
    /// Inserts a new, not completed row and returns it with its assigned id.
    fn insert(&self, title: &str) -> RepoResult<Todo>;
    /// Lists rows in id order, optionally restricted to one `completed` value.
    fn select_all(&self, completed: Option<bool>) -> RepoResult<Vec<Todo>>;
    /// Loads one row, `None` when absent.
    fn select_by_id(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Applies the provided fields and bumps `updated_at`.
    ///
    /// Fails with `RepoError::NotFound` when no row has `id`.
    fn update(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Todo>;
    /// Hard-deletes one row. Returns whether a row was removed.
    fn delete(&self, id: TodoId) -> RepoResult<bool>;
}

/// SQLite-backed todo repository borrowing a migrated connection.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Wraps a connection after checking it carries the current schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn insert(&self, title: &str) -> RepoResult<Todo> {
        let now = now_epoch_ms();
        let todo = self.conn.query_row(
            &format!(
                "INSERT INTO todos (title, completed, created_at, updated_at)
                 VALUES (?1, 0, ?2, ?2)
                 RETURNING {TODO_COLUMNS};"
            ),
            params![title, now],
            |row| Ok(parse_todo_row(row)),
        )??;
        Ok(todo)
    }

    fn select_all(&self, completed: Option<bool>) -> RepoResult<Vec<Todo>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TODO_COLUMNS}
             FROM todos
             WHERE (?1 IS NULL OR completed = ?1)
             ORDER BY id ASC;"
        ))?;

        let mut rows = stmt.query([completed.map(bool_to_int)])?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn select_by_id(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        let loaded = self
            .conn
            .query_row(
                &format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1;"),
                [id],
                |row| Ok(parse_todo_row(row)),
            )
            .optional()?;

        loaded.transpose()
    }

    fn update(&self, id: TodoId, patch: &TodoPatch) -> RepoResult<Todo> {
        let updated = self
            .conn
            .query_row(
                &format!(
                    "UPDATE todos
                     SET
                        title = COALESCE(?2, title),
                        completed = COALESCE(?3, completed),
                        updated_at = MAX(?4, updated_at + 1)
                     WHERE id = ?1
                     RETURNING {TODO_COLUMNS};"
                ),
                params![
                    id,
                    patch.title.as_deref(),
                    patch.completed.map(bool_to_int),
                    now_epoch_ms(),
                ],
                |row| Ok(parse_todo_row(row)),
            )
            .optional()?;

        match updated {
            Some(todo) => todo,
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn delete(&self, id: TodoId) -> RepoResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", [id])?;
        Ok(removed > 0)
    }
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id: TodoId = row.get("id")?;
    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed for id {id}"
            )));
        }
    };

    let todo = Todo {
        id,
        title: row.get("title")?,
        completed,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    todo.validate().map_err(|err: TodoValidationError| {
        RepoError::InvalidData(format!("todo {id} failed validation: {err}"))
    })?;
    Ok(todo)
}

fn ensure_todo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todos")? {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "todos", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn now_epoch_ms() -> i64 {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}
