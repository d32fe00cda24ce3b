//! Explicit store lifecycle: open at start, hand out handlers, close at shutdown.
//!
//! # Invariants
//! - The connection is owned by `TodoApp`; handlers only borrow it.
//! - `close` consumes the app, so no handler can outlive the store.

use crate::config::CoreConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::init_logging;
use crate::repo::todo_repo::{RepoError, SqliteTodoRepository};
use crate::service::todo_service::TodoService;
use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Logging(String),
    Db(DbError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(message) => write!(f, "logging init failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(_) => None,
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Open todo store plus the configuration it was opened with.
pub struct TodoApp {
    conn: Connection,
    config: CoreConfig,
}

impl TodoApp {
    /// Initializes logging (when a log dir is set) and opens the store.
    pub fn open(config: CoreConfig) -> AppResult<Self> {
        if let Some(log_dir) = config.log_dir.as_ref() {
            init_logging(&config.log_level, &log_dir.to_string_lossy())
                .map_err(AppError::Logging)?;
        }

        let conn = match config.db_path.as_ref() {
            Some(path) => open_db(path)?,
            None => open_db_in_memory()?,
        };
        info!(
            "event=app_open module=app status=ok store={}",
            store_label(&config)
        );

        Ok(Self { conn, config })
    }

    /// Handler layer bound to this app's connection.
    pub fn service(&self) -> AppResult<TodoService<SqliteTodoRepository<'_>>> {
        let repo = SqliteTodoRepository::try_new(&self.conn)?;
        Ok(TodoService::new(repo))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Closes the underlying connection, reporting any close failure.
    pub fn close(self) -> AppResult<()> {
        let store = store_label(&self.config);
        match self.conn.close() {
            Ok(()) => {
                info!("event=app_close module=app status=ok store={store}");
                Ok(())
            }
            Err((_conn, err)) => {
                error!(
                    "event=app_close module=app status=error store={store} error={err}"
                );
                Err(DbError::from(err).into())
            }
        }
    }
}

fn store_label(config: &CoreConfig) -> &'static str {
    if config.db_path.is_some() {
        "file"
    } else {
        "memory"
    }
}
