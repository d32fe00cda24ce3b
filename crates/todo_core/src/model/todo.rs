//! Todo record, title bounds and partial-update patch.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `title` holds between 1 and `TITLE_MAX_CHARS` characters.
//! - `updated_at >= created_at`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identifier.
pub type TodoId = i64;

/// Maximum title length, counted in Unicode scalar values.
pub const TITLE_MAX_CHARS: usize = 255;

/// One task as persisted and as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    /// Unix epoch milliseconds, fixed at creation.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by every successful update.
    pub updated_at: i64,
}

impl Todo {
    /// Checks field-level invariants of a loaded record.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        validate_title(&self.title)?;
        if self.updated_at < self.created_at {
            return Err(TodoValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Fields to change on an existing todo.
///
/// `None` leaves the column untouched, so `Some(false)` and an absent
/// `completed` stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Rejects empty patches and out-of-bounds titles.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.is_empty() {
            return Err(TodoValidationError::EmptyPatch);
        }
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    EmptyTitle,
    TitleTooLong { chars: usize, max: usize },
    TitleContainsNul,
    EmptyPatch,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { chars, max } => {
                write!(f, "title has {chars} characters; at most {max} allowed")
            }
            Self::TitleContainsNul => write!(f, "title must not contain NUL characters"),
            Self::EmptyPatch => write!(f, "update must set at least one of title or completed"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at {updated_at} is earlier than created_at {created_at}"
            ),
        }
    }
}

impl Error for TodoValidationError {}

/// Checks that `title` has 1..=`TITLE_MAX_CHARS` characters and no NUL.
///
/// SQLite's `length()` stops at the first NUL, which would make the table's
/// length check disagree with this one. The title is otherwise taken as
/// given; callers that want trimming do it first.
pub fn validate_title(title: &str) -> Result<(), TodoValidationError> {
    if title.is_empty() {
        return Err(TodoValidationError::EmptyTitle);
    }
    if title.contains('\0') {
        return Err(TodoValidationError::TitleContainsNul);
    }
    let chars = title.chars().count();
    if chars > TITLE_MAX_CHARS {
        return Err(TodoValidationError::TitleTooLong {
            chars,
            max: TITLE_MAX_CHARS,
        });
    }
    Ok(())
}
