//! Domain model for the todo list.
//!
//! # Responsibility
//! - Define the `Todo` record and its field bounds.
//! - Define the optional-field patch used by partial updates.

pub mod todo;
