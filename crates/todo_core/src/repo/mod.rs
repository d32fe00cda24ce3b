//! Record store contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Keep SQL details behind the `TodoRepository` trait.
//! - Report semantic outcomes (`NotFound`, "nothing deleted") alongside
//!   transport errors.

pub mod todo_repo;
