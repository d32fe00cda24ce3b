//! Client-side state controller for the todo list.
//!
//! # Responsibility
//! - Hold the local todo cache, active filter and inline-edit state.
//! - Reconcile handler responses into the cache.
//!
//! # Invariants
//! - The cache only changes after a handler confirms success.
//! - Derived counts and the visible list are computed, never stored.

pub mod api;
pub mod controller;

pub use api::TodoApi;
pub use controller::{
    ActionOutcome, ClientAction, ClientFailure, EditState, TodoController, TodoFilter, TodoStats,
};
