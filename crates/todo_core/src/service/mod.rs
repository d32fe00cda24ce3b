//! Handler layer: validated operations exposed to clients.
//!
//! # Responsibility
//! - Validate request shapes before touching storage.
//! - Translate repository outcomes into client-facing error kinds.

pub mod todo_service;
