//! Bridge between the UI thread and the backend worker that owns the store.

pub mod commands;
pub mod runtime;
