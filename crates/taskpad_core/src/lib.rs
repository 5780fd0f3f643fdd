//! Core task-list engine: durable task collections plus the controller that
//! turns routes and user intents into storage operations and render commands.
//! This crate is the single source of truth for collection invariants.

pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod store;
pub mod view;

pub use controller::{Controller, Filter};
pub use logging::{default_log_level, init_logging};
pub use model::task::{Task, TaskCounts, TaskId, TaskPatch, TaskQuery};
pub use store::task_store::{SqliteTaskStore, StoreError, StoreResult, TaskStore};
pub use view::{Intent, RenderCommand, View};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
