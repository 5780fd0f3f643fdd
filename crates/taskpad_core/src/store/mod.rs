//! Storage engine over named task collections.
//!
//! # Responsibility
//! - Define the store contract the controller depends on.
//! - Keep the persisted representation inside this module boundary.
//!
//! # Invariants
//! - Ids are unique within a collection and never reassigned.
//! - Reads always reflect the most recent completed write.

pub mod task_store;
