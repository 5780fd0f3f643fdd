//! Task record, partial update, predicate and aggregate types.
//!
//! # Responsibility
//! - Define the persisted task shape and the value types the store contract
//!   speaks in.
//!
//! # Invariants
//! - `id` is unique within a collection and never changes after creation.
//! - Merging a patch leaves unset fields untouched.

use serde::{Deserialize, Serialize};

/// Stable identifier for a task record.
///
/// Ids are Unix-epoch-millisecond stamps, bumped past every existing id by
/// the store so that same-millisecond creations cannot collide.
pub type TaskId = i64;

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// User-editable label. Empty is a valid transient value; committing an
    /// empty title through the controller deletes the record instead.
    pub title: String,
    /// Absent in creation payloads; defaults to not completed.
    #[serde(default)]
    pub completed: bool,
}

/// Partial-field update. `None` fields are left untouched on merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch that only sets the title.
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch that only sets the completed flag.
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Merges this patch into `task`, field by field.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

/// Conjunctive field-equality predicate over task records.
///
/// A record matches when every set field is equal to the record's value; an
/// empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub id: Option<TaskId>,
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskQuery {
    /// Query matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Query matching a single record by id.
    pub fn by_id(id: TaskId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Query matching records by completion state.
    pub fn by_completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(id) = self.id {
            if task.id != id {
                return false;
            }
        }
        if let Some(title) = &self.title {
            if &task.title != title {
                return false;
            }
        }
        if let Some(completed) = self.completed {
            if task.completed != completed {
                return false;
            }
        }
        true
    }
}

/// Aggregate counts over the unfiltered collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    /// Records still to do.
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

impl TaskCounts {
    /// Tallies the collection in one pass.
    pub fn tally(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            active: tasks.len() - completed,
            completed,
            total: tasks.len(),
        }
    }
}
