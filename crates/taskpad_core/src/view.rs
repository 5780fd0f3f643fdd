//! View contract: user intents in, render commands out.
//!
//! # Responsibility
//! - Name every user intent the controller handles.
//! - Name every render command the controller issues, with payload shapes.
//!
//! # Invariants
//! - Both sets are closed enums; dispatch is exhaustive at compile time.
//! - Render commands carry owned data so the sink never reads store state.

use crate::controller::Filter;
use crate::model::task::{Task, TaskId};

/// User action raised by the embedding surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Create a new task; whitespace-only titles are ignored.
    NewTodo { title: String },
    ItemRemove { id: TaskId },
    ItemToggle { id: TaskId, completed: bool },
    /// Drive every record to the same completion state.
    ToggleAll { completed: bool },
    ItemEdit { id: TaskId },
    /// Commit an edit; an empty title deletes the record.
    ItemEditDone { id: TaskId, title: String },
    ItemEditCancel { id: TaskId },
    RemoveCompleted,
}

/// Instruction issued to the view describing what to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Replace the visible list with these records.
    ShowEntries(Vec<Task>),
    RemoveItem(TaskId),
    /// Number of records still to do.
    UpdateElementCount(usize),
    ClearCompletedButton { completed: usize, visible: bool },
    ContentBlockVisibility { visible: bool },
    /// Checked when nothing is left to do and the collection is non-empty.
    ToggleAll { checked: bool },
    SetFilter(Filter),
    ClearNewTodo,
    ElementComplete { id: TaskId, completed: bool },
    EditItem { id: TaskId, title: String },
    EditItemDone { id: TaskId, title: String },
}

/// Opaque command sink; rendering details live behind this seam.
pub trait View {
    fn render(&mut self, command: RenderCommand);
}
