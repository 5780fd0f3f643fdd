//! Intent and route orchestration over the task store.
//!
//! # Responsibility
//! - Translate route changes and user intents into store operations.
//! - Issue every render command after the triggering store call completed.
//!
//! # Invariants
//! - The controller holds no authoritative task data; every read is fresh.
//! - Empty-title checks are the only input validation performed here.

use crate::model::task::{TaskId, TaskPatch, TaskQuery};
use crate::store::task_store::{StoreResult, TaskStore};
use crate::view::{Intent, RenderCommand, View};

/// Active subset selector derived from the navigation fragment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    /// Maps a literal route fragment to a filter.
    ///
    /// Unrecognized fragments fall back to `All`, like the default route.
    pub fn from_route(fragment: &str) -> Self {
        match fragment.trim_start_matches("#/") {
            "active" => Self::Active,
            "completed" => Self::Completed,
            _ => Self::All,
        }
    }

    /// Route-facing name; empty for the default route.
    pub fn name(self) -> &'static str {
        match self {
            Self::All => "",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Store predicate selecting this filter's subset.
    pub fn query(self) -> TaskQuery {
        match self {
            Self::All => TaskQuery::all(),
            Self::Active => TaskQuery::by_completed(false),
            Self::Completed => TaskQuery::by_completed(true),
        }
    }
}

/// Single authority mediating intents, route, storage and render commands.
pub struct Controller<S, V> {
    store: S,
    view: V,
    filter: Filter,
}

impl<S: TaskStore, V: View> Controller<S, V> {
    pub fn new(store: S, view: V) -> Self {
        Self {
            store,
            view,
            filter: Filter::default(),
        }
    }

    /// Entry point on load and on every route change.
    pub fn set_view(&mut self, route: &str) -> StoreResult<()> {
        self.filter = Filter::from_route(route);
        self.show_entries()?;
        self.refresh_counts()?;
        self.view.render(RenderCommand::SetFilter(self.filter));
        Ok(())
    }

    /// Handles one user intent.
    pub fn dispatch(&mut self, intent: Intent) -> StoreResult<()> {
        match intent {
            Intent::NewTodo { title } => self.new_todo(&title),
            Intent::ItemRemove { id } => self.item_remove(id),
            Intent::ItemToggle { id, completed } => self.item_toggle(id, completed),
            Intent::ToggleAll { completed } => self.toggle_all(completed),
            Intent::ItemEdit { id } => self.item_edit(id),
            Intent::ItemEditDone { id, title } => self.item_edit_done(id, &title),
            Intent::ItemEditCancel { id } => self.item_edit_cancel(id),
            Intent::RemoveCompleted => self.remove_completed(),
        }
    }

    fn show_entries(&mut self) -> StoreResult<()> {
        let entries = self.store.find(&self.filter.query())?;
        self.view.render(RenderCommand::ShowEntries(entries));
        Ok(())
    }

    fn refresh_counts(&mut self) -> StoreResult<()> {
        let counts = self.store.counts()?;
        self.view
            .render(RenderCommand::UpdateElementCount(counts.active));
        self.view.render(RenderCommand::ClearCompletedButton {
            completed: counts.completed,
            visible: counts.completed > 0,
        });
        self.view.render(RenderCommand::ContentBlockVisibility {
            visible: counts.total > 0,
        });
        self.view.render(RenderCommand::ToggleAll {
            checked: counts.active == 0 && counts.total > 0,
        });
        Ok(())
    }

    fn new_todo(&mut self, title: &str) -> StoreResult<()> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }
        self.store.upsert(TaskPatch::title(title), None)?;
        self.show_entries()?;
        self.refresh_counts()?;
        self.view.render(RenderCommand::ClearNewTodo);
        Ok(())
    }

    fn item_remove(&mut self, id: TaskId) -> StoreResult<()> {
        self.store.remove(id)?;
        self.view.render(RenderCommand::RemoveItem(id));
        self.refresh_counts()
    }

    fn item_toggle(&mut self, id: TaskId, completed: bool) -> StoreResult<()> {
        self.store.upsert(TaskPatch::completed(completed), Some(id))?;
        self.view
            .render(RenderCommand::ElementComplete { id, completed });
        self.refresh_counts()
    }

    fn toggle_all(&mut self, completed: bool) -> StoreResult<()> {
        // Every record gets the target state, including those already there.
        for task in self.store.find_all()? {
            self.store
                .upsert(TaskPatch::completed(completed), Some(task.id))?;
            self.view.render(RenderCommand::ElementComplete {
                id: task.id,
                completed,
            });
        }
        self.refresh_counts()
    }

    fn item_edit(&mut self, id: TaskId) -> StoreResult<()> {
        if let Some(task) = self.store.find(&TaskQuery::by_id(id))?.into_iter().next() {
            self.view.render(RenderCommand::EditItem {
                id: task.id,
                title: task.title,
            });
        }
        Ok(())
    }

    fn item_edit_done(&mut self, id: TaskId, title: &str) -> StoreResult<()> {
        let title = title.trim();
        if title.is_empty() {
            // Committing an empty title deletes the record.
            return self.item_remove(id);
        }
        self.store.upsert(TaskPatch::title(title), Some(id))?;
        self.view.render(RenderCommand::EditItemDone {
            id,
            title: title.to_string(),
        });
        Ok(())
    }

    fn item_edit_cancel(&mut self, id: TaskId) -> StoreResult<()> {
        // No mutation: re-read the persisted title to restore the display.
        if let Some(task) = self.store.find(&TaskQuery::by_id(id))?.into_iter().next() {
            self.view.render(RenderCommand::EditItemDone {
                id: task.id,
                title: task.title,
            });
        }
        Ok(())
    }

    fn remove_completed(&mut self) -> StoreResult<()> {
        for task in self.store.find(&TaskQuery::by_completed(true))? {
            self.store.remove(task.id)?;
            self.view.render(RenderCommand::RemoveItem(task.id));
        }
        self.refresh_counts()
    }
}
