use std::cell::RefCell;
use std::rc::Rc;

use rusqlite::Connection;
use taskpad_core::db::open_db_in_memory;
use taskpad_core::{
    Controller, Filter, Intent, RenderCommand, SqliteTaskStore, StoreResult, Task, TaskCounts,
    TaskId, TaskPatch, TaskQuery, TaskStore, View,
};

/// Captures every render command for later assertions.
#[derive(Clone, Default)]
struct RecordingView {
    commands: Rc<RefCell<Vec<RenderCommand>>>,
}

impl RecordingView {
    fn commands(&self) -> Vec<RenderCommand> {
        self.commands.borrow().clone()
    }

    fn clear(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl View for RecordingView {
    fn render(&mut self, command: RenderCommand) {
        self.commands.borrow_mut().push(command);
    }
}

/// Shared handles onto the calls a `SpyStore` has seen.
#[derive(Clone, Default)]
struct CallLog {
    finds: Rc<RefCell<Vec<TaskQuery>>>,
    upserts: Rc<RefCell<Vec<(TaskPatch, Option<TaskId>)>>>,
    removes: Rc<RefCell<Vec<TaskId>>>,
}

/// Store wrapper recording calls while delegating to SQLite.
struct SpyStore<'conn> {
    inner: SqliteTaskStore<'conn>,
    log: CallLog,
}

impl TaskStore for SpyStore<'_> {
    fn find(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        self.log.finds.borrow_mut().push(query.clone());
        self.inner.find(query)
    }

    fn find_all(&self) -> StoreResult<Vec<Task>> {
        self.inner.find_all()
    }

    fn upsert(&self, patch: TaskPatch, id: Option<TaskId>) -> StoreResult<Vec<Task>> {
        self.log.upserts.borrow_mut().push((patch.clone(), id));
        self.inner.upsert(patch, id)
    }

    fn remove(&self, id: TaskId) -> StoreResult<Vec<Task>> {
        self.log.removes.borrow_mut().push(id);
        self.inner.remove(id)
    }

    fn drop_all(&self) -> StoreResult<Vec<Task>> {
        self.inner.drop_all()
    }

    fn counts(&self) -> StoreResult<TaskCounts> {
        self.inner.counts()
    }
}

struct Fixture<'conn> {
    controller: Controller<SpyStore<'conn>, RecordingView>,
    view: RecordingView,
    log: CallLog,
    seeded: Vec<Task>,
}

fn fixture<'conn>(conn: &'conn Connection, seed: &[(&str, bool)]) -> Fixture<'conn> {
    let store = SqliteTaskStore::open(conn, "todos").unwrap();
    let seeded = seed
        .iter()
        .map(|(title, completed)| {
            store
                .upsert(
                    TaskPatch {
                        title: Some((*title).to_string()),
                        completed: Some(*completed),
                    },
                    None,
                )
                .unwrap()
                .remove(0)
        })
        .collect();

    let view = RecordingView::default();
    let log = CallLog::default();
    let controller = Controller::new(
        SpyStore {
            inner: store,
            log: log.clone(),
        },
        view.clone(),
    );

    Fixture {
        controller,
        view,
        log,
        seeded,
    }
}

fn persisted(conn: &Connection) -> Vec<Task> {
    SqliteTaskStore::open(conn, "todos")
        .unwrap()
        .find_all()
        .unwrap()
}

#[test]
fn startup_shows_entries() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);

    fx.controller.set_view("").unwrap();

    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ShowEntries(fx.seeded.clone())));
}

#[test]
fn default_route_shows_every_entry() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("todo a", false), ("todo b", true)]);

    fx.controller.set_view("#/").unwrap();

    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ShowEntries(fx.seeded.clone())));
}

#[test]
fn active_route_queries_incomplete_records() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("todo a", false), ("todo b", true)]);

    fx.controller.set_view("#/active").unwrap();

    assert!(fx
        .log
        .finds
        .borrow()
        .contains(&TaskQuery::by_completed(false)));
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ShowEntries(vec![fx.seeded[0].clone()])));
}

#[test]
fn completed_route_queries_completed_records() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("todo a", false), ("todo b", true)]);

    fx.controller.set_view("#/completed").unwrap();

    assert!(fx
        .log
        .finds
        .borrow()
        .contains(&TaskQuery::by_completed(true)));
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ShowEntries(vec![fx.seeded[1].clone()])));
}

#[test]
fn set_view_issues_commands_in_a_fixed_order() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", true)]);

    fx.controller.set_view("#/").unwrap();

    assert_eq!(
        fx.view.commands(),
        vec![
            RenderCommand::ShowEntries(fx.seeded.clone()),
            RenderCommand::UpdateElementCount(0),
            RenderCommand::ClearCompletedButton {
                completed: 1,
                visible: true,
            },
            RenderCommand::ContentBlockVisibility { visible: true },
            RenderCommand::ToggleAll { checked: true },
            RenderCommand::SetFilter(Filter::All),
        ]
    );
}

#[test]
fn each_route_highlights_its_filter() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[]);

    fx.controller.set_view("").unwrap();
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::SetFilter(Filter::All)));

    fx.view.clear();
    fx.controller.set_view("#/active").unwrap();
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::SetFilter(Filter::Active)));

    fx.view.clear();
    fx.controller.set_view("#/completed").unwrap();
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::SetFilter(Filter::Completed)));
}

#[test]
fn content_block_is_visible_only_when_records_exist() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", true)]);

    fx.controller.set_view("").unwrap();
    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ContentBlockVisibility { visible: true }));

    let empty_conn = open_db_in_memory().unwrap();
    let mut empty = fixture(&empty_conn, &[]);
    empty.controller.set_view("").unwrap();
    assert!(empty
        .view
        .commands()
        .contains(&RenderCommand::ContentBlockVisibility { visible: false }));
}

#[test]
fn empty_collection_renders_hidden_clear_completed_button() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[]);

    fx.controller.set_view("").unwrap();

    let commands = fx.view.commands();
    assert!(commands.contains(&RenderCommand::ClearCompletedButton {
        completed: 0,
        visible: false,
    }));
    assert!(commands.contains(&RenderCommand::ToggleAll { checked: false }));
}

#[test]
fn toggle_all_is_checked_once_nothing_is_left_to_do() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("done a", true), ("done b", true)]);

    fx.controller.set_view("").unwrap();

    assert!(fx
        .view
        .commands()
        .contains(&RenderCommand::ToggleAll { checked: true }));
}

#[test]
fn new_todo_persists_rerenders_and_clears_input() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();

    fx.controller
        .dispatch(Intent::NewTodo {
            title: "a new todo".to_string(),
        })
        .unwrap();

    let tasks = persisted(&conn);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "a new todo");
    assert!(!tasks[0].completed);

    let commands = fx.view.commands();
    assert_eq!(
        commands.first(),
        Some(&RenderCommand::ShowEntries(tasks.clone()))
    );
    assert_eq!(commands.last(), Some(&RenderCommand::ClearNewTodo));
}

#[test]
fn new_todo_titles_are_trimmed_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[]);

    fx.controller
        .dispatch(Intent::NewTodo {
            title: "  padded  ".to_string(),
        })
        .unwrap();

    assert_eq!(persisted(&conn)[0].title, "padded");
}

#[test]
fn whitespace_only_new_todo_is_a_complete_noop() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();

    fx.controller
        .dispatch(Intent::NewTodo {
            title: "   ".to_string(),
        })
        .unwrap();

    assert!(fx.view.commands().is_empty());
    assert!(fx.log.upserts.borrow().is_empty());
    assert!(persisted(&conn).is_empty());
}

#[test]
fn item_remove_updates_model_view_and_count() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", true)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let id = fx.seeded[0].id;

    fx.controller.dispatch(Intent::ItemRemove { id }).unwrap();

    assert_eq!(*fx.log.removes.borrow(), vec![id]);
    assert!(persisted(&conn).is_empty());

    let commands = fx.view.commands();
    assert!(commands.contains(&RenderCommand::RemoveItem(id)));
    assert!(commands.contains(&RenderCommand::UpdateElementCount(0)));
}

#[test]
fn item_toggle_persists_and_renders_completion() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let id = fx.seeded[0].id;

    fx.controller
        .dispatch(Intent::ItemToggle {
            id,
            completed: true,
        })
        .unwrap();

    assert!(fx
        .log
        .upserts
        .borrow()
        .contains(&(TaskPatch::completed(true), Some(id))));
    assert!(persisted(&conn)[0].completed);
    assert!(fx.view.commands().contains(&RenderCommand::ElementComplete {
        id,
        completed: true,
    }));
}

#[test]
fn toggle_all_updates_every_record_even_if_already_there() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo 42", true), ("my todo 43", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let first = fx.seeded[0].id;
    let second = fx.seeded[1].id;

    fx.controller
        .dispatch(Intent::ToggleAll { completed: true })
        .unwrap();

    let upserts = fx.log.upserts.borrow();
    assert!(upserts.contains(&(TaskPatch::completed(true), Some(first))));
    assert!(upserts.contains(&(TaskPatch::completed(true), Some(second))));

    let commands = fx.view.commands();
    assert!(commands.contains(&RenderCommand::ElementComplete {
        id: first,
        completed: true,
    }));
    assert!(commands.contains(&RenderCommand::ElementComplete {
        id: second,
        completed: true,
    }));
    assert!(persisted(&conn).iter().all(|task| task.completed));
}

#[test]
fn toggle_all_back_to_active_updates_every_record() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo 42", true), ("my todo 43", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();

    fx.controller
        .dispatch(Intent::ToggleAll { completed: false })
        .unwrap();

    assert_eq!(fx.log.upserts.borrow().len(), 2);
    assert!(persisted(&conn).iter().all(|task| !task.completed));
}

#[test]
fn remove_completed_deletes_only_completed_records() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("keep", false), ("done", true)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let done_id = fx.seeded[1].id;

    fx.controller.dispatch(Intent::RemoveCompleted).unwrap();

    assert!(fx
        .log
        .finds
        .borrow()
        .contains(&TaskQuery::by_completed(true)));
    assert_eq!(*fx.log.removes.borrow(), vec![done_id]);
    assert!(fx.view.commands().contains(&RenderCommand::RemoveItem(done_id)));
    assert_eq!(persisted(&conn), vec![fx.seeded[0].clone()]);
}

#[test]
fn item_edit_renders_the_persisted_title() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let id = fx.seeded[0].id;

    fx.controller.dispatch(Intent::ItemEdit { id }).unwrap();

    assert_eq!(
        fx.view.commands(),
        vec![RenderCommand::EditItem {
            id,
            title: "my todo".to_string(),
        }]
    );
}

#[test]
fn item_edit_with_unknown_id_renders_nothing() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();

    fx.controller
        .dispatch(Intent::ItemEdit {
            id: fx.seeded[0].id + 1,
        })
        .unwrap();

    assert!(fx.view.commands().is_empty());
}

#[test]
fn item_edit_done_persists_and_leaves_edit_mode() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let id = fx.seeded[0].id;

    fx.controller
        .dispatch(Intent::ItemEditDone {
            id,
            title: "new title".to_string(),
        })
        .unwrap();

    assert!(fx
        .log
        .upserts
        .borrow()
        .contains(&(TaskPatch::title("new title"), Some(id))));
    assert_eq!(persisted(&conn)[0].title, "new title");
    assert_eq!(
        fx.view.commands(),
        vec![RenderCommand::EditItemDone {
            id,
            title: "new title".to_string(),
        }]
    );
}

#[test]
fn empty_title_commit_behaves_exactly_like_removal() {
    let conn_a = open_db_in_memory().unwrap();
    let conn_b = open_db_in_memory().unwrap();
    let mut fx_a = fixture(&conn_a, &[("my todo", false)]);
    let mut fx_b = fixture(&conn_b, &[("my todo", false)]);
    fx_a.controller.set_view("").unwrap();
    fx_b.controller.set_view("").unwrap();
    fx_a.view.clear();
    fx_b.view.clear();
    let id_a = fx_a.seeded[0].id;
    let id_b = fx_b.seeded[0].id;

    fx_a.controller
        .dispatch(Intent::ItemRemove { id: id_a })
        .unwrap();
    fx_b.controller
        .dispatch(Intent::ItemEditDone {
            id: id_b,
            title: String::new(),
        })
        .unwrap();

    let commands_a = fx_a.view.commands();
    let commands_b = fx_b.view.commands();
    assert_eq!(commands_a[0], RenderCommand::RemoveItem(id_a));
    assert_eq!(commands_b[0], RenderCommand::RemoveItem(id_b));
    // Identical count refresh once the record is gone.
    assert_eq!(&commands_a[1..], &commands_b[1..]);
    assert!(persisted(&conn_a).is_empty());
    assert!(persisted(&conn_b).is_empty());
}

#[test]
fn item_edit_cancel_restores_the_persisted_title_without_writes() {
    let conn = open_db_in_memory().unwrap();
    let mut fx = fixture(&conn, &[("my todo", false)]);
    fx.controller.set_view("").unwrap();
    fx.view.clear();
    let id = fx.seeded[0].id;

    fx.controller
        .dispatch(Intent::ItemEditCancel { id })
        .unwrap();

    assert!(fx.log.upserts.borrow().is_empty());
    assert!(fx.log.removes.borrow().is_empty());
    assert_eq!(
        fx.view.commands(),
        vec![RenderCommand::EditItemDone {
            id,
            title: "my todo".to_string(),
        }]
    );
}
