//! Task collection store contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and aggregation over a named, insertion-ordered task
//!   collection persisted as one JSON payload per store name.
//! - Keep serialization details inside the persistence boundary.
//!
//! # Invariants
//! - Every mutation rewrites the whole collection (single writer).
//! - A payload that fails to parse aborts `open`; it is never reset.
//! - Mutations referencing an unknown id are silent no-ops, never errors.

use crate::db::DbError;
use crate::model::task::{Task, TaskCounts, TaskId, TaskPatch, TaskQuery};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage engine error taxonomy.
///
/// There is no not-found variant: at most one record matches an id, and a
/// mutation that matches nothing persists the collection unchanged.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// Persisted payload under `name` does not parse as a task collection.
    Corrupt { name: String, detail: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt { name, detail } => {
                write!(f, "collection `{name}` is corrupt: {detail}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupt { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store contract the controller depends on.
pub trait TaskStore {
    /// Returns records matching every set field of `query`, in insertion
    /// order. An empty query returns the whole collection.
    fn find(&self, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Returns the whole collection in insertion order.
    fn find_all(&self) -> StoreResult<Vec<Task>>;

    /// With `Some(id)`, merges `patch` into the matching record and returns
    /// the full updated collection. With `None`, appends a new record built
    /// from `patch` under a fresh unique id and returns just that record.
    fn upsert(&self, patch: TaskPatch, id: Option<TaskId>) -> StoreResult<Vec<Task>>;

    /// Deletes the record with `id` and returns the resulting collection.
    fn remove(&self, id: TaskId) -> StoreResult<Vec<Task>>;

    /// Resets the collection to empty and returns it.
    fn drop_all(&self) -> StoreResult<Vec<Task>>;

    /// Aggregates counts over the unfiltered collection.
    fn counts(&self) -> StoreResult<TaskCounts>;
}

/// Persisted payload shape: one insertion-ordered collection per name.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskCollection {
    tasks: Vec<Task>,
}

/// SQLite-backed named task collection.
pub struct SqliteTaskStore<'conn> {
    conn: &'conn Connection,
    name: String,
}

impl<'conn> SqliteTaskStore<'conn> {
    /// Opens the named collection, creating it empty on first use.
    ///
    /// Opening an existing name leaves its data untouched. The persisted
    /// payload is parsed here so corruption surfaces at initialization
    /// rather than on a later read; a corrupt payload is never reset.
    pub fn open(conn: &'conn Connection, name: impl Into<String>) -> StoreResult<Self> {
        let store = Self {
            conn,
            name: name.into(),
        };

        match store.read_payload()? {
            Some(payload) => {
                store.parse(&payload)?;
                info!(
                    "event=store_open module=store status=ok name={} mode=existing",
                    store.name
                );
            }
            None => {
                store.write(&TaskCollection::default())?;
                info!(
                    "event=store_open module=store status=ok name={} mode=created",
                    store.name
                );
            }
        }

        Ok(store)
    }

    /// Name this collection is persisted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_payload(&self) -> StoreResult<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM collections WHERE name = ?1;",
                [self.name.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    fn parse(&self, payload: &str) -> StoreResult<TaskCollection> {
        serde_json::from_str(payload).map_err(|err| {
            error!(
                "event=store_read module=store status=error name={} error_code=payload_corrupt error={err}",
                self.name
            );
            StoreError::Corrupt {
                name: self.name.clone(),
                detail: err.to_string(),
            }
        })
    }

    fn read(&self) -> StoreResult<TaskCollection> {
        match self.read_payload()? {
            Some(payload) => self.parse(&payload),
            // open() wrote the row and this process is the only writer.
            None => Err(StoreError::Corrupt {
                name: self.name.clone(),
                detail: "collection row is missing".to_string(),
            }),
        }
    }

    fn write(&self, collection: &TaskCollection) -> StoreResult<()> {
        let payload = serde_json::to_string(collection).map_err(|err| StoreError::Corrupt {
            name: self.name.clone(),
            detail: format!("failed to serialize collection: {err}"),
        })?;

        self.conn.execute(
            "INSERT INTO collections (name, payload) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET payload = excluded.payload;",
            params![self.name.as_str(), payload],
        )?;
        Ok(())
    }

    /// Next unique id: current epoch milliseconds, bumped past every
    /// existing id so same-millisecond creations cannot collide.
    fn next_id(&self, tasks: &[Task]) -> TaskId {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as TaskId)
            .unwrap_or(0);
        let floor = tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1;
        now_ms.max(floor)
    }
}

impl TaskStore for SqliteTaskStore<'_> {
    fn find(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let collection = self.read()?;
        Ok(collection
            .tasks
            .into_iter()
            .filter(|task| query.matches(task))
            .collect())
    }

    fn find_all(&self) -> StoreResult<Vec<Task>> {
        Ok(self.read()?.tasks)
    }

    fn upsert(&self, patch: TaskPatch, id: Option<TaskId>) -> StoreResult<Vec<Task>> {
        let mut collection = self.read()?;

        match id {
            Some(id) => {
                if let Some(task) = collection.tasks.iter_mut().find(|task| task.id == id) {
                    patch.apply_to(task);
                }
                self.write(&collection)?;
                info!(
                    "event=store_save module=store status=ok name={} op=update id={id}",
                    self.name
                );
                Ok(collection.tasks)
            }
            None => {
                let task = Task {
                    id: self.next_id(&collection.tasks),
                    title: patch.title.unwrap_or_default(),
                    completed: patch.completed.unwrap_or(false),
                };
                collection.tasks.push(task.clone());
                self.write(&collection)?;
                info!(
                    "event=store_save module=store status=ok name={} op=create id={}",
                    self.name, task.id
                );
                Ok(vec![task])
            }
        }
    }

    fn remove(&self, id: TaskId) -> StoreResult<Vec<Task>> {
        let mut collection = self.read()?;
        collection.tasks.retain(|task| task.id != id);
        self.write(&collection)?;
        info!(
            "event=store_save module=store status=ok name={} op=remove id={id}",
            self.name
        );
        Ok(collection.tasks)
    }

    fn drop_all(&self) -> StoreResult<Vec<Task>> {
        let collection = TaskCollection::default();
        self.write(&collection)?;
        info!(
            "event=store_save module=store status=ok name={} op=drop",
            self.name
        );
        Ok(collection.tasks)
    }

    fn counts(&self) -> StoreResult<TaskCounts> {
        Ok(TaskCounts::tally(&self.read()?.tasks))
    }
}
