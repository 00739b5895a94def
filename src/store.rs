//! In-memory task collection backed by a JSON snapshot file.
//!
//! Every mutation holds the write lock while it changes the collection and
//! rewrites the snapshot, so writes are serialized against each other and
//! against readers. A failed write is logged and the in-memory change is
//! kept; the next successful mutation rewrites the whole file and brings it
//! back in sync.

use log::{error, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::models::{NewTask, Task, TaskChanges};
use crate::storage::{self, StorageError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no task IDs left to allocate")]
    IdsExhausted,
}

#[derive(Debug)]
struct TaskTable {
    tasks: BTreeMap<u64, Task>,
    /// `None` once `u64::MAX` has been handed out.
    next_id: Option<u64>,
}

impl TaskTable {
    fn from_snapshot(tasks: Vec<Task>) -> Self {
        let tasks: BTreeMap<u64, Task> = tasks.into_iter().map(|task| (task.id, task)).collect();
        let next_id = match tasks.keys().next_back() {
            Some(max_id) => max_id.checked_add(1),
            None => Some(1),
        };
        Self { tasks, next_id }
    }
}

#[derive(Debug)]
pub struct TaskStore {
    table: RwLock<TaskTable>,
    path: PathBuf,
}

impl TaskStore {
    /// Opens the store backed by the snapshot at `path`.
    ///
    /// A missing file yields an empty store. An unreadable or malformed file
    /// also yields an empty store, with a warning; the bad file is replaced by
    /// the first mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tasks = match storage::read_json::<Vec<Task>>(&path) {
            Ok(tasks) => tasks.unwrap_or_default(),
            Err(err) => {
                warn!(
                    "Ignoring unreadable task file {}: {}",
                    path.display(),
                    err
                );
                Vec::new()
            }
        };

        let table = TaskTable::from_snapshot(tasks);
        if table.next_id.is_none() {
            warn!(
                "Task file {} already uses the highest task ID; new tasks will be refused",
                path.display()
            );
        }

        Self {
            table: RwLock::new(table),
            path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a pending task with the next sequential ID.
    ///
    /// Fails with [`StoreError::IdsExhausted`] once `u64::MAX` has been
    /// assigned; IDs never wrap around.
    pub fn add(&self, new_task: NewTask) -> Result<Task, StoreError> {
        let mut table = self.write();
        let id = table.next_id.ok_or(StoreError::IdsExhausted)?;
        table.next_id = id.checked_add(1);

        let task = Task::new(id, new_task);
        table.tasks.insert(id, task.clone());
        self.persist(&table);
        Ok(task)
    }

    pub fn get(&self, id: u64) -> Option<Task> {
        self.read().tasks.get(&id).cloned()
    }

    /// All tasks, ordered by ID.
    pub fn get_all(&self) -> Vec<Task> {
        self.read().tasks.values().cloned().collect()
    }

    /// Tasks whose status is `"pending"`, ordered by ID.
    pub fn get_pending(&self) -> Vec<Task> {
        self.read()
            .tasks
            .values()
            .filter(|task| task.is_pending())
            .cloned()
            .collect()
    }

    /// Replaces every mutable field of task `id`. Returns `None` and leaves
    /// the store untouched when the task does not exist.
    pub fn update(&self, id: u64, changes: TaskChanges) -> Option<Task> {
        let mut table = self.write();
        let task = table.tasks.get_mut(&id)?;
        task.apply(changes);
        let task = task.clone();
        self.persist(&table);
        Some(task)
    }

    /// Removes task `id`, returning whether it existed.
    pub fn delete(&self, id: u64) -> bool {
        let mut table = self.write();
        let removed = table.tasks.remove(&id).is_some();
        if removed {
            self.persist(&table);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.read().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, table: &TaskTable) {
        if let Err(err) = self.save(table) {
            error!(
                "Failed to save tasks to {}: {}",
                self.path.display(),
                err
            );
        }
    }

    fn save(&self, table: &TaskTable) -> Result<(), StorageError> {
        let tasks: Vec<&Task> = table.tasks.values().collect();
        storage::write_json(&self.path, &tasks)
    }

    fn read(&self) -> RwLockReadGuard<'_, TaskTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }
}
