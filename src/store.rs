use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;

use crate::error::StoreError;
use crate::models::{Priority, Recurrence, Task};

/// Fields for a task being created.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub name: String,
    pub info: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Priority,
    pub recurrence: Recurrence,
}

/// Field changes applied by [`TaskStore::update`]. `None` leaves a field
/// untouched; `due_date: Some(None)` clears the due date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub info: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<Priority>,
    pub recurrence: Option<Recurrence>,
}

/// Owner of the task collection and its JSON file.
///
/// Every mutating operation persists before returning, so the in-memory
/// collection and the file never diverge observably. If a save fails the
/// in-memory state keeps the change and the error is surfaced to the caller.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

/// On-disk layout. Current files are a flat array; the original app wrote an
/// object with separate "active" and "finished" arrays and no ids.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskFile {
    Flat(Vec<Task>),
    Partitioned {
        #[serde(default)]
        active: Vec<Task>,
        #[serde(default)]
        finished: Vec<Task>,
    },
}

/// Default location of the task file: `<local data dir>/notizzettel/tasks.json`.
pub fn default_path() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("notizzettel");
    p.push("tasks.json");
    p
}

impl TaskStore {
    /// Loads the store from `path`. A missing file yields an empty store;
    /// unreadable or malformed files fail with [`StoreError`].
    pub fn load(path: impl Into<PathBuf>) -> Result<TaskStore, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Ok(TaskStore { path, tasks: Vec::new() });
        }
        let data = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let file: TaskFile =
            serde_json::from_str(&data).map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?;
        let mut tasks = match file {
            TaskFile::Flat(tasks) => tasks,
            TaskFile::Partitioned { active, finished } => {
                let mut tasks = active;
                tasks.extend(finished.into_iter().map(|mut t| {
                    t.completed = true;
                    t
                }));
                tasks
            }
        };
        assign_missing_ids(&mut tasks);
        stamp_missing_finished(&mut tasks);
        Ok(TaskStore { path, tasks })
    }

    /// Like [`TaskStore::load`], but falls back to an empty store on failure
    /// and hands the error back as a warning instead of aborting.
    pub fn load_or_default(path: impl Into<PathBuf>) -> (TaskStore, Option<StoreError>) {
        let path = path.into();
        match TaskStore::load(path.clone()) {
            Ok(store) => (store, None),
            Err(e) => (TaskStore { path, tasks: Vec::new() }, Some(e)),
        }
    }

    /// Writes the full collection as pretty JSON, replacing the file
    /// atomically (write to a temp file, then rename) so a crash mid-write
    /// never leaves a truncated task file behind.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }
        let data = serde_json::to_string_pretty(&self.tasks).map_err(|source| {
            StoreError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Creates a task with a fresh id, appends it and persists. `today`
    /// becomes the creation date.
    pub fn add(&mut self, new: NewTask, today: NaiveDate) -> Result<u64, StoreError> {
        if new.name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        let id = self.next_id();
        self.tasks.push(Task {
            id,
            name: new.name,
            info: new.info,
            due_date: new.due_date,
            priority: new.priority,
            recurrence: new.recurrence,
            created: Some(today),
            completed: false,
            finished: None,
        });
        self.save()?;
        Ok(id)
    }

    /// Applies `patch` to the task with the given id and persists. An
    /// unknown id reports [`StoreError::NotFound`] before the patch is
    /// validated.
    pub fn update(&mut self, id: u64, patch: TaskPatch) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if matches!(&patch.name, Some(n) if n.trim().is_empty()) {
            return Err(StoreError::EmptyName);
        }
        if let Some(name) = patch.name {
            task.name = name;
        }
        if let Some(info) = patch.info {
            task.info = info;
        }
        if let Some(due) = patch.due_date {
            task.due_date = due;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(recurrence) = patch.recurrence {
            task.recurrence = recurrence;
        }
        self.save()
    }

    /// Marks the task finished at `now`. A recurring task additionally spawns
    /// a fresh active task with the same name, info, priority and recurrence
    /// and the due date advanced by the recurrence interval; the new id is
    /// returned. Completing an already finished task is a no-op.
    pub fn complete(&mut self, id: u64, now: NaiveDateTime) -> Result<Option<u64>, StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        if task.completed {
            return Ok(None);
        }
        task.completed = true;
        task.finished = Some(now);

        let next_due = task.due_date.and_then(|d| task.recurrence.advance(d));
        let successor = next_due.map(|due| NewTask {
            name: task.name.clone(),
            info: task.info.clone(),
            due_date: Some(due),
            priority: task.priority,
            recurrence: task.recurrence,
        });
        match successor {
            // add() persists, covering both changes in one write
            Some(new) => self.add(new, now.date()).map(Some),
            None => self.save().map(|()| None),
        }
    }

    /// Sets the task active again, clearing the completion timestamp.
    pub fn reactivate(&mut self, id: u64) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        task.completed = false;
        task.finished = None;
        self.save()
    }

    /// Removes the task from the collection and the file.
    pub fn delete(&mut self, id: u64) -> Result<Task, StoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound(id))?;
        let removed = self.tasks.remove(idx);
        self.save()?;
        Ok(removed)
    }

    fn next_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}

/// Completed tasks carry a timestamp; some legacy finished entries lack one.
/// Falls back to midnight of the creation date (or the due date) so the
/// invariant holds for the session and the next save writes it out.
fn stamp_missing_finished(tasks: &mut [Task]) {
    for t in tasks.iter_mut() {
        if t.completed && t.finished.is_none() {
            let day = t.created.or(t.due_date).unwrap_or_default();
            t.finished = Some(day.and_time(NaiveTime::MIN));
        }
    }
}

/// Gives every task without an id (legacy entries) a fresh one and resolves
/// duplicates, keeping the first occurrence.
fn assign_missing_ids(tasks: &mut [Task]) {
    let mut used: HashSet<u64> = HashSet::new();
    let mut next = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    for t in tasks.iter_mut() {
        if t.id == 0 || !used.insert(t.id) {
            t.id = next;
            used.insert(next);
            next += 1;
        }
    }
}
