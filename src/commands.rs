//! Mutation requests as plain data.
//!
//! UI shells build a [`Command`] from whatever event they handle (a CLI
//! subcommand, a TUI key press) and hand it to [`apply`], which runs it
//! against the store. Keeps the business logic free of any display code.

use std::fmt;

use chrono::NaiveDateTime;

use crate::error::StoreError;
use crate::store::{NewTask, TaskPatch, TaskStore};

#[derive(Debug, Clone)]
pub enum Command {
    Add(NewTask),
    Edit { id: u64, patch: TaskPatch },
    Complete { id: u64 },
    Reactivate { id: u64 },
    Delete { id: u64 },
}

/// What a successfully applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Added { id: u64 },
    Updated { id: u64 },
    /// `next` is the id of the spawned follow-up task when the completed
    /// task was recurring.
    Completed { id: u64, next: Option<u64> },
    Reactivated { id: u64 },
    Deleted { id: u64 },
}

/// Runs `cmd` against `store`, persisting before returning. `now` stamps
/// creation dates and completion timestamps.
pub fn apply(
    store: &mut TaskStore,
    cmd: Command,
    now: NaiveDateTime,
) -> Result<Outcome, StoreError> {
    match cmd {
        Command::Add(new) => {
            let id = store.add(new, now.date())?;
            Ok(Outcome::Added { id })
        }
        Command::Edit { id, patch } => {
            store.update(id, patch)?;
            Ok(Outcome::Updated { id })
        }
        Command::Complete { id } => {
            let next = store.complete(id, now)?;
            Ok(Outcome::Completed { id, next })
        }
        Command::Reactivate { id } => {
            store.reactivate(id)?;
            Ok(Outcome::Reactivated { id })
        }
        Command::Delete { id } => {
            store.delete(id)?;
            Ok(Outcome::Deleted { id })
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { id } => write!(f, "Task added (id = {id})"),
            Outcome::Updated { id } => write!(f, "Task {id} updated."),
            Outcome::Completed { id, next: None } => {
                write!(f, "Task {id} marked as complete.")
            }
            Outcome::Completed { id, next: Some(next) } => {
                write!(f, "Task {id} marked as complete; recurring task created (id = {next}).")
            }
            Outcome::Reactivated { id } => write!(f, "Task {id} set active again."),
            Outcome::Deleted { id } => write!(f, "Task {id} removed."),
        }
    }
}
