//! # Notizzettel
//!
//! A sticky-note style task manager for the terminal. Tasks carry an optional
//! due date, a color-coded priority and a recurrence; the app reminds you of
//! overdue and due-today items and keeps everything in a single local JSON
//! file.
//!
//! ## Features
//!
//! *   **Reminders**: overdue and due-today tasks are collected into a popup
//!     (TUI) or printed on demand (`notizzettel remind`).
//! *   **Recurrence**: daily, weekly and monthly recurring tasks; completing
//!     one schedules the next occurrence automatically.
//! *   **Filters**: by priority (including a synthetic "overdue" level), by
//!     from-date, by name search, plus "today" and "this week" quick filters.
//!     Filters combine with logical AND.
//! *   **Dual interface**: a scriptable CLI and an interactive TUI with
//!     Active/Finished tabs.
//! *   **Data persistence**: one JSON file in the local data directory,
//!     replaced atomically on every change. Files written by the original
//!     Notizzettel desktop app load unchanged.
//!
//! ## Usage
//!
//! ```bash
//! # Add tasks
//! notizzettel add "Write report" --due 01.12.2025 --priority red
//! notizzettel add "Water plants" --due 2025-12-01 --recur weekly
//!
//! # List active tasks (filters compose)
//! notizzettel list --priority overdue
//! notizzettel list --priority red --search report
//! notizzettel list --week
//!
//! # Complete / reactivate / remove
//! notizzettel complete 3
//! notizzettel reactivate 3
//! notizzettel remove 3
//!
//! # Print due and overdue tasks
//! notizzettel remind
//!
//! # Interactive TUI
//! notizzettel
//! ```
//!
//! ## Data storage
//!
//! Tasks are saved in your local data directory:
//! *   Linux: `~/.local/share/notizzettel/tasks.json`
//! *   macOS: `~/Library/Application Support/notizzettel/tasks.json`
//! *   Windows: `%APPDATA%\notizzettel\tasks.json`
//!
//! Pass `--file <PATH>` to use a different file. Dates are stored as
//! `DD.MM.YYYY`; ISO `YYYY-MM-DD` is accepted on input. The file is meant
//! for a single running instance; no cross-process locking is done.

pub mod commands;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod tui;
