//! Read-only queries over a task collection.
//!
//! Everything here is a pure function over `&[Task]`; the current date is
//! always passed in explicitly so the reminder timer and the tests never
//! touch the clock or the store file.

use chrono::{Days, NaiveDate};

use crate::models::{format_date, Priority, Task};

/// Active tasks (not completed), insertion order preserved.
pub fn active(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| !t.completed).collect()
}

/// Finished tasks, insertion order preserved.
pub fn finished(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.completed).collect()
}

/// Whether an active task's due date lies strictly before `today`.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    !task.completed && matches!(task.due_date, Some(d) if d < today)
}

/// Priority selector for the active list: either a concrete priority or the
/// synthetic "overdue" level, which matches any overdue task regardless of
/// its actual priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityFilter {
    Priority(Priority),
    Overdue,
}

impl PriorityFilter {
    pub fn parse(s: &str) -> Option<PriorityFilter> {
        if s.eq_ignore_ascii_case("overdue") {
            Some(PriorityFilter::Overdue)
        } else {
            Priority::parse(s).map(PriorityFilter::Priority)
        }
    }

    fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            PriorityFilter::Priority(p) => task.priority == p,
            PriorityFilter::Overdue => is_overdue(task, today),
        }
    }
}

impl std::str::FromStr for PriorityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PriorityFilter::parse(s)
            .ok_or_else(|| format!("unknown priority '{s}' (green/blue/red/overdue)"))
    }
}

/// One-key date filters on the active list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickFilter {
    /// Due date equals today.
    Today,
    /// Due date within the next seven days, today and the seventh day both
    /// included. A rolling window, not a calendar week.
    Week,
}

impl QuickFilter {
    fn matches(self, task: &Task, today: NaiveDate) -> bool {
        let Some(due) = task.due_date else {
            return false;
        };
        match self {
            QuickFilter::Today => due == today,
            QuickFilter::Week => {
                let end = today
                    .checked_add_days(Days::new(7))
                    .unwrap_or(NaiveDate::MAX);
                today <= due && due <= end
            }
        }
    }
}

/// Filter settings for the active list; unset fields match everything and
/// set fields combine with logical AND.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub priority: Option<PriorityFilter>,
    /// Keep only tasks due on or after this date; undated tasks are dropped.
    pub from: Option<NaiveDate>,
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub quick: Option<QuickFilter>,
}

impl Filter {
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        if let Some(p) = self.priority {
            if !p.matches(task, today) {
                return false;
            }
        }
        if let Some(from) = self.from {
            match task.due_date {
                Some(d) if d >= from => {}
                _ => return false,
            }
        }
        if let Some(q) = self.quick {
            if !q.matches(task, today) {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !name_contains(task, needle) {
                return false;
            }
        }
        true
    }
}

/// Active tasks passing `filter`, insertion order preserved.
pub fn filter_active<'a>(tasks: &'a [Task], filter: &Filter, today: NaiveDate) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && filter.matches(t, today))
        .collect()
}

/// Active tasks matching a single priority selector.
pub fn by_priority(tasks: &[Task], priority: PriorityFilter, today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && priority.matches(t, today))
        .collect()
}

/// Active tasks with a due date on or after `date`.
pub fn from_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && matches!(t.due_date, Some(d) if d >= date))
        .collect()
}

/// Tasks whose name contains `needle`, case-insensitively. Applies to
/// whatever slice it is given; both tabs search this way.
pub fn by_name<'a>(tasks: impl IntoIterator<Item = &'a Task>, needle: &str) -> Vec<&'a Task> {
    tasks
        .into_iter()
        .filter(|t| name_contains(t, needle))
        .collect()
}

/// Active tasks due exactly on `today`.
pub fn due_today(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && QuickFilter::Today.matches(t, today))
        .collect()
}

/// Active tasks due within the rolling seven-day window starting at `today`.
pub fn due_this_week(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| !t.completed && QuickFilter::Week.matches(t, today))
        .collect()
}

/// Finished tasks completed on or after `date`.
pub fn finished_from(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.completed && matches!(t.finished, Some(f) if f.date() >= date))
        .collect()
}

/// Active tasks due today or earlier, ascending by due date; undated tasks
/// are never reminded about. Feeds the reminder popup.
pub fn due_for_reminder(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut due: Vec<&Task> = tasks
        .iter()
        .filter(|t| !t.completed && matches!(t.due_date, Some(d) if d <= today))
        .collect();
    due.sort_by_key(|t| t.due_date);
    due
}

/// Display sort order for task lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateAscending,
    DateDescending,
}

impl SortOrder {
    pub fn toggled(self) -> SortOrder {
        match self {
            SortOrder::DateAscending => SortOrder::DateDescending,
            SortOrder::DateDescending => SortOrder::DateAscending,
        }
    }
}

/// Sorts by due date; undated tasks sort as latest.
pub fn sort_by_due(tasks: &mut [&Task], order: SortOrder) {
    tasks.sort_by_key(|t| t.due_date.unwrap_or(NaiveDate::MAX));
    if order == SortOrder::DateDescending {
        tasks.reverse();
    }
}

/// Sorts by completion timestamp; tasks without one sort as earliest.
pub fn sort_by_finished(tasks: &mut [&Task], order: SortOrder) {
    tasks.sort_by_key(|t| t.finished);
    if order == SortOrder::DateDescending {
        tasks.reverse();
    }
}

/// Tasks to surface in the periodic reminder popup, split the way the popup
/// presents them.
#[derive(Debug, Default)]
pub struct Reminder<'a> {
    pub overdue: Vec<&'a Task>,
    pub due_today: Vec<&'a Task>,
}

impl<'a> Reminder<'a> {
    pub fn collect(tasks: &'a [Task], today: NaiveDate) -> Reminder<'a> {
        let mut reminder = Reminder::default();
        for task in due_for_reminder(tasks, today) {
            if is_overdue(task, today) {
                reminder.overdue.push(task);
            } else {
                reminder.due_today.push(task);
            }
        }
        reminder
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty()
    }

    /// Popup body listing overdue tasks first, then tasks due today.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        if !self.overdue.is_empty() {
            lines.push("Overdue:".to_string());
            for t in &self.overdue {
                lines.push(entry(t));
            }
        }
        if !self.due_today.is_empty() {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push("Due today:".to_string());
            for t in &self.due_today {
                lines.push(entry(t));
            }
        }
        lines.join("\n")
    }
}

fn entry(task: &Task) -> String {
    match task.due_date {
        Some(d) => format!("- {} (due {})", task.name, format_date(d)),
        None => format!("- {}", task.name),
    }
}

fn name_contains(task: &Task, needle: &str) -> bool {
    task.name.to_lowercase().contains(&needle.to_lowercase())
}
