use std::path::Path;

use chrono::{Local, NaiveDate};
use ratatui::widgets::TableState;

use crate::commands::{apply, Command};
use crate::error::StoreError;
use crate::models::{parse_date, Priority, Recurrence, Task};
use crate::query::{self, Filter, PriorityFilter, QuickFilter, Reminder, SortOrder};
use crate::store::{NewTask, TaskPatch, TaskStore};

#[derive(PartialEq, Eq, Clone, Copy)]
pub enum Tab {
    Active,
    Finished,
}

#[derive(PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Input,
    /// The due/overdue popup is open.
    Reminder,
}

/// Which prompt the input box currently feeds.
#[derive(Clone, Copy)]
pub enum InputField {
    None,
    AddName,
    AddDue,
    AddInfo,
    EditName,
    EditDue,
    EditInfo,
    Search,
    FromDate,
}

pub struct App {
    pub store: TaskStore,
    pub tab: Tab,
    /// Rows currently shown, already filtered and sorted.
    pub visible: Vec<Task>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    /// Last outcome or error, shown in the status bar.
    pub status: Option<String>,
    pub filter: Filter,
    pub sort: SortOrder,
    pub target_id: Option<u64>,
    // Partial data while the "Add Task" wizard runs
    pub add_state: AddState,
    pub reminder_text: String,
}

/// State for the multi-step "Add Task" wizard.
#[derive(Default)]
pub struct AddState {
    pub name: String,
    pub due: Option<NaiveDate>,
    pub info: String,
}

impl App {
    /// Creates the app, loading the store from `path`. A broken file is
    /// reported in the status bar and the session starts empty (the file is
    /// only rewritten once the user mutates something).
    pub fn new(path: &Path) -> App {
        let (store, warning) = TaskStore::load_or_default(path);
        let mut app = App {
            store,
            tab: Tab::Active,
            visible: Vec::new(),
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            status: warning.map(|e| format!("Warning: {e}")),
            filter: Filter::default(),
            sort: SortOrder::DateAscending,
            target_id: None,
            add_state: AddState::default(),
            reminder_text: String::new(),
        };
        app.reload();
        app
    }

    /// Recomputes the visible rows from the store, filter and sort order.
    pub fn reload(&mut self) {
        let today = Local::now().date_naive();
        let mut rows: Vec<&Task> = match self.tab {
            Tab::Active => query::filter_active(self.store.tasks(), &self.filter, today),
            Tab::Finished => {
                let mut rows = query::finished(self.store.tasks());
                if let Some(needle) = &self.filter.search {
                    rows = query::by_name(rows, needle);
                }
                match self.filter.priority {
                    Some(PriorityFilter::Priority(p)) => rows.retain(|t| t.priority == p),
                    // finished tasks are never overdue
                    Some(PriorityFilter::Overdue) => rows.clear(),
                    None => {}
                }
                if let Some(from) = self.filter.from {
                    rows.retain(|t| matches!(t.finished, Some(f) if f.date() >= from));
                }
                rows
            }
        };
        match self.tab {
            Tab::Active => query::sort_by_due(&mut rows, self.sort),
            Tab::Finished => query::sort_by_finished(&mut rows, self.sort),
        }
        self.visible = rows.into_iter().cloned().collect();

        if self.visible.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.visible.len() {
                self.state.select(Some(self.visible.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= self.visible.len() - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row, wrapping around.
    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Active => Tab::Finished,
            Tab::Finished => Tab::Active,
        };
        self.reload();
    }

    fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }

    /// Runs a command against the store, putting the outcome (or error) in
    /// the status bar and refreshing the view.
    fn run_command(&mut self, cmd: Command) {
        let now = Local::now().naive_local();
        match apply(&mut self.store, cmd, now) {
            Ok(outcome) => self.status = Some(outcome.to_string()),
            Err(e) => self.status = Some(format!("Error: {e}")),
        }
        self.reload();
    }

    pub fn complete_selected(&mut self) {
        if self.tab != Tab::Active {
            return;
        }
        if let Some(t) = self.selected_task() {
            let id = t.id;
            self.run_command(Command::Complete { id });
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(t) = self.selected_task() {
            let id = t.id;
            self.run_command(Command::Delete { id });
        }
    }

    pub fn reactivate_selected(&mut self) {
        if self.tab != Tab::Finished {
            return;
        }
        if let Some(t) = self.selected_task() {
            let id = t.id;
            self.run_command(Command::Reactivate { id });
        }
    }

    /// Cycles the selected task's priority green -> blue -> red -> green.
    pub fn cycle_selected_priority(&mut self) {
        if self.tab != Tab::Active {
            return;
        }
        if let Some(t) = self.selected_task() {
            let id = t.id;
            let next = match t.priority {
                Priority::Green => Priority::Blue,
                Priority::Blue => Priority::Red,
                Priority::Red => Priority::Green,
            };
            self.run_command(Command::Edit {
                id,
                patch: TaskPatch {
                    priority: Some(next),
                    ..TaskPatch::default()
                },
            });
        }
    }

    /// Cycles the selected task's recurrence none -> daily -> weekly ->
    /// monthly -> none.
    pub fn cycle_selected_recurrence(&mut self) {
        if self.tab != Tab::Active {
            return;
        }
        if let Some(t) = self.selected_task() {
            let id = t.id;
            let next = match t.recurrence {
                Recurrence::None => Recurrence::Daily,
                Recurrence::Daily => Recurrence::Weekly,
                Recurrence::Weekly => Recurrence::Monthly,
                Recurrence::Monthly => Recurrence::None,
            };
            self.run_command(Command::Edit {
                id,
                patch: TaskPatch {
                    recurrence: Some(next),
                    ..TaskPatch::default()
                },
            });
        }
    }

    /// Initiates the "Add Task" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Input;
        self.input_field = InputField::AddName;
        self.add_state = AddState::default();
        self.input_buffer.clear();
    }

    fn start_field_edit(&mut self, field: InputField, prefill: String) {
        if self.tab != Tab::Active {
            return;
        }
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        self.target_id = Some(id);
        self.input_mode = InputMode::Input;
        self.input_field = field;
        self.input_buffer = prefill;
    }

    pub fn start_edit_name(&mut self) {
        let prefill = self.selected_task().map(|t| t.name.clone()).unwrap_or_default();
        self.start_field_edit(InputField::EditName, prefill);
    }

    pub fn start_edit_due(&mut self) {
        let prefill = self
            .selected_task()
            .and_then(|t| t.due_date)
            .map(crate::models::format_date)
            .unwrap_or_default();
        self.start_field_edit(InputField::EditDue, prefill);
    }

    pub fn start_edit_info(&mut self) {
        let prefill = self.selected_task().map(|t| t.info.clone()).unwrap_or_default();
        self.start_field_edit(InputField::EditInfo, prefill);
    }

    pub fn start_search(&mut self) {
        self.input_mode = InputMode::Input;
        self.input_field = InputField::Search;
        self.input_buffer = self.filter.search.clone().unwrap_or_default();
    }

    pub fn start_from_date(&mut self) {
        self.input_mode = InputMode::Input;
        self.input_field = InputField::FromDate;
        self.input_buffer = self
            .filter
            .from
            .map(crate::models::format_date)
            .unwrap_or_default();
    }

    /// Cycles the priority filter through off, the three priorities and
    /// the synthetic overdue level.
    pub fn cycle_priority_filter(&mut self) {
        self.filter.priority = match self.filter.priority {
            None => Some(PriorityFilter::Priority(Priority::Green)),
            Some(PriorityFilter::Priority(Priority::Green)) => {
                Some(PriorityFilter::Priority(Priority::Blue))
            }
            Some(PriorityFilter::Priority(Priority::Blue)) => {
                Some(PriorityFilter::Priority(Priority::Red))
            }
            Some(PriorityFilter::Priority(Priority::Red)) => Some(PriorityFilter::Overdue),
            Some(PriorityFilter::Overdue) => None,
        };
        self.reload();
    }

    pub fn toggle_quick_today(&mut self) {
        self.filter.quick = match self.filter.quick {
            Some(QuickFilter::Today) => None,
            _ => Some(QuickFilter::Today),
        };
        self.reload();
    }

    pub fn toggle_quick_week(&mut self) {
        self.filter.quick = match self.filter.quick {
            Some(QuickFilter::Week) => None,
            _ => Some(QuickFilter::Week),
        };
        self.reload();
    }

    pub fn clear_filters(&mut self) {
        self.filter = Filter::default();
        self.reload();
    }

    pub fn toggle_sort(&mut self) {
        self.sort = self.sort.toggled();
        self.reload();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter in the input box: advances the add wizard or applies
    /// the pending edit/filter.
    pub fn handle_input(&mut self) {
        match self.input_field {
            InputField::AddName => {
                if self.input_buffer.trim().is_empty() {
                    self.status = Some(format!("Error: {}", StoreError::EmptyName));
                    return;
                }
                self.add_state.name = self.input_buffer.clone();
                self.input_field = InputField::AddDue;
                self.input_buffer.clear();
            }
            InputField::AddDue => {
                if self.input_buffer.is_empty() {
                    self.add_state.due = None;
                } else {
                    match parse_date(&self.input_buffer) {
                        Ok(d) => self.add_state.due = Some(d),
                        Err(e) => {
                            self.status = Some(format!("Error: {e}"));
                            return;
                        }
                    }
                }
                self.input_field = InputField::AddInfo;
                self.input_buffer.clear();
            }
            InputField::AddInfo => {
                self.add_state.info = self.input_buffer.clone();
                let new = NewTask {
                    name: self.add_state.name.clone(),
                    info: self.add_state.info.clone(),
                    due_date: self.add_state.due,
                    priority: Priority::Green,
                    recurrence: Recurrence::None,
                };
                self.cancel_input();
                self.run_command(Command::Add(new));
            }
            InputField::EditName => {
                if let Some(id) = self.target_id {
                    let patch = TaskPatch {
                        name: Some(self.input_buffer.clone()),
                        ..TaskPatch::default()
                    };
                    self.cancel_input();
                    self.run_command(Command::Edit { id, patch });
                }
            }
            InputField::EditDue => {
                if let Some(id) = self.target_id {
                    let due = if self.input_buffer.is_empty() {
                        Some(None)
                    } else {
                        match parse_date(&self.input_buffer) {
                            Ok(d) => Some(Some(d)),
                            Err(e) => {
                                self.status = Some(format!("Error: {e}"));
                                return;
                            }
                        }
                    };
                    let patch = TaskPatch {
                        due_date: due,
                        ..TaskPatch::default()
                    };
                    self.cancel_input();
                    self.run_command(Command::Edit { id, patch });
                }
            }
            InputField::EditInfo => {
                if let Some(id) = self.target_id {
                    let patch = TaskPatch {
                        info: Some(self.input_buffer.clone()),
                        ..TaskPatch::default()
                    };
                    self.cancel_input();
                    self.run_command(Command::Edit { id, patch });
                }
            }
            InputField::Search => {
                let needle = self.input_buffer.trim().to_string();
                self.filter.search = if needle.is_empty() { None } else { Some(needle) };
                self.cancel_input();
                self.reload();
            }
            InputField::FromDate => {
                if self.input_buffer.is_empty() {
                    self.filter.from = None;
                } else {
                    match parse_date(&self.input_buffer) {
                        Ok(d) => self.filter.from = Some(d),
                        Err(e) => {
                            self.status = Some(format!("Error: {e}"));
                            return;
                        }
                    }
                }
                self.cancel_input();
                self.reload();
            }
            InputField::None => {}
        }
    }

    /// Opens the reminder popup if anything is overdue or due today. Works
    /// on the in-memory collection only, so the tick never blocks on I/O.
    pub fn check_reminders(&mut self, today: NaiveDate) {
        let reminder = Reminder::collect(self.store.tasks(), today);
        if !reminder.is_empty() {
            self.reminder_text = reminder.summary();
            self.input_mode = InputMode::Reminder;
        }
    }

    pub fn dismiss_reminder(&mut self) {
        self.reminder_text.clear();
        self.input_mode = InputMode::Normal;
    }
}
