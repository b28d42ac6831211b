use std::error::Error;
use std::io;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use notizzettel::commands::{apply, Command};
use notizzettel::models::{format_date, parse_date, Priority, Recurrence, Task};
use notizzettel::query::{self, Filter, PriorityFilter, QuickFilter, SortOrder};
use notizzettel::store::{self, NewTask, TaskPatch, TaskStore};
use notizzettel::tui::run_tui;

#[derive(Parser)]
#[command(name = "notizzettel")]
#[command(about = "Sticky-note task manager with reminders", long_about = None)]
struct Cli {
    /// Task file to use instead of the default location
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Due date in DD.MM.YYYY or YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
        /// Free-form info text
        #[arg(short, long, default_value = "")]
        info: String,
        /// Priority (green, blue, red)
        #[arg(short, long, default_value = "green")]
        priority: Priority,
        /// Recurrence (none, daily, weekly, monthly)
        #[arg(short, long, default_value = "none")]
        recur: Recurrence,
    },
    /// List tasks
    List {
        /// Show finished tasks instead of active ones
        #[arg(long)]
        finished: bool,
        /// Filter by priority (green, blue, red, overdue)
        #[arg(short, long)]
        priority: Option<PriorityFilter>,
        /// Only tasks due on or after this date (finished view: completed on
        /// or after)
        #[arg(short, long)]
        from: Option<String>,
        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,
        /// Only tasks due today
        #[arg(long)]
        today: bool,
        /// Only tasks due within the next seven days
        #[arg(long)]
        week: bool,
        /// Latest date first
        #[arg(long)]
        desc: bool,
    },
    /// Mark a task as complete
    Complete { id: u64 },
    /// Set a finished task active again
    Reactivate { id: u64 },
    /// Remove a task
    Remove { id: u64 },
    /// Edit a task
    Edit {
        id: u64,
        /// New task name
        #[arg(short, long)]
        name: Option<String>,
        /// New info text
        #[arg(short, long)]
        info: Option<String>,
        /// New due date
        #[arg(short, long)]
        due: Option<String>,
        /// Remove the due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// New recurrence
        #[arg(short, long)]
        recur: Option<Recurrence>,
    },
    /// Print overdue and due-today tasks
    Remind,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let path = cli.file.clone().unwrap_or_else(store::default_path);
    let now = Local::now().naive_local();

    match cli.command {
        Some(Commands::Add { name, due, info, priority, recur }) => {
            let due_date = due.as_deref().map(parse_date).transpose()?;
            let mut store = TaskStore::load(&path)?;
            let outcome = apply(
                &mut store,
                Command::Add(NewTask {
                    name,
                    info,
                    due_date,
                    priority,
                    recurrence: recur,
                }),
                now,
            )?;
            println!("{outcome}");
        }
        Some(Commands::List { finished, priority, from, search, today, week, desc }) => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let store = TaskStore::load(&path)?;
            let order = if desc {
                SortOrder::DateDescending
            } else {
                SortOrder::DateAscending
            };
            if finished {
                list_finished(&store, priority, from, search.as_deref(), order);
            } else {
                let quick = if today {
                    Some(QuickFilter::Today)
                } else if week {
                    Some(QuickFilter::Week)
                } else {
                    None
                };
                let filter = Filter {
                    priority,
                    from,
                    search,
                    quick,
                };
                list_active(&store, &filter, order, now.date());
            }
        }
        Some(Commands::Complete { id }) => {
            let mut store = TaskStore::load(&path)?;
            println!("{}", apply(&mut store, Command::Complete { id }, now)?);
        }
        Some(Commands::Reactivate { id }) => {
            let mut store = TaskStore::load(&path)?;
            println!("{}", apply(&mut store, Command::Reactivate { id }, now)?);
        }
        Some(Commands::Remove { id }) => {
            let mut store = TaskStore::load(&path)?;
            println!("{}", apply(&mut store, Command::Delete { id }, now)?);
        }
        Some(Commands::Edit { id, name, info, due, no_due, priority, recur }) => {
            let due_date = if no_due {
                Some(None)
            } else {
                due.as_deref().map(parse_date).transpose()?.map(Some)
            };
            let mut store = TaskStore::load(&path)?;
            let patch = TaskPatch {
                name,
                info,
                due_date,
                priority,
                recurrence: recur,
            };
            println!("{}", apply(&mut store, Command::Edit { id, patch }, now)?);
        }
        Some(Commands::Remind) => {
            let store = TaskStore::load(&path)?;
            let reminder = query::Reminder::collect(store.tasks(), now.date());
            if reminder.is_empty() {
                println!("Nothing due.");
            } else {
                println!("{}", reminder.summary());
            }
        }
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {shell}");
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "notizzettel", &mut io::stdout());
        }
        Some(Commands::Ui) | None => run_tui(&path)?,
    }
    Ok(())
}

fn list_active(store: &TaskStore, filter: &Filter, order: SortOrder, today: NaiveDate) {
    let mut tasks = query::filter_active(store.tasks(), filter, today);
    query::sort_by_due(&mut tasks, order);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Left").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Recur").add_attribute(Attribute::Bold),
            Cell::new("Info").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        let overdue = query::is_overdue(t, today);
        let color = if overdue { Color::Red } else { priority_color(t.priority) };
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name).fg(color),
            Cell::new(t.due_date.map(format_date).unwrap_or_default()),
            Cell::new(days_left(t, today)).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(t.priority.label()).fg(priority_color(t.priority)),
            Cell::new(t.recurrence.label()),
            Cell::new(truncate(&t.info, 40)),
        ]);
    }

    println!("{table}");
}

fn list_finished(
    store: &TaskStore,
    priority: Option<PriorityFilter>,
    from: Option<NaiveDate>,
    search: Option<&str>,
    order: SortOrder,
) {
    let mut tasks: Vec<&Task> = match from {
        Some(d) => query::finished_from(store.tasks(), d),
        None => query::finished(store.tasks()),
    };
    match priority {
        Some(PriorityFilter::Priority(p)) => tasks.retain(|t| t.priority == p),
        // finished tasks are never overdue
        Some(PriorityFilter::Overdue) => tasks.clear(),
        None => {}
    }
    if let Some(needle) = search {
        tasks = query::by_name(tasks, needle);
    }
    query::sort_by_finished(&mut tasks, order);
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Finished").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
        ]);

    for t in tasks {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.name).fg(priority_color(t.priority)),
            Cell::new(t.due_date.map(format_date).unwrap_or_default()),
            Cell::new(t.finished.map(|f| format_date(f.date())).unwrap_or_default()),
            Cell::new(t.priority.label()).fg(priority_color(t.priority)),
        ]);
    }

    println!("{table}");
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Green => Color::Green,
        Priority::Blue => Color::Blue,
        Priority::Red => Color::Red,
    }
}

fn days_left(task: &Task, today: NaiveDate) -> String {
    match task.due_date {
        None => String::new(),
        Some(due) => {
            let days = (due - today).num_days();
            if days < 0 {
                format!("{}d overdue", days.abs())
            } else if days == 0 {
                "Today".to_string()
            } else {
                format!("{days}d")
            }
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    let line = s.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}…")
    }
}
