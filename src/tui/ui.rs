use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::models::{format_date, Priority, Task};
use crate::query::{self, PriorityFilter, QuickFilter, SortOrder};

use super::app::{App, InputField, InputMode, Tab};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3), // Filter / status bar
                Constraint::Min(0),    // Table
                Constraint::Length(3), // Help
            ]
            .as_ref(),
        )
        .split(f.area());

    render_filter_bar(f, app, chunks[0]);

    match app.tab {
        Tab::Active => render_active_table(f, app, chunks[1]),
        Tab::Finished => render_finished_table(f, app, chunks[1]),
    }

    let help_text = match app.input_mode {
        InputMode::Normal => match app.tab {
            Tab::Active => {
                "q: Quit | Tab: Finished | a: Add | Space: Done | d: Del | n/t/i: Edit | p: Prio | r: Recur | /: Search | f: From | o: Prio Filter | 1: Today | 2: Week | 0: Clear | s: Sort"
            }
            Tab::Finished => {
                "q: Quit | Tab: Active | R: Reactivate | d: Del | /: Search | f: From | o: Prio Filter | 0: Clear | s: Sort"
            }
        },
        InputMode::Input => "Enter: Confirm | Esc: Cancel",
        InputMode::Reminder => "Enter/Esc: Dismiss",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);

    match app.input_mode {
        InputMode::Input => render_input_box(f, app),
        InputMode::Reminder => render_reminder_popup(f, app),
        InputMode::Normal => {}
    }
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let mut parts: Vec<String> = Vec::new();
    match app.filter.priority {
        Some(PriorityFilter::Priority(p)) => parts.push(format!("priority: {}", p.label())),
        Some(PriorityFilter::Overdue) => parts.push("priority: overdue".to_string()),
        None => {}
    }
    if let Some(from) = app.filter.from {
        parts.push(format!("from: {}", format_date(from)));
    }
    match app.filter.quick {
        Some(QuickFilter::Today) => parts.push("today".to_string()),
        Some(QuickFilter::Week) => parts.push("this week".to_string()),
        None => {}
    }
    if let Some(s) = &app.filter.search {
        parts.push(format!("search: \"{s}\""));
    }
    if app.sort == SortOrder::DateDescending {
        parts.push("sort: desc".to_string());
    }

    let line = match &app.status {
        Some(status) if parts.is_empty() => status.clone(),
        Some(status) => format!("{} | {status}", parts.join(" | ")),
        None if parts.is_empty() => "no filters".to_string(),
        None => parts.join(" | "),
    };

    let bar = Paragraph::new(line)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title("Filter"));
    f.render_widget(bar, area);
}

fn render_active_table(f: &mut Frame, app: &mut App, area: Rect) {
    let today = Local::now().date_naive();

    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|t| {
            let overdue = query::is_overdue(t, today);
            let style = if overdue {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(priority_color(t.priority))
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.name.clone()),
                Cell::from(t.due_date.map(format_date).unwrap_or_default()),
                Cell::from(days_left(t, today)),
                Cell::from(t.priority.label()),
                Cell::from(t.recurrence.label()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Name", "Due", "Left", "Priority", "Recur"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title("Active Tasks"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_finished_table(f: &mut Frame, app: &mut App, area: Rect) {
    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(t.name.clone()),
                Cell::from(t.due_date.map(format_date).unwrap_or_default()),
                Cell::from(t.finished.map(|ts| format_date(ts.date())).unwrap_or_default()),
                Cell::from(t.priority.label()),
            ])
            .style(Style::default().fg(priority_color(t.priority)))
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["ID", "Name", "Due", "Finished", "Priority"])
                .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(Block::default().borders(Borders::ALL).title("Finished Tasks"))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_input_box(f: &mut Frame, app: &App) {
    let title = match app.input_field {
        InputField::AddName => "Add Task: Enter Name",
        InputField::AddDue => "Add Task: Enter Due Date (DD.MM.YYYY, empty for none)",
        InputField::AddInfo => "Add Task: Enter Info (optional)",
        InputField::EditName => "Edit Name",
        InputField::EditDue => "Edit Due Date (DD.MM.YYYY, empty to clear)",
        InputField::EditInfo => "Edit Info",
        InputField::Search => "Search Name",
        InputField::FromDate => "From Date (DD.MM.YYYY, empty to clear)",
        InputField::None => "Input",
    };

    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);
    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn render_reminder_popup(f: &mut Frame, app: &App) {
    let lines = app.reminder_text.lines().count() as u16;
    let area = centered_rect(60, lines.saturating_add(2).min(f.area().height), f.area());
    f.render_widget(Clear, area);
    let popup = Paragraph::new(app.reminder_text.as_str())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Reminder: due tasks"));
    f.render_widget(popup, area);
}

fn priority_color(p: Priority) -> Color {
    match p {
        Priority::Green => Color::Green,
        Priority::Blue => Color::Blue,
        Priority::Red => Color::Red,
    }
}

fn days_left(task: &Task, today: chrono::NaiveDate) -> String {
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

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(r.height.saturating_sub(height) / 2),
                Constraint::Length(height),
                Constraint::Length(r.height.saturating_sub(height) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}
