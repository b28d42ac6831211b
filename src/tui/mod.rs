pub mod app;
pub mod ui;

use std::error::Error;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use app::{App, InputMode};
use ui::ui;

/// How often the reminder popup re-checks for due tasks. The check runs on
/// the in-memory collection only, never the file.
const REMINDER_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

const TICK: Duration = Duration::from_millis(500);

pub fn run_tui(path: &Path) -> Result<(), Box<dyn Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app = App::new(path);

    // Run loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    // First reminder right away, then every REMINDER_INTERVAL.
    let mut last_check: Option<Instant> = None;

    loop {
        let due = last_check.map_or(true, |t| t.elapsed() >= REMINDER_INTERVAL);
        if due && app.input_mode == InputMode::Normal {
            app.check_reminders(Local::now().date_naive());
            last_check = Some(Instant::now());
        }

        terminal.draw(|f| ui(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            match app.input_mode {
                InputMode::Normal => match key.code {
                    KeyCode::Char('q') => return Ok(()),
                    KeyCode::Down | KeyCode::Char('j') => app.next(),
                    KeyCode::Up | KeyCode::Char('k') => app.previous(),
                    KeyCode::Tab | KeyCode::Char('v') => app.toggle_tab(),
                    KeyCode::Char(' ') => app.complete_selected(),
                    KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
                    KeyCode::Char('R') => app.reactivate_selected(),
                    KeyCode::Char('a') => app.start_add(),
                    KeyCode::Char('n') => app.start_edit_name(),
                    KeyCode::Char('t') => app.start_edit_due(), // 't' for Time/Date
                    KeyCode::Char('i') => app.start_edit_info(),
                    KeyCode::Char('p') => app.cycle_selected_priority(),
                    KeyCode::Char('r') => app.cycle_selected_recurrence(),
                    KeyCode::Char('/') => app.start_search(),
                    KeyCode::Char('f') => app.start_from_date(),
                    KeyCode::Char('o') => app.cycle_priority_filter(),
                    KeyCode::Char('1') => app.toggle_quick_today(),
                    KeyCode::Char('2') => app.toggle_quick_week(),
                    KeyCode::Char('0') => app.clear_filters(),
                    KeyCode::Char('s') => app.toggle_sort(),
                    _ => {}
                },
                InputMode::Input => match key.code {
                    KeyCode::Enter => app.handle_input(),
                    KeyCode::Esc => app.cancel_input(),
                    KeyCode::Char(c) => {
                        app.input_buffer.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input_buffer.pop();
                    }
                    _ => {}
                },
                InputMode::Reminder => match key.code {
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => {
                        app.dismiss_reminder();
                    }
                    _ => {}
                },
            }
        }
    }
}
