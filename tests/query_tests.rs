use chrono::NaiveDate;

use notizzettel::models::{Priority, Recurrence, Task};
use notizzettel::query::{self, Filter, PriorityFilter, QuickFilter, Reminder, SortOrder};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn task(id: u64, name: &str, due: Option<NaiveDate>, priority: Priority) -> Task {
    Task {
        id,
        name: name.into(),
        info: String::new(),
        due_date: due,
        priority,
        recurrence: Recurrence::None,
        created: Some(date(2024, 1, 1)),
        completed: false,
        finished: None,
    }
}

fn finished_task(id: u64, name: &str, finished_on: NaiveDate, priority: Priority) -> Task {
    Task {
        completed: true,
        finished: finished_on.and_hms_opt(9, 30, 0),
        ..task(id, name, Some(finished_on), priority)
    }
}

/// Fixture around a fixed "today" of 15.06.2024.
fn sample() -> (Vec<Task>, NaiveDate) {
    let today = date(2024, 6, 15);
    let tasks = vec![
        task(1, "Water plants", Some(date(2024, 6, 10)), Priority::Green), // overdue
        task(2, "Write report", Some(date(2024, 6, 15)), Priority::Red),   // due today
        task(3, "Dentist", Some(date(2024, 6, 18)), Priority::Blue),       // this week
        task(4, "Summer party", Some(date(2024, 6, 22)), Priority::Green), // week boundary
        task(5, "Renew passport", Some(date(2024, 7, 30)), Priority::Red), // far out
        task(6, "Read more", None, Priority::Blue),                        // undated
        finished_task(7, "Tax report", date(2024, 6, 1), Priority::Red),
    ];
    (tasks, today)
}

#[test]
fn partition_preserves_order() {
    let (tasks, _) = sample();
    let active: Vec<u64> = query::active(&tasks).iter().map(|t| t.id).collect();
    assert_eq!(active, vec![1, 2, 3, 4, 5, 6]);
    let finished: Vec<u64> = query::finished(&tasks).iter().map(|t| t.id).collect();
    assert_eq!(finished, vec![7]);
}

#[test]
fn overdue_pseudo_priority_ignores_actual_priority() {
    let (tasks, today) = sample();
    let overdue: Vec<u64> = query::by_priority(&tasks, PriorityFilter::Overdue, today)
        .iter()
        .map(|t| t.id)
        .collect();
    // only task 1: due today is not overdue, finished tasks never are,
    // undated tasks never are
    assert_eq!(overdue, vec![1]);

    // overdue tasks are still active and never finished
    assert!(query::active(&tasks).iter().any(|t| t.id == 1));
    assert!(!query::finished(&tasks).iter().any(|t| t.id == 1));
}

#[test]
fn concrete_priority_filter_excludes_finished() {
    let (tasks, today) = sample();
    let red: Vec<u64> = query::by_priority(&tasks, PriorityFilter::Priority(Priority::Red), today)
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(red, vec![2, 5]); // not the finished red task 7
}

#[test]
fn from_date_excludes_undated() {
    let (tasks, _) = sample();
    let from: Vec<u64> = query::from_date(&tasks, date(2024, 6, 18))
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(from, vec![3, 4, 5]);
}

#[test]
fn name_search_is_case_insensitive() {
    let (tasks, _) = sample();
    let hits: Vec<u64> = query::by_name(&tasks, "REPORT").iter().map(|t| t.id).collect();
    assert_eq!(hits, vec![2, 7]);
}

#[test]
fn quick_filter_today() {
    let (tasks, today) = sample();
    let hits: Vec<u64> = query::due_today(&tasks, today).iter().map(|t| t.id).collect();
    assert_eq!(hits, vec![2]);
}

#[test]
fn quick_filter_week_is_a_rolling_seven_day_window() {
    let (tasks, today) = sample();
    let hits: Vec<u64> = query::due_this_week(&tasks, today).iter().map(|t| t.id).collect();
    // 15.06. through 22.06. inclusive
    assert_eq!(hits, vec![2, 3, 4]);
}

#[test]
fn filters_compose_with_logical_and() {
    let (mut tasks, today) = sample();
    tasks.push(task(8, "Final report", Some(date(2024, 6, 20)), Priority::Red));
    tasks.push(finished_task(9, "Old report", date(2024, 6, 2), Priority::Red));

    let filter = Filter {
        priority: Some(PriorityFilter::Priority(Priority::Red)),
        search: Some("report".into()),
        ..Filter::default()
    };
    let hits: Vec<u64> = query::filter_active(&tasks, &filter, today)
        .iter()
        .map(|t| t.id)
        .collect();
    // red AND name contains "report" AND active
    assert_eq!(hits, vec![2, 8]);

    let narrowed = Filter {
        from: Some(date(2024, 6, 16)),
        ..filter
    };
    let hits: Vec<u64> = query::filter_active(&tasks, &narrowed, today)
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(hits, vec![8]);
}

#[test]
fn quick_filter_composes_too() {
    let (tasks, today) = sample();
    let filter = Filter {
        priority: Some(PriorityFilter::Priority(Priority::Green)),
        quick: Some(QuickFilter::Week),
        ..Filter::default()
    };
    let hits: Vec<u64> = query::filter_active(&tasks, &filter, today)
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(hits, vec![4]);
}

#[test]
fn reminder_selects_due_and_overdue_ascending() {
    let (mut tasks, today) = sample();
    tasks.push(task(10, "Very late", Some(date(2024, 6, 1)), Priority::Blue));

    let due: Vec<u64> = query::due_for_reminder(&tasks, today)
        .iter()
        .map(|t| t.id)
        .collect();
    // ascending due date, undated excluded, finished excluded
    assert_eq!(due, vec![10, 1, 2]);

    let reminder = Reminder::collect(&tasks, today);
    let overdue: Vec<u64> = reminder.overdue.iter().map(|t| t.id).collect();
    let today_ids: Vec<u64> = reminder.due_today.iter().map(|t| t.id).collect();
    assert_eq!(overdue, vec![10, 1]);
    assert_eq!(today_ids, vec![2]);

    let summary = reminder.summary();
    assert!(summary.contains("Overdue:"));
    assert!(summary.contains("Due today:"));
    assert!(summary.contains("Very late (due 01.06.2024)"));
}

#[test]
fn empty_reminder_for_quiet_days() {
    let tasks = vec![task(1, "Later", Some(date(2024, 6, 20)), Priority::Green)];
    let reminder = Reminder::collect(&tasks, date(2024, 6, 15));
    assert!(reminder.is_empty());
    assert_eq!(reminder.summary(), "");
}

#[test]
fn sort_by_due_puts_undated_last() {
    let (tasks, _) = sample();
    let mut rows = query::active(&tasks);
    query::sort_by_due(&mut rows, SortOrder::DateAscending);
    let ids: Vec<u64> = rows.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    query::sort_by_due(&mut rows, SortOrder::DateDescending);
    let ids: Vec<u64> = rows.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![6, 5, 4, 3, 2, 1]);
}

#[test]
fn finished_from_filters_on_completion_date() {
    let tasks = vec![
        finished_task(1, "Early", date(2024, 5, 1), Priority::Green),
        finished_task(2, "Late", date(2024, 6, 10), Priority::Green),
        task(3, "Active", Some(date(2024, 5, 1)), Priority::Green),
    ];
    let hits: Vec<u64> = query::finished_from(&tasks, date(2024, 6, 1))
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(hits, vec![2]);
}
