use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use notizzettel::commands::{apply, Command, Outcome};
use notizzettel::error::StoreError;
use notizzettel::models::{Priority, Recurrence};
use notizzettel::store::{NewTask, TaskPatch, TaskStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

fn new_task(name: &str, due: Option<NaiveDate>) -> NewTask {
    NewTask {
        name: name.into(),
        due_date: due,
        ..NewTask::default()
    }
}

#[test]
fn missing_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    let store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    assert!(store.tasks().is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");

    let mut store = TaskStore::load(&path).unwrap();
    store
        .add(
            NewTask {
                name: "Write report".into(),
                info: "quarterly numbers".into(),
                due_date: Some(date(2024, 3, 1)),
                priority: Priority::Red,
                recurrence: Recurrence::Weekly,
            },
            date(2024, 2, 1),
        )
        .unwrap();
    store.add(new_task("Undated", None), date(2024, 2, 1)).unwrap();
    store.complete(2, noon(2024, 2, 2)).unwrap();

    let reloaded = TaskStore::load(&path).unwrap();
    assert_eq!(reloaded.tasks(), store.tasks());
    // tmp file from the atomic write must not linger
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn add_assigns_sequential_ids_and_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");

    let mut store = TaskStore::load(&path).unwrap();
    let a = store.add(new_task("A", None), date(2024, 1, 1)).unwrap();
    let b = store.add(new_task("B", None), date(2024, 1, 1)).unwrap();
    assert_eq!((a, b), (1, 2));

    // ids survive deletion of the highest one
    store.delete(b).unwrap();
    let c = store.add(new_task("C", None), date(2024, 1, 2)).unwrap();
    assert_eq!(c, 2);

    let reloaded = TaskStore::load(&path).unwrap();
    assert_eq!(reloaded.tasks().len(), 2);
}

#[test]
fn add_rejects_empty_name() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let err = store.add(new_task("   ", None), date(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, StoreError::EmptyName));
    assert!(store.tasks().is_empty());
}

#[test]
fn update_patches_only_given_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    let mut store = TaskStore::load(&path).unwrap();
    let id = store
        .add(new_task("Original", Some(date(2024, 5, 1))), date(2024, 1, 1))
        .unwrap();

    store
        .update(
            id,
            TaskPatch {
                priority: Some(Priority::Red),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    let t = store.get(id).unwrap();
    assert_eq!(t.name, "Original");
    assert_eq!(t.due_date, Some(date(2024, 5, 1)));
    assert_eq!(t.priority, Priority::Red);

    // clearing the due date
    store
        .update(
            id,
            TaskPatch {
                due_date: Some(None),
                ..TaskPatch::default()
            },
        )
        .unwrap();
    assert_eq!(store.get(id).unwrap().due_date, None);

    let err = store
        .update(
            id,
            TaskPatch {
                name: Some("  ".into()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::EmptyName));
}

#[test]
fn update_unknown_id_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let err = store.update(99, TaskPatch::default()).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(99)));

    // the missing id wins over patch validation
    let err = store
        .update(
            99,
            TaskPatch {
                name: Some("  ".into()),
                ..TaskPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(99)));
}

#[test]
fn failed_save_keeps_the_change_in_memory() {
    let dir = TempDir::new().unwrap();
    // a plain file where the store expects its parent directory
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let mut store = TaskStore::load(blocker.join("tasks.json")).unwrap();
    let err = store.add(new_task("Unsaved", None), date(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));

    // the error is surfaced, but the collection keeps the task
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].name, "Unsaved");
}

#[test]
fn complete_sets_flag_and_timestamp() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let id = store
        .add(new_task("One-off", Some(date(2024, 1, 1))), date(2024, 1, 1))
        .unwrap();

    let next = store.complete(id, noon(2024, 1, 1)).unwrap();
    assert_eq!(next, None);
    let t = store.get(id).unwrap();
    assert!(t.completed);
    assert_eq!(t.finished, Some(noon(2024, 1, 1)));
    assert_eq!(store.tasks().len(), 1);

    // completing again is a no-op, not a second spawn
    assert_eq!(store.complete(id, noon(2024, 1, 2)).unwrap(), None);
}

#[test]
fn completing_weekly_task_spawns_successor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    let mut store = TaskStore::load(&path).unwrap();
    let id = store
        .add(
            NewTask {
                name: "Standup notes".into(),
                info: "post to wiki".into(),
                due_date: Some(date(2024, 1, 1)),
                priority: Priority::Blue,
                recurrence: Recurrence::Weekly,
            },
            date(2024, 1, 1),
        )
        .unwrap();

    let next = store.complete(id, noon(2024, 1, 1)).unwrap().unwrap();
    assert_ne!(next, id);

    let spawned = store.get(next).unwrap();
    assert!(!spawned.completed);
    assert_eq!(spawned.due_date, Some(date(2024, 1, 8)));
    assert_eq!(spawned.name, "Standup notes");
    assert_eq!(spawned.info, "post to wiki");
    assert_eq!(spawned.priority, Priority::Blue);
    assert_eq!(spawned.recurrence, Recurrence::Weekly);

    // both tasks hit the disk in the same operation
    let reloaded = TaskStore::load(&path).unwrap();
    assert_eq!(reloaded.tasks().len(), 2);
}

#[test]
fn completing_monthly_task_clamps_the_day() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let id = store
        .add(
            NewTask {
                name: "Rent".into(),
                due_date: Some(date(2024, 1, 31)),
                recurrence: Recurrence::Monthly,
                ..NewTask::default()
            },
            date(2024, 1, 1),
        )
        .unwrap();

    let next = store.complete(id, noon(2024, 1, 31)).unwrap().unwrap();
    assert_eq!(store.get(next).unwrap().due_date, Some(date(2024, 2, 29)));
}

#[test]
fn completing_undated_recurring_task_spawns_nothing() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let id = store
        .add(
            NewTask {
                name: "Someday".into(),
                recurrence: Recurrence::Daily,
                ..NewTask::default()
            },
            date(2024, 1, 1),
        )
        .unwrap();
    assert_eq!(store.complete(id, noon(2024, 1, 1)).unwrap(), None);
    assert_eq!(store.tasks().len(), 1);
}

#[test]
fn reactivate_clears_completion() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let id = store.add(new_task("Back again", None), date(2024, 1, 1)).unwrap();
    store.complete(id, noon(2024, 1, 1)).unwrap();

    store.reactivate(id).unwrap();
    let t = store.get(id).unwrap();
    assert!(!t.completed);
    assert_eq!(t.finished, None);
}

#[test]
fn delete_removes_from_store_and_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    let mut store = TaskStore::load(&path).unwrap();
    let id = store.add(new_task("Doomed", None), date(2024, 1, 1)).unwrap();

    let removed = store.delete(id).unwrap();
    assert_eq!(removed.name, "Doomed");
    assert!(store.tasks().is_empty());

    let reloaded = TaskStore::load(&path).unwrap();
    assert!(reloaded.tasks().is_empty());

    let err = store.delete(id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn malformed_json_is_an_error_with_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = TaskStore::load(&path).unwrap_err();
    assert!(matches!(err, StoreError::Malformed { .. }));

    let (store, warning) = TaskStore::load_or_default(&path);
    assert!(store.tasks().is_empty());
    assert!(warning.is_some());
}

#[test]
fn loads_legacy_partitioned_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        r#"{
            "active": [
                {"name": "Water plants", "date": "20.10.2024", "info": "",
                 "priority": "green", "created_date": "01.10.2024", "recurrence": "weekly"},
                {"name": "Call dentist", "date": "2024-10-22", "info": "ask about Friday",
                 "priority": "yellow", "created_date": "02.10.2024", "recurrence": null}
            ],
            "finished": [
                {"name": "Tax return", "date": "15.09.2024", "info": "",
                 "priority": "red", "created_date": "01.09.2024", "recurrence": null,
                 "finished_date": "14.09.2024"}
            ]
        }"#,
    )
    .unwrap();

    let store = TaskStore::load(&path).unwrap();
    assert_eq!(store.tasks().len(), 3);

    let plants = &store.tasks()[0];
    assert!(!plants.completed);
    assert_eq!(plants.due_date, Some(date(2024, 10, 20)));
    assert_eq!(plants.recurrence, Recurrence::Weekly);

    let dentist = &store.tasks()[1];
    assert_eq!(dentist.priority, Priority::Blue); // legacy "yellow"
    assert_eq!(dentist.due_date, Some(date(2024, 10, 22))); // ISO input

    let tax = &store.tasks()[2];
    assert!(tax.completed);
    assert_eq!(tax.finished.map(|f| f.date()), Some(date(2024, 9, 14)));

    // every legacy entry got a unique id
    let mut ids: Vec<u64> = store.tasks().iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 3);
    assert!(ids.iter().all(|&id| id != 0));

    // a save rewrites the file in the flat format, which loads back cleanly
    store.save().unwrap();
    let reloaded = TaskStore::load(&path).unwrap();
    assert_eq!(reloaded.tasks(), store.tasks());
}

#[test]
fn legacy_finished_entry_without_timestamp_gets_one() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        r#"{
            "active": [],
            "finished": [
                {"name": "Old chore", "date": "10.03.2024", "info": "",
                 "priority": "green", "created_date": "01.03.2024", "recurrence": null}
            ]
        }"#,
    )
    .unwrap();

    let store = TaskStore::load(&path).unwrap();
    let chore = &store.tasks()[0];
    assert!(chore.completed);
    // falls back to midnight of the creation date
    assert_eq!(
        chore.finished,
        Some(date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap())
    );
}

#[test]
fn unknown_fields_are_ignored_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    std::fs::write(
        &path,
        r#"[{"id": 1, "name": "Future-proof", "date": "01.01.2030",
             "some_new_field": {"nested": true}, "color": "violet"}]"#,
    )
    .unwrap();

    let store = TaskStore::load(&path).unwrap();
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(store.tasks()[0].name, "Future-proof");
}

#[test]
fn command_layer_reports_outcomes() {
    let dir = TempDir::new().unwrap();
    let mut store = TaskStore::load(dir.path().join("tasks.json")).unwrap();
    let now = noon(2024, 1, 1);

    let added = apply(
        &mut store,
        Command::Add(NewTask {
            name: "Recurring".into(),
            due_date: Some(date(2024, 1, 1)),
            recurrence: Recurrence::Daily,
            ..NewTask::default()
        }),
        now,
    )
    .unwrap();
    let Outcome::Added { id } = added else {
        panic!("expected Added, got {added:?}");
    };

    let completed = apply(&mut store, Command::Complete { id }, now).unwrap();
    assert!(matches!(completed, Outcome::Completed { next: Some(_), .. }));

    let err = apply(&mut store, Command::Delete { id: 999 }, now).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(999)));
}
