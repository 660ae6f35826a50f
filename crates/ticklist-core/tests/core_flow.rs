use std::ffi::OsString;
use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use ticklist_core::app::App;
use ticklist_core::datastore::{FileBackend, MemoryBackend, PersistentStore, TASKS_KEY, THEME_KEY};
use ticklist_core::filter::FilterMode;
use ticklist_core::task::Task;
use ticklist_core::todos::TaskStore;
use tempfile::tempdir;

#[test]
fn buy_milk_scenario() {
    let mut app = App::open(MemoryBackend::new());
    assert!(app.todos.tasks().is_empty());

    let id = app
        .todos
        .create("buy milk")
        .expect("create")
        .expect("task created");
    assert_eq!(app.todos.tasks().len(), 1);
    assert_eq!(app.todos.tasks()[0].text, "buy milk");
    assert!(!app.todos.tasks()[0].completed);

    app.todos.toggle(id).expect("toggle");
    assert!(app.todos.tasks()[0].completed);

    app.todos.set_filter(FilterMode::Active);
    assert!(app.todos.filtered_view().is_empty());

    app.todos.set_filter(FilterMode::Completed);
    let view = app.todos.filtered_view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].id, id);

    app.todos.clear_completed().expect("clear completed");
    assert!(app.todos.tasks().is_empty());
}

#[test]
fn dark_mode_survives_restart() {
    let backend = MemoryBackend::new();
    let mut app = App::open(backend.clone());
    assert!(!app.prefs.dark_mode());

    app.prefs.toggle().expect("toggle dark mode");
    assert!(app.prefs.dark_mode());
    drop(app);

    let app = App::open(backend);
    assert!(app.prefs.dark_mode());
}

#[test]
fn file_backed_tasks_round_trip() {
    let temp = tempdir().expect("tempdir");
    let backend = FileBackend::open(temp.path()).expect("open backend");
    let mut todos = TaskStore::open(PersistentStore::new(backend));

    let now = Utc
        .with_ymd_and_hms(2026, 4, 2, 8, 15, 30)
        .single()
        .expect("valid now");
    let first = todos.create_at("water plants", now).expect("create").expect("id");
    todos.create_at("call mum", now).expect("create").expect("id");
    todos.toggle(first).expect("toggle");
    let saved = todos.tasks().to_vec();

    let backend = todos.into_store().into_backend();
    let reloaded = TaskStore::open(PersistentStore::new(backend));
    assert_eq!(reloaded.tasks(), saved.as_slice());

    let raw = fs::read_to_string(temp.path().join(format!("{TASKS_KEY}.json"))).expect("read slot");
    let decoded: Vec<Task> = serde_json::from_str(&raw).expect("decode slot");
    assert_eq!(decoded, saved);
    assert!(raw.contains("\"createdAt\":\"2026-04-02T08:15:30Z\""));
}

#[test]
fn malformed_files_fall_back_to_defaults() {
    let temp = tempdir().expect("tempdir");
    fs::write(temp.path().join(format!("{TASKS_KEY}.json")), "[{\"id\":").expect("write tasks");
    fs::write(temp.path().join(format!("{THEME_KEY}.json")), "maybe").expect("write theme");

    let mut app = App::open(FileBackend::open(temp.path()).expect("open backend"));
    assert!(app.todos.tasks().is_empty());
    assert!(!app.prefs.dark_mode());

    app.todos.create("fresh start").expect("create");
    let reopened = App::open(FileBackend::open(temp.path()).expect("reopen backend"));
    assert_eq!(reopened.todos.tasks().len(), 1);
}

fn run_cli(data: &Path, rc: &Path, args: &[&str]) {
    let mut argv: Vec<OsString> = vec![
        "ticklist".into(),
        "--config".into(),
        rc.into(),
        "--data".into(),
        data.into(),
    ];
    argv.extend(args.iter().map(OsString::from));
    ticklist_core::run(argv).expect("run cli");
}

#[test]
fn cli_commands_persist_between_invocations() {
    let temp = tempdir().expect("tempdir");
    let data = temp.path().join("data");
    let rc = temp.path().join("ticklistrc");
    fs::write(&rc, "color = off\n").expect("write rc");

    run_cli(&data, &rc, &["add", "feed", "the", "cat"]);
    run_cli(&data, &rc, &["add", "   "]);
    run_cli(&data, &rc, &["theme", "toggle"]);

    let app = App::open(FileBackend::open(&data).expect("open backend"));
    assert_eq!(app.todos.tasks().len(), 1);
    assert_eq!(app.todos.tasks()[0].text, "feed the cat");
    assert!(app.prefs.dark_mode());
    let id = app.todos.tasks()[0].id.to_string();
    drop(app);

    run_cli(&data, &rc, &["done", &id]);
    run_cli(&data, &rc, &["list", "--filter", "completed"]);
    run_cli(&data, &rc, &["clear-completed"]);
    run_cli(&data, &rc, &[]);

    let app = App::open(FileBackend::open(&data).expect("open backend"));
    assert!(app.todos.tasks().is_empty());
}

#[test]
fn cli_keeps_rc_like_words_in_task_text() {
    let temp = tempdir().expect("tempdir");
    let data = temp.path().join("data");
    let rc = temp.path().join("ticklistrc");
    fs::write(&rc, "color = off\n").expect("write rc");

    run_cli(&data, &rc, &["add", "edit", "rc.local=on", "file"]);
    run_cli(&data, &rc, &["add", "scratch"]);

    let app = App::open(FileBackend::open(&data).expect("open backend"));
    assert_eq!(app.todos.tasks()[0].text, "edit rc.local=on file");
    let first = app.todos.tasks()[0].id.to_string();
    let scratch = app.todos.tasks()[1].id.to_string();
    drop(app);

    run_cli(&data, &rc, &["edit", &first, "set", "rc.x:y"]);
    run_cli(&data, &rc, &["rm", &scratch]);

    let app = App::open(FileBackend::open(&data).expect("open backend"));
    assert_eq!(app.todos.tasks().len(), 1);
    assert_eq!(app.todos.tasks()[0].text, "set rc.x:y");
}
