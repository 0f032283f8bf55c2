use chrono::{Duration, Utc};

use taskflow::core::category::Category;
use taskflow::core::settings::{ThemeColor, UserSettings};
use taskflow::core::task::Task;
use taskflow::state::{AppState, CategoryOp, TaskOp};
use taskflow::store::{
    FileStore, KeyValueStore, Persisted, SETTINGS_KEY, TASKS_KEY, parse_or_default,
};

#[test]
fn task_collection_round_trips_field_for_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path());

    let mut done = Task::new("Report")
        .unwrap()
        .with_description("quarterly numbers")
        .with_category("1")
        .with_due_date(Utc::now() - Duration::days(1))
        .with_important(true);
    done.completed = true;
    let tasks = vec![done, Task::new("Buy milk").unwrap()];

    let mut slot = Persisted::load(&store, TASKS_KEY, Vec::<Task>::new());
    slot.set(&mut store, tasks.clone());

    let reopened = FileStore::open(dir.path());
    let reloaded = Persisted::load(&reopened, TASKS_KEY, Vec::<Task>::new());
    assert_eq!(reloaded.get(), &tasks);
}

#[test]
fn corrupt_file_reads_as_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path());
    std::fs::write(store.path_for(SETTINGS_KEY), "{\"primaryColor\": ").unwrap();

    let slot = Persisted::load(&store, SETTINGS_KEY, UserSettings::default());
    assert_eq!(slot.get(), &UserSettings::default());
    assert_eq!(
        parse_or_default(b"{\"primaryColor\": ", UserSettings::default()),
        UserSettings::default()
    );
}

#[test]
fn unknown_theme_color_keeps_other_settings() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = FileStore::open(dir.path());
    store
        .set(
            SETTINGS_KEY,
            r#"{"primaryColor":"chartreuse","sidebarCollapsed":true,"openaiApiKey":"sk-saved"}"#,
        )
        .unwrap();

    let state = AppState::open(FileStore::open(dir.path()));
    assert_eq!(state.settings().primary_color, ThemeColor::Blue);
    assert!(state.settings().sidebar_collapsed);
    assert_eq!(state.settings().openai_api_key, "sk-saved");
}

#[test]
fn app_state_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();

    let task = Task::new("Water plants").unwrap().with_category("2");
    {
        let mut state = AppState::open(FileStore::open(dir.path()));
        state.mutate_task(TaskOp::Add(task.clone()));
        state.mutate_category(CategoryOp::Add(Category::new("Garden", "#14b8a6").unwrap()));
        state.mutate_category(CategoryOp::Delete("2".into()));
    }

    let state = AppState::open(FileStore::open(dir.path()));
    assert_eq!(state.tasks().len(), 1);
    assert_eq!(state.tasks()[0].id, task.id);
    assert_eq!(state.tasks()[0].category_id, None);
    let names: Vec<_> = state.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Work", "Shopping", "Health", "Study", "Entertainment", "Garden"]
    );
}

#[test]
fn writes_leave_no_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::open(FileStore::open(dir.path()));
    state.mutate_task(TaskOp::Add(Task::new("one").unwrap()));

    let mut files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    files.sort();
    assert_eq!(files, vec!["tasks.json"]);
}

#[test]
fn unusable_directory_runs_in_memory() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let store = FileStore::open(blocker.join("data"));
    assert!(!store.is_ready());

    let mut state = AppState::open(store);
    assert_eq!(state.categories().len(), 6);
    state.mutate_task(TaskOp::Add(Task::new("kept in memory").unwrap()));
    assert_eq!(state.tasks().len(), 1);
}
