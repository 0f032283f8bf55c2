mod cli;

use std::io::Write;
use std::process::ExitCode;

use chrono::{Local, NaiveDate, TimeZone, Utc};
use clap::Parser;

use cli::{Cli, Command, SettingKey, TabArg};

use taskflow::chat::Conversation;
use taskflow::config::TaskflowConfig;
use taskflow::core::category::{self, Category, PRESET_COLORS};
use taskflow::core::query::{ActiveFilter, ViewState, filter_count};
use taskflow::core::task::Task;
use taskflow::core::today;
use taskflow::state::{AppState, CategoryOp, TaskOp};
use taskflow::store::FileStore;

fn install_logger(debug: bool) {
    // Journal logging (`journalctl --user -t taskflow -f`): this crate at
    // info/debug, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("taskflow") {
                let max = if taskflow::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    taskflow::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("taskflow".to_string()),
        Err(e) => {
            eprintln!("journal logging unavailable: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass when toggled.
        log::set_max_level(log::LevelFilter::Debug);
    }
}

/// Due dates picked by day are stored as local midnight.
fn start_of_day(day: NaiveDate) -> Result<chrono::DateTime<Utc>, String> {
    day.and_hms_opt(0, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("{} has no local midnight", day))
}

fn resolve_task(state: &AppState<FileStore>, prefix: &str) -> Result<String, String> {
    let matches: Vec<&Task> = state
        .tasks()
        .iter()
        .filter(|t| t.id.starts_with(prefix))
        .collect();
    match matches.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(format!("no task matches {:?}", prefix)),
        _ => Err(format!("{:?} matches {} tasks", prefix, matches.len())),
    }
}

fn print_task(task: &Task, categories: &[Category]) {
    let mark = if task.completed { "x" } else { " " };
    let star = if task.important { "*" } else { " " };
    let cat = category::find(categories, task.category_id.as_deref())
        .map(|c| format!(" [{}]", c.name))
        .unwrap_or_default();
    let due = task
        .due_day()
        .map(|d| format!(" (due {})", d))
        .unwrap_or_default();
    let short_id: String = task.id.chars().take(8).collect();
    println!(
        "[{}]{} {}  {}{}{}",
        mark,
        star,
        short_id,
        task.title,
        cat,
        due
    );
}

fn list(
    state: &AppState<FileStore>,
    search: Option<String>,
    filter: Option<String>,
    tab: Option<TabArg>,
    date: Option<NaiveDate>,
) {
    let mut view = ViewState::default();
    if date.is_some() {
        view.select_date(date);
    }
    if let Some(key) = filter {
        let filter = match key.as_str() {
            "all" => None,
            key => Some(ActiveFilter::from_key(key)),
        };
        view.select_filter(filter);
    }
    if let Some(tab) = tab {
        view.select_tab(tab.into());
    }
    if let Some(text) = search {
        view.set_search(&text);
    }

    for task in state.visible_tasks(&view, today()) {
        print_task(task, state.categories());
    }
}

fn add(
    state: &mut AppState<FileStore>,
    title: String,
    description: Option<String>,
    category: Option<String>,
    due: Option<NaiveDate>,
    important: bool,
) -> Result<(), String> {
    let mut task = Task::new(title)
        .map_err(|e| e.to_string())?
        .with_important(important);
    if let Some(d) = description {
        task = task.with_description(d);
    }
    if let Some(c) = category {
        task = task.with_category(c);
    }
    if let Some(due) = due {
        task = task.with_due_date(start_of_day(due)?);
    }
    print_task(&task, state.categories());
    state.mutate_task(TaskOp::Add(task));
    Ok(())
}

fn categories(state: &AppState<FileStore>) {
    let day = today();
    for c in state.categories() {
        let count = filter_count(state.tasks(), &ActiveFilter::Category(c.id.clone()), day);
        println!("{:>8}  {}  {} ({})", c.id, c.color, c.name, count);
    }
}

fn stats(state: &AppState<FileStore>) {
    let s = state.stats(today());
    println!(
        "completed {}/{} ({}%), important {}/{} ({}%), overdue {}",
        s.overall.completed,
        s.overall.total,
        s.overall.rate,
        s.important.completed,
        s.important.total,
        s.important.rate,
        s.overdue
    );
    for c in &s.by_category {
        println!("  {:<16} {}/{}", c.name, c.completed, c.total);
    }
    for w in &s.by_weekday {
        println!("  {:<16} {}/{}", w.weekday, w.completed, w.total);
    }
    for m in &s.by_month {
        println!("  {:<16} {}/{}", format!("{} {}", m.label, m.year), m.completed, m.total);
    }
}

fn set(state: &mut AppState<FileStore>, key: SettingKey, value: String) {
    let mut settings = state.settings().clone();
    match key {
        SettingKey::ApiKey => settings.openai_api_key = value,
        SettingKey::BaseUrl => settings.openai_base_url = value,
        SettingKey::Model => settings.openai_model = value,
    }
    state.set_settings(settings);
    if state.settings().uses_custom_model() {
        println!("using custom model {}", state.settings().openai_model);
    }
}

async fn chat(state: &AppState<FileStore>, message: &[String]) -> Result<(), String> {
    let client = state.chat_client().map_err(|e| e.to_string())?;
    let input = message.join(" ");
    let mut conversation = Conversation::new();
    let mut printed = 0;
    let result = conversation
        .send(&client, &state.chat_context(), &input, |text| {
            // Each update carries the whole reply; print only what's new.
            print!("{}", &text[printed..]);
            let _ = std::io::stdout().flush();
            printed = text.len();
        })
        .await;
    println!();
    result.map(|_| ()).map_err(|e| e.to_string())
}

async fn run(state: &mut AppState<FileStore>, command: Command) -> Result<(), String> {
    match command {
        Command::List {
            search,
            filter,
            tab,
            date,
        } => list(state, search, filter, tab, date),
        Command::Add {
            title,
            description,
            category,
            due,
            important,
        } => add(state, title, description, category, due, important)?,
        Command::Done { id } => {
            let id = resolve_task(state, &id)?;
            state.mutate_task(TaskOp::ToggleCompleted(id));
        }
        Command::Star { id } => {
            let id = resolve_task(state, &id)?;
            state.mutate_task(TaskOp::ToggleImportant(id));
        }
        Command::Rm { id } => {
            let id = resolve_task(state, &id)?;
            state.mutate_task(TaskOp::Delete(id));
        }
        Command::Categories => categories(state),
        Command::CategoryAdd { name, color } => {
            let color = color.unwrap_or_else(|| {
                PRESET_COLORS[state.categories().len() % PRESET_COLORS.len()].to_string()
            });
            let category = Category::new(name, color).map_err(|e| e.to_string())?;
            state.mutate_category(CategoryOp::Add(category));
        }
        Command::CategoryRm { id } => state.mutate_category(CategoryOp::Delete(id)),
        Command::Suggest { text } => {
            for s in state.suggestions(&text) {
                println!("{}", s);
            }
        }
        Command::Stats => stats(state),
        Command::View { view } => state.set_active_view(view.into()),
        Command::Set { key, value } => set(state, key, value),
        Command::Chat { message } => chat(state, &message).await?,
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = TaskflowConfig::load();
    if let Some(dir) = cli.data_dir {
        config.data_directory = dir;
    }
    install_logger(config.debug_logging || cli.debug);

    let mut state = AppState::open(config.open_store());
    let command = cli.command.unwrap_or(Command::List {
        search: None,
        filter: None,
        tab: None,
        date: None,
    });

    match run(&mut state, command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("taskflow: {}", e);
            ExitCode::FAILURE
        }
    }
}
