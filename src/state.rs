use chrono::NaiveDate;

use crate::chat::context::build_context;
use crate::chat::{ChatClient, ChatError, ChatMessage, ChatStream};
use crate::core::category::{Category, default_categories};
use crate::core::query::{self, ViewState};
use crate::core::settings::{UserSettings, View};
use crate::core::stats::TaskStats;
use crate::core::task::Task;
use crate::store::{CATEGORIES_KEY, KeyValueStore, Persisted, SETTINGS_KEY, TASKS_KEY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOp {
    /// Insert at the front; the list is most-recent-first.
    Add(Task),
    /// Replace the task with the same id.
    Update(Task),
    Delete(String),
    ToggleCompleted(String),
    ToggleImportant(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOp {
    Add(Category),
    Update(Category),
    /// Remove the category and clear it from every task that used it.
    Delete(String),
}

/// Owns the store and the three persisted collections.
///
/// Every change goes through one of the mutation methods here, which derive a
/// new collection from the current one and write it through in call order.
pub struct AppState<S: KeyValueStore> {
    store: S,
    tasks: Persisted<Vec<Task>>,
    categories: Persisted<Vec<Category>>,
    settings: Persisted<UserSettings>,
    /// Built from the saved chat settings; `None` while they are incomplete.
    chat: Option<ChatClient>,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn open(store: S) -> Self {
        let tasks = Persisted::load(&store, TASKS_KEY, Vec::new());
        let categories = Persisted::load(&store, CATEGORIES_KEY, default_categories());
        let settings = Persisted::load(&store, SETTINGS_KEY, UserSettings::default());
        log::info!(
            "Loaded {} tasks and {} categories",
            tasks.get().len(),
            categories.get().len()
        );
        let chat = ChatClient::new(&settings.get().chat()).ok();
        Self {
            store,
            tasks,
            categories,
            settings,
            chat,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.get()
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.get()
    }

    pub fn settings(&self) -> &UserSettings {
        self.settings.get()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }

    pub fn visible_tasks(&self, view: &ViewState, today: NaiveDate) -> Vec<&Task> {
        query::visible_tasks(self.tasks(), self.categories(), view, today)
    }

    pub fn suggestions(&self, search: &str) -> Vec<String> {
        query::search_suggestions(self.tasks(), self.categories(), search)
    }

    pub fn stats(&self, today: NaiveDate) -> TaskStats {
        TaskStats::compute(self.tasks(), self.categories(), today)
    }

    pub fn mutate_task(&mut self, op: TaskOp) {
        log::debug!("Task op: {:?}", op);
        self.tasks.update(&mut self.store, |tasks| match op {
            TaskOp::Add(task) => {
                let mut next = Vec::with_capacity(tasks.len() + 1);
                next.push(task);
                next.extend(tasks.iter().cloned());
                next
            }
            TaskOp::Update(task) => tasks
                .iter()
                .map(|t| if t.id == task.id { task.clone() } else { t.clone() })
                .collect(),
            TaskOp::Delete(id) => tasks.iter().filter(|t| t.id != id).cloned().collect(),
            TaskOp::ToggleCompleted(id) => map_task(tasks, &id, |t| t.completed = !t.completed),
            TaskOp::ToggleImportant(id) => map_task(tasks, &id, |t| t.important = !t.important),
        });
    }

    pub fn mutate_category(&mut self, op: CategoryOp) {
        log::debug!("Category op: {:?}", op);
        match op {
            CategoryOp::Add(category) => self.categories.update(&mut self.store, |cats| {
                let mut next = cats.clone();
                next.push(category);
                next
            }),
            CategoryOp::Update(category) => self.categories.update(&mut self.store, |cats| {
                cats.iter()
                    .map(|c| if c.id == category.id { category.clone() } else { c.clone() })
                    .collect()
            }),
            CategoryOp::Delete(id) => {
                self.tasks.update(&mut self.store, |tasks| {
                    tasks
                        .iter()
                        .map(|t| {
                            let mut t = t.clone();
                            if t.has_category(&id) {
                                t.category_id = None;
                            }
                            t
                        })
                        .collect()
                });
                self.categories.update(&mut self.store, |cats| {
                    cats.iter().filter(|c| c.id != id).cloned().collect()
                });
            }
        }
    }

    /// Save settings wholesale.
    pub fn set_settings(&mut self, settings: UserSettings) {
        let previous = self.settings().chat();
        self.settings.set(&mut self.store, settings.normalized());

        let current = self.settings().chat();
        if current != previous || self.chat.is_none() {
            self.chat = ChatClient::new(&current).ok();
        }
    }

    /// Remember the active view. Only written when it changes.
    pub fn set_active_view(&mut self, view: View) {
        if self.settings().default_view != view {
            self.settings.update(&mut self.store, |s| UserSettings {
                default_view: view,
                ..s.clone()
            });
        }
    }

    /// Remember the sidebar state. Only written when it changes.
    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        if self.settings().sidebar_collapsed != collapsed {
            self.settings.update(&mut self.store, |s| UserSettings {
                sidebar_collapsed: collapsed,
                ..s.clone()
            });
        }
    }

    /// The client for the saved chat settings. Clones share one connection pool.
    pub fn chat_client(&self) -> Result<ChatClient, ChatError> {
        match &self.chat {
            Some(client) => Ok(client.clone()),
            // Re-run validation to report why no client could be built.
            None => ChatClient::new(&self.settings().chat()),
        }
    }

    /// Snapshot of tasks and categories for the assistant.
    pub fn chat_context(&self) -> String {
        build_context(self.tasks(), self.categories())
    }

    pub async fn stream_chat(&self, history: &[ChatMessage]) -> Result<ChatStream, ChatError> {
        self.chat_client()?.stream(history).await
    }
}

fn map_task(tasks: &[Task], id: &str, f: impl Fn(&mut Task)) -> Vec<Task> {
    tasks
        .iter()
        .map(|t| {
            let mut t = t.clone();
            if t.id == id {
                f(&mut t);
            }
            t
        })
        .collect()
}
