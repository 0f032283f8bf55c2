use std::collections::HashSet;

use chrono::NaiveDate;

use super::category::Category;
use super::task::Task;

/// Search prefix that switches from text search to category-name search.
pub const CATEGORY_PREFIX: &str = "category:";

const MAX_TITLE_SUGGESTIONS: usize = 3;
const MAX_CATEGORY_SUGGESTIONS: usize = 2;

/// Sidebar filter. At most one is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveFilter {
    Completed,
    Important,
    Today,
    Overdue,
    Category(String),
}

impl ActiveFilter {
    /// Any key that isn't one of the named filters is taken as a category id.
    pub fn from_key(s: &str) -> Self {
        match s {
            "completed" => Self::Completed,
            "important" => Self::Important,
            "today" => Self::Today,
            "overdue" => Self::Overdue,
            other => Self::Category(other.to_string()),
        }
    }

    pub fn as_key(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Important => "important",
            Self::Today => "today",
            Self::Overdue => "overdue",
            Self::Category(id) => id,
        }
    }

    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::Completed => task.completed,
            Self::Important => task.important,
            Self::Today => task.is_due_on(today),
            Self::Overdue => task.is_overdue(today),
            Self::Category(id) => task.has_category(id),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    All,
    Pending,
    Completed,
}

impl Tab {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !task.completed,
            Self::Completed => task.completed,
        }
    }
}

/// Everything the task list is currently narrowed by.
///
/// The `select_*` methods keep the tab and the sidebar filter consistent with
/// each other the same way the dashboard does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    pub filter: Option<ActiveFilter>,
    pub tab: Tab,
    pub selected_date: Option<NaiveDate>,
}

impl ViewState {
    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
        match tab {
            Tab::Completed => self.filter = Some(ActiveFilter::Completed),
            Tab::Pending | Tab::All => {
                if self.filter == Some(ActiveFilter::Completed) {
                    self.filter = None;
                }
            }
        }
    }

    pub fn select_filter(&mut self, filter: Option<ActiveFilter>) {
        match &filter {
            Some(ActiveFilter::Completed) => self.tab = Tab::Completed,
            Some(ActiveFilter::Today) | None => self.tab = Tab::All,
            Some(_) => {}
        }
        self.filter = filter;
    }

    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        self.selected_date = date;
        if date.is_some() {
            self.filter = None;
            self.tab = Tab::All;
        }
    }
}

/// Returns the category-name part of a `category:` search, if it is one.
pub fn category_search(search: &str) -> Option<&str> {
    let prefix = search.get(..CATEGORY_PREFIX.len())?;
    if prefix.eq_ignore_ascii_case(CATEGORY_PREFIX) {
        Some(&search[CATEGORY_PREFIX.len()..])
    } else {
        None
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn apply_search<'a>(tasks: &mut Vec<&'a Task>, categories: &[Category], search: &str) {
    if search.is_empty() {
        return;
    }
    match category_search(search) {
        Some(name) => {
            let name = name.to_lowercase();
            let ids: HashSet<&str> = categories
                .iter()
                .filter(|c| contains_ci(&c.name, &name))
                .map(|c| c.id.as_str())
                .collect();
            tasks.retain(|t| t.category_id.as_deref().is_some_and(|id| ids.contains(id)));
        }
        None => {
            let needle = search.to_lowercase();
            tasks.retain(|t| contains_ci(&t.title, &needle) || contains_ci(&t.description, &needle));
        }
    }
}

/// Search, sidebar filter and selected date, in that order. Order is preserved.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    categories: &[Category],
    search: &str,
    filter: Option<&ActiveFilter>,
    selected_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut result: Vec<&Task> = tasks.iter().collect();

    apply_search(&mut result, categories, search);

    if let Some(filter) = filter {
        result.retain(|t| filter.matches(t, today));
    }

    if let Some(date) = selected_date {
        result.retain(|t| t.is_due_on(date));
    }

    result
}

/// The task list as shown: [`filter_tasks`] narrowed further by the tab.
pub fn visible_tasks<'a>(
    tasks: &'a [Task],
    categories: &[Category],
    view: &ViewState,
    today: NaiveDate,
) -> Vec<&'a Task> {
    let mut result = filter_tasks(
        tasks,
        categories,
        &view.search,
        view.filter.as_ref(),
        view.selected_date,
        today,
    );
    result.retain(|t| view.tab.matches(t));
    result
}

/// Autocomplete entries for the search box. Advisory only.
pub fn search_suggestions(tasks: &[Task], categories: &[Category], search: &str) -> Vec<String> {
    if search.chars().count() <= 1 {
        return Vec::new();
    }
    let needle = search.to_lowercase();

    let titles = tasks
        .iter()
        .filter(|t| {
            let title = t.title.to_lowercase();
            title.contains(&needle) && !title.starts_with(&needle)
        })
        .map(|t| t.title.clone())
        .take(MAX_TITLE_SUGGESTIONS);

    let names = categories
        .iter()
        .filter(|c| contains_ci(&c.name, &needle))
        .map(|c| format!("{}{}", CATEGORY_PREFIX, c.name))
        .take(MAX_CATEGORY_SUGGESTIONS);

    let mut seen = HashSet::new();
    titles
        .chain(names)
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// Number of tasks a single sidebar filter would match, ignoring search and date.
pub fn filter_count(tasks: &[Task], filter: &ActiveFilter, today: NaiveDate) -> usize {
    tasks.iter().filter(|t| filter.matches(t, today)).count()
}

/// Tasks due on one calendar day, as marked on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub total: usize,
    pub completed: usize,
}

pub fn day_summary(tasks: &[Task], day: NaiveDate) -> DaySummary {
    tasks
        .iter()
        .filter(|t| t.is_due_on(day))
        .fold(DaySummary::default(), |mut acc, t| {
            acc.total += 1;
            if t.completed {
                acc.completed += 1;
            }
            acc
        })
}
