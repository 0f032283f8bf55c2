use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{local_day, ModelError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub important: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Result<Self, ModelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModelError::EmptyTitle);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            description: String::new(),
            completed: false,
            important: false,
            category_id: None,
            due_date: None,
            created_at: Utc::now(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn with_important(mut self, important: bool) -> Self {
        self.important = important;
        self
    }

    /// Calendar day (local time) the task is due on.
    pub fn due_day(&self) -> Option<NaiveDate> {
        self.due_date.as_ref().map(local_day)
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_day() == Some(day)
    }

    /// Open and due on a day strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_day().is_some_and(|d| d < today)
    }

    pub fn has_category(&self, category_id: &str) -> bool {
        self.category_id.as_deref() == Some(category_id)
    }
}
