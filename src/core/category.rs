use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ModelError;

/// Color used for tasks whose category is missing or no longer exists.
pub const UNCATEGORIZED_COLOR: &str = "#94a3b8";

/// Colors offered by the category color picker.
pub const PRESET_COLORS: [&str; 10] = [
    "#3b82f6", "#8b5cf6", "#22c55e", "#ef4444", "#f59e0b", "#ec4899", "#06b6d4", "#14b8a6",
    "#f97316", "#6366f1",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            color: color.into(),
        })
    }
}

/// The categories a fresh installation starts with.
pub fn default_categories() -> Vec<Category> {
    [
        ("1", "Work", "#3b82f6"),
        ("2", "Personal", "#22c55e"),
        ("3", "Shopping", "#f59e0b"),
        ("4", "Health", "#ef4444"),
        ("5", "Study", "#8b5cf6"),
        ("6", "Entertainment", "#ec4899"),
    ]
    .into_iter()
    .map(|(id, name, color)| Category {
        id: id.into(),
        name: name.into(),
        color: color.into(),
    })
    .collect()
}

/// Look up a category by id. Dangling ids resolve to `None`.
pub fn find<'a>(categories: &'a [Category], id: Option<&str>) -> Option<&'a Category> {
    let id = id?;
    categories.iter().find(|c| c.id == id)
}
