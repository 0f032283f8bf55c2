use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Models offered in the settings picker; anything else is a custom model.
pub const KNOWN_MODELS: [&str; 7] = [
    "gpt-3.5-turbo",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-4o",
    "claude-3-opus-20240229",
    "claude-3-sonnet-20240229",
    "claude-3-haiku-20240307",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    #[default]
    Blue,
    Purple,
    Green,
    Rose,
    Amber,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Tasks,
    Calendar,
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    #[serde(deserialize_with = "or_default")]
    pub primary_color: ThemeColor,
    pub compact_mode: bool,
    pub show_animations: bool,
    #[serde(deserialize_with = "or_default")]
    pub default_view: View,
    pub sidebar_collapsed: bool,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
}

/// Reset an unrecognised value to its default instead of rejecting the
/// whole settings document.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        log::warn!("Resetting unreadable setting to its default: {}", e);
        T::default()
    }))
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            primary_color: ThemeColor::Blue,
            compact_mode: false,
            show_animations: true,
            default_view: View::Tasks,
            sidebar_collapsed: false,
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_BASE_URL.into(),
            openai_model: DEFAULT_MODEL.into(),
        }
    }
}

/// The subset of settings the chat client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl UserSettings {
    /// Fill blank endpoint fields the way the settings form does on save.
    pub fn normalized(mut self) -> Self {
        if self.openai_base_url.trim().is_empty() {
            self.openai_base_url = DEFAULT_BASE_URL.into();
        }
        if self.openai_model.trim().is_empty() {
            self.openai_model = DEFAULT_MODEL.into();
        }
        self
    }

    pub fn uses_custom_model(&self) -> bool {
        !KNOWN_MODELS.contains(&self.openai_model.as_str())
    }

    pub fn chat(&self) -> ChatSettings {
        ChatSettings {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
        }
    }
}
