use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::{FileStore, parse_or_default};

pub const APP_ID: &str = "taskflow";

/// Overrides the data directory from the config file.
pub const DATA_DIR_ENV: &str = "TASKFLOW_DATA_DIR";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join(APP_ID)
}

/// Process-level configuration, as opposed to [`crate::core::settings::UserSettings`]
/// which lives in the data store.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TaskflowConfig {
    pub data_directory: PathBuf,
    pub debug_logging: bool,
}

impl Default for TaskflowConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
        }
    }
}

impl TaskflowConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_ID).join("config.json"))
    }

    /// Load from the standard location, then apply the environment override.
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .map(|p| Self::load_from(&p))
            .unwrap_or_default();
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_directory = PathBuf::from(dir);
        }
        config
    }

    /// A missing or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => parse_or_default(&bytes, Self::default()),
            Err(_) => Self::default(),
        }
    }

    pub fn open_store(&self) -> FileStore {
        FileStore::open(&self.data_directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"debug_logging": true}"#).unwrap();

        let config = TaskflowConfig::load_from(&path);
        assert!(config.debug_logging);
        assert_eq!(config.data_directory, default_data_dir());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = TaskflowConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, TaskflowConfig::default());
    }
}
