pub mod file;
pub mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

pub const TASKS_KEY: &str = "tasks";
pub const CATEGORIES_KEY: &str = "categories";
pub const SETTINGS_KEY: &str = "userSettings";

/// Persistence failures. These are logged and never surfaced past [`Persisted`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not available yet")]
    Unavailable,
    #[error("I/O error on key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize {key:?}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to decode stored value: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("storage quota exceeded writing {key:?} ({needed} bytes, {available} available)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        available: usize,
    },
}

/// A durable string store addressed by logical key.
pub trait KeyValueStore {
    /// Whether the backing storage can be used at all. Until it is, loads
    /// yield defaults and writes only touch memory.
    fn is_ready(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Decode a stored document.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Decode a stored document, substituting `default` if it doesn't parse.
pub fn parse_or_default<T: DeserializeOwned>(bytes: &[u8], default: T) -> T {
    match decode(bytes) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Discarding unreadable stored value: {}", e);
            default
        }
    }
}

/// One logical key held in memory and written through to a [`KeyValueStore`].
///
/// The in-memory value is authoritative: a failed write is logged and the
/// new value stays visible.
#[derive(Debug, Clone)]
pub struct Persisted<T> {
    key: &'static str,
    value: T,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &'static str, default: T) -> Self {
        if !store.is_ready() {
            log::debug!("Store not ready, using default for {:?}", key);
            return Self { key, value: default };
        }

        let value = match store.get(key) {
            Ok(Some(raw)) => parse_or_default(raw.as_bytes(), default),
            Ok(None) => default,
            Err(e) => {
                log::warn!("Failed to read {:?}, using default: {}", key, e);
                default
            }
        };
        Self { key, value }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set<S: KeyValueStore + ?Sized>(&mut self, store: &mut S, value: T) {
        self.value = value;
        if let Err(e) = self.persist(store) {
            log::warn!("Failed to persist {:?}: {}", self.key, e);
        }
    }

    /// Replace the value with one derived from the current value.
    pub fn update<S, F>(&mut self, store: &mut S, f: F)
    where
        S: KeyValueStore + ?Sized,
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(store, next);
    }

    fn persist<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        if !store.is_ready() {
            return Err(StoreError::Unavailable);
        }
        let json = serde_json::to_string(&self.value).map_err(|source| StoreError::Serialize {
            key: self.key.to_string(),
            source,
        })?;
        store.set(self.key, &json)
    }
}
