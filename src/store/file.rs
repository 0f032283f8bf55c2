use std::path::PathBuf;

use super::{KeyValueStore, StoreError};

/// Stores each key as `<key>.json` in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
    ready: bool,
}

impl FileStore {
    /// Open a store rooted at `directory`, creating it if needed. A directory
    /// that can't be created leaves the store unready rather than failing.
    pub fn open(directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        let ready = match std::fs::create_dir_all(&directory) {
            Ok(()) => true,
            Err(e) => {
                log::warn!(
                    "Data directory {} is unusable, running without persistence: {}",
                    directory.display(),
                    e
                );
                false
            }
        };
        Self { directory, ready }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if !self.ready {
            return Err(StoreError::Unavailable);
        }
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if !self.ready {
            return Err(StoreError::Unavailable);
        }
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        // Write beside the target then rename, so readers never see half a file.
        let path = self.path_for(key);
        let tmp = self.directory.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)?;
        log::debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }
}
