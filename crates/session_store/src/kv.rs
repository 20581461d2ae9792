use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::SessionStoreError;
use crate::paths::staging_path;

/// Generic string key-value persistence used for client state.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        validate_key(key)?;
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        self.values.remove(key);
        Ok(())
    }
}

/// JSON-object file store. Every mutation rewrites the whole file through a
/// staging file and rename, so readers never observe a partial write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self, SessionStoreError> {
        let path = path.to_path_buf();
        let values = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|source| SessionStoreError::io("reading state file", &path, source))?;
            parse_state(&path, &raw)?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| {
                SessionStoreError::io("creating state directory", parent, source)
            })?;
        }

        let encoded = serde_json::to_vec_pretty(&self.values)
            .map_err(|source| SessionStoreError::json_serialize(&self.path, source))?;
        let staging = staging_path(&self.path);
        fs::write(&staging, encoded).map_err(|source| {
            SessionStoreError::io("writing staging state file", &staging, source)
        })?;
        fs::rename(&staging, &self.path)
            .map_err(|source| SessionStoreError::io("replacing state file", &self.path, source))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionStoreError> {
        validate_key(key)?;
        let previous = self.values.insert(key.to_owned(), value.to_owned());
        if let Err(error) = self.persist() {
            match previous {
                Some(previous) => self.values.insert(key.to_owned(), previous),
                None => self.values.remove(key),
            };
            return Err(error);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionStoreError> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), SessionStoreError> {
    if key.trim().is_empty() {
        return Err(SessionStoreError::EmptyKey {
            key: key.to_owned(),
        });
    }
    Ok(())
}

fn parse_state(path: &Path, raw: &str) -> Result<BTreeMap<String, String>, SessionStoreError> {
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }

    let parsed: Value =
        serde_json::from_str(raw).map_err(|source| SessionStoreError::json_parse(path, source))?;
    let Value::Object(object) = parsed else {
        return Err(SessionStoreError::InvalidStateShape {
            path: path.to_path_buf(),
        });
    };

    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(value) => Ok((key, value)),
            _ => Err(SessionStoreError::InvalidStateShape {
                path: path.to_path_buf(),
            }),
        })
        .collect()
}
