use std::{
    collections::HashMap,
    marker::PhantomData,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::warn;

use crate::error::AppError;

/// Durable string storage keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn set(&self, key: &str, value: String) -> Result<(), AppError>;
}

/// Keeps each key in `<root>/<key>.json`.
#[derive(Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_structure(&self) -> Result<(), AppError> {
        fs::create_dir_all(self.root()).await?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(AppError::BadRequest(format!("invalid store key {key:?}")));
        }
        Ok(self.root().join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let path = self.path_for(key)?;
        if !fs::try_exists(&path).await? {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path).await?))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(self.root()).await?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, value).await?;
        fs::rename(&staging, &path).await?;
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// A typed value living under one key of a [`KeyValueStore`].
pub struct Persisted<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _value: PhantomData,
        }
    }

    /// Where undecodable contents are copied before falling back.
    pub fn backup_key(&self) -> String {
        format!("{}-corrupt", self.key)
    }

    /// Missing keys and unreadable contents both fall back to `T::default()`.
    /// Unreadable contents are first copied to [`Persisted::backup_key`].
    pub async fn load(&self) -> Result<T, AppError> {
        let Some(raw) = self.store.get(self.key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                let backup = self.backup_key();
                self.store.set(&backup, raw).await?;
                warn!(
                    key = self.key,
                    %backup,
                    "stored value could not be decoded, kept a copy and using default: {err}"
                );
                Ok(T::default())
            }
        }
    }

    pub async fn save(&self, value: &T) -> Result<(), AppError> {
        let data =
            serde_json::to_string(value).map_err(|err| AppError::Other(err.into()))?;
        self.store.set(self.key, data).await
    }
}
