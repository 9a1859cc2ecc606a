//! Environment collaborators
//!
//! The workspace layer reads and writes two environment signals: the
//! current address (whose path may carry a workspace id) and a small durable
//! key/value store holding the last used workspace. Activation also hands the
//! workspace to the application bootstrap.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{DomainResult, Workspace};
use crate::identity::is_workspace_id;

/// Key of the persisted "last workspace" hint
pub const WORKSPACE_HINT_KEY: &str = "workspace";

/// Address and durable hints of the hosting application
pub trait Environment: Send + Sync {
    /// Path of the current address, e.g. `/ab12`
    fn location_path(&self) -> String;

    /// Replace the current address without adding a history entry
    fn replace_location(&self, path: &str) -> DomainResult<()>;

    fn hint(&self, key: &str) -> Option<String>;

    fn set_hint(&self, key: &str, value: &str) -> DomainResult<()>;

    fn remove_hint(&self, key: &str) -> DomainResult<()>;
}

/// Workspace id carried by an address path, if the raw segment has the exact id shape
pub fn workspace_token(path: &str) -> Option<String> {
    let segment = path.strip_prefix('/').unwrap_or(path);
    is_workspace_id(segment).then(|| segment.to_string())
}

/// Application side of activation: rehydrate from the workspace states
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn boot(&self, workspace: &Workspace) -> DomainResult<()>;
}

/// Bootstrap that only records the activation in the log
pub struct NoopBootstrap;

#[async_trait]
impl Bootstrap for NoopBootstrap {
    async fn boot(&self, workspace: &Workspace) -> DomainResult<()> {
        log::info!(
            "[workspaces] boot {} ({}), {} states",
            workspace.name,
            workspace.id,
            workspace.states.len()
        );
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Environment held entirely in memory
#[derive(Default)]
pub struct MemoryEnvironment {
    location: Mutex<String>,
    hints: Mutex<BTreeMap<String, String>>,
}

impl MemoryEnvironment {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
            hints: Mutex::default(),
        }
    }

    /// Same environment with a hint already stored
    pub fn with_hint(self, key: &str, value: &str) -> Self {
        lock(&self.hints).insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MemoryEnvironment {
    fn location_path(&self) -> String {
        lock(&self.location).clone()
    }

    fn replace_location(&self, path: &str) -> DomainResult<()> {
        *lock(&self.location) = path.to_string();
        Ok(())
    }

    fn hint(&self, key: &str) -> Option<String> {
        lock(&self.hints).get(key).cloned()
    }

    fn set_hint(&self, key: &str, value: &str) -> DomainResult<()> {
        lock(&self.hints).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_hint(&self, key: &str) -> DomainResult<()> {
        lock(&self.hints).remove(key);
        Ok(())
    }
}

/// Environment whose hints survive restarts in a JSON file.
///
/// The address lives in memory and starts from the value given at construction.
pub struct FileEnvironment {
    path: PathBuf,
    location: Mutex<String>,
    hints: Mutex<BTreeMap<String, String>>,
}

impl FileEnvironment {
    /// Load hints from `path`; a missing file means no hints
    pub fn open(path: impl AsRef<Path>, location: impl Into<String>) -> DomainResult<Self> {
        let path = path.as_ref().to_path_buf();

        let hints = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            location: Mutex::new(location.into()),
            hints: Mutex::new(hints),
        })
    }

    fn persist(&self, hints: &BTreeMap<String, String>) -> DomainResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(hints)?)?;
        Ok(())
    }
}

impl Environment for FileEnvironment {
    fn location_path(&self) -> String {
        lock(&self.location).clone()
    }

    fn replace_location(&self, path: &str) -> DomainResult<()> {
        *lock(&self.location) = path.to_string();
        Ok(())
    }

    fn hint(&self, key: &str) -> Option<String> {
        lock(&self.hints).get(key).cloned()
    }

    fn set_hint(&self, key: &str, value: &str) -> DomainResult<()> {
        let mut hints = lock(&self.hints);
        hints.insert(key.to_string(), value.to_string());
        self.persist(&hints)
    }

    fn remove_hint(&self, key: &str) -> DomainResult<()> {
        let mut hints = lock(&self.hints);
        if hints.remove(key).is_some() {
            self.persist(&hints)?;
        }
        Ok(())
    }
}
