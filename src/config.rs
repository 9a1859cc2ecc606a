//! Store configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::repository::DB_NAME;

/// Environment variable pointing at the data directory
pub const DATA_DIR_ENV: &str = "AGGR_DATA_DIR";

const HINTS_FILE: &str = "local_storage.json";
const LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database and hints; in memory when `None`
    pub data_dir: Option<PathBuf>,
    pub db_name: String,
    /// Seed the built-in series when the schema is created
    pub seed_defaults: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_name: DB_NAME.to_string(),
            seed_defaults: true,
        }
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn at(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: Some(data_dir.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Data directory from `AGGR_DATA_DIR`, in memory when unset
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::at(PathBuf::from(dir)),
            _ => Self::in_memory(),
        }
    }

    pub fn db_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.db", self.db_name)))
    }

    pub fn hints_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(HINTS_FILE))
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join(LOG_DIR))
    }
}
