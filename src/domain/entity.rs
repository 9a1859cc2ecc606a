//! Domain Layer - Core Entity Trait
//!
//! Every persisted document belongs to exactly one collection and is
//! addressed by a single string key.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// The four collections of the `aggr` database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Workspaces,
    Series,
    Products,
    Gifs,
}

impl Collection {
    /// Table backing the collection
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Workspaces => "workspaces",
            Collection::Series => "series",
            Collection::Products => "products",
            Collection::Gifs => "gifs",
        }
    }

    /// Name of the primary key column
    pub fn key_path(&self) -> &'static str {
        match self {
            Collection::Workspaces | Collection::Series => "id",
            Collection::Products => "exchange",
            Collection::Gifs => "slug",
        }
    }

    /// Whether the collection keeps a secondary index on `updated_at`
    pub fn is_indexed(&self) -> bool {
        matches!(self, Collection::Workspaces | Collection::Series)
    }
}

/// Core trait for all persisted documents
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Collection the document lives in
    const COLLECTION: Collection;

    /// Returns the document's primary key
    fn key(&self) -> &str;

    /// Value of the ordering index, for indexed collections
    fn updated_at(&self) -> i64 {
        0
    }
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug)]
pub enum DomainError {
    /// A state or save operation ran before any workspace was activated
    NoCurrentWorkspace,
    /// The database connection is closed
    NotInitialized,
    NotFound(String),
    InvalidInput(String),
    VersionMismatch { on_disk: u32, supported: u32 },
    IdSpaceExhausted { attempts: usize },
    Storage(rusqlite::Error),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::NoCurrentWorkspace => write!(f, "There is no current workspace"),
            DomainError::NotInitialized => write!(f, "Database not initialized"),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::VersionMismatch { on_disk, supported } => write!(
                f,
                "Database version {} is newer than supported version {}",
                on_disk, supported
            ),
            DomainError::IdSpaceExhausted { attempts } => {
                write!(f, "No free workspace id after {} attempts", attempts)
            }
            DomainError::Storage(err) => write!(f, "Storage error: {}", err),
            DomainError::Serialization(err) => write!(f, "Serialization error: {}", err),
            DomainError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for DomainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DomainError::Storage(err) => Some(err),
            DomainError::Serialization(err) => Some(err),
            DomainError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(value: rusqlite::Error) -> Self {
        DomainError::Storage(value)
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(value: serde_json::Error) -> Self {
        DomainError::Serialization(value)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(value: std::io::Error) -> Self {
        DomainError::Io(value)
    }
}

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
