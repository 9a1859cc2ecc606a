//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for document access.

use async_trait::async_trait;

use crate::domain::{DomainResult, Entity};

/// Keyed document store over one collection
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new document; an existing key is an error
    async fn create(&self, entity: &T) -> DomainResult<()>;

    /// Find document by key
    async fn find_by_id(&self, key: &str) -> DomainResult<Option<T>>;

    /// List all documents, by `updated_at` for indexed collections, by key otherwise
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Write the whole document, replacing any previous version
    async fn put(&self, entity: &T) -> DomainResult<()>;

    /// Delete document by key; absent keys are ignored
    async fn delete(&self, key: &str) -> DomainResult<()>;
}
