//! Workspace Operations
//!
//! Workspace-specific queries on top of the document repository.

use async_trait::async_trait;
use rusqlite::params;

use super::db::{open_connection, storage_error};
use super::document_repo::DocumentRepository;
use crate::domain::{DomainResult, Workspace};
use crate::identity::Identities;

pub type WorkspaceRepository = DocumentRepository<Workspace>;

/// Trait for workspace identity queries
#[async_trait]
pub trait WorkspaceOperations {
    /// Fresh snapshot of every registered id and name
    async fn identities(&self) -> DomainResult<Identities>;

    /// Same snapshot without the workspace `id`
    async fn identities_except(&self, id: &str) -> DomainResult<Identities>;
}

#[async_trait]
impl WorkspaceOperations for WorkspaceRepository {
    async fn identities(&self) -> DomainResult<Identities> {
        self.snapshot(None).await
    }

    async fn identities_except(&self, id: &str) -> DomainResult<Identities> {
        self.snapshot(Some(id)).await
    }
}

impl WorkspaceRepository {
    async fn snapshot(&self, except: Option<&str>) -> DomainResult<Identities> {
        let guard = self.conn.lock().await;
        let conn = open_connection(&guard)?;

        let mut stmt = conn
            .prepare("SELECT id, json_extract(document, '$.name') FROM workspaces WHERE id IS NOT ?1")
            .map_err(storage_error)?;
        let rows = stmt
            .query_map(params![except], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })
            .map_err(storage_error)?;

        let mut identities = Identities::default();
        for row in rows {
            let (id, name) = row.map_err(storage_error)?;
            identities.ids.insert(id);
            identities.names.insert(name.unwrap_or_default());
        }
        Ok(identities)
    }
}
