//! Workspace Store
//!
//! Owns the database handle, the repositories and the single in-memory
//! current workspace. Operations are split by concern:
//! - workspaces: resolution, activation and workspace CRUD
//! - states: the named states of the current workspace
//! - storage: series presets and cached datasets

mod states;
mod storage;
mod workspaces;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::domain::{DomainResult, GifsStorage, ProductsStorage, Workspace};
use crate::environment::{Bootstrap, Environment, WORKSPACE_HINT_KEY};
use crate::repository::{
    default_series, delete_database, init_db, DbState, DocumentRepository, SerieRepository,
    WorkspaceRepository,
};

pub use workspaces::WorkspaceExport;

pub struct WorkspaceStore {
    db: DbState,
    workspaces: WorkspaceRepository,
    series: SerieRepository,
    products: DocumentRepository<ProductsStorage>,
    gifs: DocumentRepository<GifsStorage>,
    environment: Arc<dyn Environment>,
    bootstrap: Arc<dyn Bootstrap>,
    current: Option<Workspace>,
}

impl WorkspaceStore {
    /// Open the database described by `config`; resolves once it is ready
    /// (and seeded, on first creation)
    pub async fn open(
        config: &StoreConfig,
        environment: Arc<dyn Environment>,
        bootstrap: Arc<dyn Bootstrap>,
    ) -> DomainResult<Self> {
        let defaults = if config.seed_defaults {
            default_series()?
        } else {
            Vec::new()
        };

        let db = init_db(config.db_path().as_deref(), &defaults).await?;
        Ok(Self::with_db(db, environment, bootstrap))
    }

    /// Build the store over an already initialized database
    pub fn with_db(
        db: DbState,
        environment: Arc<dyn Environment>,
        bootstrap: Arc<dyn Bootstrap>,
    ) -> Self {
        let conn = db.connection();
        Self {
            workspaces: WorkspaceRepository::new(conn.clone()),
            series: SerieRepository::new(conn.clone()),
            products: DocumentRepository::new(conn.clone()),
            gifs: DocumentRepository::new(conn),
            db,
            environment,
            bootstrap,
            current: None,
        }
    }

    /// The active workspace, if any
    pub fn current(&self) -> Option<&Workspace> {
        self.current.as_ref()
    }

    pub fn db(&self) -> &DbState {
        &self.db
    }

    /// Close the database, forget the current workspace and its hint, then
    /// delete the database from disk. Irreversible.
    ///
    /// The handle and the hint are dropped even when closing fails, since the
    /// connection is gone either way.
    pub async fn reset(&mut self) -> DomainResult<()> {
        log::info!("[workspaces] reset");

        let closed = self.db.close().await;
        self.current = None;
        let unhinted = self.environment.remove_hint(WORKSPACE_HINT_KEY);
        closed.and(unhinted)?;

        if let Some(path) = self.db.path() {
            delete_database(path)?;
        }
        Ok(())
    }
}
