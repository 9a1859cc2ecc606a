//! Repository Layer
//!
//! Data access abstractions and the SQLite implementation.

mod db;
mod document_repo;
mod seed;
mod serie_repo;
mod traits;
mod workspace_repo;


pub use db::{
    delete_database, init_db, report, storage_error, DbEvent, DbState, SharedConnection,
    DB_NAME, DB_VERSION,
};
pub use document_repo::DocumentRepository;
pub use seed::{default_series, parse_catalog};
pub use serie_repo::{SerieOperations, SerieRepository};
pub use traits::Repository;
pub use workspace_repo::{WorkspaceOperations, WorkspaceRepository};
