//! aggr workspaces
//!
//! Local persistence for workspaces, series presets and cached datasets.
//!
//! Layered architecture:
//! - domain: Documents and the rules that apply to them
//! - identity: Collision-free workspace ids and names
//! - repository: SQLite schema lifecycle and document access
//! - environment: Address, durable hints and application bootstrap
//! - service: The workspace store tying everything together

pub mod config;
pub mod domain;
pub mod environment;
pub mod identity;
pub mod repository;
pub mod service;

pub use config::StoreConfig;
pub use domain::{DomainError, DomainResult, Serie, Workspace};
pub use environment::{Bootstrap, Environment, FileEnvironment, MemoryEnvironment, NoopBootstrap};
pub use service::{WorkspaceExport, WorkspaceStore};
