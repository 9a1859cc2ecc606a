//! Domain Layer
//!
//! Documents stored by the workspace layer and the rules that apply to them
//! independently of storage.

mod cache;
mod entity;
mod serie;
mod state;
mod workspace;

pub use cache::{GifsStorage, ProductsStorage};
pub use entity::{now_ms, Collection, DomainError, DomainResult, Entity};
pub use serie::Serie;
pub use state::{normalize_state, strip_private_fields, IDENTITY_FIELD, PRIVATE_PREFIX};
pub use workspace::{StateMap, Workspace};
