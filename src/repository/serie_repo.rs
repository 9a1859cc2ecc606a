//! Serie Operations

use async_trait::async_trait;

use super::document_repo::DocumentRepository;
use super::traits::Repository;
use crate::domain::{now_ms, DomainResult, Serie};

pub type SerieRepository = DocumentRepository<Serie>;

/// Trait for serie writes that maintain timestamps
#[async_trait]
pub trait SerieOperations {
    /// Stamp `createdAt` when unset, bump `updatedAt`, write the whole serie.
    /// Settings keyed like the dedicated fields are dropped.
    async fn save(&self, serie: &mut Serie) -> DomainResult<()>;
}

#[async_trait]
impl SerieOperations for SerieRepository {
    async fn save(&self, serie: &mut Serie) -> DomainResult<()> {
        let now = now_ms();
        if serie.created_at == 0 {
            serie.created_at = now;
        }
        serie.updated_at = now;
        serie.strip_reserved();

        log::debug!("[series] save serie {}", serie.id);
        self.put(serie).await
    }
}
