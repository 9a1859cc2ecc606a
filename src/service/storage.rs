//! Series presets and cached datasets
//!
//! Passthrough to the repositories; none of these touch the current workspace.

use super::WorkspaceStore;
use crate::domain::{DomainResult, GifsStorage, ProductsStorage, Serie};
use crate::repository::{Repository, SerieOperations};

impl WorkspaceStore {
    pub async fn save_serie(&self, serie: &mut Serie) -> DomainResult<()> {
        self.series.save(serie).await
    }

    pub async fn get_serie(&self, id: &str) -> DomainResult<Option<Serie>> {
        self.series.find_by_id(id).await
    }

    /// All series, least recently updated first
    pub async fn list_series(&self) -> DomainResult<Vec<Serie>> {
        self.series.list().await
    }

    pub async fn delete_serie(&self, id: &str) -> DomainResult<()> {
        self.series.delete(id).await
    }

    pub async fn save_products(&self, storage: &ProductsStorage) -> DomainResult<()> {
        self.products.put(storage).await
    }

    pub async fn get_products(&self, exchange_id: &str) -> DomainResult<Option<ProductsStorage>> {
        self.products.find_by_id(exchange_id).await
    }

    pub async fn delete_products(&self, exchange_id: &str) -> DomainResult<()> {
        self.products.delete(exchange_id).await
    }

    pub async fn save_gifs(&self, storage: &GifsStorage) -> DomainResult<()> {
        self.gifs.put(storage).await
    }

    pub async fn get_gifs(&self, slug: &str) -> DomainResult<Option<GifsStorage>> {
        self.gifs.find_by_id(slug).await
    }

    pub async fn delete_gifs(&self, slug: &str) -> DomainResult<()> {
        self.gifs.delete(slug).await
    }
}
