//! Cached datasets
//!
//! Opaque blobs refreshed from the network; last write wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Collection, Entity};

/// Product listing of one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsStorage {
    pub exchange: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub data: Value,
}

impl Entity for ProductsStorage {
    const COLLECTION: Collection = Collection::Products;

    fn key(&self) -> &str {
        &self.exchange
    }
}

/// Media lookup result for one keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifsStorage {
    pub slug: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub data: Value,
}

impl Entity for GifsStorage {
    const COLLECTION: Collection = Collection::Gifs;

    fn key(&self) -> &str {
        &self.slug
    }
}
