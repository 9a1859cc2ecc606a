//! Presentation series preset

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::{Collection, Entity};

/// A reusable display preset. Everything besides the id and the timestamps
/// is opaque configuration owned by the chart layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Serie {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl Entity for Serie {
    const COLLECTION: Collection = Collection::Series;

    fn key(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

/// Keys owned by the dedicated fields; never kept inside `settings`
const RESERVED_KEYS: [&str; 3] = ["id", "createdAt", "updatedAt"];

impl Serie {
    pub fn new(id: impl Into<String>, settings: Map<String, Value>) -> Self {
        let mut serie = Self {
            id: id.into(),
            created_at: 0,
            updated_at: 0,
            settings,
        };
        serie.strip_reserved();
        serie
    }

    /// Drop settings that would shadow the id or the timestamps once flattened
    pub fn strip_reserved(&mut self) {
        for key in RESERVED_KEYS {
            if self.settings.remove(key).is_some() {
                log::debug!("[series] dropped '{}' from settings of {}", key, self.id);
            }
        }
    }
}
