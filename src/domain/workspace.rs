//! Workspace domain entity

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Collection, Entity};

/// Named states of a workspace, keyed by state name
pub type StateMap = BTreeMap<String, Value>;

/// A named bundle of application state
///
/// Serialized with camelCase keys; the same shape is used for exported files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// 4-character alphanumeric identifier; empty on documents not yet registered
    #[serde(default)]
    pub id: String,
    /// Display name, unique among workspaces once registered
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub states: StateMap,
}

impl Entity for Workspace {
    const COLLECTION: Collection = Collection::Workspaces;

    fn key(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl Workspace {
    /// Blank document stamped with `timestamp`, id and name left to the allocator
    pub fn blank(timestamp: i64) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            created_at: timestamp,
            updated_at: timestamp,
            states: StateMap::new(),
        }
    }

    /// Restamp both timestamps, used when a document is registered as a new record
    pub fn stamp(&mut self, timestamp: i64) {
        self.created_at = timestamp;
        self.updated_at = timestamp;
    }
}

// Exported files from older clients carry `"name": null`.
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
