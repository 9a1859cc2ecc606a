//! Built-in series catalog
//!
//! Inserted once, when the schema is first created.

use serde_json::{Map, Value};

use crate::domain::{DomainError, DomainResult, Serie};

const DEFAULT_SERIES: &str = include_str!("default_series.json");

/// Parse the bundled catalog, keyed by serie id
pub fn default_series() -> DomainResult<Vec<Serie>> {
    parse_catalog(DEFAULT_SERIES)
}

/// Parse a catalog object `{ "<id>": { ...settings } }`
pub fn parse_catalog(catalog: &str) -> DomainResult<Vec<Serie>> {
    let entries: Map<String, Value> = serde_json::from_str(catalog)?;

    entries
        .into_iter()
        .map(|(id, settings)| match settings {
            Value::Object(settings) => Ok(Serie::new(id, settings)),
            _ => Err(DomainError::InvalidInput(format!(
                "serie '{}' is not an object",
                id
            ))),
        })
        .collect()
}
