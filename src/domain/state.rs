//! State payload normalization
//!
//! UI modules keep transient bookkeeping in `_`-prefixed fields. Those are
//! dropped before a state is persisted, except `_id` which identifies the
//! owning pane.

use serde::Serialize;
use serde_json::Value;

use super::entity::DomainResult;

/// Prefix of transient fields
pub const PRIVATE_PREFIX: char = '_';

/// The one private-looking field that is persisted
pub const IDENTITY_FIELD: &str = "_id";

/// Convert any serializable payload into a detached, sanitized value
pub fn normalize_state<S: Serialize + ?Sized>(state: &S) -> DomainResult<Value> {
    let value = serde_json::to_value(state)?;
    Ok(strip_private_fields(value))
}

/// Remove top-level private fields from an object payload.
/// Non-object payloads are returned untouched.
pub fn strip_private_fields(value: Value) -> Value {
    match value {
        Value::Object(mut fields) => {
            fields.retain(|key, _| !is_private(key));
            Value::Object(fields)
        }
        other => other,
    }
}

fn is_private(key: &str) -> bool {
    key.starts_with(PRIVATE_PREFIX) && key != IDENTITY_FIELD
}
