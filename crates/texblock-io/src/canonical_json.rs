//! Deterministic serialization of normalized documents.
//!
//! Normalization is deterministic, so two equal documents must serialize to
//! identical bytes regardless of the key order their source JSON used:
//! - object keys are sorted lexicographically (including the struct-declared
//!   `type` / `data` / `attr` order of the block model)
//! - arrays preserve order
//! - output is minified JSON with no extra whitespace

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use texblock_core::model::Block;

/// Canonical JSON bytes for a normalized document.
pub fn canonical_blocks_bytes(blocks: &[Block]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&sorted_value(blocks)?)
}

/// Canonical JSON string for a normalized document.
pub fn canonical_blocks_string(blocks: &[Block]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted_value(blocks)?)
}

fn sorted_value(blocks: &[Block]) -> Result<Value, serde_json::Error> {
    Ok(sort_keys(serde_json::to_value(blocks)?))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(key, value)| (key, sort_keys(value)))
                .collect();
            Value::Object(Map::from_iter(sorted))
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}
