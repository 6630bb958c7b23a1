// lazylist-embed - JSON emission and ingestion
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! JSON output for values, and JSON input as lazy lists.

use lazylist_core::{Error, External, LazyList, Result, Value, canonicalize, flatten};
use tracing::debug;

/// Emit a value as JSON. Lists are materialized and nested lists become
/// arrays; rationals are widened to floats.
pub fn to_json(value: &Value) -> Result<serde_json::Value> {
    let flat = flatten(value)?;
    serde_json::to_value(&flat).map_err(|e| {
        debug!(error = %e, "json emission failed");
        Error::conversion("json-compatible value", flat.type_name())
    })
}

/// Emit a value as a compact JSON string.
pub fn to_json_string(value: &Value) -> Result<String> {
    let flat = flatten(value)?;
    serde_json::to_string(&flat).map_err(|e| {
        debug!(error = %e, "json emission failed");
        Error::conversion("json-compatible value", flat.type_name())
    })
}

/// Canonicalize a JSON document.
///
/// Numbers become integers or exact rationals, strings stay strings and
/// arrays become lazy lists whose elements are converted on demand. JSON
/// has no counterpart for `null`, booleans or objects among the canonical
/// kinds, so those are rejected (inside an array, when the element is
/// reached).
pub fn from_json(json: serde_json::Value) -> Result<Value> {
    canonicalize(json_external(json)?)
}

/// A finite lazy list over the elements of a JSON array.
pub fn list_from_json(json: serde_json::Value) -> Result<LazyList> {
    match json {
        serde_json::Value::Array(items) => Ok(LazyList::with_producer(
            Box::new(
                items
                    .into_iter()
                    .map(|item| json_external(item).and_then(canonicalize)),
            ),
            false,
        )),
        other => Err(Error::conversion("array", json_type_name(&other))),
    }
}

fn json_external(json: serde_json::Value) -> Result<External> {
    match json {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(External::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(External::Int(u.into()))
            } else if let Some(x) = n.as_f64() {
                Ok(External::Float(x))
            } else {
                Err(Error::Unrepresentable(n.to_string()))
            }
        }
        serde_json::Value::String(s) => Ok(External::Str(s)),
        serde_json::Value::Array(_) => list_from_json(json).map(External::from),
        other => Err(Error::conversion(
            "number, string or array",
            json_type_name(&other),
        )),
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
