//! Untyped record representation and its on-disk text form.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A record as a JSON object, before or without validation.
pub type Document = Map<String, Value>;

pub(crate) const VERSION_KEY: &str = "version";

pub fn from_value(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidFormat),
    }
}

pub fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Document> {
    from_value(serde_json::to_value(value)?)
}

/// Returns the `version` field when it is present and numeric.
pub fn version_of(document: &Document) -> Option<&serde_json::Number> {
    match document.get(VERSION_KEY) {
        Some(Value::Number(n)) => Some(n),
        _ => None,
    }
}

pub(crate) fn encode(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

pub(crate) fn decode(raw: &str) -> Result<Value> {
    Ok(serde_json::from_str(raw)?)
}
