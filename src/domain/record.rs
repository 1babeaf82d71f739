//! Record helpers shared by both persistence adapters.
//!
//! A record is an open JSON object; the only field the service owns is the
//! collection's identifier field.

use serde_json::{Map, Value as JsonValue};

pub type Record = Map<String, JsonValue>;

/// Extracts a record from a request body. Only JSON objects are accepted.
pub fn record_from_body(body: JsonValue) -> Result<Record, String> {
    match body {
        JsonValue::Object(map) => Ok(map),
        other => Err(format!(
            "Request body must be a JSON object, got {}",
            json_kind(&other)
        )),
    }
}

/// Overwrites same-named top-level fields of `existing` with those in `patch`.
pub fn shallow_merge(existing: &mut Record, patch: Record) {
    for (k, v) in patch {
        existing.insert(k, v);
    }
}

/// Sets the identifier field, replacing whatever value the record carried.
pub fn pin_id(record: &mut Record, id_field: &str, id: &str) {
    record.insert(id_field.to_string(), JsonValue::from(id));
}

/// Returns the identifier of a stored record, if it carries a string one.
pub fn record_id<'a>(record: &'a Record, id_field: &str) -> Option<&'a str> {
    record.get(id_field).and_then(JsonValue::as_str)
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
