//! Conversion between Firestore REST `Value` JSON and [`FieldValue`].

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::backend::storage::document::{Document, FieldValue};

/// Strip the `projects/.../documents/` prefix from a resource name
pub fn relative_path<'a>(name: &'a str, documents_root: &str) -> &'a str {
    name.strip_prefix(documents_root)
        .map(|rest| rest.trim_start_matches('/'))
        .or_else(|| name.split_once("/documents/").map(|(_, rest)| rest))
        .unwrap_or(name)
}

pub fn decode_value(value: &Value, documents_root: &str) -> FieldValue {
    let object = match value.as_object() {
        Some(object) => object,
        None => return FieldValue::Null,
    };
    let (kind, inner) = match object.iter().next() {
        Some(entry) => entry,
        None => return FieldValue::Null,
    };

    match kind.as_str() {
        "booleanValue" => inner.as_bool().map(FieldValue::Bool).unwrap_or(FieldValue::Null),
        // int64 values travel as JSON strings
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map(FieldValue::Integer)
            .unwrap_or(FieldValue::Null),
        "doubleValue" => inner
            .as_f64()
            .or_else(|| inner.as_str().and_then(|s| s.parse::<f64>().ok()))
            .map(FieldValue::Double)
            .unwrap_or(FieldValue::Null),
        "stringValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .unwrap_or(FieldValue::Null),
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| FieldValue::Timestamp(t.with_timezone(&Utc)))
            .unwrap_or(FieldValue::Null),
        "referenceValue" => inner
            .as_str()
            .map(|name| FieldValue::Reference(relative_path(name, documents_root).to_string()))
            .unwrap_or(FieldValue::Null),
        "arrayValue" => FieldValue::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(|v| decode_value(v, documents_root)).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => FieldValue::Map(decode_fields(inner.get("fields"), documents_root)),
        _ => FieldValue::Null,
    }
}

fn decode_fields(fields: Option<&Value>, documents_root: &str) -> BTreeMap<String, FieldValue> {
    fields
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value, documents_root)))
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a REST `Document` resource
pub fn decode_document(value: &Value, documents_root: &str) -> Result<Document> {
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("document without a name"))?;
    let path = relative_path(name, documents_root).to_string();
    let id = path.rsplit('/').next().unwrap_or_default().to_string();

    Ok(Document {
        id,
        path,
        fields: decode_fields(value.get("fields"), documents_root),
    })
}

pub fn encode_value(value: &FieldValue, documents_root: &str) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Timestamp(t) => json!({ "timestampValue": t.to_rfc3339() }),
        FieldValue::Reference(path) => json!({ "referenceValue": format!("{}/{}", documents_root, path) }),
        FieldValue::Array(values) => json!({
            "arrayValue": {
                "values": values.iter().map(|v| encode_value(v, documents_root)).collect::<Vec<_>>()
            }
        }),
        FieldValue::Map(fields) => {
            let encoded: Map<String, Value> = fields
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value, documents_root)))
                .collect();
            json!({ "mapValue": { "fields": encoded } })
        }
    }
}
