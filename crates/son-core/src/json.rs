//! JSON rendering of documents.
//!
//! Documents become JSON objects with their key order preserved (serde_json
//! is built with `preserve_order`). Kinds that JSON cannot represent natively
//! are written as single-key extended-JSON objects:
//!
//! | Value | JSON |
//! |---|---|
//! | `Binary` | `{"$binary": {"base64": "...", "subType": "00"}}` |
//! | `DateTime` | `{"$date": "2009-01-01T00:00:00.000Z"}` |
//! | `ObjectId` | `{"$oid": "<24 hex digits>"}` |
//! | `Regex` | `{"$regularExpression": {"pattern": "...", "options": "im"}}` |
//! | `DbRef` | `{"$ref": "collection", "$id": <id>}` |
//! | `Code` | `{"$code": "..."}` |
//! | non-finite `Float` | `{"$numberDouble": "NaN" \| "Infinity" \| "-Infinity"}` |
//!
//! # Example
//! ```
//! use son_core::{to_json_string, Document};
//! let doc = Document::from_pairs([("b", 1), ("a", 2)]);
//! assert_eq!(to_json_string(&doc).unwrap(), r#"{"b":1,"a":2}"#);
//! ```

use serde_json::{json, Map, Number, Value as Json};

use crate::canonical::PlainValue;
use crate::document::Document;
use crate::error::Result;
use crate::value::Value;

/// Render a document as a JSON object, keeping key order.
pub fn to_json(document: &Document) -> Json {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document.items() {
        map.insert(key.to_string(), value_to_json(value));
    }
    Json::Object(map)
}

/// Compact JSON text.
pub fn to_json_string(document: &Document) -> Result<String> {
    Ok(serde_json::to_string(&to_json(document))?)
}

/// Indented JSON text.
pub fn to_json_string_pretty(document: &Document) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(document))?)
}

pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(n) => Json::Number((*n).into()),
        Value::Float(f) => float_to_json(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Binary(bin) => json!({
            "$binary": {
                "base64": bin.to_base64(),
                "subType": format!("{:02x}", bin.subtype()),
            }
        }),
        Value::Array(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Document(doc) => to_json(doc),
        Value::DateTime(dt) => json!({
            "$date": dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
        }),
        Value::Regex(re) => json!({
            "$regularExpression": {
                "pattern": re.pattern,
                "options": re.flags.to_letters(),
            }
        }),
        Value::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
        Value::DbRef(r) => json!({
            "$ref": r.collection,
            "$id": value_to_json(&r.id),
        }),
        Value::Code(code) => json!({ "$code": code.as_str() }),
    }
}

fn float_to_json(f: f64) -> Json {
    match Number::from_f64(f) {
        Some(n) => Json::Number(n),
        None => {
            let repr = if f.is_nan() {
                "NaN"
            } else if f > 0.0 {
                "Infinity"
            } else {
                "-Infinity"
            };
            json!({ "$numberDouble": repr })
        }
    }
}

/// Render a flattened tree. Map keys are written in sorted order so output is
/// deterministic even though the source map has no order.
pub fn plain_to_json(value: &PlainValue) -> Json {
    match value {
        PlainValue::Map(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), plain_to_json(&map[key]));
            }
            Json::Object(out)
        }
        PlainValue::List(items) => Json::Array(items.iter().map(plain_to_json).collect()),
        PlainValue::Scalar(scalar) => value_to_json(scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_floats_use_extended_form() {
        assert_eq!(float_to_json(f64::NAN), json!({"$numberDouble": "NaN"}));
        assert_eq!(
            float_to_json(f64::NEG_INFINITY),
            json!({"$numberDouble": "-Infinity"})
        );
        assert_eq!(float_to_json(1.5), json!(1.5));
    }

    #[test]
    fn regex_uses_regular_expression_wrapper() {
        let re = Value::Regex(crate::value::Regex::new(
            "^a",
            crate::value::RegexFlags::IGNORE_CASE | crate::value::RegexFlags::MULTILINE,
        ));
        let rendered = value_to_json(&re);
        assert_eq!(
            rendered,
            json!({"$regularExpression": {"pattern": "^a", "options": "im"}})
        );
        assert!(rendered.get("$regex").is_none());
    }
}
