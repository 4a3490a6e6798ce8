//! Rendering of raw BSON as relaxed extended JSON text, for logging and debugging.
//!
//! Values that have no JSON equivalent are written as the extended JSON wrappers (`$oid`,
//! `$binary`, `$date`, and so on). Rendering never fails: a malformed element ends the document
//! it appears in, and everything before it is still rendered.
//!
//! ```rust
//! use rawbson::{builder::DocumentStream, json};
//!
//! let doc = DocumentStream::new()
//!     .key("a")
//!     .append(1)
//!     .key("b")
//!     .open_document()
//!     .key("c")
//!     .append("x")
//!     .close_document()
//!     .extract()?;
//! assert_eq!(json::to_json(&doc), r#"{"a":1,"b":{"c":"x"}}"#);
//! # Ok::<(), rawbson::error::Error>(())
//! ```

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Map, Value};

use crate::raw::{ElementAccess, RawArray, RawBsonRef, RawDocument};

/// Documents and arrays nested deeper than this are rendered as `"..."`.
pub const MAX_DEPTH: usize = 200;

/// Renders `doc` as a JSON object.
pub fn to_json(doc: &RawDocument) -> String {
    to_json_value(doc).to_string()
}

/// Renders `array` as a JSON array.
pub fn to_json_array(array: &RawArray) -> String {
    array_value(array, 0).to_string()
}

/// Converts `doc` to a [`serde_json::Value`] with the same contents [`to_json`] renders.
pub fn to_json_value(doc: &RawDocument) -> Value {
    document_value(doc, 0)
}

fn document_value(doc: &RawDocument, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return json!("...");
    }

    let mut map = Map::new();
    for element in doc {
        let Ok(value) = element.value() else {
            break;
        };
        map.insert(element.key().to_string(), bson_value(value, depth + 1));
    }
    Value::Object(map)
}

fn array_value(array: &RawArray, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return json!("...");
    }

    let mut values = Vec::new();
    for element in array {
        let Ok(value) = element.value() else {
            break;
        };
        values.push(bson_value(value, depth + 1));
    }
    Value::Array(values)
}

fn bson_value(value: RawBsonRef<'_>, depth: usize) -> Value {
    match value {
        RawBsonRef::Double(v) if v.is_nan() => json!({ "$numberDouble": "NaN" }),
        RawBsonRef::Double(v) if v.is_infinite() => {
            let s = if v.is_sign_negative() {
                "-Infinity"
            } else {
                "Infinity"
            };
            json!({ "$numberDouble": s })
        }
        RawBsonRef::Double(v) => json!(v),
        RawBsonRef::String(v) => json!(v),
        RawBsonRef::Document(v) => document_value(v, depth),
        RawBsonRef::Array(v) => array_value(v, depth),
        RawBsonRef::Boolean(v) => json!(v),
        RawBsonRef::Null => Value::Null,
        RawBsonRef::RegularExpression(re) => {
            let mut chars: Vec<_> = re.options.chars().collect();
            chars.sort();
            let options: String = chars.into_iter().collect();

            json!({
                "$regularExpression": {
                    "pattern": re.pattern,
                    "options": options,
                }
            })
        }
        RawBsonRef::JavaScriptCode(code) => json!({ "$code": code }),
        RawBsonRef::JavaScriptCodeWithScope(cws) => json!({
            "$code": cws.code,
            "$scope": document_value(cws.scope, depth),
        }),
        RawBsonRef::Int32(v) => v.into(),
        RawBsonRef::Int64(v) => v.into(),
        RawBsonRef::Timestamp(ts) => json!({
            "$timestamp": {
                "t": ts.time,
                "i": ts.increment,
            }
        }),
        RawBsonRef::Binary(binary) => json!({
            "$binary": {
                "base64": STANDARD.encode(binary.bytes),
                "subType": hex::encode([u8::from(binary.subtype)]),
            }
        }),
        RawBsonRef::ObjectId(oid) => json!({ "$oid": oid.to_hex() }),
        RawBsonRef::DateTime(millis) => json!({
            "$date": { "$numberLong": millis.to_string() },
        }),
        RawBsonRef::Symbol(v) => json!({ "$symbol": v }),
        RawBsonRef::Decimal128(v) => json!({ "$numberDecimal": v.to_string() }),
        RawBsonRef::Undefined => json!({ "$undefined": true }),
        RawBsonRef::MinKey => json!({ "$minKey": 1 }),
        RawBsonRef::MaxKey => json!({ "$maxKey": 1 }),
        RawBsonRef::DbPointer(dbp) => json!({
            "$dbPointer": {
                "$ref": dbp.namespace,
                "$id": { "$oid": dbp.id.to_hex() },
            }
        }),
    }
}
