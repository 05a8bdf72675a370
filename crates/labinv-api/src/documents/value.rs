// Typed-value codec for the document store.
//
// The REST surface wraps every field in a one-key object naming its type
// (`{"stringValue": "x"}`, `{"integerValue": "3"}`, `{"mapValue": {...}}`).
// Callers work with plain `serde_json::Value`; this module converts both
// ways so models can stay ordinary serde structs.

use serde_json::{Map, Number, Value, json};

use crate::error::Error;

/// Encode a plain JSON object as a document `fields` map.
pub fn encode_fields(obj: &Map<String, Value>) -> Map<String, Value> {
    obj.iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect()
}

/// Encode one plain JSON value into its typed representation.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(obj) => json!({ "mapValue": { "fields": encode_fields(obj) } }),
    }
}

/// Decode a document `fields` map into a plain JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, Error> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Decode one typed value into plain JSON.
///
/// Timestamps decode to their RFC 3339 string; references decode to the
/// full resource name. Bytes and geo points are passed through as-is.
pub fn decode_value(value: &Value) -> Result<Value, Error> {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(Error::Schema(format!("not a typed value: {value}")));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue"
        | "geoPointValue" => Ok(inner.clone()),
        "integerValue" => {
            // Sent as a decimal string, occasionally as a bare number.
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(|i| Value::Number(i.into()))
                .ok_or_else(|| Error::Schema(format!("bad integerValue: {inner}")))
        }
        "doubleValue" => match inner {
            Value::Number(_) => Ok(inner.clone()),
            Value::String(s) => s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| Error::Schema(format!("bad doubleValue: {inner}"))),
            _ => Err(Error::Schema(format!("bad doubleValue: {inner}"))),
        },
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Object(fields))
        }
        other => Err(Error::Schema(format!("unknown value kind: {other}"))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn encodes_scalars() {
        assert_eq!(encode_value(&json!("10uF")), json!({ "stringValue": "10uF" }));
        assert_eq!(encode_value(&json!(12)), json!({ "integerValue": "12" }));
        assert_eq!(encode_value(&json!(0.5)), json!({ "doubleValue": 0.5 }));
        assert_eq!(encode_value(&json!(true)), json!({ "booleanValue": true }));
        assert_eq!(encode_value(&Value::Null), json!({ "nullValue": null }));
    }

    #[test]
    fn encodes_nested_maps() {
        let encoded = encode_value(&json!({ "displayName": "Ada", "tags": ["a"] }));
        assert_eq!(
            encoded,
            json!({
                "mapValue": { "fields": {
                    "displayName": { "stringValue": "Ada" },
                    "tags": { "arrayValue": { "values": [ { "stringValue": "a" } ] } }
                }}
            })
        );
    }

    #[test]
    fn decodes_document_fields() {
        let fields = json!({
            "name": { "stringValue": "Resistor 10k" },
            "quantity": { "integerValue": "250" },
            "rate": { "doubleValue": 0.02 },
            "createdAt": { "timestampValue": "2024-05-01T10:00:00Z" },
            "empty": { "arrayValue": {} }
        });
        let decoded = decode_fields(fields.as_object().unwrap()).unwrap();
        assert_eq!(
            Value::Object(decoded),
            json!({
                "name": "Resistor 10k",
                "quantity": 250,
                "rate": 0.02,
                "createdAt": "2024-05-01T10:00:00Z",
                "empty": []
            })
        );
    }

    #[test]
    fn rejects_untyped_values() {
        assert!(decode_value(&json!("plain")).is_err());
        assert!(decode_value(&json!({ "integerValue": "x" })).is_err());
    }
}
