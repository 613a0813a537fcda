use crate::{
    model::Instance,
    schema::{Primitive, Shape, registry::Registry},
    value::{Timestamp, Value},
};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map as JsonMap, Number, Value as JsonValue};
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// TranslateError
///
/// Per-field failures while moving between runtime values and their
/// JSON form. Every variant names the offending field or model.
///

#[derive(Debug, ThisError)]
pub enum TranslateError {
    #[error("translation error in '{field}' field: JSON object not supported by declared types")]
    UnsupportedObject { field: String },

    #[error("translation error in '{field}' field: JSON array not supported by declared types")]
    UnsupportedArray { field: String },

    #[error(
        "translation error in '{field}' field: JSON scalar not supported by declared types"
    )]
    UnsupportedScalar { field: String },

    #[error("map key in '{field}' field is not JSON-representable: {kind} keys do not serialize to text")]
    NonTextMapKey { field: String, kind: &'static str },

    #[error("non-finite number in '{field}' field is not JSON-representable")]
    NonFiniteNumber { field: String },

    #[error("model '{model}' could not be translated to a valid JSON object")]
    NotRepresentable { model: String },

    #[error("JSON payload for model '{model}' must be an object")]
    NotAnObject { model: String },

    #[error("invalid JSON payload: {0}")]
    Parse(#[from] serde_json::Error),
}

///
/// JsonMode
///
/// Canonical emits nested relationship values as full objects;
/// RawIdentifiers substitutes their bare identifiers, producing the
/// flat parameter shape used for backend calls.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum JsonMode {
    #[default]
    Canonical,
    RawIdentifiers,
}

///
/// SERIALIZE
///
/// Driven by the runtime shape of the value; the value already has a
/// concrete form, so declared types play no part here.
///

pub fn value_to_json(
    field: &str,
    value: &Value,
    mode: JsonMode,
) -> Result<JsonValue, TranslateError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Int(i) => Ok(JsonValue::Number(Number::from(*i))),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| TranslateError::NonFiniteNumber {
                field: field.to_string(),
            }),
        Value::Decimal(d) => d
            .to_f64()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .ok_or_else(|| TranslateError::NonFiniteNumber {
                field: field.to_string(),
            }),
        Value::Text(s) => Ok(JsonValue::String(s.clone())),
        Value::Bytes(bytes) => Ok(JsonValue::String(encode_hex(bytes))),
        Value::Timestamp(ts) => Ok(JsonValue::String(ts.to_iso8601())),

        // Raw mode applies inside collections too, so has-many values
        // serialize as identifier arrays.
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
            let rendered = items
                .iter()
                .map(|item| value_to_json(field, item, mode))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(JsonValue::Array(rendered))
        }
        Value::Map(entries) => {
            let mut object = JsonMap::new();
            for (key, val) in entries {
                let JsonValue::String(key_text) = value_to_json(field, key, mode)? else {
                    return Err(TranslateError::NonTextMapKey {
                        field: field.to_string(),
                        kind: key.kind_name(),
                    });
                };
                object.insert(key_text, value_to_json(field, val, mode)?);
            }
            Ok(JsonValue::Object(object))
        }

        Value::Model(instance) => match mode {
            JsonMode::Canonical => instance.to_json_value(JsonMode::Canonical),
            // Raw mode substitutes the bare identifier; an unsaved
            // nested model without one degrades to null.
            JsonMode::RawIdentifiers => match instance.identifier() {
                Some(id) => value_to_json(field, &id, JsonMode::RawIdentifiers),
                None => Ok(JsonValue::Null),
            },
        },
    }
}

///
/// DESERIALIZE
///
/// Driven by the shape of the parsed JSON value, mirroring a standard
/// parse tree; the declared shapes choose how each form is decoded.
///

pub fn value_from_json(
    field: &str,
    allowed: &[Shape],
    json: &JsonValue,
    registry: &Registry,
) -> Result<Value, TranslateError> {
    match json {
        JsonValue::Object(object) => object_from_json(field, allowed, json, object, registry),
        JsonValue::Array(items) => array_from_json(field, allowed, items, registry),
        JsonValue::String(text) => string_from_json(field, allowed, text, registry),
        scalar => scalar_from_json(field, allowed, scalar),
    }
}

fn object_from_json(
    field: &str,
    allowed: &[Shape],
    json: &JsonValue,
    object: &JsonMap<String, JsonValue>,
    registry: &Registry,
) -> Result<Value, TranslateError> {
    // First declared map or model shape wins.
    let usable = allowed
        .iter()
        .find(|shape| matches!(shape, Shape::Map { .. } | Shape::Model(_)));

    match usable {
        Some(Shape::Map { key, value }) => {
            let mut entries = Vec::with_capacity(object.len());
            for (raw_key, raw_value) in object {
                let key_json = JsonValue::String(raw_key.clone());
                let key_value =
                    value_from_json(field, std::slice::from_ref(key.as_ref()), &key_json, registry)?;
                let val_value =
                    value_from_json(field, std::slice::from_ref(value.as_ref()), raw_value, registry)?;
                entries.push((key_value, val_value));
            }
            Ok(Value::Map(entries))
        }
        Some(Shape::Model(name)) => {
            let Some(schema) = registry.lookup(name) else {
                return Err(TranslateError::UnsupportedObject {
                    field: field.to_string(),
                });
            };
            let instance = Instance::from_parsed_in(&schema, json, registry, false)?;
            Ok(Value::Model(Box::new(instance)))
        }
        _ => Err(TranslateError::UnsupportedObject {
            field: field.to_string(),
        }),
    }
}

fn array_from_json(
    field: &str,
    allowed: &[Shape],
    items: &[JsonValue],
    registry: &Registry,
) -> Result<Value, TranslateError> {
    // First declared sequence shape wins; its inner descriptor drives
    // per-element recursion.
    let usable = allowed.iter().find(|shape| shape.is_sequence());

    let Some(shape) = usable else {
        return Err(TranslateError::UnsupportedArray {
            field: field.to_string(),
        });
    };
    let (Shape::List(element) | Shape::Tuple(element) | Shape::Set(element)) = shape else {
        return Err(TranslateError::UnsupportedArray {
            field: field.to_string(),
        });
    };

    let values = items
        .iter()
        .map(|item| value_from_json(field, std::slice::from_ref(element.as_ref()), item, registry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match shape {
        Shape::Tuple(_) => Value::Tuple(values),
        Shape::Set(_) => Value::Set(values),
        _ => Value::List(values),
    })
}

fn string_from_json(
    field: &str,
    allowed: &[Shape],
    text: &str,
    registry: &Registry,
) -> Result<Value, TranslateError> {
    // Exact complex-model dispatch comes first: a model shape may
    // reconstruct itself from an embedded JSON object.
    let usable = allowed.iter().find(|shape| !shape.is_container());

    if let Some(Shape::Model(name)) = usable
        && let Ok(parsed) = serde_json::from_str::<JsonValue>(text)
        && parsed.is_object()
        && let Some(schema) = registry.lookup(name)
    {
        let instance = Instance::from_parsed_in(&schema, &parsed, registry, false)?;
        return Ok(Value::Model(Box::new(instance)));
    }

    let leaf = allowed.iter().find_map(Shape::as_leaf);
    match leaf {
        Some(Primitive::Text) => Ok(Value::Text(text.to_string())),
        Some(Primitive::Timestamp) => {
            Timestamp::parse(text)
                .map(Value::Timestamp)
                .map_err(|_| TranslateError::UnsupportedScalar {
                    field: field.to_string(),
                })
        }
        Some(Primitive::Bytes) => Ok(Value::Bytes(
            decode_hex(text).unwrap_or_else(|| text.as_bytes().to_vec()),
        )),
        Some(Primitive::Int) => {
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|_| TranslateError::UnsupportedScalar {
                    field: field.to_string(),
                })
        }
        Some(Primitive::Float) => {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|_| TranslateError::UnsupportedScalar {
                    field: field.to_string(),
                })
        }
        Some(Primitive::Decimal) => {
            Decimal::from_str(text)
                .map(Value::Decimal)
                .map_err(|_| TranslateError::UnsupportedScalar {
                    field: field.to_string(),
                })
        }
        Some(Primitive::Bool) => match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(TranslateError::UnsupportedScalar {
                field: field.to_string(),
            }),
        },
        Some(Primitive::Null) => Err(TranslateError::UnsupportedScalar {
            field: field.to_string(),
        }),

        // No leaf descriptor at all: the field carries only an opaque
        // identifier, so the text passes through unchanged.
        None => Ok(Value::Text(text.to_string())),
    }
}

fn scalar_from_json(
    field: &str,
    allowed: &[Shape],
    json: &JsonValue,
) -> Result<Value, TranslateError> {
    // Null is null regardless of declared types.
    if json.is_null() {
        return Ok(Value::Null);
    }

    // Direct literal-type match against any allowed leaf.
    match json {
        JsonValue::Bool(b) => {
            if allowed.contains(&Shape::Leaf(Primitive::Bool)) {
                return Ok(Value::Bool(*b));
            }
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64()
                && allowed.contains(&Shape::Leaf(Primitive::Int))
            {
                return Ok(Value::Int(i));
            }
            if allowed.contains(&Shape::Leaf(Primitive::Float))
                && let Some(f) = n.as_f64()
            {
                return Ok(Value::Float(f));
            }
        }
        _ => {}
    }

    // The literal type matched no allowed leaf: re-decode through the
    // first declared primitive's own decode routine.
    let leaf = allowed.iter().find_map(Shape::as_leaf);
    match leaf {
        Some(kind) => decode_scalar_as(field, kind, json),

        // No primitive declared at all: an identifier-only payload, so
        // the scalar passes through with its literal type.
        None => Ok(match json {
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => n
                .as_i64()
                .map_or_else(|| Value::Float(n.as_f64().unwrap_or_default()), Value::Int),
            _ => Value::Null,
        }),
    }
}

fn decode_scalar_as(
    field: &str,
    kind: Primitive,
    json: &JsonValue,
) -> Result<Value, TranslateError> {
    let unsupported = || TranslateError::UnsupportedScalar {
        field: field.to_string(),
    };

    match kind {
        Primitive::Bool => json.as_bool().map(Value::Bool).ok_or_else(unsupported),
        Primitive::Int => match json {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .map(Value::Int)
                .ok_or_else(unsupported),
            _ => Err(unsupported()),
        },
        Primitive::Float => json.as_f64().map(Value::Float).ok_or_else(unsupported),
        Primitive::Decimal => match json {
            JsonValue::Number(n) => n
                .as_i64()
                .map(Decimal::from)
                .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain))
                .map(Value::Decimal)
                .ok_or_else(unsupported),
            _ => Err(unsupported()),
        },
        Primitive::Timestamp => json
            .as_i64()
            .map(|secs| Value::Timestamp(Timestamp::from_secs(secs)))
            .ok_or_else(unsupported),
        Primitive::Text => match json {
            JsonValue::Number(n) => Ok(Value::Text(n.to_string())),
            JsonValue::Bool(b) => Ok(Value::Text(b.to_string())),
            _ => Err(unsupported()),
        },
        Primitive::Null => Ok(Value::Null),
        Primitive::Bytes => Err(unsupported()),
    }
}

///
/// HEX
///
/// Bytes values travel as lowercase hex strings in JSON.
///

fn encode_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}
