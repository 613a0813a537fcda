use crate::{
    schema::{Primitive, Shape, registry::Registry},
    value::Value,
};
use thiserror::Error as ThisError;

///
/// ValidateError
///
/// Aggregated per-instance validation report. Issues are collected
/// across every field and raised together, never fail-fast.
///

#[derive(Debug, ThisError)]
pub enum ValidateError {
    #[error("validation failed for model '{model}':\n{}", .issues.join("\n"))]
    Failed { model: String, issues: Vec<String> },
}

/// Structural check of `value` against any one of the `allowed` shapes.
///
/// Container values are paired with descriptors of the same container
/// kind and recurse per element; an empty container is trivially valid,
/// since its element type is unconstrained when no elements exist.
#[must_use]
pub fn value_matches(allowed: &[Shape], value: &Value, registry: &Registry) -> bool {
    if value.container_kind().is_some() {
        return container_matches(allowed, value, registry);
    }

    allowed
        .iter()
        .any(|shape| scalar_matches(shape, value, registry))
}

fn container_matches(allowed: &[Shape], value: &Value, registry: &Registry) -> bool {
    match value {
        Value::Map(entries) => {
            let candidates: Vec<(&Shape, &Shape)> = allowed
                .iter()
                .filter_map(|shape| {
                    if let Shape::Map { key, value } = shape {
                        Some((key.as_ref(), value.as_ref()))
                    } else {
                        None
                    }
                })
                .collect();
            if candidates.is_empty() {
                return false;
            }
            if entries.is_empty() {
                return true;
            }

            let key_shapes: Vec<Shape> = candidates.iter().map(|(k, _)| (*k).clone()).collect();
            let value_shapes: Vec<Shape> = candidates.iter().map(|(_, v)| (*v).clone()).collect();

            entries.iter().all(|(key, val)| {
                value_matches(&key_shapes, key, registry)
                    && value_matches(&value_shapes, val, registry)
            })
        }
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => {
            let element_shapes: Vec<Shape> = allowed
                .iter()
                .filter(|shape| sequence_kind_matches(shape, value))
                .filter_map(Shape::sequence_element)
                .cloned()
                .collect();
            if element_shapes.is_empty() {
                return false;
            }

            items
                .iter()
                .all(|item| value_matches(&element_shapes, item, registry))
        }

        _ => false,
    }
}

// Sequence values pair only with descriptors of the same container kind.
const fn sequence_kind_matches(shape: &Shape, value: &Value) -> bool {
    matches!(
        (shape, value),
        (Shape::List(_), Value::List(_))
            | (Shape::Tuple(_), Value::Tuple(_))
            | (Shape::Set(_), Value::Set(_))
    )
}

fn scalar_matches(shape: &Shape, value: &Value, registry: &Registry) -> bool {
    match (shape, value) {
        (Shape::Leaf(Primitive::Bool), Value::Bool(_))
        | (Shape::Leaf(Primitive::Bytes), Value::Bytes(_))
        | (Shape::Leaf(Primitive::Decimal), Value::Decimal(_))
        | (Shape::Leaf(Primitive::Float), Value::Float(_))
        | (Shape::Leaf(Primitive::Int), Value::Int(_))
        | (Shape::Leaf(Primitive::Null), Value::Null)
        | (Shape::Leaf(Primitive::Text), Value::Text(_))
        | (Shape::Leaf(Primitive::Timestamp), Value::Timestamp(_)) => true,

        // Shape identity only; nested instances validate their own
        // fields through their own validate calls.
        (Shape::Model(name), Value::Model(instance)) => {
            instance.model_name() == name && registry.contains(name)
        }

        _ => false,
    }
}
