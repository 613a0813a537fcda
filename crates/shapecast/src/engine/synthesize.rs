use crate::{
    model::Instance,
    schema::{FieldSpec, ModelSchema, Primitive, Shape, SchemaError, registry::Registry},
    value::{Timestamp, Value},
};
use rand::Rng;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::sync::Arc;

///
/// CONSTANTS
///

const TEXT_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789 ";

const THIRTY_DAYS_SECS: i64 = 2_592_000;

/// Generate a value for a field, honoring its choices constraint and
/// otherwise its first declared shape. First-declared keeps generation
/// deterministic enough for tests while every declared shape across a
/// schema still gets exercised.
pub fn synthesize_field(
    field: &FieldSpec,
    budget: usize,
    registry: &Registry,
) -> Result<Value, SchemaError> {
    if !field.choices.is_empty() {
        let index = rand::thread_rng().gen_range(0..field.choices.len());
        return Ok(field.choices[index].clone());
    }

    field
        .allowed
        .first()
        .map_or(Ok(Value::Null), |shape| synthesize_shape(shape, budget, registry))
}

/// Generate a structurally valid value conforming to `shape`.
///
/// Nested models recurse with a decremented budget; a budget of zero
/// substitutes the Null sentinel instead of recursing further, which is
/// the termination condition for cyclic schemas — a designed fallback,
/// not an error.
pub fn synthesize_shape(
    shape: &Shape,
    budget: usize,
    registry: &Registry,
) -> Result<Value, SchemaError> {
    match shape {
        Shape::Leaf(kind) => Ok(synthesize_leaf(*kind)),

        Shape::Model(name) => {
            if budget == 0 {
                return Ok(Value::Null);
            }
            let schema = registry
                .lookup(name)
                .ok_or_else(|| SchemaError::UnknownModel(name.to_string()))?;
            let instance = synthesize_instance_in(&schema, budget - 1, registry)?;
            Ok(Value::Model(Box::new(instance)))
        }

        // Sequences always generate at least one element so the
        // structural shape is exercised; maps may be empty, since an
        // empty map is itself a valid value.
        Shape::List(inner) | Shape::Tuple(inner) | Shape::Set(inner) => {
            let len = rand::thread_rng().gen_range(1..=5);
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(synthesize_shape(inner, budget, registry)?);
            }
            Ok(match shape {
                Shape::Tuple(_) => Value::Tuple(items),
                Shape::Set(_) => Value::Set(items),
                _ => Value::List(items),
            })
        }
        Shape::Map { key, value } => {
            let len = rand::thread_rng().gen_range(0..=5);
            let mut entries = Vec::with_capacity(len);
            for _ in 0..len {
                entries.push((
                    synthesize_shape(key, budget, registry)?,
                    synthesize_shape(value, budget, registry)?,
                ));
            }
            Ok(Value::Map(entries))
        }
    }
}

/// Generate a full instance of `schema`; calculated fields are left to
/// compute themselves on read.
pub fn synthesize_instance_in(
    schema: &Arc<ModelSchema>,
    budget: usize,
    registry: &Registry,
) -> Result<Instance, SchemaError> {
    let mut instance = Instance::of_schema(Arc::clone(schema));

    for (index, field) in schema.fields().iter().enumerate() {
        if field.calculated.is_some() {
            continue;
        }
        let value = synthesize_field(field, budget, registry)?;
        instance.push_field_raw(index, value, false);
    }

    Ok(instance)
}

fn synthesize_leaf(kind: Primitive) -> Value {
    let mut rng = rand::thread_rng();

    match kind {
        Primitive::Null => Value::Null,
        Primitive::Bool => Value::Bool(rng.r#gen()),
        Primitive::Int => Value::Int(rng.gen_range(0..1000)),
        Primitive::Float => Value::Float(rng.gen_range(0.0..1000.0)),
        Primitive::Decimal => Value::Decimal(
            Decimal::from_f64(rng.gen_range(0.0..1000.0)).unwrap_or_default(),
        ),
        Primitive::Text => {
            let len = rng.gen_range(1..25);
            let text: String = (0..len)
                .map(|_| TEXT_CHARSET[rng.gen_range(0..TEXT_CHARSET.len())] as char)
                .collect();
            Value::Text(text)
        }
        Primitive::Bytes => {
            let len = rng.gen_range(0..16);
            let mut bytes = vec![0u8; len];
            rng.fill(bytes.as_mut_slice());
            Value::Bytes(bytes)
        }
        Primitive::Timestamp => {
            let offset = rng.gen_range(0..THIRTY_DAYS_SECS);
            Value::Timestamp(Timestamp::from_secs(Timestamp::now().get() - offset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::validate::value_matches,
        schema::{FieldSpec, ModelSchema},
    };

    #[test]
    fn leaves_stay_in_their_default_ranges() {
        for _ in 0..50 {
            let Value::Int(i) = synthesize_leaf(Primitive::Int) else {
                panic!("expected int");
            };
            assert!((0..1000).contains(&i));

            let Value::Text(s) = synthesize_leaf(Primitive::Text) else {
                panic!("expected text");
            };
            assert!(!s.is_empty() && s.len() < 25);
        }
    }

    #[test]
    fn sequences_are_never_empty_and_maps_may_be() {
        let registry = Registry::new();
        let shape = Shape::list(Shape::Leaf(Primitive::Int));

        for _ in 0..20 {
            let value = synthesize_shape(&shape, 0, &registry).unwrap();
            let Value::List(items) = &value else {
                panic!("expected list");
            };
            assert!((1..=5).contains(&items.len()));
            assert!(value_matches(&[shape.clone()], &value, &registry));
        }
    }

    #[test]
    fn model_shape_with_zero_budget_yields_sentinel() {
        let registry = Registry::new();

        let value = synthesize_shape(&Shape::model("Anything"), 0, &registry).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn choices_constrain_generated_values() {
        let mut registry = Registry::new();
        let schema = registry
            .register(ModelSchema::new(
                "SynthChoices",
                vec![
                    FieldSpec::new("status", vec![Shape::Leaf(Primitive::Text)])
                        .choices(vec![Value::Text("open".into()), Value::Text("closed".into())]),
                ],
            ))
            .unwrap();

        for _ in 0..20 {
            let instance = synthesize_instance_in(&schema, 1, &registry).unwrap();
            let status = instance.field("status").unwrap().value().clone();
            assert!(
                status == Value::Text("open".into()) || status == Value::Text("closed".into())
            );
        }
    }
}
