use crate::{
    error::Error,
    model::Instance,
    schema::{Relationship, Shape, registry},
    value::Value,
};

///
/// ForeignModel
///
/// Bridge interface for externally-defined objects whose attributes
/// mirror a model schema. Attributes are looked up per declared field
/// by exact title first, then by the identifier alias.
///

pub trait ForeignModel {
    fn foreign_attr(&self, name: &str) -> Option<ForeignValue<'_>>;
}

///
/// ForeignCollection
///
/// A collection-like foreign value that materializes lazily (e.g. a
/// query set). `all` is invoked before recursing into the elements.
///

pub trait ForeignCollection {
    fn all(&self) -> Vec<&dyn ForeignModel>;
}

///
/// ForeignValue
///

pub enum ForeignValue<'a> {
    Scalar(Value),
    One(&'a dyn ForeignModel),
    Many(Vec<&'a dyn ForeignModel>),
    Deferred(&'a dyn ForeignCollection),
}

/// Read the named-value map for `model` off a foreign object.
///
/// Relationship fields recurse into the referenced model; scalar
/// foreign values (bare identifiers included) pass through unchanged.
/// Fields absent on the foreign object are simply skipped.
pub fn foreign_fields(
    model: &str,
    foreign_object: &dyn ForeignModel,
) -> Result<Vec<(String, Value)>, Error> {
    let schema = registry::ensure_validated(model)?;
    let mut values = Vec::new();

    for spec in schema.fields() {
        let attr = foreign_object
            .foreign_attr(&spec.title)
            .or_else(|| foreign_object.foreign_attr(spec.alias()));
        let Some(attr) = attr else {
            continue;
        };

        match spec.relationship {
            Relationship::HasMany => {
                let elements = match attr {
                    ForeignValue::Many(objects) => objects,
                    ForeignValue::Deferred(collection) => collection.all(),
                    ForeignValue::Scalar(value) => {
                        values.push((spec.title.clone(), value));
                        continue;
                    }
                    ForeignValue::One(_) => continue,
                };
                let Some(child) = child_model_of(&spec.allowed) else {
                    continue;
                };

                let mut items = Vec::with_capacity(elements.len());
                for object in elements {
                    items.push(Value::Model(Box::new(Instance::from_foreign(child, object)?)));
                }
                values.push((spec.title.clone(), Value::List(items)));
            }

            Relationship::HasOne => match attr {
                ForeignValue::One(object) => {
                    let Some(child) = child_model_of(&spec.allowed) else {
                        continue;
                    };
                    let nested = Instance::from_foreign(child, object)?;
                    values.push((spec.title.clone(), Value::Model(Box::new(nested))));
                }
                ForeignValue::Scalar(value) => values.push((spec.title.clone(), value)),
                ForeignValue::Many(_) | ForeignValue::Deferred(_) => {}
            },

            Relationship::Attribute => {
                if let ForeignValue::Scalar(value) = attr {
                    values.push((spec.title.clone(), value));
                }
            }
        }
    }

    Ok(values)
}

// First model reference among the declared shapes: the related type a
// relationship field recurses into.
fn child_model_of(allowed: &[Shape]) -> Option<&str> {
    let mut refs = Vec::new();
    for shape in allowed {
        shape.model_refs(&mut refs);
        if let Some(first) = refs.first() {
            return Some(first);
        }
    }

    None
}
