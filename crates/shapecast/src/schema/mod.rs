pub mod naming;
pub mod registry;
pub mod shape;
pub mod validate;

pub use naming::NamingPolicy;
pub use shape::{Primitive, Shape};

use crate::{model::Instance, value::Value};
use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Fatal schema-level failures. Raised at registration or first-use
/// resolution; a model that fails here can never produce instances.
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("model '{0}' is already registered")]
    DuplicateModel(String),

    #[error("model '{0}' is not registered")]
    UnknownModel(String),

    #[error("schema validation failed for model '{model}':\n{}", .issues.join("\n"))]
    Validation { model: String, issues: Vec<String> },
}

///
/// DroppedField
///
/// Structured record of an optional field removed from a schema because
/// its symbolic type reference did not resolve.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DroppedField {
    pub model: String,
    pub field: String,
    pub reason: String,
}

///
/// Relationship
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, PartialEq, Serialize,
)]
pub enum Relationship {
    #[default]
    Attribute,
    HasOne,
    HasMany,
}

impl Relationship {
    #[must_use]
    pub const fn is_relation(self) -> bool {
        matches!(self, Self::HasOne | Self::HasMany)
    }
}

/// Pure function of the instance's current field values; re-evaluated on
/// every read, never cached.
pub type CalculatedFn = fn(&Instance) -> Value;

///
/// FieldSpec
///
/// Schema-level field description, shared by every instance of a model
/// type. A field may satisfy any one of several alternative shapes.
///

#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub title: String,
    pub allowed: Vec<Shape>,
    pub required: bool,
    pub validated: bool,
    pub relationship: Relationship,
    pub calculated: Option<CalculatedFn>,
    pub default_value: Option<Value>,
    pub choices: Vec<Value>,

    /// Identifier-shadow alias, derived from the title and the model's
    /// naming policy when the schema is built. Attribute fields alias
    /// to their own title.
    alias: String,
}

impl FieldSpec {
    ///
    /// CONSTRUCTION
    ///

    #[must_use]
    pub fn new(title: impl Into<String>, allowed: Vec<Shape>) -> Self {
        let title = title.into();
        Self {
            alias: title.clone(),
            title,
            allowed,
            required: false,
            validated: true,
            relationship: Relationship::Attribute,
            calculated: None,
            default_value: None,
            choices: Vec::new(),
        }
    }

    /// Has-one relationship field pointing at the named model.
    #[must_use]
    pub fn has_one(title: impl Into<String>, model: impl Into<String>) -> Self {
        let mut spec = Self::new(title, vec![Shape::model(model)]);
        spec.relationship = Relationship::HasOne;
        spec
    }

    /// Has-many relationship field holding a list of the named model.
    #[must_use]
    pub fn has_many(title: impl Into<String>, model: impl Into<String>) -> Self {
        let mut spec = Self::new(title, vec![Shape::list(Shape::model(model))]);
        spec.relationship = Relationship::HasMany;
        spec
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Skip structural validation for this field. Unvalidated fields
    /// still participate in translation, without any shape guarantee.
    #[must_use]
    pub const fn unvalidated(mut self) -> Self {
        self.validated = false;
        self
    }

    #[must_use]
    pub const fn calculated(mut self, f: CalculatedFn) -> Self {
        self.calculated = Some(f);
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: Vec<Value>) -> Self {
        self.choices = choices;
        self
    }

    ///
    /// ACCESS
    ///

    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// True when the declared default conforms to one of the allowed
    /// shapes, making it usable at construction time.
    #[must_use]
    pub fn has_usable_default(&self, registry: &registry::Registry) -> bool {
        self.default_value
            .as_ref()
            .is_some_and(|value| crate::engine::validate::value_matches(&self.allowed, value, registry))
    }

    // Derive the alias and append the implicitly-allowed identifier
    // shapes for relationship fields.
    fn finish(&mut self, naming: NamingPolicy) {
        match self.relationship {
            Relationship::HasOne => {
                self.alias = naming.has_one_alias(&self.title);
                self.allowed.push(Shape::Leaf(Primitive::Int));
                self.allowed.push(Shape::Leaf(Primitive::Text));
            }
            Relationship::HasMany => {
                self.alias = naming.has_many_alias(&self.title);
                self.allowed.push(Shape::list(Shape::Leaf(Primitive::Int)));
                self.allowed.push(Shape::list(Shape::Leaf(Primitive::Text)));
            }
            Relationship::Attribute => {
                self.alias = self.title.clone();
            }
        }
    }
}

///
/// ModelSchema
///
/// Ordered field table for one model type. Schemas are static: built
/// once, registered once, never mutated afterwards.
///

#[derive(Clone, Debug)]
pub struct ModelSchema {
    name: String,
    naming: NamingPolicy,
    fields: Vec<FieldSpec>,
}

impl ModelSchema {
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self::with_naming(name, NamingPolicy::default(), fields)
    }

    #[must_use]
    pub fn with_naming(
        name: impl Into<String>,
        naming: NamingPolicy,
        mut fields: Vec<FieldSpec>,
    ) -> Self {
        for field in &mut fields {
            field.finish(naming);
        }

        Self {
            name: name.into(),
            naming,
            fields,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn naming(&self) -> NamingPolicy {
        self.naming
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, title: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.title == title)
    }

    /// Resolve a name against field titles and identifier aliases.
    /// Returns the field index and whether the match came via the alias.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(usize, bool)> {
        self.fields.iter().enumerate().find_map(|(index, field)| {
            if field.title == name {
                Some((index, false))
            } else if field.relationship.is_relation() && field.alias == name {
                Some((index, true))
            } else {
                None
            }
        })
    }

    /// Every declared field title, in declaration order. Used for the
    /// undeclared-field error message.
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.title.as_str()).collect()
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Vec<FieldSpec> {
        &mut self.fields
    }
}
