use derive_more::{Display, FromStr};
use serde::{Deserialize, Serialize};

///
/// Primitive
///
/// The closed set of leaf kinds a field value may take. Complex model
/// types are not primitives; they are referenced through [`Shape::Model`].
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[remain::sorted]
pub enum Primitive {
    Bool,
    Bytes,
    Decimal,
    Float,
    Int,
    Null,
    Text,
    Timestamp,
}

impl Primitive {
    /// Returns true for kinds that carry a numeric literal in JSON.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Decimal | Self::Float | Self::Int)
    }

    /// Returns true for kinds whose JSON form is a quoted string.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::Bytes | Self::Text | Self::Timestamp)
    }
}

///
/// Shape
///
/// Recursive descriptor for one allowed form of a field value.
///
/// Every container carries exactly one inner descriptor, enforced by
/// construction; heterogeneous containers are unrepresentable.
/// Tuple is semantically a List whose serialized-format fidelity is
/// looser; Set is a List with membership-only equality.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Shape {
    Leaf(Primitive),
    /// A registered complex model type, referenced by name.
    /// Resolution against the registry happens in a separate phase,
    /// after all participating models have been declared.
    Model(String),
    List(Box<Shape>),
    Tuple(Box<Shape>),
    Set(Box<Shape>),
    Map {
        key: Box<Shape>,
        value: Box<Shape>,
    },
}

impl Shape {
    ///
    /// CONSTRUCTION
    ///

    #[must_use]
    pub fn model(name: impl Into<String>) -> Self {
        Self::Model(name.into())
    }

    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn tuple(element: Self) -> Self {
        Self::Tuple(Box::new(element))
    }

    #[must_use]
    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(
            self,
            Self::List(_) | Self::Tuple(_) | Self::Set(_) | Self::Map { .. }
        )
    }

    #[must_use]
    pub const fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Tuple(_) | Self::Set(_))
    }

    #[must_use]
    pub const fn is_model(&self) -> bool {
        matches!(self, Self::Model(_))
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<Primitive> {
        if let Self::Leaf(kind) = self {
            Some(*kind)
        } else {
            None
        }
    }

    /// Inner element descriptor for sequence shapes.
    #[must_use]
    pub fn sequence_element(&self) -> Option<&Self> {
        match self {
            Self::List(inner) | Self::Tuple(inner) | Self::Set(inner) => Some(inner),
            _ => None,
        }
    }

    /// Walk this descriptor depth-first, yielding every model name it
    /// references. Used by reference resolution and relation checks.
    pub fn model_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Leaf(_) => {}
            Self::Model(name) => out.push(name),
            Self::List(inner) | Self::Tuple(inner) | Self::Set(inner) => inner.model_refs(out),
            Self::Map { key, value } => {
                key.model_refs(out);
                value.model_refs(out);
            }
        }
    }
}

impl From<Primitive> for Shape {
    fn from(kind: Primitive) -> Self {
        Self::Leaf(kind)
    }
}
