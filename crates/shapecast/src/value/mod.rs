mod timestamp;

#[cfg(test)]
mod tests;

pub use timestamp::{Timestamp, TimestampError};

use crate::model::Instance;
use rust_decimal::Decimal;

///
/// Value
///
/// Runtime representation of a field value. Scalars map one-to-one onto
/// the schema primitives; containers hold further values; `Model` holds
/// a nested instance for relationship fields.
///
/// Null        → the field explicitly carries no value.
/// Tuple       → a List with looser serialized-format fidelity.
/// Set         → membership semantics; equality ignores element order.
///

#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    /// Entries keep their insertion order; equality is by membership.
    Map(Vec<(Self, Self)>),
    Model(Box<Instance>),
    Null,
    Set(Vec<Self>),
    Text(String),
    Timestamp(Timestamp),
    Tuple(Vec<Self>),
}

///
/// ContainerKind
///
/// Runtime container discriminant used by the engine to pair a value
/// with descriptors of the same container family.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContainerKind {
    List,
    Tuple,
    Set,
    Map,
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from a list literal.
    ///
    /// Intended for tests and inline construction.
    /// Requires `Clone` because items are borrowed.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Set` from owned items.
    pub fn from_set<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::Set(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Map` from owned key/value entries.
    pub fn from_map<K, V>(entries: Vec<(K, V)>) -> Self
    where
        K: Into<Self>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    ///
    /// TYPES
    ///

    /// Human-readable kind label used in validation and translation
    /// error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Bytes(_) => "Bytes",
            Self::Decimal(_) => "Decimal",
            Self::Float(_) => "Float",
            Self::Int(_) => "Int",
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Model(_) => "Model",
            Self::Null => "Null",
            Self::Set(_) => "Set",
            Self::Text(_) => "Text",
            Self::Timestamp(_) => "Timestamp",
            Self::Tuple(_) => "Tuple",
        }
    }

    #[must_use]
    pub const fn container_kind(&self) -> Option<ContainerKind> {
        match self {
            Self::List(_) => Some(ContainerKind::List),
            Self::Tuple(_) => Some(ContainerKind::Tuple),
            Self::Set(_) => Some(ContainerKind::Set),
            Self::Map(_) => Some(ContainerKind::Map),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        match self {
            Self::List(_) | Self::Map(_) | Self::Set(_) | Self::Tuple(_) => false,
            _ => true,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer and text values double as bare relationship identifiers.
    #[must_use]
    pub const fn is_identifier_scalar(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Text(_))
    }

    /// True for a sequence whose elements are all bare identifiers.
    /// An empty sequence qualifies.
    #[must_use]
    pub fn is_identifier_list(&self) -> bool {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => {
                items.iter().all(Self::is_identifier_scalar)
            }
            _ => false,
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        if let Self::Int(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Vec<Self>> {
        match self {
            Self::List(items) | Self::Tuple(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&[(Self, Self)]> {
        if let Self::Map(entries) = self {
            Some(entries.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_model(&self) -> Option<&Instance> {
        if let Self::Model(instance) = self {
            Some(instance)
        } else {
            None
        }
    }

    ///
    /// EMPTY
    ///

    #[must_use]
    pub const fn is_empty(&self) -> Option<bool> {
        match self {
            Self::List(xs) | Self::Set(xs) | Self::Tuple(xs) => Some(xs.is_empty()),
            Self::Map(entries) => Some(entries.is_empty()),
            Self::Text(s) => Some(s.is_empty()),
            Self::Bytes(b) => Some(b.is_empty()),
            Self::Null => Some(true),

            _ => None,
        }
    }
}

// Set and Map equality is by membership; everything else is structural.
// Quadratic matching is acceptable: these collections are field values,
// not bulk data.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(ak, av)| b.iter().any(|(bk, bv)| ak == bk && av == bv))
            }
            (Self::Model(a), Self::Model(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::Set(a), Self::Set(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,

            _ => false,
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool      => Bool,
    Decimal   => Decimal,
    f32       => Float,
    f64       => Float,
    i8        => Int,
    i16       => Int,
    i32       => Int,
    i64       => Int,
    u8        => Int,
    u16       => Int,
    u32       => Int,
    &str      => Text,
    String    => Text,
    Timestamp => Timestamp,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Instance> for Value {
    fn from(instance: Instance) -> Self {
        Self::Model(Box::new(instance))
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Null
    }
}
