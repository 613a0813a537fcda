use crate::{
    model::Instance,
    schema::Relationship,
    value::Value,
};

///
/// Relationship resolution
///
/// A relationship field may at any time be represented as the nested
/// model value(s) or as bare identifier(s). Conversion object → id
/// requires the nested object to expose an `id` field; conversion
/// id → object never happens implicitly — the resolver performs no
/// hidden fetches.
///

impl Instance {
    /// Transformed copy with every resolvable relationship collapsed to
    /// its identifier representation.
    #[must_use]
    pub fn collapse_to_identifiers(&self) -> Self {
        let mut copy = self.clone();
        copy.collapse_in_place();
        copy
    }

    /// In-place variant of [`collapse_to_identifiers`](Self::collapse_to_identifiers).
    ///
    /// Fields whose nested value exposes no identifier are left
    /// untouched; that is not an error.
    pub fn collapse_in_place(&mut self) {
        let schema = std::sync::Arc::clone(&self.schema);

        for field in &mut self.fields {
            let spec = &schema.fields()[field.spec_index];

            match spec.relationship {
                Relationship::HasOne => {
                    if let Some(id) = identifier_of(&field.value) {
                        field.set_value(id, true);
                    }
                }
                Relationship::HasMany => {
                    if let Some(ids) = identifier_list_of(&field.value) {
                        field.set_value(ids, true);
                    }
                }
                Relationship::Attribute => {}
            }
        }
    }
}

/// The identifier carried by a nested model value, when resolvable.
pub(crate) fn identifier_of(value: &Value) -> Option<Value> {
    value.as_model().and_then(Instance::identifier)
}

/// Identifier list for a sequence of nested models. Every element must
/// resolve, otherwise the original value is preserved as-is.
pub(crate) fn identifier_list_of(value: &Value) -> Option<Value> {
    let items = value.as_sequence()?;
    let ids: Option<Vec<Value>> = items.iter().map(identifier_of).collect();

    ids.map(Value::List)
}

/// Identifier view of a stored value, used when a relationship field is
/// read through its alias: single objects yield their id, sequences of
/// objects yield an id list.
pub(crate) fn identifier_view(value: &Value) -> Option<Value> {
    identifier_of(value).or_else(|| identifier_list_of(value))
}

impl Instance {
    /// The instance's own identifier, when it stores an `id` field.
    #[must_use]
    pub fn identifier(&self) -> Option<Value> {
        self.field("id").map(|field| field.value().clone())
    }
}
