pub mod relation;

use crate::{
    DEFAULT_RECURSION_BUDGET,
    engine::{
        json::{self, JsonMode, TranslateError},
        synthesize,
        validate::{self, ValidateError},
    },
    error::{Error, ModelError},
    foreign::{self, ForeignModel},
    schema::{ModelSchema, Primitive, SchemaError, Shape, registry},
    value::{Timestamp, Value},
};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::sync::Arc;

///
/// Field
///
/// Instance-level storage for one declared field: the owned value plus
/// the lazy re-validation cache. A field is currently valid only if it
/// was validated and the live value still equals the snapshot taken at
/// that time; any mutation invalidates until the next validate call.
///

#[derive(Clone, Debug)]
pub struct Field {
    spec_index: usize,
    value: Value,
    was_validated: bool,
    last_validated_value: Option<Value>,
    is_id_field: bool,
}

impl Field {
    const fn new(spec_index: usize, value: Value, is_id_field: bool) -> Self {
        Self {
            spec_index,
            value,
            was_validated: false,
            last_validated_value: None,
            is_id_field,
        }
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// True when the stored value is the identifier-shadow
    /// representation rather than the full relationship object.
    #[must_use]
    pub const fn is_id_field(&self) -> bool {
        self.is_id_field
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.was_validated && self.last_validated_value.as_ref() == Some(&self.value)
    }

    fn mark_validated(&mut self) {
        self.was_validated = true;
        self.last_validated_value = Some(self.value.clone());
    }

    fn set_value(&mut self, value: Value, is_id_field: bool) {
        self.value = value;
        self.is_id_field = is_id_field;
    }
}

///
/// Instance
///
/// An ordered collection of fields, one per declared spec present.
/// Construction is lazy: fields absent from the input and lacking a
/// usable default are simply omitted, which only becomes an error at
/// validation time.
///

#[derive(Clone, Debug)]
pub struct Instance {
    schema: Arc<ModelSchema>,
    fields: Vec<Field>,
}

impl Instance {
    ///
    /// CONSTRUCTION
    ///

    /// Empty instance of a registered model. The model's schema is
    /// reference-resolved on first use.
    pub fn new(model: &str) -> Result<Self, SchemaError> {
        let schema = registry::ensure_validated(model)?;
        Ok(Self::of_schema(schema))
    }

    /// Build from named values, then apply declared defaults to absent
    /// fields. Values are not validated until `validate` is called.
    pub fn construct(model: &str, values: Vec<(String, Value)>) -> Result<Self, Error> {
        let mut instance = Self::new(model)?;
        for (name, value) in values {
            instance.set(&name, value)?;
        }
        instance.apply_defaults(&registry::registry_read());

        Ok(instance)
    }

    /// Build from a serialized JSON object.
    pub fn from_json(model: &str, text: &str) -> Result<Self, Error> {
        let parsed: JsonValue = serde_json::from_str(text).map_err(TranslateError::from)?;
        Self::from_parsed(model, &parsed)
    }

    /// Build from an already-parsed JSON object.
    pub fn from_parsed(model: &str, parsed: &JsonValue) -> Result<Self, Error> {
        let schema = registry::ensure_validated(model)?;
        let registry = registry::registry_read();
        let instance = Self::from_parsed_in(&schema, parsed, &registry, false)?;

        Ok(instance)
    }

    /// Build from a foreign object whose attributes mirror the schema.
    pub fn from_foreign(model: &str, foreign_object: &dyn ForeignModel) -> Result<Self, Error> {
        let values = foreign::foreign_fields(model, foreign_object)?;
        Self::construct(model, values)
    }

    /// Generate a structurally valid random instance.
    pub fn synthesize(model: &str, recursion_budget: usize) -> Result<Self, Error> {
        let schema = registry::ensure_validated(model)?;
        let registry = registry::registry_read();
        let instance = synthesize::synthesize_instance_in(&schema, recursion_budget, &registry)?;

        Ok(instance)
    }

    /// Generate a random instance with the default recursion budget.
    pub fn synthesize_default(model: &str) -> Result<Self, Error> {
        Self::synthesize(model, DEFAULT_RECURSION_BUDGET)
    }

    /// Pure translation: resolve and decode each JSON key against the
    /// schema without constructing an instance. Unknown keys are
    /// skipped; in warning-only mode untranslatable fields are omitted
    /// instead of failing the call.
    pub fn deserialize_fields(
        model: &str,
        parsed: &JsonValue,
        warning_only: bool,
    ) -> Result<Vec<(String, Value)>, Error> {
        let schema = registry::ensure_validated(model)?;
        let registry = registry::registry_read();

        Ok(translate_object(&schema, parsed, &registry, warning_only)?)
    }

    pub(crate) fn of_schema(schema: Arc<ModelSchema>) -> Self {
        Self {
            schema,
            fields: Vec::new(),
        }
    }

    pub(crate) fn from_parsed_in(
        schema: &Arc<ModelSchema>,
        parsed: &JsonValue,
        registry: &registry::Registry,
        warning_only: bool,
    ) -> Result<Self, TranslateError> {
        let values = translate_object(schema, parsed, registry, warning_only)?;

        let mut instance = Self::of_schema(Arc::clone(schema));
        for (name, value) in values {
            // names came from resolve(), so set cannot reject them
            let _ = instance.set(&name, value);
        }
        instance.apply_defaults(registry);

        Ok(instance)
    }

    pub(crate) fn push_field_raw(&mut self, spec_index: usize, value: Value, is_id_field: bool) {
        self.fields.push(Field::new(spec_index, value, is_id_field));
    }

    // Populate defaults for declared fields that were not set. The
    // conventional `id` field never defaults; missing data there should
    // surface as a validation error instead.
    fn apply_defaults(&mut self, registry: &registry::Registry) {
        let schema = Arc::clone(&self.schema);

        for (index, spec) in schema.fields().iter().enumerate() {
            if spec.title == "id" || self.fields.iter().any(|f| f.spec_index == index) {
                continue;
            }
            if spec.has_usable_default(registry)
                && let Some(default) = &spec.default_value
            {
                self.push_field_raw(index, default.clone(), false);
            }
        }
    }

    ///
    /// ACCESS
    ///

    #[must_use]
    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.schema.name()
    }

    /// Stored field for a title, if one is present on this instance.
    #[must_use]
    pub fn field(&self, title: &str) -> Option<&Field> {
        let (index, _) = self.schema.resolve(title)?;
        self.fields.iter().find(|f| f.spec_index == index)
    }

    /// Stored fields in insertion order, paired with their specs.
    pub fn entries(&self) -> impl Iterator<Item = (&crate::schema::FieldSpec, &Field)> {
        self.fields
            .iter()
            .map(|field| (&self.schema.fields()[field.spec_index], field))
    }

    /// Field value by title or identifier alias.
    ///
    /// Calculated fields are always evaluated fresh against the current
    /// instance; caching never applies to them. Reading a relationship
    /// field through its alias substitutes the nested object's
    /// identifier when one is resolvable.
    pub fn get(&self, name: &str) -> Result<Value, ModelError> {
        let Some((index, via_alias)) = self.schema.resolve(name) else {
            return Err(self.field_not_found(name));
        };

        let spec = &self.schema.fields()[index];
        if let Some(calc) = spec.calculated {
            return Ok(calc(self));
        }

        let field = self
            .fields
            .iter()
            .find(|f| f.spec_index == index)
            .ok_or_else(|| self.field_not_found(name))?;

        if via_alias && !field.is_id_field
            && let Some(id) = relation::identifier_view(&field.value)
        {
            return Ok(id);
        }

        Ok(field.value.clone())
    }

    /// Assign a field value by title or identifier alias.
    ///
    /// Text assigned to a field that allows timestamps is coerced
    /// through the ISO-8601 parser when it parses. Setting an
    /// undeclared name is a structural error naming the legal titles.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ModelError> {
        let mut value = value.into();

        let Some((index, via_alias)) = self.schema.resolve(name) else {
            return Err(ModelError::UndeclaredField {
                model: self.model_name().to_string(),
                field: name.to_string(),
                titles: self.schema.titles().iter().map(ToString::to_string).collect(),
            });
        };

        let spec = &self.schema.fields()[index];
        if let Value::Text(text) = &value
            && spec.allowed.contains(&Shape::Leaf(Primitive::Timestamp))
            && let Ok(ts) = Timestamp::parse(text)
        {
            value = Value::Timestamp(ts);
        }

        match self.fields.iter_mut().find(|f| f.spec_index == index) {
            Some(field) => field.set_value(value, via_alias),
            None => self.fields.push(Field::new(index, value, via_alias)),
        }

        Ok(())
    }

    /// Drop a field entirely. Used when collapsing a relationship down
    /// to its identifier-only representation.
    pub fn remove(&mut self, name: &str) -> Result<(), ModelError> {
        let Some((index, _)) = self.schema.resolve(name) else {
            return Err(self.field_not_found(name));
        };
        let Some(position) = self.fields.iter().position(|f| f.spec_index == index) else {
            return Err(self.field_not_found(name));
        };
        self.fields.remove(position);

        Ok(())
    }

    ///
    /// VALIDATION
    ///

    /// Check every stored field against its declared shapes and report
    /// missing required fields. Issues are aggregated across the whole
    /// instance and raised together; `warning_only` downgrades the
    /// report to a logged warning.
    pub fn validate(&mut self, warning_only: bool) -> Result<(), ValidateError> {
        let registry = registry::registry_read();
        let schema = Arc::clone(&self.schema);
        let mut issues = Vec::new();

        // missing required fields
        for (index, spec) in schema.fields().iter().enumerate() {
            if spec.required && !self.fields.iter().any(|f| f.spec_index == index) {
                issues.push(format!("Missing required field: {}", spec.title));
            }
        }

        // invalid field values; previously-validated unchanged fields
        // are cache hits and skip translation work entirely
        for field in &mut self.fields {
            let spec = &schema.fields()[field.spec_index];
            if !spec.validated || field.is_valid() {
                continue;
            }

            if !validate::value_matches(&spec.allowed, &field.value, &registry) {
                issues.push(format!(
                    "Invalid field: {} has value of type {} but allowed types are {:?}",
                    spec.title,
                    field.value.kind_name(),
                    spec.allowed
                ));
                continue;
            }
            if !spec.choices.is_empty() && !spec.choices.contains(&field.value) {
                issues.push(format!(
                    "Invalid field: {} value is not among the declared choices",
                    spec.title
                ));
                continue;
            }

            field.mark_validated();
        }

        if issues.is_empty() {
            Ok(())
        } else if warning_only {
            tracing::warn!(
                model = %self.model_name(),
                issues = ?issues,
                "validation failed (warning only)"
            );
            Ok(())
        } else {
            Err(ValidateError::Failed {
                model: self.model_name().to_string(),
                issues,
            })
        }
    }

    ///
    /// SERIALIZATION
    ///

    /// Canonical JSON text for this instance.
    pub fn to_json(&self) -> Result<String, TranslateError> {
        let value = self.to_json_value(JsonMode::Canonical)?;
        serde_json::to_string(&value).map_err(TranslateError::from)
    }

    /// JSON tree for this instance. Raw-identifier mode keys
    /// relationship fields by their alias and substitutes bare
    /// identifiers for nested objects.
    pub fn to_json_value(&self, mode: JsonMode) -> Result<JsonValue, TranslateError> {
        let mut object = JsonMap::new();

        for field in &self.fields {
            let spec = &self.schema.fields()[field.spec_index];
            let raw_relation =
                mode == JsonMode::RawIdentifiers && spec.relationship.is_relation();
            let key = if field.is_id_field || raw_relation {
                spec.alias()
            } else {
                spec.title.as_str()
            };
            object.insert(key.to_string(), json::value_to_json(&spec.title, &field.value, mode)?);
        }

        Ok(JsonValue::Object(object))
    }

    /// Flat parameter map with relationships collapsed to identifiers,
    /// the shape backend calls consume.
    pub fn to_raw(&self) -> Result<JsonMap<String, JsonValue>, TranslateError> {
        match self.to_json_value(JsonMode::RawIdentifiers)? {
            JsonValue::Object(map) => Ok(map),
            _ => Err(TranslateError::NotRepresentable {
                model: self.model_name().to_string(),
            }),
        }
    }

    fn field_not_found(&self, name: &str) -> ModelError {
        ModelError::FieldNotFound {
            model: self.model_name().to_string(),
            field: name.to_string(),
        }
    }
}

// Equality is by model identity and per-field values; validation state
// does not participate. Field order is irrelevant, matching JSON object
// semantics.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.model_name() == other.model_name()
            && self.fields.len() == other.fields.len()
            && self.fields.iter().all(|field| {
                let title = &self.schema.fields()[field.spec_index].title;
                other
                    .field(title)
                    .is_some_and(|theirs| theirs.value == field.value)
            })
    }
}

// Decode each recognized key of a parsed JSON object against its
// field's declared shapes. Unknown keys are skipped by design.
pub(crate) fn translate_object(
    schema: &Arc<ModelSchema>,
    parsed: &JsonValue,
    registry: &registry::Registry,
    warning_only: bool,
) -> Result<Vec<(String, Value)>, TranslateError> {
    let Some(object) = parsed.as_object() else {
        return Err(TranslateError::NotAnObject {
            model: schema.name().to_string(),
        });
    };

    let mut values = Vec::with_capacity(object.len());
    for (key, raw) in object {
        let Some((index, _)) = schema.resolve(key) else {
            continue;
        };
        let spec = &schema.fields()[index];

        match json::value_from_json(&spec.title, &spec.allowed, raw, registry) {
            Ok(value) => values.push((key.clone(), value)),
            Err(err) if warning_only => {
                tracing::warn!(
                    model = %schema.name(),
                    field = %spec.title,
                    error = %err,
                    "omitting untranslatable field"
                );
            }
            Err(err) => return Err(err),
        }
    }

    Ok(values)
}
