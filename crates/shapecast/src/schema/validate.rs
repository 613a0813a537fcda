use crate::{
    MAX_FIELD_NAME_LEN, MAX_MODEL_NAME_LEN,
    schema::{DroppedField, ModelSchema, SchemaError, registry::Registry},
};
use std::collections::BTreeSet;

/// Intra-model schema checks, run at registration time. Issues are
/// collected and reported together, never fail-fast.
pub(crate) fn validate_model(schema: &ModelSchema) -> Result<(), SchemaError> {
    let mut issues = Vec::new();

    validate_model_name(schema.name(), &mut issues);

    if schema.fields().is_empty() {
        issues.push("field list is missing or empty".to_string());
    }

    let mut seen = BTreeSet::new();
    for field in schema.fields() {
        validate_field_title(&field.title, &mut issues);

        if !seen.insert(field.title.clone()) {
            issues.push(format!("duplicate field title '{}'", field.title));
        }
        if field.relationship.is_relation() && !seen.insert(field.alias().to_string()) {
            issues.push(format!(
                "field '{}': alias '{}' collides with another field",
                field.title,
                field.alias()
            ));
        }

        if field.allowed.is_empty() {
            issues.push(format!("field '{}': no allowed shapes declared", field.title));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Validation {
            model: schema.name().to_string(),
            issues,
        })
    }
}

/// Cross-model reference resolution, run once per model on first use.
///
/// Unresolvable references on required fields are fatal. On optional
/// fields the whole field is dropped from the schema, recorded as a
/// [`DroppedField`], and logged.
pub(crate) fn resolve_model_refs(
    schema: &mut ModelSchema,
    registry: &Registry,
) -> Result<Vec<DroppedField>, SchemaError> {
    let model = schema.name().to_string();
    let mut issues = Vec::new();
    let mut dropped = Vec::new();

    schema.fields_mut().retain(|field| {
        let mut refs = Vec::new();
        for shape in &field.allowed {
            shape.model_refs(&mut refs);
        }

        let Some(unresolved) = refs.iter().find(|name| !registry.contains(name)) else {
            return true;
        };

        let reason = format!("unresolved model reference '{unresolved}'");
        if field.required {
            issues.push(format!("required field '{}': {reason}", field.title));
            return true;
        }

        tracing::warn!(
            model = %model,
            field = %field.title,
            %reason,
            "dropping optional field from schema"
        );
        dropped.push(DroppedField {
            model: model.clone(),
            field: field.title.clone(),
            reason,
        });
        false
    });

    if issues.is_empty() {
        Ok(dropped)
    } else {
        Err(SchemaError::Validation { model, issues })
    }
}

fn validate_model_name(name: &str, issues: &mut Vec<String>) {
    if name.is_empty() {
        issues.push("model name is empty".to_string());
    } else if name.len() > MAX_MODEL_NAME_LEN {
        issues.push(format!(
            "model name '{name}' exceeds max length {MAX_MODEL_NAME_LEN}"
        ));
    } else if !name.is_ascii() {
        issues.push(format!("model name '{name}' must be ASCII"));
    }
}

fn validate_field_title(title: &str, issues: &mut Vec<String>) {
    if title.is_empty() {
        issues.push("field title cannot be empty".to_string());
    } else if title.len() > MAX_FIELD_NAME_LEN {
        issues.push(format!(
            "field title '{title}' exceeds max length {MAX_FIELD_NAME_LEN}"
        ));
    } else if !title.is_ascii() {
        issues.push(format!("field title '{title}' must be ASCII"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, Primitive, Shape};

    fn int_field(title: &str) -> FieldSpec {
        FieldSpec::new(title, vec![Shape::Leaf(Primitive::Int)])
    }

    #[test]
    fn rejects_duplicate_and_empty_titles() {
        let schema = ModelSchema::new(
            "Sample",
            vec![int_field("count"), int_field("count"), int_field("")],
        );

        let err = validate_model(&schema).unwrap_err();
        let SchemaError::Validation { issues, .. } = err else {
            panic!("expected validation error");
        };
        assert!(issues.iter().any(|i| i.contains("duplicate field title")));
        assert!(issues.iter().any(|i| i.contains("cannot be empty")));
    }

    #[test]
    fn rejects_empty_field_list() {
        let schema = ModelSchema::new("Empty", vec![]);

        assert!(validate_model(&schema).is_err());
    }

    #[test]
    fn rejects_alias_collision() {
        // `owner` (has-one) aliases to `owner_id`, which collides with
        // the declared attribute of the same name.
        let schema = ModelSchema::new(
            "Sample",
            vec![
                int_field("owner_id"),
                FieldSpec::has_one("owner", "Person"),
            ],
        );

        let err = validate_model(&schema).unwrap_err();
        let SchemaError::Validation { issues, .. } = err else {
            panic!("expected validation error");
        };
        assert!(issues.iter().any(|i| i.contains("collides")));
    }

    #[test]
    fn unresolved_required_reference_is_fatal() {
        let registry = Registry::new();
        let mut schema = ModelSchema::new(
            "Sample",
            vec![FieldSpec::has_one("owner", "Missing").required()],
        );

        assert!(resolve_model_refs(&mut schema, &registry).is_err());
    }

    #[test]
    fn unresolved_optional_reference_drops_field() {
        let registry = Registry::new();
        let mut schema = ModelSchema::new(
            "Sample",
            vec![int_field("count"), FieldSpec::has_one("owner", "Missing")],
        );

        let dropped = resolve_model_refs(&mut schema, &registry).unwrap();

        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].field, "owner");
        assert!(schema.field("owner").is_none());
        assert!(schema.field("count").is_some());
    }
}
