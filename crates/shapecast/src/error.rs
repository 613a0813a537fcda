use crate::{
    engine::{json::TranslateError, validate::ValidateError},
    schema::SchemaError,
    service::ServiceError,
};
use thiserror::Error as ThisError;

///
/// ModelError
///
/// Structural misuse of a model instance: addressing fields that the
/// schema does not declare. Distinct from validation failures, which
/// concern the values of declared fields.
///

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error(
        "tried to set undeclared field '{field}' on model '{model}'; available fields are: {titles:?}"
    )]
    UndeclaredField {
        model: String,
        field: String,
        titles: Vec<String>,
    },

    /// The field is declared but carries no value on this instance.
    /// Absence is a distinct state from an explicit null.
    #[error("model '{model}' has no field '{field}'")]
    FieldNotFound { model: String, field: String },
}

///
/// Error
///
/// Top-level error for callers that do not need to branch on the
/// individual taxonomies.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
