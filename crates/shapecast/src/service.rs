use crate::{
    error::{Error, ModelError},
    model::Instance,
    schema::registry,
    value::Value,
};
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;

///
/// ServiceError
///

#[derive(Debug, ThisError)]
pub enum ServiceError {
    #[error("the given backend needs a '{0}' method")]
    MethodMissing(&'static str),

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Named parameters for backend calls, in the flat identifier shape.
pub type Params = Vec<(String, Value)>;

///
/// BackendResponse
///

pub enum BackendResponse {
    /// JSON payload: an object for one record, an array for many.
    Parsed(JsonValue),
    One(Instance),
    Many(Vec<Instance>),
    /// No records to render (e.g. a delete acknowledgement).
    Empty,
}

///
/// Backend
///
/// Pluggable storage interface. Methods default to a structured
/// missing-method error so a backend only implements the operations it
/// actually supports; callers see the gap as a typed failure rather
/// than a silent no-op.
///

pub trait Backend {
    fn find(&mut self, model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let _ = (model, params);
        Err(ServiceError::MethodMissing("find"))
    }

    fn create(&mut self, model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let _ = (model, params);
        Err(ServiceError::MethodMissing("create"))
    }

    fn update(&mut self, model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let _ = (model, params);
        Err(ServiceError::MethodMissing("update"))
    }

    fn delete(&mut self, model: &str, params: &Params) -> Result<BackendResponse, ServiceError> {
        let _ = (model, params);
        Err(ServiceError::MethodMissing("delete"))
    }

    fn get_or_create(
        &mut self,
        model: &str,
        params: &Params,
    ) -> Result<BackendResponse, ServiceError> {
        let _ = (model, params);
        Err(ServiceError::MethodMissing("get_or_create"))
    }
}

///
/// Service
///
/// Thin orchestration over a backend: parameter names are checked
/// against the schema before every call and responses are rendered back
/// into model instances. No persistence or transport of its own.
///

pub struct Service<B: Backend> {
    backend: B,
}

impl<B: Backend> Service<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn find(&mut self, model: &str, params: Params) -> Result<Vec<Instance>, Error> {
        check_params(model, &params)?;
        let response = self.backend.find(model, &params)?;

        render(model, response)
    }

    /// Create a record, ignoring parameters that merely restate a
    /// field's declared default.
    pub fn create(&mut self, model: &str, params: Params) -> Result<Vec<Instance>, Error> {
        let params = strip_defaults(model, params)?;
        check_params(model, &params)?;
        let response = self.backend.create(model, &params)?;

        render(model, response)
    }

    pub fn update(&mut self, model: &str, params: Params) -> Result<Vec<Instance>, Error> {
        let params = strip_defaults(model, params)?;
        check_params(model, &params)?;
        let response = self.backend.update(model, &params)?;

        render(model, response)
    }

    pub fn delete(&mut self, model: &str, params: Params) -> Result<Vec<Instance>, Error> {
        check_params(model, &params)?;
        let response = self.backend.delete(model, &params)?;

        render(model, response)
    }

    /// Get-or-create, composed from find + create when the backend has
    /// no native method for it.
    pub fn get_or_create(&mut self, model: &str, params: Params) -> Result<Vec<Instance>, Error> {
        check_params(model, &params)?;

        match self.backend.get_or_create(model, &params) {
            Ok(response) => render(model, response),
            Err(ServiceError::MethodMissing(_)) => {
                let found = self.find(model, params.clone())?;
                if found.is_empty() {
                    self.create(model, params)
                } else {
                    Ok(found)
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}

// Every parameter name must resolve to a declared field title or alias.
fn check_params(model: &str, params: &Params) -> Result<(), Error> {
    let schema = registry::ensure_validated(model)?;

    for (name, _) in params {
        if schema.resolve(name).is_none() {
            return Err(ModelError::UndeclaredField {
                model: model.to_string(),
                field: name.clone(),
                titles: schema.titles().iter().map(ToString::to_string).collect(),
            }
            .into());
        }
    }

    Ok(())
}

// Drop parameters whose value equals the field's declared default.
fn strip_defaults(model: &str, params: Params) -> Result<Params, Error> {
    let schema = registry::ensure_validated(model)?;

    Ok(params
        .into_iter()
        .filter(|(name, value)| {
            schema.resolve(name).is_none_or(|(index, _)| {
                schema.fields()[index].default_value.as_ref() != Some(value)
            })
        })
        .collect())
}

// Translate a backend response into model instances.
fn render(model: &str, response: BackendResponse) -> Result<Vec<Instance>, Error> {
    match response {
        BackendResponse::One(instance) => Ok(vec![instance]),
        BackendResponse::Many(instances) => Ok(instances),
        BackendResponse::Empty => Ok(Vec::new()),
        BackendResponse::Parsed(JsonValue::Array(items)) => items
            .iter()
            .map(|item| Instance::from_parsed(model, item))
            .collect(),
        BackendResponse::Parsed(object) => Ok(vec![Instance::from_parsed(model, &object)?]),
    }
}
