use crate::schema::{
    DroppedField, ModelSchema, SchemaError,
    validate::{resolve_model_refs, validate_model},
};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, LazyLock, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

///
/// REGISTRY
/// the process-wide model schema table
///
/// Written once per model type at registration; reference resolution is
/// recorded in the validated set exactly once per model. All other
/// access is read-only.
///

static REGISTRY: LazyLock<RwLock<Registry>> = LazyLock::new(|| RwLock::new(Registry::new()));

/// Acquire a write guard to the global registry.
pub fn registry_write() -> RwLockWriteGuard<'static, Registry> {
    REGISTRY
        .write()
        .expect("registry RwLock poisoned while acquiring write lock")
}

/// Acquire a read guard to the global registry.
pub fn registry_read() -> RwLockReadGuard<'static, Registry> {
    REGISTRY
        .read()
        .expect("registry RwLock poisoned while acquiring read lock")
}

/// Register a model schema with the global registry.
pub fn register(schema: ModelSchema) -> Result<Arc<ModelSchema>, SchemaError> {
    registry_write().register(schema)
}

/// Resolve a model by name, validating its references exactly once.
pub fn ensure_validated(name: &str) -> Result<Arc<ModelSchema>, SchemaError> {
    registry_write().ensure_validated(name)
}

/// Validate every registered model, returning the dropped-field records.
pub fn finalize() -> Result<Vec<DroppedField>, SchemaError> {
    registry_write().finalize()
}

///
/// Registry
///

#[derive(Debug, Default)]
pub struct Registry {
    models: BTreeMap<String, Arc<ModelSchema>>,
    validated: BTreeSet<String>,
    dropped: Vec<DroppedField>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<ModelSchema>> {
        self.models.get(name).cloned()
    }

    #[must_use]
    pub fn is_validated(&self, name: &str) -> bool {
        self.validated.contains(name)
    }

    /// Dropped-field records accumulated by reference resolution.
    #[must_use]
    pub fn dropped_fields(&self) -> &[DroppedField] {
        &self.dropped
    }

    /// Register a schema, running intra-model validation. Registration
    /// is rejected outright on duplicate names or schema issues; a model
    /// that fails here can never produce instances.
    pub fn register(&mut self, schema: ModelSchema) -> Result<Arc<ModelSchema>, SchemaError> {
        if self.models.contains_key(schema.name()) {
            return Err(SchemaError::DuplicateModel(schema.name().to_string()));
        }

        validate_model(&schema)?;

        let arc = Arc::new(schema);
        self.models.insert(arc.name().to_string(), Arc::clone(&arc));

        Ok(arc)
    }

    /// Look up a model, resolving its cross-model references exactly
    /// once per process. Optional fields with unresolvable references
    /// are dropped from the stored schema at this point.
    pub fn ensure_validated(&mut self, name: &str) -> Result<Arc<ModelSchema>, SchemaError> {
        let arc = self
            .lookup(name)
            .ok_or_else(|| SchemaError::UnknownModel(name.to_string()))?;

        if self.validated.contains(name) {
            return Ok(arc);
        }

        let mut schema = (*arc).clone();
        let dropped = resolve_model_refs(&mut schema, self)?;

        let resolved = Arc::new(schema);
        self.models
            .insert(name.to_string(), Arc::clone(&resolved));
        self.validated.insert(name.to_string());
        self.dropped.extend(dropped);

        tracing::debug!(model = %name, "model schema validated");

        Ok(resolved)
    }

    /// Resolve every registered model eagerly, returning all
    /// dropped-field records. Useful as a startup step for hosts that
    /// want schema failures surfaced before first use.
    pub fn finalize(&mut self) -> Result<Vec<DroppedField>, SchemaError> {
        let names: Vec<String> = self.models.keys().cloned().collect();
        for name in names {
            self.ensure_validated(&name)?;
        }

        Ok(self.dropped.clone())
    }
}
