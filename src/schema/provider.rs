//! Schema metadata provider: the seam the registry reads models through.

use crate::error::ConfigError;
use crate::schema::{ApiOverrides, FieldDescriptor, ModelDescriptor};

/// Source of model metadata. The registry never reads descriptors directly;
/// it goes through this trait so schema backends that introspect lazily can
/// fail per model without aborting the rest.
pub trait SchemaSource: Send + Sync {
    fn list_models(&self) -> &[ModelDescriptor];

    /// Field metadata for one model. An error here isolates to that model
    /// during route assembly.
    fn fields<'a>(&'a self, model: &'a ModelDescriptor) -> Result<&'a [FieldDescriptor], ConfigError>;

    fn overrides<'a>(&'a self, model: &'a ModelDescriptor) -> Option<&'a ApiOverrides>;
}

/// In-memory schema source built from an explicit registration list. No
/// ambient scanning: the caller constructs the full model list once at
/// process start.
pub struct StaticSchema {
    models: Vec<ModelDescriptor>,
}

impl StaticSchema {
    pub fn new(models: Vec<ModelDescriptor>) -> Self {
        StaticSchema { models }
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.name == name)
    }
}

impl SchemaSource for StaticSchema {
    fn list_models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    fn fields<'a>(&'a self, model: &'a ModelDescriptor) -> Result<&'a [FieldDescriptor], ConfigError> {
        if model.fields.is_empty() {
            return Err(ConfigError::MissingFields(model.name.clone()));
        }
        Ok(&model.fields)
    }

    fn overrides<'a>(&'a self, model: &'a ModelDescriptor) -> Option<&'a ApiOverrides> {
        model.overrides.as_ref()
    }
}
