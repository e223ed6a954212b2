//! Resource registry: one pass over the registered models at process start,
//! producing the route table the HTTP layer serves from.

use crate::error::ConfigError;
use crate::resolve::{resolve_projection, resolve_resource, ApiDefaults};
use crate::routes::resource_routes;
use crate::schema::{ModelDescriptor, SchemaSource};
use crate::store::DataSource;
use crate::synth::{synthesize, ResourceHandler};
use axum::Router;
use std::collections::HashSet;
use std::sync::Arc;

/// Canonical resource name: plural display name, lower-cased, spaces as
/// path separators. "Question Bank" -> "question/bank".
pub fn canonical_name(model: &ModelDescriptor) -> String {
    model.verbose_name_plural.to_lowercase().replace(' ', "/")
}

/// One (path, handler) pair in the route table.
#[derive(Clone, Debug)]
pub struct Registration {
    pub path: String,
    pub basename: String,
    pub handler: Arc<ResourceHandler>,
}

/// The assembled route table. Read-only after construction; hot reload means
/// rebuilding the whole table and swapping it, never mutating in place.
#[derive(Debug)]
pub struct RouteTable {
    registrations: Vec<Registration>,
    skipped: Vec<(String, ConfigError)>,
}

impl RouteTable {
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Models whose resolution failed (missing field metadata). Reported
    /// once, at build time; they do not abort the rest of the table.
    pub fn skipped(&self) -> &[(String, ConfigError)] {
        &self.skipped
    }

    /// Mount every registration: `/{path}` for list/create, `/{path}/:id`
    /// for retrieve/update/delete.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        for registration in &self.registrations {
            router = router.merge(resource_routes(registration));
        }
        router
    }
}

/// Derives and registers a resource for every model of a schema source.
pub struct ApiRegistry {
    schema: Arc<dyn SchemaSource>,
    source: Arc<dyn DataSource>,
    defaults: ApiDefaults,
}

impl ApiRegistry {
    pub fn new(schema: Arc<dyn SchemaSource>, source: Arc<dyn DataSource>) -> Self {
        ApiRegistry {
            schema,
            source,
            defaults: ApiDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: ApiDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build the route table: for each model in registration order, derive
    /// its canonical name, resolve its configs, synthesize its handler.
    ///
    /// Duplicate canonical names and malformed override values abort the
    /// build; missing field metadata skips that model only.
    pub fn build_routes(&self) -> Result<RouteTable, ConfigError> {
        let models = self.schema.list_models();

        let mut seen = HashSet::new();
        for model in models {
            let path = canonical_name(model);
            if !seen.insert(path.clone()) {
                return Err(ConfigError::DuplicatePath(path));
            }
        }

        let schema_models: Arc<[ModelDescriptor]> = models.to_vec().into();
        let mut registrations = Vec::with_capacity(models.len());
        let mut skipped = Vec::new();

        for model in models {
            let fields = match self.schema.fields(model) {
                Ok(fields) => fields,
                Err(err) => {
                    tracing::warn!(model = %model.name, error = %err, "skipping model");
                    skipped.push((model.name.clone(), err));
                    continue;
                }
            };
            let overrides = self.schema.overrides(model);
            let projection = resolve_projection(overrides);
            let resource = resolve_resource(fields, overrides, &self.defaults);
            let handler = synthesize(
                model,
                &projection,
                resource,
                self.source.clone(),
                schema_models.clone(),
            )?;
            let path = canonical_name(model);
            tracing::debug!(model = %model.name, path = %path, handler = %handler.name, "registered resource");
            registrations.push(Registration {
                basename: path.clone(),
                path,
                handler,
            });
        }

        Ok(RouteTable {
            registrations,
            skipped,
        })
    }
}
