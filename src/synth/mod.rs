//! Resource type synthesis: turn resolved configs into live projection and
//! handler objects. Pure construction, no decision logic; resolved configs
//! stay independently testable without ever building a handler.

mod handler;
mod projection;

pub use handler::{parse_id, ResourceHandler};
pub use projection::{Projection, ProjectionFactory};

use crate::error::ConfigError;
use crate::resolve::{ResolvedProjection, ResolvedResource};
use crate::schema::ModelDescriptor;
use crate::store::DataSource;
use std::sync::Arc;

/// Title-case a display name into a type-shaped identifier:
/// "question bank" -> "QuestionBank".
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars);
        }
    }
    out
}

/// Deterministic, collision-free (per distinct display name) projection type
/// name, used for diagnostics only.
pub fn projection_type_name(model: &ModelDescriptor) -> String {
    format!("{}Projection", title_case(&model.verbose_name))
}

/// Deterministic resource type name, used for diagnostics only.
pub fn resource_type_name(model: &ModelDescriptor) -> String {
    format!("{}Resource", title_case(&model.verbose_name))
}

fn check_fields(
    model: &ModelDescriptor,
    key: &'static str,
    names: &[String],
) -> Result<(), ConfigError> {
    for name in names {
        if model.field_by_name(name).is_none() {
            return Err(ConfigError::UnknownField {
                model: model.name.clone(),
                key,
                field: name.clone(),
            });
        }
    }
    Ok(())
}

/// Bind a model and its resolved configs to a data source, producing the
/// CRUD handler registered into the route table.
///
/// This is where malformed override values surface: any resolved field list
/// naming a field absent from the model aborts with the model and offending
/// key, at startup rather than per request.
pub fn synthesize(
    model: &ModelDescriptor,
    projection_config: &ResolvedProjection,
    resource_config: ResolvedResource,
    source: Arc<dyn DataSource>,
    schema_models: Arc<[ModelDescriptor]>,
) -> Result<Arc<ResourceHandler>, ConfigError> {
    check_fields(model, "filterset_fields", &resource_config.filterset_fields)?;
    check_fields(model, "search_fields", &resource_config.search_fields)?;
    check_fields(model, "ordering_fields", &resource_config.ordering_fields)?;

    let projection = match &resource_config.projection_factory {
        Some(factory) => factory(model, projection_config),
        None => Projection::build(model, projection_config)?,
    };

    Ok(Arc::new(ResourceHandler {
        name: resource_type_name(model),
        model: model.clone(),
        projection,
        config: resource_config,
        source,
        schema_models,
    }))
}
