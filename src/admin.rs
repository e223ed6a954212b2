//! Generic admin auto-registration: every model the API registry did not
//! claim gets a raw listing route. Consumes only the model list and a
//! registration predicate; shares no state with the core.

use crate::error::ApiError;
use crate::response;
use crate::schema::SchemaSource;
use crate::store::{DataSource, ListQuery};
use axum::{extract::State, routing::get, Router};
use std::sync::Arc;

#[derive(Clone)]
struct AdminEntry {
    model: String,
    source: Arc<dyn DataSource>,
}

async fn list_raw(
    State(entry): State<AdminEntry>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let query = ListQuery {
        limit: Some(100),
        ..Default::default()
    };
    let rows = entry.source.list(&entry.model, &query).await?;
    Ok(response::success_many(rows))
}

/// Mount `GET /{model_name}` for every model where `registered` is false.
pub fn admin_routes(
    schema: &dyn SchemaSource,
    source: Arc<dyn DataSource>,
    registered: impl Fn(&crate::schema::ModelDescriptor) -> bool,
) -> Router {
    let mut router = Router::new();
    for model in schema.list_models() {
        if registered(model) {
            continue;
        }
        tracing::debug!(model = %model.name, "admin auto-registration");
        let entry = AdminEntry {
            model: model.name.clone(),
            source: source.clone(),
        };
        router = router.merge(
            Router::new()
                .route(&format!("/{}", model.name), get(list_raw))
                .with_state(entry),
        );
    }
    router
}
