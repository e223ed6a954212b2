//! Demo server: registers the quiz models against an in-memory store and
//! serves the derived API plus the generic admin listing.

use autorest_sdk::{
    admin_routes, common_routes, ApiOverrides, ApiRegistry, FieldDescriptor, MemoryStore,
    ModelDescriptor, StaticSchema,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn quiz_models() -> Vec<ModelDescriptor> {
    vec![
        ModelDescriptor::new("question", "Question", "Questions")
            .field(FieldDescriptor::short_text("title"))
            .field(FieldDescriptor::choice("kind", ["t", "m"]))
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().search_fields(["title"])),
        ModelDescriptor::new("answer", "Answer", "Answers")
            .field(FieldDescriptor::relation("question", "question"))
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().depth(1)),
    ]
}

fn notification_model() -> ModelDescriptor {
    ModelDescriptor::new("notification", "Notification", "Notifications")
        .field(FieldDescriptor::long_text("text"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("autorest_sdk=info".parse()?))
        .init();

    let mut models = quiz_models();
    models.push(notification_model());
    let api_model_names: Vec<String> = quiz_models().iter().map(|m| m.name.clone()).collect();

    let schema = Arc::new(StaticSchema::new(models));
    let store = Arc::new(MemoryStore::new());

    let registry = ApiRegistry::new(schema.clone(), store.clone());
    let table = registry.build_routes()?;
    for registration in table.registrations() {
        tracing::info!(path = %registration.path, handler = %registration.handler.name, "route");
    }

    let admin = admin_routes(schema.as_ref(), store.clone(), |model| {
        api_model_names.iter().any(|n| n == &model.name)
    });

    let app = Router::new()
        .merge(common_routes())
        .nest("/api/v1", table.into_router())
        .nest("/admin", admin);

    let listener = TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
