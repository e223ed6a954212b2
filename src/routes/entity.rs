//! Resource routes built from one registration. Each resource gets its own
//! sub-router bound to its synthesized handler; canonical names may contain
//! path separators ("question/bank"), which mount as nested literal segments.

use crate::handlers::entity::{create, delete as delete_handler, list, retrieve, update};
use crate::registry::Registration;
use axum::{routing::get, Router};

pub fn resource_routes(registration: &Registration) -> Router {
    Router::new()
        .route(
            &format!("/{}", registration.path),
            get(list).post(create),
        )
        .route(
            &format!("/{}/:id", registration.path),
            get(retrieve).patch(update).delete(delete_handler),
        )
        .with_state(registration.handler.clone())
}
