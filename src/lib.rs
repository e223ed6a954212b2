//! Autorest SDK: model-driven REST resource derivation.
//!
//! Register a model once (fields and semantic types); the registry derives a
//! full REST surface for it: routes, a wire projection, and default
//! filter/search/ordering behavior, each narrowly overridable per model.

pub mod admin;
pub mod classify;
pub mod error;
pub mod handlers;
pub mod pagination;
pub mod permission;
pub mod registry;
pub mod resolve;
pub mod response;
pub mod routes;
pub mod schema;
pub mod sql;
pub mod store;
pub mod synth;

pub use admin::admin_routes;
pub use classify::{classify, FieldRoles};
pub use error::{ApiError, ConfigError};
pub use pagination::PaginationPolicy;
pub use permission::{AllowAny, Operation, Permission, WriteRequiresToken};
pub use registry::{canonical_name, ApiRegistry, Registration, RouteTable};
pub use resolve::{
    resolve_projection, resolve_resource, ApiDefaults, FieldSelection, ResolvedProjection,
    ResolvedResource,
};
pub use routes::common_routes;
pub use schema::{
    ApiOverrides, FieldDescriptor, FieldKind, ModelDescriptor, SchemaSource, StaticSchema,
};
pub use store::{
    DataSource, FilterSet, ListQuery, MemoryStore, PgStore, QuerysetHook, SearchSpec, SortKey,
};
pub use synth::{synthesize, Projection, ProjectionFactory, ResourceHandler};
