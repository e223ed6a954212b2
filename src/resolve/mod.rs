//! Option resolution: computed defaults merged with explicit overrides.
//!
//! Both resolvers share one shape: compute a default record from the field
//! classifier plus fixed defaults, read the override block through the
//! namespace accessor relevant to this resolver (foreign-namespace keys are
//! invisible, hence inert), and replace every overridden key wholesale.
//! Resolvers never validate override values; malformed values are rejected
//! at synthesis time, which keeps resolution total and pure.

pub mod projection;
pub mod resource;

pub use projection::{resolve_projection, FieldSelection, ResolvedProjection};
pub use resource::{resolve_resource, ResolvedResource};

use crate::pagination::PaginationPolicy;
use crate::permission::{AllowAny, Permission};
use std::sync::Arc;

/// Process-wide defaults applied when a model overrides neither pagination
/// nor permissions.
#[derive(Clone)]
pub struct ApiDefaults {
    pub pagination: PaginationPolicy,
    pub permissions: Vec<Arc<dyn Permission>>,
}

impl Default for ApiDefaults {
    fn default() -> Self {
        ApiDefaults {
            pagination: PaginationPolicy::default(),
            permissions: vec![Arc::new(AllowAny)],
        }
    }
}
