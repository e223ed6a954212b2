//! Data source seam: resolved resource configs execute against this trait.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// One sort key, parsed from `ordering=field` / `ordering=-field`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_string(),
                descending: true,
            },
            None => SortKey {
                field: raw.to_string(),
                descending: false,
            },
        }
    }
}

/// Free-text search request: a term matched against a fixed field list.
#[derive(Clone, Debug)]
pub struct SearchSpec {
    pub term: String,
    pub fields: Vec<String>,
}

/// Fully-described list request handed to a data source. Field names have
/// already been restricted to the resolved filter/search/order lists by the
/// resource handler; sources may trust them as identifiers.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub filters: Vec<(String, Value)>,
    pub search: Option<SearchSpec>,
    pub ordering: Vec<SortKey>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Override hook mutating the base query before execution (the "queryset"
/// override key).
pub type QuerysetHook = Arc<dyn Fn(&mut ListQuery) + Send + Sync>;

/// Custom filter parameter interpretation (the "filterset" override key).
/// Replaces the default exact-match filtering over `filterset_fields`.
pub trait FilterSet: Send + Sync {
    fn apply(
        &self,
        params: &HashMap<String, String>,
        query: &mut ListQuery,
    ) -> Result<(), ApiError>;
}

/// Row-oriented persistence over JSON values, keyed by model name. The core
/// never builds queries against storage directly; it describes them as
/// [`ListQuery`] and lets the source execute.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn list(&self, model: &str, query: &ListQuery) -> Result<Vec<Value>, ApiError>;

    async fn get(&self, model: &str, id: &Value) -> Result<Option<Value>, ApiError>;

    async fn insert(&self, model: &str, record: Map<String, Value>) -> Result<Value, ApiError>;

    async fn update(
        &self,
        model: &str,
        id: &Value,
        patch: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError>;

    async fn delete(&self, model: &str, id: &Value) -> Result<bool, ApiError>;
}
