//! Resource config resolution: pagination, permissions, filter/search/order
//! field lists, query hooks.

use crate::classify::classify;
use crate::pagination::PaginationPolicy;
use crate::permission::Permission;
use crate::resolve::ApiDefaults;
use crate::schema::{ApiOverrides, FieldDescriptor};
use crate::store::{FilterSet, QuerysetHook};
use crate::synth::ProjectionFactory;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResolvedResource {
    pub pagination: PaginationPolicy,
    pub permissions: Vec<Arc<dyn Permission>>,
    pub filterset_fields: Vec<String>,
    pub filterset: Option<Arc<dyn FilterSet>>,
    pub search_fields: Vec<String>,
    pub ordering_fields: Vec<String>,
    pub queryset: Option<QuerysetHook>,
    pub projection_factory: Option<ProjectionFactory>,
}

impl std::fmt::Debug for ResolvedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedResource")
            .field("pagination", &self.pagination)
            .field("filterset_fields", &self.filterset_fields)
            .field("filterset", &self.filterset.is_some())
            .field("search_fields", &self.search_fields)
            .field("ordering_fields", &self.ordering_fields)
            .field("queryset", &self.queryset.is_some())
            .field("projection_factory", &self.projection_factory.is_some())
            .finish()
    }
}

/// Resolve the resource config for one model from its field metadata, its
/// override block, and the process-wide defaults.
///
/// The classifier's search-field cap is a default-computation rule only: an
/// explicit `search_fields` override is taken as-is, unbounded. The default
/// query provider is "all rows of this model", expressed as the absence of
/// a queryset hook.
pub fn resolve_resource(
    fields: &[FieldDescriptor],
    overrides: Option<&ApiOverrides>,
    defaults: &ApiDefaults,
) -> ResolvedResource {
    let roles = classify(fields);
    let mut resolved = ResolvedResource {
        pagination: defaults.pagination,
        permissions: defaults.permissions.clone(),
        filterset_fields: roles.filterable,
        filterset: None,
        search_fields: roles.searchable,
        ordering_fields: roles.orderable,
        queryset: None,
        projection_factory: None,
    };
    let Some(block) = overrides else {
        return resolved;
    };
    let keys = block.resource_keys();
    if let Some(pagination) = keys.pagination {
        resolved.pagination = pagination;
    }
    if let Some(permissions) = keys.permissions {
        resolved.permissions = permissions.to_vec();
    }
    if let Some(fields) = keys.filterset_fields {
        resolved.filterset_fields = fields.to_vec();
    }
    if let Some(filterset) = keys.filterset {
        resolved.filterset = Some(filterset.clone());
    }
    if let Some(fields) = keys.search_fields {
        resolved.search_fields = fields.to_vec();
    }
    if let Some(fields) = keys.ordering_fields {
        resolved.ordering_fields = fields.to_vec();
    }
    if let Some(hook) = keys.queryset {
        resolved.queryset = Some(hook.clone());
    }
    if let Some(factory) = keys.projection_factory {
        resolved.projection_factory = Some(factory.clone());
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldKind;

    fn question_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::short_text("title"),
            FieldDescriptor::choice("kind", ["t", "m"]),
            FieldDescriptor::long_text("text"),
        ]
    }

    #[test]
    fn defaults_follow_the_classifier() {
        let resolved = resolve_resource(&question_fields(), None, &ApiDefaults::default());
        assert_eq!(resolved.search_fields, ["title", "text"]);
        assert_eq!(resolved.filterset_fields, ["kind"]);
        assert!(resolved.ordering_fields.is_empty());
        assert!(resolved.queryset.is_none());
        assert!(resolved.filterset.is_none());
    }

    #[test]
    fn default_search_fields_are_text_kinds_in_declaration_order() {
        let fields = question_fields();
        let resolved = resolve_resource(&fields, None, &ApiDefaults::default());
        assert!(resolved.search_fields.len() <= 3);
        for name in &resolved.search_fields {
            let kind = fields.iter().find(|f| &f.name == name).unwrap().kind;
            assert!(matches!(kind, FieldKind::ShortText | FieldKind::LongText));
        }
    }

    #[test]
    fn override_replaces_the_computed_default_wholesale() {
        let overrides = ApiOverrides::new().search_fields(["title"]);
        let resolved = resolve_resource(
            &question_fields(),
            Some(&overrides),
            &ApiDefaults::default(),
        );
        assert_eq!(resolved.search_fields, ["title"]);
        // Untouched keys keep their computed defaults.
        assert_eq!(resolved.filterset_fields, ["kind"]);
    }

    #[test]
    fn explicit_search_fields_bypass_the_cap() {
        let overrides = ApiOverrides::new().search_fields(["a", "b", "c", "d", "e"]);
        let resolved = resolve_resource(
            &question_fields(),
            Some(&overrides),
            &ApiDefaults::default(),
        );
        assert_eq!(resolved.search_fields.len(), 5);
    }

    #[test]
    fn projection_namespace_keys_are_inert_here() {
        let overrides = ApiOverrides::new().fields(["title"]).ordering_fields(["title"]);
        let resolved = resolve_resource(
            &question_fields(),
            Some(&overrides),
            &ApiDefaults::default(),
        );
        assert_eq!(resolved.ordering_fields, ["title"]);
        assert_eq!(resolved.search_fields, ["title", "text"]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let overrides = ApiOverrides::new().search_fields(["title"]);
        let defaults = ApiDefaults::default();
        let a = resolve_resource(&question_fields(), Some(&overrides), &defaults);
        let b = resolve_resource(&question_fields(), Some(&overrides), &defaults);
        assert_eq!(a.search_fields, b.search_fields);
        assert_eq!(a.filterset_fields, b.filterset_fields);
        assert_eq!(a.ordering_fields, b.ordering_fields);
        assert_eq!(a.pagination, b.pagination);
    }

    #[test]
    fn malformed_override_values_pass_through_unvalidated() {
        let overrides = ApiOverrides::new().filterset_fields(["no_such_field"]);
        let resolved = resolve_resource(
            &question_fields(),
            Some(&overrides),
            &ApiDefaults::default(),
        );
        // Rejection is the synthesizer's job, not the resolver's.
        assert_eq!(resolved.filterset_fields, ["no_such_field"]);
    }
}
