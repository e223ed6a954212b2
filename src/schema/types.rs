//! Model and field descriptors plus the per-model override block.

use crate::pagination::PaginationPolicy;
use crate::permission::Permission;
use crate::store::{FilterSet, QuerysetHook};
use crate::synth::ProjectionFactory;
use std::sync::Arc;

/// Semantic type tag for a field. Drives the default filter/search/order
/// classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    ShortText,
    LongText,
    Choice,
    Date,
    DateTime,
    Relation,
    Other,
}

/// Read-only view of one model field.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub has_choices: bool,
    pub nullable: bool,
    /// Allowed values when the field declares a choice domain.
    pub choices: Vec<String>,
    /// Target model name for relation fields (used for depth expansion).
    pub related_model: Option<String>,
}

impl FieldDescriptor {
    fn new(name: &str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name: name.to_string(),
            kind,
            has_choices: false,
            nullable: false,
            choices: Vec::new(),
            related_model: None,
        }
    }

    pub fn short_text(name: &str) -> Self {
        Self::new(name, FieldKind::ShortText)
    }

    pub fn long_text(name: &str) -> Self {
        Self::new(name, FieldKind::LongText)
    }

    pub fn choice<S: Into<String>>(name: &str, choices: impl IntoIterator<Item = S>) -> Self {
        let mut f = Self::new(name, FieldKind::Choice);
        f.has_choices = true;
        f.choices = choices.into_iter().map(Into::into).collect();
        f
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn datetime(name: &str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub fn relation(name: &str, related_model: &str) -> Self {
        let mut f = Self::new(name, FieldKind::Relation);
        f.related_model = Some(related_model.to_string());
        f
    }

    pub fn other(name: &str) -> Self {
        Self::new(name, FieldKind::Other)
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A registered model: identity, display names, ordered fields, and the
/// optional override block supplied by the model's author.
#[derive(Clone)]
pub struct ModelDescriptor {
    /// Internal name, also the storage key (e.g. table name).
    pub name: String,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub fields: Vec<FieldDescriptor>,
    pub overrides: Option<ApiOverrides>,
}

impl ModelDescriptor {
    pub fn new(name: &str, verbose_name: &str, verbose_name_plural: &str) -> Self {
        ModelDescriptor {
            name: name.to_string(),
            verbose_name: verbose_name.to_string(),
            verbose_name_plural: verbose_name_plural.to_string(),
            fields: Vec::new(),
            overrides: None,
        }
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn overrides(mut self, overrides: ApiOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("overrides", &self.overrides.is_some())
            .finish()
    }
}

/// Per-model explicit configuration. Every key is optional; a `None` key
/// falls back to the computed default. Keys split into two disjoint
/// namespaces read by [`projection_keys`](ApiOverrides::projection_keys) and
/// [`resource_keys`](ApiOverrides::resource_keys); each resolver only sees
/// its own namespace, so one block serves both.
#[derive(Clone, Default)]
pub struct ApiOverrides {
    // Projection namespace.
    pub fields: Option<Vec<String>>,
    pub read_only_fields: Option<Vec<String>>,
    pub depth: Option<u8>,

    // Resource namespace.
    pub pagination: Option<PaginationPolicy>,
    pub permissions: Option<Vec<Arc<dyn Permission>>>,
    pub filterset_fields: Option<Vec<String>>,
    pub filterset: Option<Arc<dyn FilterSet>>,
    pub search_fields: Option<Vec<String>>,
    pub ordering_fields: Option<Vec<String>>,
    pub queryset: Option<QuerysetHook>,
    pub projection_factory: Option<ProjectionFactory>,
}

/// Projection-namespace view of an override block.
pub struct ProjectionOverrides<'a> {
    pub fields: Option<&'a [String]>,
    pub read_only_fields: Option<&'a [String]>,
    pub depth: Option<u8>,
}

/// Resource-namespace view of an override block.
pub struct ResourceOverrides<'a> {
    pub pagination: Option<PaginationPolicy>,
    pub permissions: Option<&'a [Arc<dyn Permission>]>,
    pub filterset_fields: Option<&'a [String]>,
    pub filterset: Option<&'a Arc<dyn FilterSet>>,
    pub search_fields: Option<&'a [String]>,
    pub ordering_fields: Option<&'a [String]>,
    pub queryset: Option<&'a QuerysetHook>,
    pub projection_factory: Option<&'a ProjectionFactory>,
}

impl ApiOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn read_only_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.read_only_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn depth(mut self, depth: u8) -> Self {
        self.depth = Some(depth);
        self
    }

    pub fn pagination(mut self, pagination: PaginationPolicy) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn permissions(mut self, permissions: Vec<Arc<dyn Permission>>) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn filterset_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        self.filterset_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn filterset(mut self, filterset: Arc<dyn FilterSet>) -> Self {
        self.filterset = Some(filterset);
        self
    }

    pub fn search_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.search_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn ordering_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.ordering_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn queryset(mut self, hook: QuerysetHook) -> Self {
        self.queryset = Some(hook);
        self
    }

    pub fn projection_factory(mut self, factory: ProjectionFactory) -> Self {
        self.projection_factory = Some(factory);
        self
    }

    /// Projection-namespace keys. Resource keys are invisible through this
    /// view, which is what makes them inert for the projection resolver.
    pub fn projection_keys(&self) -> ProjectionOverrides<'_> {
        ProjectionOverrides {
            fields: self.fields.as_deref(),
            read_only_fields: self.read_only_fields.as_deref(),
            depth: self.depth,
        }
    }

    /// Resource-namespace keys.
    pub fn resource_keys(&self) -> ResourceOverrides<'_> {
        ResourceOverrides {
            pagination: self.pagination,
            permissions: self.permissions.as_deref(),
            filterset_fields: self.filterset_fields.as_deref(),
            filterset: self.filterset.as_ref(),
            search_fields: self.search_fields.as_deref(),
            ordering_fields: self.ordering_fields.as_deref(),
            queryset: self.queryset.as_ref(),
            projection_factory: self.projection_factory.as_ref(),
        }
    }
}

impl std::fmt::Debug for ApiOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut set = Vec::new();
        if self.fields.is_some() {
            set.push("fields");
        }
        if self.read_only_fields.is_some() {
            set.push("read_only_fields");
        }
        if self.depth.is_some() {
            set.push("depth");
        }
        if self.pagination.is_some() {
            set.push("pagination");
        }
        if self.permissions.is_some() {
            set.push("permissions");
        }
        if self.filterset_fields.is_some() {
            set.push("filterset_fields");
        }
        if self.filterset.is_some() {
            set.push("filterset");
        }
        if self.search_fields.is_some() {
            set.push("search_fields");
        }
        if self.ordering_fields.is_some() {
            set.push("ordering_fields");
        }
        if self.queryset.is_some() {
            set.push("queryset");
        }
        if self.projection_factory.is_some() {
            set.push("projection_factory");
        }
        f.debug_tuple("ApiOverrides").field(&set).finish()
    }
}
