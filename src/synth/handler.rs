//! The synthesized resource handler: CRUD over the data source, driven
//! entirely by a resolved resource config.

use crate::error::ApiError;
use crate::permission::Operation;
use crate::resolve::ResolvedResource;
use crate::schema::{FieldKind, ModelDescriptor};
use crate::store::{DataSource, ListQuery, SearchSpec, SortKey};
use crate::synth::Projection;
use axum::http::HeaderMap;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub struct ResourceHandler {
    /// Diagnostic name, deterministic per model (e.g. `QuestionResource`).
    pub name: String,
    pub model: ModelDescriptor,
    pub projection: Projection,
    pub config: ResolvedResource,
    pub(crate) source: Arc<dyn DataSource>,
    /// Full model list, needed to follow relation fields during depth
    /// expansion.
    pub(crate) schema_models: Arc<[ModelDescriptor]>,
}

impl std::fmt::Debug for ResourceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("name", &self.name)
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}

/// Parse a path id: integers bind as numbers, anything else (uuid, slug)
/// stays a string.
pub fn parse_id(raw: &str) -> Value {
    match raw.parse::<i64>() {
        Ok(n) => Value::Number(n.into()),
        Err(_) => Value::String(raw.to_string()),
    }
}

impl ResourceHandler {
    fn check(&self, op: Operation, headers: &HeaderMap) -> Result<(), ApiError> {
        for policy in &self.config.permissions {
            policy.check(op, headers)?;
        }
        Ok(())
    }

    /// List rows: filter/search/order params restricted to the resolved
    /// field lists, paginated per the resolved policy.
    pub async fn list(
        &self,
        headers: &HeaderMap,
        params: &HashMap<String, String>,
    ) -> Result<Vec<Value>, ApiError> {
        self.check(Operation::List, headers)?;
        let mut query = ListQuery::default();

        match &self.config.filterset {
            Some(filterset) => filterset.apply(params, &mut query)?,
            None => {
                for field in &self.config.filterset_fields {
                    if let Some(raw) = params.get(field) {
                        query.filters.push((field.clone(), Value::String(raw.clone())));
                    }
                }
            }
        }

        if let Some(term) = params.get("search") {
            if !term.is_empty() && !self.config.search_fields.is_empty() {
                query.search = Some(SearchSpec {
                    term: term.clone(),
                    fields: self.config.search_fields.clone(),
                });
            }
        }

        if let Some(raw) = params.get("ordering") {
            for part in raw.split(',') {
                let key = SortKey::parse(part.trim());
                if self.config.ordering_fields.contains(&key.field) {
                    query.ordering.push(key);
                }
            }
        }

        let (limit, offset) = self.config.pagination.page(params);
        query.limit = Some(limit);
        query.offset = Some(offset);

        if let Some(hook) = &self.config.queryset {
            hook(&mut query);
        }

        let rows = self.source.list(&self.model.name, &query).await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(self.project(row).await?);
        }
        Ok(out)
    }

    pub async fn retrieve(&self, headers: &HeaderMap, id_raw: &str) -> Result<Value, ApiError> {
        self.check(Operation::Retrieve, headers)?;
        let id = parse_id(id_raw);
        let row = self
            .source
            .get(&self.model.name, &id)
            .await?
            .ok_or_else(|| ApiError::NotFound(id_raw.to_string()))?;
        self.project(&row).await
    }

    pub async fn create(&self, headers: &HeaderMap, body: Value) -> Result<Value, ApiError> {
        self.check(Operation::Create, headers)?;
        let record = self.projection.deserialize(body)?;
        let row = self.source.insert(&self.model.name, record).await?;
        self.project(&row).await
    }

    pub async fn update(
        &self,
        headers: &HeaderMap,
        id_raw: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        self.check(Operation::Update, headers)?;
        let id = parse_id(id_raw);
        let patch = self.projection.deserialize(body)?;
        let row = self
            .source
            .update(&self.model.name, &id, patch)
            .await?
            .ok_or_else(|| ApiError::NotFound(id_raw.to_string()))?;
        self.project(&row).await
    }

    pub async fn delete(&self, headers: &HeaderMap, id_raw: &str) -> Result<(), ApiError> {
        self.check(Operation::Delete, headers)?;
        let id = parse_id(id_raw);
        if self.source.delete(&self.model.name, &id).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound(id_raw.to_string()))
        }
    }

    async fn project(&self, row: &Value) -> Result<Value, ApiError> {
        let mut wire = self.projection.serialize(row);
        if self.projection.depth > 0 {
            self.expand(&mut wire, &self.model, self.projection.depth)
                .await?;
        }
        Ok(wire)
    }

    /// Replace relation foreign keys with the related row, recursing up to
    /// `depth` levels through the related models' own relation fields.
    fn expand<'a>(
        &'a self,
        value: &'a mut Value,
        model: &'a ModelDescriptor,
        depth: u8,
    ) -> Pin<Box<dyn Future<Output = Result<(), ApiError>> + Send + 'a>> {
        Box::pin(async move {
            let Value::Object(map) = value else {
                return Ok(());
            };
            for field in &model.fields {
                if field.kind != FieldKind::Relation {
                    continue;
                }
                let Some(target_name) = field.related_model.as_deref() else {
                    continue;
                };
                let Some(fk) = map.get(&field.name).cloned() else {
                    continue;
                };
                if fk.is_null() || fk.is_object() {
                    continue;
                }
                let Some(mut related) = self.source.get(target_name, &fk).await? else {
                    continue;
                };
                if depth > 1 {
                    if let Some(target) = self.schema_models.iter().find(|m| m.name == target_name)
                    {
                        self.expand(&mut related, target, depth - 1).await?;
                    }
                }
                map.insert(field.name.clone(), related);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::WriteRequiresToken;
    use crate::resolve::{resolve_projection, resolve_resource, ApiDefaults};
    use crate::schema::{ApiOverrides, FieldDescriptor};
    use crate::store::MemoryStore;
    use crate::synth::synthesize;
    use serde_json::json;

    fn question() -> ModelDescriptor {
        ModelDescriptor::new("question", "Question", "Questions")
            .field(FieldDescriptor::short_text("title"))
            .field(FieldDescriptor::choice("kind", ["t", "m"]))
            .field(FieldDescriptor::long_text("text"))
    }

    fn handler_for(model: ModelDescriptor, store: Arc<MemoryStore>) -> Arc<ResourceHandler> {
        let models: Arc<[ModelDescriptor]> = vec![model.clone()].into();
        let projection = resolve_projection(model.overrides.as_ref());
        let resource = resolve_resource(
            &model.fields,
            model.overrides.as_ref(),
            &ApiDefaults::default(),
        );
        synthesize(&model, &projection, resource, store, models).unwrap()
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        for (title, kind, text) in [
            ("Borrow checker", "t", "explain moves"),
            ("Lifetimes", "m", "pick the elided form"),
            ("Traits", "t", "object safety"),
        ] {
            let row = match json!({"title": title, "kind": kind, "text": text}) {
                Value::Object(m) => m,
                _ => unreachable!(),
            };
            store.seed("question", vec![row]);
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn default_search_spans_title_and_text() {
        let handler = handler_for(question(), seeded_store());
        let params: HashMap<_, _> = [("search".to_string(), "moves".to_string())].into();
        let rows = handler.list(&HeaderMap::new(), &params).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], json!("Borrow checker"));
    }

    #[tokio::test]
    async fn overridden_search_fields_replace_the_default() {
        let model = question().overrides(ApiOverrides::new().search_fields(["title"]));
        let handler = handler_for(model, seeded_store());
        // "moves" only appears in text, which the override excludes.
        let params: HashMap<_, _> = [("search".to_string(), "moves".to_string())].into();
        let rows = handler.list(&HeaderMap::new(), &params).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn filter_params_restricted_to_filterset_fields() {
        let handler = handler_for(question(), seeded_store());
        let params: HashMap<_, _> = [
            ("kind".to_string(), "m".to_string()),
            // title is not filterable by default; must be ignored.
            ("title".to_string(), "Traits".to_string()),
        ]
        .into();
        let rows = handler.list(&HeaderMap::new(), &params).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["title"], json!("Lifetimes"));
    }

    #[tokio::test]
    async fn ordering_params_restricted_to_ordering_fields() {
        // No date fields, so the default ordering list is empty and the
        // param is inert.
        let handler = handler_for(question(), seeded_store());
        let params: HashMap<_, _> = [("ordering".to_string(), "-title".to_string())].into();
        let rows = handler.list(&HeaderMap::new(), &params).await.unwrap();
        assert_eq!(rows[0]["title"], json!("Borrow checker"));
    }

    #[tokio::test]
    async fn crud_round_trip_with_choice_validation() {
        let handler = handler_for(question(), Arc::new(MemoryStore::new()));
        let headers = HeaderMap::new();

        let created = handler
            .create(&headers, json!({"title": "Async", "kind": "t", "text": "pin"}))
            .await
            .unwrap();
        assert_eq!(created["id"], json!(1));

        let bad = handler
            .create(&headers, json!({"title": "Async", "kind": "z"}))
            .await;
        assert!(matches!(bad, Err(ApiError::Validation(_))));

        let updated = handler
            .update(&headers, "1", json!({"title": "Async moved"}))
            .await
            .unwrap();
        assert_eq!(updated["title"], json!("Async moved"));

        handler.delete(&headers, "1").await.unwrap();
        let gone = handler.retrieve(&headers, "1").await;
        assert!(matches!(gone, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn permission_policies_gate_operations() {
        let model = question().overrides(ApiOverrides::new().permissions(vec![Arc::new(
            WriteRequiresToken {
                header: "x-api-token",
                token: "secret".into(),
            },
        )]));
        let handler = handler_for(model, seeded_store());

        let headers = HeaderMap::new();
        assert!(handler.list(&headers, &HashMap::new()).await.is_ok());
        let denied = handler.create(&headers, json!({"title": "x"})).await;
        assert!(matches!(denied, Err(ApiError::Forbidden(_))));
    }

    #[tokio::test]
    async fn queryset_hook_scopes_the_base_query() {
        let hook: crate::store::QuerysetHook = Arc::new(|query: &mut ListQuery| {
            query.filters.push(("kind".into(), json!("t")));
        });
        let model = question().overrides(ApiOverrides::new().queryset(hook));
        let handler = handler_for(model, seeded_store());
        let rows = handler.list(&HeaderMap::new(), &HashMap::new()).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn depth_expands_relations() {
        let question_model = question();
        let answer_model = ModelDescriptor::new("answer", "Answer", "Answers")
            .field(FieldDescriptor::relation("question", "question"))
            .field(FieldDescriptor::long_text("text"))
            .overrides(ApiOverrides::new().depth(1));

        let store = seeded_store();
        let row = match json!({"question": 3, "text": "mark the trait dyn-safe"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        store.seed("answer", vec![row]);

        let models: Arc<[ModelDescriptor]> =
            vec![question_model, answer_model.clone()].into();
        let projection = resolve_projection(answer_model.overrides.as_ref());
        let resource = resolve_resource(
            &answer_model.fields,
            answer_model.overrides.as_ref(),
            &ApiDefaults::default(),
        );
        let handler = synthesize(&answer_model, &projection, resource, store, models).unwrap();

        let got = handler.retrieve(&HeaderMap::new(), "1").await.unwrap();
        assert_eq!(got["question"]["title"], json!("Traits"));
    }
}
