//! PostgreSQL data source: executes list queries via the safe SQL builder.
//!
//! Tables are named after the model (one table per registered model) inside
//! a single schema. Rows are decoded to JSON objects column by column.

use crate::error::ApiError;
use crate::sql::{self, PgBindValue, QueryBuf};
use crate::store::{DataSource, ListQuery};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore {
            pool,
            schema: "public".into(),
        }
    }

    pub fn with_schema(pool: PgPool, schema: &str) -> Self {
        PgStore {
            pool,
            schema: schema.to_string(),
        }
    }

    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Value>, ApiError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, sql: &str, id: &Value) -> Result<Option<Value>, ApiError> {
        tracing::debug!(sql = %sql, id = ?id, "query");
        let row = sqlx::query(sql)
            .bind(PgBindValue::from_json(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_json))
    }
}

#[async_trait]
impl DataSource for PgStore {
    async fn list(&self, model: &str, query: &ListQuery) -> Result<Vec<Value>, ApiError> {
        let q = sql::select_list(&self.schema, model, query);
        self.fetch_all(&q).await
    }

    async fn get(&self, model: &str, id: &Value) -> Result<Option<Value>, ApiError> {
        let sql = sql::select_by_id(&self.schema, model);
        self.fetch_optional(&sql, id).await
    }

    async fn insert(&self, model: &str, record: Map<String, Value>) -> Result<Value, ApiError> {
        let q = sql::insert(&self.schema, model, &record);
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::Db(sqlx::Error::RowNotFound))?;
        Ok(row_to_json(&row))
    }

    async fn update(
        &self,
        model: &str,
        id: &Value,
        patch: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let q = sql::update(&self.schema, model, id, &patch);
        let rows = self.fetch_all(&q).await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, model: &str, id: &Value) -> Result<bool, ApiError> {
        let sql = sql::delete(&self.schema, model);
        tracing::debug!(sql = %sql, id = ?id, "query");
        let row = sqlx::query(&sql)
            .bind(PgBindValue::from_json(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
