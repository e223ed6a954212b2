//! In-memory data source for tests, demos, and schema-only deployments.

use crate::error::ApiError;
use crate::store::{DataSource, ListQuery};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<Map<String, Value>>,
}

/// Rows per model behind one process-wide lock. Ids are assigned
/// sequentially when the caller does not supply one.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload rows for a model, assigning ids where absent.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn seed(&self, model: &str, rows: Vec<Map<String, Value>>) {
        let mut tables = self.tables.write().expect("memory store lock poisoned");
        let table = tables.entry(model.to_string()).or_default();
        for mut row in rows {
            assign_id(table, &mut row);
            table.rows.push(row);
        }
    }

    fn read_tables(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>, ApiError> {
        self.tables
            .read()
            .map_err(|_| ApiError::Internal("memory store lock poisoned".into()))
    }

    fn write_tables(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>, ApiError> {
        self.tables
            .write()
            .map_err(|_| ApiError::Internal("memory store lock poisoned".into()))
    }
}

fn assign_id(table: &mut Table, row: &mut Map<String, Value>) {
    match row.get("id").and_then(Value::as_i64) {
        Some(given) => {
            table.next_id = table.next_id.max(given + 1);
        }
        None if row.contains_key("id") => {}
        None => {
            table.next_id += 1;
            row.insert("id".into(), Value::Number(table.next_id.into()));
        }
    }
}

/// Equality between a stored value and a query-supplied one. Query params
/// arrive as strings, so numbers and booleans compare through their text
/// form as well.
fn loosely_equal(stored: &Value, wanted: &Value) -> bool {
    if stored == wanted {
        return true;
    }
    match (stored, wanted) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            n.to_string() == *s
        }
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            s.eq_ignore_ascii_case(if *b { "true" } else { "false" })
        }
        _ => false,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn matches(row: &Map<String, Value>, query: &ListQuery) -> bool {
    for (field, wanted) in &query.filters {
        let stored = row.get(field).unwrap_or(&Value::Null);
        if !loosely_equal(stored, wanted) {
            return false;
        }
    }
    if let Some(search) = &query.search {
        let term = search.term.to_lowercase();
        let hit = search.fields.iter().any(|field| {
            row.get(field)
                .and_then(Value::as_str)
                .map(|s| s.to_lowercase().contains(&term))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }
    true
}

#[async_trait]
impl DataSource for MemoryStore {
    async fn list(&self, model: &str, query: &ListQuery) -> Result<Vec<Value>, ApiError> {
        let tables = self.read_tables()?;
        let Some(table) = tables.get(model) else {
            return Ok(Vec::new());
        };
        let mut rows: Vec<&Map<String, Value>> =
            table.rows.iter().filter(|r| matches(r, query)).collect();

        for key in query.ordering.iter().rev() {
            rows.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&key.field).unwrap_or(&Value::Null),
                    b.get(&key.field).unwrap_or(&Value::Null),
                );
                if key.descending {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map(|n| n as usize).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|r| Value::Object(r.clone()))
            .collect())
    }

    async fn get(&self, model: &str, id: &Value) -> Result<Option<Value>, ApiError> {
        let tables = self.read_tables()?;
        Ok(tables.get(model).and_then(|table| {
            table
                .rows
                .iter()
                .find(|r| loosely_equal(r.get("id").unwrap_or(&Value::Null), id))
                .map(|r| Value::Object(r.clone()))
        }))
    }

    async fn insert(&self, model: &str, mut record: Map<String, Value>) -> Result<Value, ApiError> {
        let mut tables = self.write_tables()?;
        let table = tables.entry(model.to_string()).or_default();
        assign_id(table, &mut record);
        table.rows.push(record.clone());
        Ok(Value::Object(record))
    }

    async fn update(
        &self,
        model: &str,
        id: &Value,
        patch: Map<String, Value>,
    ) -> Result<Option<Value>, ApiError> {
        let mut tables = self.write_tables()?;
        let Some(table) = tables.get_mut(model) else {
            return Ok(None);
        };
        let Some(row) = table
            .rows
            .iter_mut()
            .find(|r| loosely_equal(r.get("id").unwrap_or(&Value::Null), id))
        else {
            return Ok(None);
        };
        for (k, v) in patch {
            if k == "id" {
                continue;
            }
            row.insert(k, v);
        }
        Ok(Some(Value::Object(row.clone())))
    }

    async fn delete(&self, model: &str, id: &Value) -> Result<bool, ApiError> {
        let mut tables = self.write_tables()?;
        let Some(table) = tables.get_mut(model) else {
            return Ok(false);
        };
        let before = table.rows.len();
        table
            .rows
            .retain(|r| !loosely_equal(r.get("id").unwrap_or(&Value::Null), id));
        Ok(table.rows.len() < before)
    }
}
