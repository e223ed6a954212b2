//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for a list query.
//!
//! Every identifier reaching this module comes from resolved configuration
//! (model field lists validated at synthesis time), never from raw request
//! input; values always travel as bind parameters.

use crate::store::ListQuery;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// SELECT with exact-match filters, ILIKE search over the resolved search
/// fields, ORDER BY the resolved sort keys (falling back to id so pages are
/// stable), LIMIT/OFFSET.
pub fn select_list(schema: &str, table: &str, query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);

    let mut where_parts = Vec::new();
    for (field, value) in &query.filters {
        let n = q.push_param(value.clone());
        where_parts.push(format!("{} = ${}", quoted(field), n));
    }
    if let Some(search) = &query.search {
        if !search.fields.is_empty() {
            let n = q.push_param(Value::String(format!("%{}%", search.term)));
            let alts: Vec<String> = search
                .fields
                .iter()
                .map(|f| format!("{}::text ILIKE ${}", quoted(f), n))
                .collect();
            where_parts.push(format!("({})", alts.join(" OR ")));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };

    let order_clause = if query.ordering.is_empty() {
        format!(" ORDER BY {}", quoted("id"))
    } else {
        let keys: Vec<String> = query
            .ordering
            .iter()
            .map(|k| {
                format!(
                    "{} {}",
                    quoted(&k.field),
                    if k.descending { "DESC" } else { "ASC" }
                )
            })
            .collect();
        format!(" ORDER BY {}", keys.join(", "))
    };

    let limit_clause = query
        .limit
        .map(|n| format!(" LIMIT {}", n))
        .unwrap_or_default();
    let offset_clause = query
        .offset
        .map(|n| format!(" OFFSET {}", n))
        .unwrap_or_default();

    q.sql = format!(
        "SELECT * FROM {}{}{}{}{}",
        table, where_clause, order_clause, limit_clause, offset_clause
    );
    q
}

/// SELECT by id; caller binds the id as sole parameter.
pub fn select_by_id(schema: &str, table: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = $1",
        qualified_table(schema, table),
        quoted("id")
    )
}

/// INSERT from a deserialized record; keys are model field names.
pub fn insert(schema: &str, table: &str, record: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (k, v) in record {
        let n = q.push_param(v.clone());
        cols.push(quoted(k));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        qualified_table(schema, table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET only keys present in the patch; id bound last.
pub fn update(schema: &str, table: &str, id: &Value, patch: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for (k, v) in patch {
        if k == "id" {
            continue;
        }
        let n = q.push_param(v.clone());
        sets.push(format!("{} = ${}", quoted(k), n));
    }
    let table = qualified_table(schema, table);
    if sets.is_empty() {
        q.push_param(id.clone());
        q.sql = format!("SELECT * FROM {} WHERE {} = $1", table, quoted("id"));
        return q;
    }
    let id_param = q.push_param(id.clone());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING *",
        table,
        sets.join(", "),
        quoted("id"),
        id_param
    );
    q
}

/// DELETE by id; caller binds the id as sole parameter.
pub fn delete(schema: &str, table: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        qualified_table(schema, table),
        quoted("id"),
        quoted("id")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SearchSpec, SortKey};
    use serde_json::json;

    #[test]
    fn select_list_composes_filters_search_ordering_and_paging() {
        let query = ListQuery {
            filters: vec![("kind".into(), json!("t"))],
            search: Some(SearchSpec {
                term: "moves".into(),
                fields: vec!["title".into(), "text".into()],
            }),
            ordering: vec![SortKey::parse("-created_at")],
            limit: Some(10),
            offset: Some(20),
        };
        let q = select_list("public", "question", &query);
        assert_eq!(
            q.sql,
            "SELECT * FROM \"public\".\"question\" WHERE \"kind\" = $1 AND \
             (\"title\"::text ILIKE $2 OR \"text\"::text ILIKE $2) \
             ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(q.params, vec![json!("t"), json!("%moves%")]);
    }

    #[test]
    fn select_list_defaults_to_stable_id_order() {
        let q = select_list("public", "question", &ListQuery::default());
        assert_eq!(q.sql, "SELECT * FROM \"public\".\"question\" ORDER BY \"id\"");
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_binds_every_record_key() {
        let record = match json!({"kind": "t", "title": "Traits"}) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };
        let q = insert("public", "question", &record);
        assert_eq!(
            q.sql,
            "INSERT INTO \"public\".\"question\" (\"kind\", \"title\") \
             VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_skips_id_and_binds_it_last() {
        let patch = match json!({"id": 9, "title": "Moves"}) {
            serde_json::Value::Object(m) => m,
            _ => unreachable!(),
        };
        let q = update("public", "question", &json!(9), &patch);
        assert_eq!(
            q.sql,
            "UPDATE \"public\".\"question\" SET \"title\" = $1 \
             WHERE \"id\" = $2 RETURNING *"
        );
        assert_eq!(q.params, vec![json!("Moves"), json!(9)]);
    }

    #[test]
    fn empty_patch_degrades_to_select() {
        let patch = serde_json::Map::new();
        let q = update("public", "question", &json!(3), &patch);
        assert_eq!(
            q.sql,
            "SELECT * FROM \"public\".\"question\" WHERE \"id\" = $1"
        );
    }
}
