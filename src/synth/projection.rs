//! The synthesized projection: a fixed struct bound to one model and one
//! resolved projection config, converting rows to and from the wire shape.

use crate::error::{ApiError, ConfigError};
use crate::resolve::{FieldSelection, ResolvedProjection};
use crate::schema::{FieldDescriptor, ModelDescriptor};
use crate::synth::projection_type_name;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Override hook replacing the synthesized projection for a model (the
/// "get_serializer_class" slot of the origin system).
pub type ProjectionFactory =
    Arc<dyn Fn(&ModelDescriptor, &ResolvedProjection) -> Projection + Send + Sync>;

#[derive(Clone, Debug)]
pub struct Projection {
    /// Diagnostic name, deterministic per model (e.g. `QuestionProjection`).
    pub name: String,
    fields: Vec<FieldDescriptor>,
    read_only: HashSet<String>,
    pub depth: u8,
}

impl Projection {
    /// Bind a resolved projection config to a model. Field names in the
    /// config that do not exist on the model are a startup configuration
    /// error.
    pub fn build(model: &ModelDescriptor, config: &ResolvedProjection) -> Result<Self, ConfigError> {
        let fields = match &config.fields {
            FieldSelection::All => model.fields.clone(),
            FieldSelection::Fields(names) => {
                let mut out = Vec::with_capacity(names.len());
                for name in names {
                    let field = model.field_by_name(name).ok_or_else(|| {
                        ConfigError::UnknownField {
                            model: model.name.clone(),
                            key: "fields",
                            field: name.clone(),
                        }
                    })?;
                    out.push(field.clone());
                }
                out
            }
        };
        let mut read_only = HashSet::new();
        if let Some(names) = &config.read_only_fields {
            for name in names {
                if model.field_by_name(name).is_none() {
                    return Err(ConfigError::UnknownField {
                        model: model.name.clone(),
                        key: "read_only_fields",
                        field: name.clone(),
                    });
                }
                read_only.insert(name.clone());
            }
        }
        Ok(Projection {
            name: projection_type_name(model),
            fields,
            read_only,
            depth: config.depth.unwrap_or(0),
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Project a stored row to its wire representation: the id plus the
    /// configured fields in order, absent values as null.
    pub fn serialize(&self, row: &Value) -> Value {
        let empty = Map::new();
        let source = row.as_object().unwrap_or(&empty);
        let mut out = Map::new();
        if let Some(id) = source.get("id") {
            out.insert("id".into(), id.clone());
        }
        for field in &self.fields {
            out.insert(
                field.name.clone(),
                source.get(&field.name).cloned().unwrap_or(Value::Null),
            );
        }
        Value::Object(out)
    }

    /// Validate a request body into writable field values. Read-only fields
    /// (and the id) are stripped; unknown fields and out-of-domain choice
    /// values are collected into one validation error.
    pub fn deserialize(&self, body: Value) -> Result<Map<String, Value>, ApiError> {
        let Value::Object(input) = body else {
            return Err(ApiError::BadRequest("body must be a JSON object".into()));
        };
        let mut out = Map::new();
        let mut errors = Vec::new();
        for (key, value) in input {
            if key == "id" || self.read_only.contains(&key) {
                continue;
            }
            let Some(field) = self.fields.iter().find(|f| f.name == key) else {
                errors.push(format!("unknown field '{}'", key));
                continue;
            };
            if let Some(problem) = check_value(field, &value) {
                errors.push(problem);
                continue;
            }
            out.insert(key, value);
        }
        if errors.is_empty() {
            Ok(out)
        } else {
            Err(ApiError::Validation(errors.join("; ")))
        }
    }
}

fn check_value(field: &FieldDescriptor, value: &Value) -> Option<String> {
    if value.is_null() {
        if field.nullable {
            return None;
        }
        return Some(format!("'{}' may not be null", field.name));
    }
    if field.has_choices && !field.choices.is_empty() {
        match value.as_str() {
            Some(s) if field.choices.iter().any(|c| c == s) => {}
            _ => {
                return Some(format!(
                    "'{}' must be one of: {}",
                    field.name,
                    field.choices.join(", ")
                ))
            }
        }
    }
    None
}
