//! Field classification: semantic type -> default filter/search/order roles.

use crate::schema::{FieldDescriptor, FieldKind};

/// Free-text search over many columns is expensive; the computed default is
/// capped. Explicit `search_fields` overrides are never capped.
pub const DEFAULT_SEARCH_FIELD_CAP: usize = 3;

/// Candidate roles computed from a model's field list, each in field
/// declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldRoles {
    pub filterable: Vec<String>,
    pub searchable: Vec<String>,
    pub orderable: Vec<String>,
}

/// Classify fields into default roles. Pure and deterministic for a given
/// field order.
///
/// - filterable: relations, dates, datetimes, and any choice-bearing field
///   (exact-match filtering is meaningful and cheap there);
/// - searchable: text fields, first [`DEFAULT_SEARCH_FIELD_CAP`] only;
/// - orderable: dates and datetimes (the only totally-ordered scalars we
///   order on by default; anything else is opt-in).
pub fn classify(fields: &[FieldDescriptor]) -> FieldRoles {
    let mut roles = FieldRoles::default();
    for field in fields {
        if matches!(
            field.kind,
            FieldKind::Relation | FieldKind::Date | FieldKind::DateTime
        ) || field.has_choices
        {
            roles.filterable.push(field.name.clone());
        }
        if matches!(field.kind, FieldKind::ShortText | FieldKind::LongText)
            && roles.searchable.len() < DEFAULT_SEARCH_FIELD_CAP
        {
            roles.searchable.push(field.name.clone());
        }
        if matches!(field.kind, FieldKind::Date | FieldKind::DateTime) {
            roles.orderable.push(field.name.clone());
        }
    }
    roles
}
