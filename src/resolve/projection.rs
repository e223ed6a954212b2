//! Projection config resolution: which fields appear on the wire.

use crate::schema::ApiOverrides;

/// Field selection marker. The default is `All`; an explicit `fields`
/// override replaces it entirely with the listed names, in the given order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldSelection {
    All,
    Fields(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedProjection {
    pub fields: FieldSelection,
    /// `None` means no read-only markers; the synthesizer applies its own
    /// fallback for omitted keys.
    pub read_only_fields: Option<Vec<String>>,
    pub depth: Option<u8>,
}

impl Default for ResolvedProjection {
    fn default() -> Self {
        ResolvedProjection {
            fields: FieldSelection::All,
            read_only_fields: None,
            depth: None,
        }
    }
}

/// Resolve the projection config for one model. Pure: defaults plus the
/// projection-namespace keys of the override block, each overridden key
/// replaced wholesale.
pub fn resolve_projection(overrides: Option<&ApiOverrides>) -> ResolvedProjection {
    let mut resolved = ResolvedProjection::default();
    let Some(block) = overrides else {
        return resolved;
    };
    let keys = block.projection_keys();
    if let Some(fields) = keys.fields {
        resolved.fields = FieldSelection::Fields(fields.to_vec());
    }
    if let Some(read_only) = keys.read_only_fields {
        resolved.read_only_fields = Some(read_only.to_vec());
    }
    if let Some(depth) = keys.depth {
        resolved.depth = Some(depth);
    }
    resolved
}
