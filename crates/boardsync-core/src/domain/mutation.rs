//! Outgoing field updates and their human-readable summary.

use serde::{Deserialize, Serialize};

use super::{FieldKind, ItemId};

/// A single field write for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub item_id: ItemId,
    pub field_id: String,
    pub kind: FieldKind,
    /// Option id for single-select fields, iteration id for iteration fields.
    pub value_id: String,
}

/// One line of a change summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field display name, e.g. "Size".
    pub field: String,
    /// Display name of the new value.
    pub value: String,
}

impl FieldChange {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.value)
    }
}
