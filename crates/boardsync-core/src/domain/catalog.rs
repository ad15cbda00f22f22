//! Option catalogs for derived fields.
//!
//! A [`ProjectCatalog`] is fetched once per run and treated as an immutable
//! snapshot. Catalogs are small (tens of options) so lookups are linear scans
//! in catalog order.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One selectable option of a single-select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleSelectOption {
    pub id: String,
    pub name: String,
}

impl SingleSelectOption {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One iteration (week) of an iteration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationOption {
    pub id: String,
    pub title: String,
    pub start_date: NaiveDate,
    /// Length in days.
    pub duration: u32,
}

impl IterationOption {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: NaiveDate,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_date,
            duration,
        }
    }

    /// First day after the iteration (exclusive bound).
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(i64::from(self.duration))
    }

    /// Half-open membership: `start_date <= date < start_date + duration`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date()
    }
}

/// Kind of a field that the engine can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    SingleSelect,
    Iteration,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::SingleSelect => "single_select",
            FieldKind::Iteration => "iteration",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldOptions {
    SingleSelect {
        options: Vec<SingleSelectOption>,
    },
    Iteration {
        active: Vec<IterationOption>,
        completed: Vec<IterationOption>,
    },
}

/// A board field together with its selectable values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub name: String,
    pub options: FieldOptions,
}

impl FieldDefinition {
    pub fn single_select(
        id: impl Into<String>,
        name: impl Into<String>,
        options: Vec<SingleSelectOption>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            options: FieldOptions::SingleSelect { options },
        }
    }

    pub fn iteration(
        id: impl Into<String>,
        name: impl Into<String>,
        active: Vec<IterationOption>,
        completed: Vec<IterationOption>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            options: FieldOptions::Iteration { active, completed },
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self.options {
            FieldOptions::SingleSelect { .. } => FieldKind::SingleSelect,
            FieldOptions::Iteration { .. } => FieldKind::Iteration,
        }
    }
}

/// Snapshot of a project's id and field catalogs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCatalog {
    pub project_id: String,
    pub fields: Vec<FieldDefinition>,
}

impl ProjectCatalog {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// First field with the given display name.
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Single-select field `name` and its options, if it exists with that kind.
    pub fn single_select(&self, name: &str) -> Option<(&FieldDefinition, &[SingleSelectOption])> {
        let field = self.field(name)?;
        match &field.options {
            FieldOptions::SingleSelect { options } => Some((field, options.as_slice())),
            FieldOptions::Iteration { .. } => None,
        }
    }

    /// Iteration field `name` with active and completed iterations merged
    /// into one candidate list (active first, each in catalog order).
    pub fn iterations(&self, name: &str) -> Option<(&FieldDefinition, Vec<IterationOption>)> {
        let field = self.field(name)?;
        match &field.options {
            FieldOptions::Iteration { active, completed } => {
                let merged = active.iter().chain(completed.iter()).cloned().collect();
                Some((field, merged))
            }
            FieldOptions::SingleSelect { .. } => None,
        }
    }
}
