//! Derived-field reconciliation.
//!
//! Compares what an item currently stores against what the catalogs say it
//! should store, and produces the minimal batch of writes. Governed fields:
//!
//! | Target  | Derived from | Matcher                     |
//! |---------|--------------|-----------------------------|
//! | Size    | Estimate     | [`find_size`]               |
//! | Week    | Due Date     | [`find_week`]               |
//! | Release | Due Date     | [`find_release`] via policy |
//!
//! Reconciliation has no side effects. The same item and catalog snapshot
//! always yield the same output, and a field already at its target value
//! never produces a mutation, so re-running after a successful apply is a
//! no-op.

use serde::{Deserialize, Serialize};

use crate::config::FieldNames;
use crate::domain::{
    FieldChange, FieldDefinition, FieldKind, Item, ItemId, IterationOption, MutationRequest,
    ProjectCatalog, SingleSelectOption,
};
use crate::matcher::{find_release, find_size, find_week, ReleasePolicy};

/// Heading of the field-update summary comment.
pub const SUMMARY_HEADING: &str = "The following fields have been updated:";

/// Writes needed for one item, with a matching change summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub item_id: ItemId,
    pub mutations: Vec<MutationRequest>,
    /// One entry per mutation, same order.
    pub changes: Vec<FieldChange>,
}

impl Reconciliation {
    fn new(item_id: ItemId) -> Self {
        Self {
            item_id,
            mutations: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    fn push(&mut self, field: &FieldDefinition, value_id: &str, display: &str) {
        self.mutations.push(MutationRequest {
            item_id: self.item_id.clone(),
            field_id: field.id.clone(),
            kind: field.kind(),
            value_id: value_id.to_string(),
        });
        self.changes.push(FieldChange::new(&field.name, display));
    }

    /// The first `n` mutations and their changes.
    pub fn prefix(&self, n: usize) -> Reconciliation {
        let n = n.min(self.mutations.len());
        Reconciliation {
            item_id: self.item_id.clone(),
            mutations: self.mutations[..n].to_vec(),
            changes: self.changes[..n].to_vec(),
        }
    }

    /// Markdown body listing every change.
    pub fn summary_comment(&self) -> String {
        let lines: Vec<String> = self
            .changes
            .iter()
            .map(|c| format!("- {}: **{}**", c.field, c.value))
            .collect();
        format!("{}\n{}", SUMMARY_HEADING, lines.join("\n"))
    }
}

/// Reconciles items against one catalog snapshot.
///
/// Governed fields missing from the catalog (or present with the wrong kind)
/// are disabled for every item; see [`Reconciler::unresolved_fields`].
pub struct Reconciler<'a> {
    names: &'a FieldNames,
    size: Option<(&'a FieldDefinition, &'a [SingleSelectOption])>,
    week: Option<(&'a FieldDefinition, Vec<IterationOption>)>,
    release: Option<(&'a FieldDefinition, &'a [SingleSelectOption])>,
    release_policy: &'a dyn ReleasePolicy,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        catalog: &'a ProjectCatalog,
        names: &'a FieldNames,
        release_policy: &'a dyn ReleasePolicy,
    ) -> Self {
        Self {
            names,
            size: catalog.single_select(&names.size),
            week: catalog.iterations(&names.week),
            release: catalog.single_select(&names.release),
            release_policy,
        }
    }

    /// Governed fields that could not be resolved in the catalog.
    pub fn unresolved_fields(&self) -> Vec<(&'a str, FieldKind)> {
        let mut missing = Vec::new();
        if self.size.is_none() {
            missing.push((self.names.size.as_str(), FieldKind::SingleSelect));
        }
        if self.week.is_none() {
            missing.push((self.names.week.as_str(), FieldKind::Iteration));
        }
        if self.release.is_none() {
            missing.push((self.names.release.as_str(), FieldKind::SingleSelect));
        }
        missing
    }

    pub fn reconcile(&self, item: &Item) -> Reconciliation {
        let mut out = Reconciliation::new(item.id.clone());

        if let (Some((field, sizes)), Some(estimate)) =
            (self.size, item.option_name(&self.names.estimate))
        {
            if let Some(size) = find_size(sizes, estimate) {
                if item.value_id(&self.names.size) != Some(size.id.as_str()) {
                    out.push(field, &size.id, &size.name);
                }
            }
        }

        let Some(due) = item.date(&self.names.due_date) else {
            return out;
        };

        if let Some((field, weeks)) = &self.week {
            if let Some(week) = find_week(weeks, due) {
                if item.value_id(&self.names.week) != Some(week.id.as_str()) {
                    out.push(field, &week.id, &week.title);
                }
            }
        }

        if let Some((field, releases)) = self.release {
            if let Some(release) = find_release(self.release_policy, releases, due) {
                if item.value_id(&self.names.release) != Some(release.id.as_str()) {
                    out.push(field, &release.id, &release.name);
                }
            }
        }

        out
    }
}

/// One-shot form of [`Reconciler::reconcile`].
pub fn reconcile(
    item: &Item,
    catalog: &ProjectCatalog,
    names: &FieldNames,
    release_policy: &dyn ReleasePolicy,
) -> Reconciliation {
    Reconciler::new(catalog, names, release_policy).reconcile(item)
}
