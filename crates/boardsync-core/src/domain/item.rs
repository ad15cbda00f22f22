//! Project items as read from the board.
//!
//! An [`Item`] is a snapshot: it is rebuilt from the remote source at the
//! start of every run and never written back directly. Changes go out as
//! [`MutationRequest`](super::MutationRequest)s.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque, stable identifier of a project item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        ItemId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of the issue behind an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemState {
    Open,
    Closed,
}

/// A person assigned to the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub login: String,
    pub name: Option<String>,
}

/// Issue metadata attached to an item.
///
/// Draft items on a board have no issue behind them, which is why
/// [`Item::content`] is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueContent {
    /// Node id of the issue; comments are posted against this id.
    pub id: String,
    pub number: u64,
    pub title: String,
    pub url: String,
    pub state: ItemState,
    pub assignees: Vec<Assignee>,
}

impl IssueContent {
    /// `@login` mentions for every assignee, space separated.
    pub fn mentions(&self) -> String {
        self.assignees
            .iter()
            .map(|a| format!("@{}", a.login))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Current value stored in one board field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldValue {
    Date { date: NaiveDate },
    SingleSelect { option_id: String, name: String },
    Iteration { iteration_id: String, title: String },
}

impl FieldValue {
    /// Identifier of the selected option or iteration; `None` for dates.
    pub fn value_id(&self) -> Option<&str> {
        match self {
            FieldValue::Date { .. } => None,
            FieldValue::SingleSelect { option_id, .. } => Some(option_id),
            FieldValue::Iteration { iteration_id, .. } => Some(iteration_id),
        }
    }

    /// Human readable form of the value.
    pub fn display(&self) -> String {
        match self {
            FieldValue::Date { date } => date.to_string(),
            FieldValue::SingleSelect { name, .. } => name.clone(),
            FieldValue::Iteration { title, .. } => title.clone(),
        }
    }
}

/// A tracked unit of work on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub content: Option<IssueContent>,
    /// Field display name -> current value. Absent keys mean "unset".
    pub fields: BTreeMap<String, FieldValue>,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Item {
            id: ItemId::new(id),
            content: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_content(mut self, content: IssueContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Lifecycle state of the underlying issue, if there is one.
    pub fn state(&self) -> Option<ItemState> {
        self.content.as_ref().map(|c| c.state)
    }

    /// Only items backed by an OPEN issue count as open.
    pub fn is_open(&self) -> bool {
        self.state() == Some(ItemState::Open)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Date stored in `name`, if the field holds a date.
    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.fields.get(name) {
            Some(FieldValue::Date { date }) => Some(*date),
            _ => None,
        }
    }

    /// Display name of the option selected in a single-select field.
    pub fn option_name(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::SingleSelect { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Identifier currently stored in an option or iteration field.
    pub fn value_id(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::value_id)
    }

    /// Issue URL, or the item id for draft items.
    pub fn label(&self) -> &str {
        self.content
            .as_ref()
            .map(|c| c.url.as_str())
            .unwrap_or_else(|| self.id.as_str())
    }
}
