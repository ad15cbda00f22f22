//! Port definitions for the remote project store.
//!
//! The engine never talks HTTP itself. Everything it needs from the board
//! goes through [`ProjectSource`], which the GitHub transport implements and
//! [`crate::fakes::MemoryProject`] fakes for tests.
//!
//! Every method may fail with a [`TransportError`] (wrapped in a
//! [`BatchError`] for field writes); how that failure is
//! treated (abort, skip the item, skip the notice) is decided by the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{BatchError, Item, ItemId, MutationRequest, ProjectCatalog, TransportError};

/// Result type for transport calls
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub nodes: Vec<T>,
    /// Cursor to pass to the next request.
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

impl<T> Page<T> {
    pub fn new(nodes: Vec<T>, end_cursor: Option<String>, has_next_page: bool) -> Self {
        Self {
            nodes,
            end_cursor,
            has_next_page,
        }
    }

    /// A page with no successor.
    pub fn last(nodes: Vec<T>) -> Self {
        Self::new(nodes, None, false)
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub author: Option<String>,
}

impl Comment {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            author: None,
        }
    }
}

/// Minimal reference to an issue that comments can be posted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    pub number: u64,
    pub url: String,
}

/// Remote project board.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Fetch one page of project items, starting after `cursor`.
    async fn fetch_item_page(&self, cursor: Option<&str>) -> TransportResult<Page<Item>>;

    /// Fetch the project id and every field catalog.
    async fn fetch_catalog(&self) -> TransportResult<ProjectCatalog>;

    /// Fetch one page of comments on `subject_id`, starting after `cursor`.
    async fn fetch_comment_page(
        &self,
        subject_id: &str,
        cursor: Option<&str>,
    ) -> TransportResult<Page<Comment>>;

    /// Write a batch of field values for one item, in order.
    ///
    /// A batch need not be atomic. On failure the error carries how many
    /// leading requests were written before the rejection.
    async fn apply_mutations(
        &self,
        project_id: &str,
        item_id: &ItemId,
        mutations: &[MutationRequest],
    ) -> std::result::Result<(), BatchError>;

    /// Post a comment on `subject_id`.
    async fn post_comment(&self, subject_id: &str, body: &str) -> TransportResult<()>;

    /// Look up an issue by repository name and number.
    async fn fetch_issue(&self, repo: &str, number: u64) -> TransportResult<IssueRef>;
}
