//! In-memory fakes for the ports (testing only)
//!
//! `MemoryProject` behaves like a small project board: it paginates items and
//! comments, applies field writes to its stored items and appends posted
//! comments to the history, so a second run observes the first run's
//! effects. Individual calls can be made to fail.
//!
//! `MemorySink` records every emitted event.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{
    BatchError, FieldOptions, FieldValue, Item, ItemId, MutationRequest, ProjectCatalog,
    TransportError,
};
use crate::obs::{EventSink, SyncEvent};
use crate::ports::{Comment, IssueRef, Page, ProjectSource, TransportResult};

const DEFAULT_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// MemoryProject
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Failures {
    item_page: Option<usize>,
    catalog: bool,
    comments_of: HashSet<String>,
    posts_to: HashSet<String>,
    /// Item id to the index of the first rejected request in its batch.
    mutations_of: HashMap<ItemId, usize>,
}

#[derive(Debug, Default)]
struct BoardState {
    items: Vec<Item>,
    catalog: ProjectCatalog,
    comments: HashMap<String, Vec<Comment>>,
    issues: HashMap<(String, u64), IssueRef>,
    applied: Vec<(ItemId, Vec<MutationRequest>)>,
    posted: Vec<(String, String)>,
    item_pages_served: usize,
    failures: Failures,
}

/// In-memory project board.
#[derive(Debug)]
pub struct MemoryProject {
    state: Mutex<BoardState>,
    page_size: usize,
}

impl Default for MemoryProject {
    fn default() -> Self {
        Self::new(ProjectCatalog::default())
    }
}

fn paginate<T: Clone>(all: &[T], cursor: Option<&str>, size: usize) -> TransportResult<Page<T>> {
    let start = match cursor {
        None => 0,
        Some(c) => c
            .strip_prefix("cursor:")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| TransportError::Request(format!("invalid cursor {c}")))?,
    };
    let end = (start + size).min(all.len());
    let nodes = all.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    let has_next_page = end < all.len();
    Ok(Page::new(
        nodes,
        has_next_page.then(|| format!("cursor:{end}")),
        has_next_page,
    ))
}

impl MemoryProject {
    pub fn new(catalog: ProjectCatalog) -> Self {
        Self {
            state: Mutex::new(BoardState {
                catalog,
                ..BoardState::default()
            }),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Serve items and comments in pages of `size` (minimum 1).
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    pub fn with_items(self, items: impl IntoIterator<Item = Item>) -> Self {
        self.state.lock().unwrap().items.extend(items);
        self
    }

    pub fn with_comments(self, subject_id: &str, bodies: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .comments
            .entry(subject_id.to_string())
            .or_default()
            .extend(bodies.iter().map(|b| Comment::new(*b)));
        self
    }

    pub fn with_issue(self, repo: &str, issue: IssueRef) -> Self {
        self.state
            .lock()
            .unwrap()
            .issues
            .insert((repo.to_string(), issue.number), issue);
        self
    }

    /// Make the `page`-th item page request (1-based) fail.
    pub fn fail_item_page(&self, page: usize) {
        self.state.lock().unwrap().failures.item_page = Some(page);
    }

    pub fn fail_catalog(&self) {
        self.state.lock().unwrap().failures.catalog = true;
    }

    pub fn fail_comments_of(&self, subject_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .comments_of
            .insert(subject_id.to_string());
    }

    pub fn fail_posts_to(&self, subject_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .posts_to
            .insert(subject_id.to_string());
    }

    pub fn fail_mutations_of(&self, item_id: &str) {
        self.fail_mutation_request(item_id, 0);
    }

    /// Reject the `index`-th request (0-based) of `item_id`'s next batches.
    /// The requests before it are written.
    pub fn fail_mutation_request(&self, item_id: &str, index: usize) {
        self.state
            .lock()
            .unwrap()
            .failures
            .mutations_of
            .insert(ItemId::new(item_id), index);
    }

    /// Clear every injected failure.
    pub fn heal(&self) {
        self.state.lock().unwrap().failures = Failures::default();
    }

    /// Current snapshot of the stored items.
    pub fn items(&self) -> Vec<Item> {
        self.state.lock().unwrap().items.clone()
    }

    pub fn item(&self, id: &str) -> Option<Item> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|i| i.id.as_str() == id)
            .cloned()
    }

    /// Written requests of each batch so far, in call order. A batch that
    /// failed part way shows only its written prefix.
    pub fn applied(&self) -> Vec<(ItemId, Vec<MutationRequest>)> {
        self.state.lock().unwrap().applied.clone()
    }

    /// `(subject_id, body)` of every comment posted so far, in call order.
    pub fn posted(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn comments(&self, subject_id: &str) -> Vec<Comment> {
        self.state
            .lock()
            .unwrap()
            .comments
            .get(subject_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn item_pages_served(&self) -> usize {
        self.state.lock().unwrap().item_pages_served
    }

    /// Replace the value of field `name` on item `id`, as a user editing the board would.
    pub fn set_field(&self, id: &str, name: &str, value: FieldValue) {
        let mut state = self.state.lock().unwrap();
        if let Some(item) = state.items.iter_mut().find(|i| i.id.as_str() == id) {
            item.fields.insert(name.to_string(), value);
        }
    }

    /// Stored value a mutation produces, resolved through the catalog.
    fn resolve(catalog: &ProjectCatalog, m: &MutationRequest) -> Option<(String, FieldValue)> {
        let field = catalog.fields.iter().find(|f| f.id == m.field_id)?;
        let value = match &field.options {
            FieldOptions::SingleSelect { options } => {
                let opt = options.iter().find(|o| o.id == m.value_id)?;
                FieldValue::SingleSelect {
                    option_id: opt.id.clone(),
                    name: opt.name.clone(),
                }
            }
            FieldOptions::Iteration { active, completed } => {
                let it = active
                    .iter()
                    .chain(completed.iter())
                    .find(|i| i.id == m.value_id)?;
                FieldValue::Iteration {
                    iteration_id: it.id.clone(),
                    title: it.title.clone(),
                }
            }
        };
        Some((field.name.clone(), value))
    }
}

#[async_trait]
impl ProjectSource for MemoryProject {
    async fn fetch_item_page(&self, cursor: Option<&str>) -> TransportResult<Page<Item>> {
        let mut state = self.state.lock().unwrap();
        state.item_pages_served += 1;
        if state.failures.item_page == Some(state.item_pages_served) {
            return Err(TransportError::Request("item page unavailable".to_string()));
        }
        paginate(&state.items, cursor, self.page_size)
    }

    async fn fetch_catalog(&self) -> TransportResult<ProjectCatalog> {
        let state = self.state.lock().unwrap();
        if state.failures.catalog {
            return Err(TransportError::Request("catalog unavailable".to_string()));
        }
        Ok(state.catalog.clone())
    }

    async fn fetch_comment_page(
        &self,
        subject_id: &str,
        cursor: Option<&str>,
    ) -> TransportResult<Page<Comment>> {
        let state = self.state.lock().unwrap();
        if state.failures.comments_of.contains(subject_id) {
            return Err(TransportError::Status {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        let comments = state.comments.get(subject_id).cloned().unwrap_or_default();
        paginate(&comments, cursor, self.page_size)
    }

    async fn apply_mutations(
        &self,
        project_id: &str,
        item_id: &ItemId,
        mutations: &[MutationRequest],
    ) -> Result<(), BatchError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        if project_id != state.catalog.project_id {
            return Err(BatchError::nothing_applied(TransportError::NotFound(
                format!("project {project_id}"),
            )));
        }
        let reject_at = state.failures.mutations_of.get(item_id).copied();
        let item = state
            .items
            .iter_mut()
            .find(|i| &i.id == item_id)
            .ok_or_else(|| {
                BatchError::nothing_applied(TransportError::NotFound(format!("item {item_id}")))
            })?;

        let mut result = Ok(());
        let mut written = 0;
        for (index, m) in mutations.iter().enumerate() {
            if reject_at == Some(index) {
                result = Err(TransportError::Api {
                    messages: vec![format!("item {item_id} is locked")],
                });
                break;
            }
            match Self::resolve(&state.catalog, m) {
                Some((name, value)) => {
                    item.fields.insert(name, value);
                    written += 1;
                }
                None => {
                    result = Err(TransportError::Api {
                        messages: vec![format!(
                            "unknown value {} for field {}",
                            m.value_id, m.field_id
                        )],
                    });
                    break;
                }
            }
        }

        if written > 0 {
            state
                .applied
                .push((item_id.clone(), mutations[..written].to_vec()));
        }
        result.map_err(|source| BatchError {
            applied: written,
            source,
        })
    }

    async fn post_comment(&self, subject_id: &str, body: &str) -> TransportResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.failures.posts_to.contains(subject_id) {
            return Err(TransportError::Api {
                messages: vec!["comment rejected".to_string()],
            });
        }
        state
            .comments
            .entry(subject_id.to_string())
            .or_default()
            .push(Comment::new(body));
        state
            .posted
            .push((subject_id.to_string(), body.to_string()));
        Ok(())
    }

    async fn fetch_issue(&self, repo: &str, number: u64) -> TransportResult<IssueRef> {
        let state = self.state.lock().unwrap();
        state
            .issues
            .get(&(repo.to_string(), number))
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("{repo}#{number}")))
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Event sink that keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Dotted names of the recorded events, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(SyncEvent::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().into_iter().filter(|n| *n == name).count()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().unwrap().push(event);
    }
}
