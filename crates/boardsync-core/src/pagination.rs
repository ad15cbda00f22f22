//! Cursor pagination drained into a complete, ordered sequence.
//!
//! Collection is all-or-nothing: any failed page discards what was gathered
//! so far, so a failed collection can simply be retried from scratch.

use std::future::Future;

use crate::domain::FetchError;
use crate::ports::{Page, TransportResult};

/// Drains cursor-paginated collections.
pub struct PageCollector;

impl PageCollector {
    /// Fetch every page, keeping elements for which `keep` returns true.
    ///
    /// `fetch_page` receives `None` for the first page and then each page's
    /// end cursor. Remote ordering is preserved across page boundaries and
    /// the filter is applied per element before accumulation.
    ///
    /// Terminates when a page reports `has_next_page == false`. A page that
    /// claims more results but gives no cursor, or hands back the cursor
    /// that was just requested, aborts with [`FetchError`] instead of
    /// looping forever.
    pub async fn collect<T, F, Fut, P>(mut fetch_page: F, mut keep: P) -> Result<Vec<T>, FetchError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = TransportResult<Page<T>>>,
        P: FnMut(&T) -> bool,
    {
        let mut collected = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            let Page {
                nodes,
                end_cursor,
                has_next_page,
            } = fetch_page(cursor.clone())
                .await
                .map_err(|source| FetchError::Transport { page, source })?;

            collected.extend(nodes.into_iter().filter(|node| keep(node)));

            if !has_next_page {
                return Ok(collected);
            }

            let next = end_cursor.ok_or(FetchError::MissingCursor { page })?;
            if cursor.as_deref() == Some(next.as_str()) {
                return Err(FetchError::StalledCursor { cursor: next });
            }
            cursor = Some(next);
        }
    }

    /// [`PageCollector::collect`] without a filter.
    pub async fn collect_all<T, F, Fut>(fetch_page: F) -> Result<Vec<T>, FetchError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = TransportResult<Page<T>>>,
    {
        Self::collect(fetch_page, |_| true).await
    }
}
