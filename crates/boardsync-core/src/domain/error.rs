//! Error taxonomy for a sync run.
//!
//! Only [`SyncError`] ends a run. Mutation and notification failures are
//! per-item: the orchestrator logs them and moves on. A missing catalog
//! match is not an error at all, it is a `None` from the matcher.

use super::ItemId;

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API rejected the request: {}", messages.join("; "))]
    Api { messages: Vec<String> },

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),
}

/// A paginated collection was aborted. Partial results are discarded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetching page {page} failed: {source}")]
    Transport {
        page: usize,
        #[source]
        source: TransportError,
    },

    #[error("page {page} reported more results but no cursor")]
    MissingCursor { page: usize },

    #[error("cursor {cursor} did not advance")]
    StalledCursor { cursor: String },
}

/// A field-update batch stopped at its first rejected request.
///
/// Requests are written in order, so the first `applied` of the batch are
/// stored remotely and the rest were never sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request {} of the batch failed: {source}", applied + 1)]
pub struct BatchError {
    pub applied: usize,
    #[source]
    pub source: TransportError,
}

impl BatchError {
    /// Nothing of the batch was written.
    pub fn nothing_applied(source: TransportError) -> Self {
        Self { applied: 0, source }
    }
}

/// The remote store rejected a field update for one item.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("updating fields of item {item_id} failed after {} of {total} writes: {}", source.applied, source.source)]
pub struct MutationError {
    pub item_id: ItemId,
    pub total: usize,
    #[source]
    pub source: BatchError,
}

/// A notification could not be confirmed or delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("reading comment history of {subject_id} failed: {source}")]
    History {
        subject_id: String,
        #[source]
        source: FetchError,
    },

    #[error("posting comment to {subject_id} failed: {source}")]
    Post {
        subject_id: String,
        #[source]
        source: TransportError,
    },
}

/// Run-level failures. All of them happen before the first write.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("collecting project items failed: {0}")]
    Items(#[source] FetchError),

    #[error("fetching field catalogs failed: {0}")]
    Catalog(#[source] TransportError),

    #[error("resolving summary issue {repo}#{number} failed: {source}")]
    SummaryIssue {
        repo: String,
        number: u64,
        #[source]
        source: TransportError,
    },
}

/// Result type for run-level operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_joins_messages() {
        let err = TransportError::Api {
            messages: vec!["bad field".to_string(), "bad option".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "API rejected the request: bad field; bad option"
        );
    }

    #[test]
    fn test_fetch_error_names_page() {
        let err = FetchError::Transport {
            page: 3,
            source: TransportError::Request("connection reset".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("page 3"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn test_mutation_error_names_item() {
        let err = MutationError {
            item_id: ItemId::new("PVTI_7"),
            total: 3,
            source: BatchError {
                applied: 1,
                source: TransportError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                },
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("PVTI_7"));
        assert!(msg.contains("after 1 of 3 writes"));
        assert!(msg.contains("502"));
    }

    #[test]
    fn test_batch_error_names_failed_request() {
        let err = BatchError {
            applied: 2,
            source: TransportError::Request("timeout".to_string()),
        };
        assert_eq!(err.to_string(), "request 3 of the batch failed: request failed: timeout");
        assert_eq!(
            BatchError::nothing_applied(TransportError::Request("x".to_string())).applied,
            0
        );
    }
}
