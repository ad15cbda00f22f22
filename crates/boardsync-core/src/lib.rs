//! boardsync core library
//!
//! Field reconciliation and idempotent notification for project boards.
//!
//! - [`PageCollector`] drains cursor-paginated collections
//! - [`matcher`] maps due dates and estimates onto catalog options
//! - [`Reconciler`] diffs current field values against derived targets
//! - [`NotificationGuard`] posts each notice at most once, keyed on marker text
//! - [`Orchestrator`] sequences a run: fetch, reconcile, apply, notify
//!
//! The remote board is reached only through the [`ProjectSource`] port.

pub mod config;
pub mod domain;
pub mod fakes;
pub mod matcher;
pub mod notify;
pub mod obs;
pub mod orchestrator;
pub mod pagination;
pub mod ports;
pub mod reconcile;
pub mod telemetry;

pub use config::{FieldNames, SummaryIssue, SyncConfig};
pub use domain::{
    Assignee, BatchError, FetchError, FieldChange, FieldDefinition, FieldKind, FieldOptions,
    FieldValue, IssueContent, Item, ItemId, ItemState, IterationOption, MutationError,
    MutationRequest, NotificationError, ProjectCatalog, Result, SingleSelectOption, SyncError,
    TransportError,
};
pub use matcher::{
    find_release, find_size, find_week, DateRangeInName, NextReleaseOnOrAfter, NoRelease,
    ReleasePolicy,
};
pub use notify::{marker_present, Delivery, Notice, NoticeKind, NotificationGuard};
pub use obs::{run_span, DryRunAction, EventSink, SyncEvent, TracingSink};
pub use orchestrator::{Orchestrator, RunReport};
pub use pagination::PageCollector;
pub use ports::{Comment, IssueRef, Page, ProjectSource, TransportResult};
pub use reconcile::{reconcile, Reconciler, Reconciliation, SUMMARY_HEADING};
pub use telemetry::init_tracing;

/// boardsync version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
