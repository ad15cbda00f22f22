//! Structured observability hooks for sync runs.
//!
//! The orchestrator reports everything it does as a [`SyncEvent`] through an
//! injected [`EventSink`], so the engine itself never decides where logs go.
//!
//! This module provides:
//! - Run-scoped tracing spans via [`run_span`]
//! - `TracingSink`, which turns events into `tracing` events
//!
//! Events are emitted at `info!` level unless they describe a failure.
//! For JSON output, run the binary with `--json`.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{FieldChange, FieldKind};
use crate::notify::NoticeKind;
use crate::orchestrator::RunReport;

/// Span tagging every event of a run with its id.
///
/// ```ignore
/// orchestrator.execute(run_id).instrument(run_span(&run_id)).await
/// ```
pub fn run_span(run_id: &str) -> tracing::Span {
    tracing::info_span!("boardsync.run", run_id = %run_id)
}

/// A mutating action suppressed by dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DryRunAction {
    ApplyMutations { count: usize },
    PostComment { kind: NoticeKind },
}

/// Everything a run reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    RunStarted {
        run_id: String,
        dry_run: bool,
    },
    ItemsCollected {
        count: usize,
    },
    FieldUnresolved {
        field: String,
        expected: FieldKind,
    },
    ItemReconciled {
        item: String,
        changes: Vec<FieldChange>,
    },
    MutationsApplied {
        item: String,
        count: usize,
    },
    MutationFailed {
        item: String,
        error: String,
    },
    CommentPosted {
        subject: String,
        kind: NoticeKind,
    },
    AlreadyNotified {
        subject: String,
        kind: NoticeKind,
    },
    NotificationFailed {
        subject: String,
        kind: NoticeKind,
        error: String,
    },
    DryRunSkipped {
        target: String,
        action: DryRunAction,
    },
    RunFinished {
        report: RunReport,
    },
}

impl SyncEvent {
    /// Dotted event name, e.g. `item.reconciled`.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::RunStarted { .. } => "run.started",
            SyncEvent::ItemsCollected { .. } => "items.collected",
            SyncEvent::FieldUnresolved { .. } => "field.unresolved",
            SyncEvent::ItemReconciled { .. } => "item.reconciled",
            SyncEvent::MutationsApplied { .. } => "mutations.applied",
            SyncEvent::MutationFailed { .. } => "mutations.failed",
            SyncEvent::CommentPosted { .. } => "comment.posted",
            SyncEvent::AlreadyNotified { .. } => "notice.already_delivered",
            SyncEvent::NotificationFailed { .. } => "notice.failed",
            SyncEvent::DryRunSkipped { .. } => "dry_run.skipped",
            SyncEvent::RunFinished { .. } => "run.finished",
        }
    }
}

/// Destination for run events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Sends every event to the global `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: SyncEvent) {
        let name = event.name();
        match &event {
            SyncEvent::RunStarted { run_id, dry_run } => {
                info!(event = name, run_id = %run_id, dry_run = dry_run);
            }
            SyncEvent::ItemsCollected { count } => {
                info!(event = name, count = count);
            }
            SyncEvent::FieldUnresolved { field, expected } => {
                warn!(event = name, field = %field, expected = %expected);
            }
            SyncEvent::ItemReconciled { item, changes } => {
                let summary = changes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                if changes.is_empty() {
                    debug!(event = name, item = %item, "no changes");
                } else {
                    info!(event = name, item = %item, changes = %summary);
                }
            }
            SyncEvent::MutationsApplied { item, count } => {
                info!(event = name, item = %item, count = count);
            }
            SyncEvent::MutationFailed { item, error } => {
                warn!(event = name, item = %item, error = %error);
            }
            SyncEvent::CommentPosted { subject, kind } => {
                info!(event = name, subject = %subject, kind = %kind);
            }
            SyncEvent::AlreadyNotified { subject, kind } => {
                debug!(event = name, subject = %subject, kind = %kind);
            }
            SyncEvent::NotificationFailed {
                subject,
                kind,
                error,
            } => {
                warn!(event = name, subject = %subject, kind = %kind, error = %error);
            }
            SyncEvent::DryRunSkipped { target, action } => match action {
                DryRunAction::ApplyMutations { count } => {
                    info!(event = name, target = %target, action = "apply_mutations", count = count);
                }
                DryRunAction::PostComment { kind } => {
                    info!(event = name, target = %target, action = "post_comment", kind = %kind);
                }
            },
            SyncEvent::RunFinished { report } => {
                info!(
                    event = name,
                    run_id = %report.run_id,
                    dry_run = report.dry_run,
                    items = report.items_collected,
                    items_changed = report.items_changed,
                    mutations_applied = report.mutations_applied,
                    mutation_failures = report.mutation_failures,
                    comments_posted = report.comments_posted,
                    already_notified = report.already_notified,
                    notification_failures = report.notification_failures,
                    dry_run_skipped = report.dry_run_skipped,
                );
            }
        }
    }
}
