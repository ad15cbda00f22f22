//! Run sequencing: fetch, reconcile, apply, notify.
//!
//! All reads happen before the first write. If the item collection, the
//! catalog fetch or the summary-issue lookup fails, the run ends with a
//! [`SyncError`] and nothing has been changed remotely. After that point
//! failures are per item and the run carries on.
//!
//! Remote calls are awaited one at a time, in item order.

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::config::SyncConfig;
use crate::domain::{
    FetchError, Item, ItemState, MutationError, NotificationError, ProjectCatalog, Result,
    SyncError,
};
use crate::matcher::{DateRangeInName, ReleasePolicy};
use crate::notify::{Delivery, Notice, NoticeKind, NotificationGuard};
use crate::obs::{run_span, DryRunAction, EventSink, SyncEvent};
use crate::pagination::PageCollector;
use crate::ports::{IssueRef, ProjectSource};
use crate::reconcile::{Reconciler, Reconciliation};

/// Counters for one run, emitted as the final `run.finished` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub dry_run: bool,
    pub items_collected: usize,
    /// Items whose reconciliation produced at least one mutation.
    pub items_changed: usize,
    pub mutations_applied: usize,
    pub mutation_failures: usize,
    pub comments_posted: usize,
    pub already_notified: usize,
    pub notification_failures: usize,
    /// Writes suppressed by dry run (mutation batches and comments).
    pub dry_run_skipped: usize,
}

impl RunReport {
    pub fn new(run_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: run_id.into(),
            dry_run,
            ..Self::default()
        }
    }

    /// True when some per-item write or notification failed.
    pub fn has_failures(&self) -> bool {
        self.mutation_failures > 0 || self.notification_failures > 0
    }
}

/// Drives one sync run against a [`ProjectSource`].
pub struct Orchestrator<'a, S: ProjectSource + ?Sized, E: EventSink + ?Sized> {
    source: &'a S,
    sink: &'a E,
    config: SyncConfig,
    release_policy: Box<dyn ReleasePolicy>,
}

impl<'a, S: ProjectSource + ?Sized, E: EventSink + ?Sized> Orchestrator<'a, S, E> {
    pub fn new(source: &'a S, sink: &'a E, config: SyncConfig) -> Self {
        Self {
            source,
            sink,
            config,
            release_policy: Box::new(DateRangeInName),
        }
    }

    /// Replace the default [`DateRangeInName`] release policy.
    pub fn with_release_policy(mut self, policy: impl ReleasePolicy + 'static) -> Self {
        self.release_policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Execute a full run.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = run_span(&run_id);
        self.execute(run_id).instrument(span).await
    }

    async fn execute(&self, run_id: String) -> Result<RunReport> {
        let mut report = RunReport::new(run_id.clone(), self.config.dry_run);
        self.sink.emit(SyncEvent::RunStarted {
            run_id,
            dry_run: self.config.dry_run,
        });

        let items = self.collect_items().await.map_err(SyncError::Items)?;
        report.items_collected = items.len();
        self.sink
            .emit(SyncEvent::ItemsCollected { count: items.len() });

        if !items.is_empty() {
            let catalog = self
                .source
                .fetch_catalog()
                .await
                .map_err(SyncError::Catalog)?;
            let summary_issue = self.resolve_summary_issue().await?;

            self.reconcile_pass(&items, &catalog, summary_issue.as_ref(), &mut report)
                .await;
            self.due_date_pass(&items, &mut report).await;
            self.qa_pass(&items, &mut report).await;
        }

        self.sink.emit(SyncEvent::RunFinished {
            report: report.clone(),
        });
        Ok(report)
    }

    async fn collect_items(&self) -> std::result::Result<Vec<Item>, FetchError> {
        let source = self.source;
        let open_only = self.config.open_only;
        PageCollector::collect(
            move |cursor: Option<String>| async move {
                source.fetch_item_page(cursor.as_deref()).await
            },
            |item: &Item| !open_only || item.is_open(),
        )
        .await
    }

    async fn resolve_summary_issue(&self) -> Result<Option<IssueRef>> {
        let Some(target) = &self.config.summary_issue else {
            return Ok(None);
        };
        self.source
            .fetch_issue(&target.repo, target.number)
            .await
            .map(Some)
            .map_err(|source| SyncError::SummaryIssue {
                repo: target.repo.clone(),
                number: target.number,
                source,
            })
    }

    /// Where the change summary for `item` goes, and its body.
    fn summary_comment(
        &self,
        item: &Item,
        rec: &Reconciliation,
        summary_issue: Option<&IssueRef>,
    ) -> Option<(String, String)> {
        match (summary_issue, &item.content) {
            (Some(issue), _) => Some((
                issue.id.clone(),
                format!("Issue {}: {}", item.label(), rec.summary_comment()),
            )),
            (None, Some(content)) => Some((content.id.clone(), rec.summary_comment())),
            (None, None) => None,
        }
    }

    async fn reconcile_pass(
        &self,
        items: &[Item],
        catalog: &ProjectCatalog,
        summary_issue: Option<&IssueRef>,
        report: &mut RunReport,
    ) {
        let reconciler = Reconciler::new(
            catalog,
            &self.config.fields,
            self.release_policy.as_ref(),
        );
        for (field, expected) in reconciler.unresolved_fields() {
            self.sink.emit(SyncEvent::FieldUnresolved {
                field: field.to_string(),
                expected,
            });
        }

        for item in items {
            let rec = reconciler.reconcile(item);
            if rec.is_empty() {
                continue;
            }
            report.items_changed += 1;
            self.sink.emit(SyncEvent::ItemReconciled {
                item: item.label().to_string(),
                changes: rec.changes.clone(),
            });

            if self.config.dry_run {
                report.dry_run_skipped += 1;
                self.sink.emit(SyncEvent::DryRunSkipped {
                    target: item.label().to_string(),
                    action: DryRunAction::ApplyMutations {
                        count: rec.mutations.len(),
                    },
                });
                if let Some((subject, _)) = self.summary_comment(item, &rec, summary_issue) {
                    report.dry_run_skipped += 1;
                    self.sink.emit(SyncEvent::DryRunSkipped {
                        target: subject,
                        action: DryRunAction::PostComment {
                            kind: NoticeKind::FieldSummary,
                        },
                    });
                }
                continue;
            }

            let applied = match self
                .source
                .apply_mutations(&catalog.project_id, &item.id, &rec.mutations)
                .await
            {
                Ok(()) => rec.mutations.len(),
                Err(source) => {
                    let applied = source.applied.min(rec.mutations.len());
                    let err = MutationError {
                        item_id: item.id.clone(),
                        total: rec.mutations.len(),
                        source,
                    };
                    report.mutation_failures += 1;
                    self.sink.emit(SyncEvent::MutationFailed {
                        item: item.label().to_string(),
                        error: err.to_string(),
                    });
                    applied
                }
            };
            if applied == 0 {
                continue;
            }
            report.mutations_applied += applied;
            self.sink.emit(SyncEvent::MutationsApplied {
                item: item.label().to_string(),
                count: applied,
            });

            // Written fields already match on the next run, so a partial batch
            // is summarized now or never.
            let comment = self.summary_comment(item, &rec.prefix(applied), summary_issue);
            let Some((subject, body)) = comment else {
                continue;
            };
            match self.source.post_comment(&subject, &body).await {
                Ok(()) => {
                    report.comments_posted += 1;
                    self.sink.emit(SyncEvent::CommentPosted {
                        subject,
                        kind: NoticeKind::FieldSummary,
                    });
                }
                Err(source) => {
                    let err = NotificationError::Post {
                        subject_id: subject.clone(),
                        source,
                    };
                    report.notification_failures += 1;
                    self.sink.emit(SyncEvent::NotificationFailed {
                        subject,
                        kind: NoticeKind::FieldSummary,
                        error: err.to_string(),
                    });
                }
            }
        }
    }

    async fn due_date_pass(&self, items: &[Item], report: &mut RunReport) {
        let guard = NotificationGuard::new(self.source);
        for item in items {
            let Some(content) = &item.content else {
                continue;
            };
            if content.state == ItemState::Closed {
                continue;
            }
            let Some(due) = item.date(&self.config.fields.due_date) else {
                continue;
            };
            let notice = Notice::due_date_changed(content, due, &self.config);
            self.deliver(&guard, &notice, report).await;
        }
    }

    async fn qa_pass(&self, items: &[Item], report: &mut RunReport) {
        let guard = NotificationGuard::new(self.source);
        for item in items {
            let Some(content) = &item.content else {
                continue;
            };
            if content.state == ItemState::Closed {
                continue;
            }
            if item.option_name(&self.config.fields.status) != Some(self.config.qa_status.as_str())
            {
                continue;
            }
            let notice = Notice::qa_ready(content, &self.config);
            self.deliver(&guard, &notice, report).await;
        }
    }

    async fn deliver(
        &self,
        guard: &NotificationGuard<'_, S>,
        notice: &Notice,
        report: &mut RunReport,
    ) {
        let subject = notice.subject_id.clone();
        let kind = notice.kind;
        match guard.deliver(notice, self.config.dry_run).await {
            Ok(Delivery::Posted) => {
                report.comments_posted += 1;
                self.sink.emit(SyncEvent::CommentPosted { subject, kind });
            }
            Ok(Delivery::AlreadyDelivered) => {
                report.already_notified += 1;
                self.sink.emit(SyncEvent::AlreadyNotified { subject, kind });
            }
            Ok(Delivery::DryRun) => {
                report.dry_run_skipped += 1;
                self.sink.emit(SyncEvent::DryRunSkipped {
                    target: subject,
                    action: DryRunAction::PostComment { kind },
                });
            }
            Err(err) => {
                report.notification_failures += 1;
                self.sink.emit(SyncEvent::NotificationFailed {
                    subject,
                    kind,
                    error: err.to_string(),
                });
            }
        }
    }
}
