//! Structured tracing output of sync runs.
//!
//! `TracingSink` forwards every run event to `tracing` with an `event`
//! field carrying the dotted event name.

use boardsync_core::fakes::MemoryProject;
use boardsync_core::{
    run_span, DryRunAction, EventSink, FieldChange, FieldDefinition, FieldValue, Item, NoticeKind,
    Orchestrator, ProjectCatalog, RunReport, SingleSelectOption, SyncConfig, SyncEvent,
    TracingSink,
};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_item_reconciled_logs_changes() {
    TracingSink.emit(SyncEvent::ItemReconciled {
        item: "https://github.com/acme/app/issues/1".to_string(),
        changes: vec![FieldChange::new("Size", "M"), FieldChange::new("Week", "Week 10")],
    });

    assert!(logs_contain("item.reconciled"));
    assert!(logs_contain("Size: M, Week: Week 10"));
}

#[traced_test]
#[test]
fn test_failures_log_at_warn() {
    TracingSink.emit(SyncEvent::MutationFailed {
        item: "PVTI_9".to_string(),
        error: "mutation for item PVTI_9 failed".to_string(),
    });

    assert!(logs_contain("WARN"));
    assert!(logs_contain("mutations.failed"));
}

#[traced_test]
#[test]
fn test_dry_run_skip_names_the_action() {
    TracingSink.emit(SyncEvent::DryRunSkipped {
        target: "I_3".to_string(),
        action: DryRunAction::PostComment {
            kind: NoticeKind::DueDateChanged,
        },
    });

    assert!(logs_contain("dry_run.skipped"));
    assert!(logs_contain("due_date_changed"));
}

#[traced_test]
#[test]
fn test_run_finished_logs_counters() {
    let mut report = RunReport::new("run-obs-1", false);
    report.mutations_applied = 4;
    TracingSink.emit(SyncEvent::RunFinished { report });

    assert!(logs_contain("run.finished"));
    assert!(logs_contain("mutations_applied=4"));
}

#[traced_test]
#[test]
fn test_run_span_tags_events() {
    let _entered = run_span("run-span-1").entered();
    TracingSink.emit(SyncEvent::ItemsCollected { count: 2 });

    assert!(logs_contain("run_id=run-span-1"));
}

#[tokio::test]
#[traced_test]
async fn test_orchestrated_run_is_traced() {
    let catalog = ProjectCatalog::new("PVT_1").with_field(FieldDefinition::single_select(
        "F_size",
        "Size",
        vec![SingleSelectOption::new("size_m", "M")],
    ));
    let project = MemoryProject::new(catalog).with_items([Item::new("PVTI_1").with_field(
        "Estimate",
        FieldValue::SingleSelect {
            option_id: "est_m".to_string(),
            name: "M".to_string(),
        },
    )]);
    let config = SyncConfig::new().with_open_only(false);

    let report = Orchestrator::new(&project, &TracingSink, config)
        .run()
        .await
        .unwrap();

    assert!(logs_contain("run.started"));
    assert!(logs_contain("field.unresolved"));
    assert!(logs_contain("mutations.applied"));
    assert!(logs_contain(&format!("run_id={}", report.run_id)));
}
