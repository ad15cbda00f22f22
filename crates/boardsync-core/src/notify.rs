//! At-most-once notification comments.
//!
//! There is no delivery ledger. A notice counts as delivered when any
//! existing comment on the subject contains its marker text, so the comment
//! history itself is the record. Each notice type is told apart only by its
//! marker.
//!
//! Two overlapping runs can both see "not yet delivered" and both post.
//! Runs are expected to be serialized by whatever schedules them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SyncConfig;
use crate::domain::{IssueContent, NotificationError};
use crate::pagination::PageCollector;
use crate::ports::{Comment, ProjectSource};

/// Kinds of comment the engine posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Summary of fields the engine just updated. Not marker-gated; it is
    /// posted once per successful mutation batch.
    FieldSummary,
    DueDateChanged,
    QaReady,
}

impl NoticeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeKind::FieldSummary => "field_summary",
            NoticeKind::DueDateChanged => "due_date_changed",
            NoticeKind::QaReady => "qa_ready",
        }
    }
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comment waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    /// Node id of the issue the comment goes to.
    pub subject_id: String,
    /// Literal text whose presence means "already delivered".
    pub marker: String,
    /// Full comment body; always contains `marker`.
    pub body: String,
}

fn issue_link(content: &IssueContent) -> String {
    format!("[#{} {}]({})", content.number, content.title, content.url)
}

fn with_mentions(content: &IssueContent, text: String) -> String {
    let mentions = content.mentions();
    if mentions.is_empty() {
        text
    } else {
        format!("{mentions}\n\n{text}")
    }
}

impl Notice {
    /// Notice that the due date of `content` is now `due`.
    ///
    /// The marker embeds the date, so every new due date is a new event
    /// while re-runs with an unchanged date stay silent.
    pub fn due_date_changed(content: &IssueContent, due: NaiveDate, config: &SyncConfig) -> Self {
        let marker = config.due_date_marker(due);
        let body = with_mentions(
            content,
            format!("{marker}\n\nIssue: {}", issue_link(content)),
        );
        Notice {
            kind: NoticeKind::DueDateChanged,
            subject_id: content.id.clone(),
            marker,
            body,
        }
    }

    /// Notice that `content` has reached the QA status.
    pub fn qa_ready(content: &IssueContent, config: &SyncConfig) -> Self {
        let marker = config.qa_marker.clone();
        let body = with_mentions(
            content,
            format!(
                "{} moved to **{}**. {marker}",
                issue_link(content),
                config.qa_status
            ),
        );
        Notice {
            kind: NoticeKind::QaReady,
            subject_id: content.id.clone(),
            marker,
            body,
        }
    }
}

/// True when any comment body contains `marker`.
pub fn marker_present(comments: &[Comment], marker: &str) -> bool {
    comments.iter().any(|c| c.body.contains(marker))
}

/// What happened to a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    Posted,
    AlreadyDelivered,
    /// Would have been posted; suppressed by dry run.
    DryRun,
}

/// Gates notices on the subject's comment history.
pub struct NotificationGuard<'a, S: ProjectSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: ProjectSource + ?Sized> NotificationGuard<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// `Ok(true)` when no comment on `subject_id` contains `marker`.
    ///
    /// Reads the full, paginated history. A failed read is an error, never
    /// a `true`: when delivery cannot be ruled out the notice is skipped.
    pub async fn should_notify(
        &self,
        subject_id: &str,
        marker: &str,
    ) -> Result<bool, NotificationError> {
        let source = self.source;
        let comments = PageCollector::collect_all(move |cursor: Option<String>| async move {
            source.fetch_comment_page(subject_id, cursor.as_deref()).await
        })
        .await
        .map_err(|source| NotificationError::History {
            subject_id: subject_id.to_string(),
            source,
        })?;

        Ok(!marker_present(&comments, marker))
    }

    /// Post `notice` unless its marker is already in the history.
    ///
    /// The history is still read in dry run so the preview reports what a
    /// real run would do.
    pub async fn deliver(
        &self,
        notice: &Notice,
        dry_run: bool,
    ) -> Result<Delivery, NotificationError> {
        if !self.should_notify(&notice.subject_id, &notice.marker).await? {
            return Ok(Delivery::AlreadyDelivered);
        }
        if dry_run {
            return Ok(Delivery::DryRun);
        }
        self.source
            .post_comment(&notice.subject_id, &notice.body)
            .await
            .map_err(|source| NotificationError::Post {
                subject_id: notice.subject_id.clone(),
                source,
            })?;
        Ok(Delivery::Posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Assignee, ItemState};

    fn content(assignees: &[&str]) -> IssueContent {
        IssueContent {
            id: "I_42".to_string(),
            number: 42,
            title: "Checkout flow".to_string(),
            url: "https://github.com/acme/shop/issues/42".to_string(),
            state: ItemState::Open,
            assignees: assignees
                .iter()
                .map(|login| Assignee {
                    login: login.to_string(),
                    name: None,
                })
                .collect(),
        }
    }

    #[test]
    fn due_date_body_contains_marker_and_mentions() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let notice = Notice::due_date_changed(&content(&["alice"]), due, &SyncConfig::default());

        assert_eq!(notice.kind, NoticeKind::DueDateChanged);
        assert_eq!(notice.subject_id, "I_42");
        assert_eq!(notice.marker, "The Due Date is updated to: Mar 10, 2024.");
        assert!(notice.body.starts_with("@alice\n\n"));
        assert!(notice.body.contains(&notice.marker));
        assert!(notice
            .body
            .contains("[#42 Checkout flow](https://github.com/acme/shop/issues/42)"));
    }

    #[test]
    fn qa_body_without_assignees() {
        let notice = Notice::qa_ready(&content(&[]), &SyncConfig::default());
        assert_eq!(notice.kind, NoticeKind::QaReady);
        assert!(!notice.body.starts_with('@'));
        assert!(notice.body.contains("**QA Testing**"));
        assert!(notice
            .body
            .ends_with("Testing will be available in 15 minutes."));
    }

    #[test]
    fn marker_is_a_substring_match() {
        let comments = vec![
            Comment::new("unrelated"),
            Comment::new("@bob\n\nThe Due Date is updated to: Mar 10, 2024.\n\nIssue: x"),
        ];
        assert!(marker_present(
            &comments,
            "The Due Date is updated to: Mar 10, 2024."
        ));
        assert!(!marker_present(
            &comments,
            "The Due Date is updated to: Mar 11, 2024."
        ));
        assert!(!marker_present(&[], "anything"));
    }
}
