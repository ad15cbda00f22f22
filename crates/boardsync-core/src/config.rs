//! Run configuration.
//!
//! A plain value object handed to the [`Orchestrator`](crate::Orchestrator).
//! Nothing in the engine reads the environment; the binary builds this from
//! its command line.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display names of the board fields the engine reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNames {
    pub due_date: String,
    pub release: String,
    pub week: String,
    pub estimate: String,
    pub size: String,
    pub status: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        FieldNames {
            due_date: "Due Date".to_string(),
            release: "Release".to_string(),
            week: "Week".to_string(),
            estimate: "Estimate".to_string(),
            size: "Size".to_string(),
            status: "Status".to_string(),
        }
    }
}

/// Issue that collects field-update summaries instead of the item's own issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryIssue {
    /// Repository name under the configured owner.
    pub repo: String,
    pub number: u64,
}

/// Configuration for a single sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Compute and log everything, write nothing.
    pub dry_run: bool,
    /// Only consider items whose issue is OPEN.
    pub open_only: bool,
    pub fields: FieldNames,
    /// Status option name that triggers the QA notice.
    pub qa_status: String,
    /// Marker text of the QA notice.
    pub qa_marker: String,
    /// Prefix of the due-date notice marker; the formatted date follows it.
    pub due_date_marker_prefix: String,
    pub summary_issue: Option<SummaryIssue>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            dry_run: false,
            open_only: true,
            fields: FieldNames::default(),
            qa_status: "QA Testing".to_string(),
            qa_marker: "Testing will be available in 15 minutes.".to_string(),
            due_date_marker_prefix: "The Due Date is updated to:".to_string(),
            summary_issue: None,
        }
    }
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_open_only(mut self, open_only: bool) -> Self {
        self.open_only = open_only;
        self
    }

    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_qa_status(mut self, status: impl Into<String>) -> Self {
        self.qa_status = status.into();
        self
    }

    pub fn with_qa_marker(mut self, marker: impl Into<String>) -> Self {
        self.qa_marker = marker.into();
        self
    }

    pub fn with_due_date_marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.due_date_marker_prefix = prefix.into();
        self
    }

    pub fn with_summary_issue(mut self, repo: impl Into<String>, number: u64) -> Self {
        self.summary_issue = Some(SummaryIssue {
            repo: repo.into(),
            number,
        });
        self
    }

    /// Marker for "due date is now `date`", e.g.
    /// `The Due Date is updated to: Mar 10, 2024.`
    pub fn due_date_marker(&self, date: NaiveDate) -> String {
        format!(
            "{} {}.",
            self.due_date_marker_prefix,
            date.format("%b %d, %Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert!(!config.dry_run);
        assert!(config.open_only);
        assert_eq!(config.fields.due_date, "Due Date");
        assert_eq!(config.qa_status, "QA Testing");
        assert!(config.summary_issue.is_none());
    }

    #[test]
    fn test_due_date_marker_format() {
        let config = SyncConfig::default();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(
            config.due_date_marker(date),
            "The Due Date is updated to: Mar 10, 2024."
        );

        let single_digit = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            config.due_date_marker(single_digit),
            "The Due Date is updated to: Jan 05, 2024."
        );
    }

    #[test]
    fn test_builder_setters() {
        let config = SyncConfig::new()
            .with_dry_run(true)
            .with_open_only(false)
            .with_summary_issue("ops", 42)
            .with_qa_status("Ready for QA");
        assert!(config.dry_run);
        assert!(!config.open_only);
        assert_eq!(
            config.summary_issue,
            Some(SummaryIssue {
                repo: "ops".to_string(),
                number: 42
            })
        );
        assert_eq!(config.qa_status, "Ready for QA");
    }
}
