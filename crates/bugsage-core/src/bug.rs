//! Bug struct -- the central domain model for BugSage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::comment::Comment;
use crate::enums::{Priority, Status};
use crate::history::BugHistoryEntry;

/// A tracked defect.
///
/// `bug_id` is assigned by the store on insert; a freshly built `Bug` carries
/// `0` until it has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    #[serde(default)]
    pub bug_id: i64,

    pub title: String,

    pub description: String,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub project_id: Option<i64>,

    pub reporter_id: i64,

    #[serde(default)]
    pub assignee_id: Option<i64>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Default for Bug {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            bug_id: 0,
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::default(),
            project_id: None,
            reporter_id: 0,
            assignee_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Builder for [`Bug`], mostly used by tests and seeding code.
pub struct BugBuilder {
    bug: Bug,
}

impl BugBuilder {
    /// Starts a new bug with the given title and reporter.
    pub fn new(title: impl Into<String>, reporter_id: i64) -> Self {
        Self {
            bug: Bug {
                title: title.into(),
                reporter_id,
                ..Bug::default()
            },
        }
    }

    pub fn bug_id(mut self, id: i64) -> Self {
        self.bug.bug_id = id;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.bug.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.bug.priority = priority;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.bug.status = status;
        self
    }

    pub fn project_id(mut self, project_id: i64) -> Self {
        self.bug.project_id = Some(project_id);
        self
    }

    pub fn assignee_id(mut self, assignee_id: i64) -> Self {
        self.bug.assignee_id = Some(assignee_id);
        self
    }

    pub fn created_at(mut self, t: DateTime<Utc>) -> Self {
        self.bug.created_at = t;
        self
    }

    pub fn updated_at(mut self, t: DateTime<Utc>) -> Self {
        self.bug.updated_at = t;
        self
    }

    pub fn build(self) -> Bug {
        self.bug
    }
}

/// Input for bug creation as submitted by a caller.
///
/// Strings are raw (untrimmed); the lifecycle engine normalises them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBug {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Absent means [`Priority::Medium`].
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub assignee_id: Option<i64>,
    #[serde(default)]
    pub force_create: bool,
}

/// A bug joined with the display names of its references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugSummary {
    #[serde(flatten)]
    pub bug: Bug,

    pub project_name: Option<String>,

    pub reporter_name: Option<String>,

    pub assignee_name: Option<String>,
}

/// Everything shown on a bug's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugDetail {
    #[serde(flatten)]
    pub summary: BugSummary,

    pub comments: Vec<Comment>,

    pub attachments: Vec<Attachment>,

    pub history: Vec<BugHistoryEntry>,
}

/// A possible duplicate returned instead of creating a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    pub bug_id: i64,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let bug = BugBuilder::new("Login fails", 3)
            .description("Cannot log in")
            .priority(Priority::High)
            .assignee_id(7)
            .build();
        assert_eq!(bug.title, "Login fails");
        assert_eq!(bug.reporter_id, 3);
        assert_eq!(bug.status, Status::New);
        assert_eq!(bug.priority, Priority::High);
        assert_eq!(bug.assignee_id, Some(7));
        assert_eq!(bug.project_id, None);
    }

    #[test]
    fn summary_flattens_bug_fields() {
        let summary = BugSummary {
            bug: BugBuilder::new("Crash", 1).bug_id(9).build(),
            project_name: Some("Web".into()),
            reporter_name: Some("Ana".into()),
            assignee_name: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["bug_id"], 9);
        assert_eq!(json["title"], "Crash");
        assert_eq!(json["status"], "New");
        assert_eq!(json["project_name"], "Web");
        assert!(json["assignee_name"].is_null());
    }

    #[test]
    fn new_bug_defaults_missing_fields() {
        let input: NewBug = serde_json::from_str(r#"{"title":"t","description":"d"}"#).unwrap();
        assert_eq!(input.priority, None);
        assert!(!input.force_create);
        assert_eq!(input.assignee_id, None);
    }
}
