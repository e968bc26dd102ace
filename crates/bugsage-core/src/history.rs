//! Partial updates, typed change detection and the history audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bug::Bug;
use crate::enums::{Priority, Status, TrackedField};
use crate::validation::ValidationError;

/// One immutable audit record: a single field's before/after on one update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugHistoryEntry {
    pub history_id: i64,

    pub bug_id: i64,

    pub changed_by: i64,

    /// Display name of `changed_by`, filled in by read projections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by_name: Option<String>,

    pub field_changed: TrackedField,

    pub old_value: Option<String>,

    pub new_value: Option<String>,

    pub changed_at: DateTime<Utc>,
}

/// A detected difference for one field, before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Typed partial update restricted to the mutable field set.
///
/// `None` means "not provided". For the assignee, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assignee_id: Option<Option<i64>>,
}

impl BugPatch {
    /// Builds a patch from an untyped request body.
    ///
    /// Keys outside the tracked set are ignored. Text values are trimmed.
    /// `assignee_id` accepts a number or a numeric string. An explicit
    /// `null` (or `""`) means "clear the assignee", not "leave unchanged".
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut patch = Self::default();
        for (key, value) in map {
            let Some(field) = TrackedField::parse(key) else {
                continue;
            };
            match field {
                TrackedField::Title => patch.title = Some(text_value(field, value)?),
                TrackedField::Description => {
                    patch.description = Some(text_value(field, value)?);
                }
                TrackedField::Priority => {
                    let raw = text_value(field, value)?;
                    patch.priority = Some(
                        Priority::parse(&raw).ok_or(ValidationError::InvalidPriority(raw))?,
                    );
                }
                TrackedField::Status => {
                    let raw = text_value(field, value)?;
                    patch.status =
                        Some(Status::parse(&raw).ok_or(ValidationError::InvalidStatus(raw))?);
                }
                TrackedField::AssigneeId => patch.assignee_id = Some(assignee_value(value)?),
            }
        }
        Ok(patch)
    }

    /// Returns `true` if no recognized field was provided.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee_id.is_none()
    }

    /// The fields present in this patch, in canonical order.
    pub fn provided_fields(&self) -> Vec<TrackedField> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push(TrackedField::Title);
        }
        if self.description.is_some() {
            fields.push(TrackedField::Description);
        }
        if self.priority.is_some() {
            fields.push(TrackedField::Priority);
        }
        if self.status.is_some() {
            fields.push(TrackedField::Status);
        }
        if self.assignee_id.is_some() {
            fields.push(TrackedField::AssigneeId);
        }
        fields
    }

    /// Compares each provided field against `current` and returns one
    /// [`FieldChange`] per field whose value actually differs.
    ///
    /// Text compares by string equality, enums by variant, the assignee by
    /// nullable integer equality.
    pub fn diff(&self, current: &Bug) -> Vec<FieldChange> {
        let mut changes = Vec::new();

        if let Some(ref title) = self.title {
            if *title != current.title {
                changes.push(FieldChange {
                    field: TrackedField::Title,
                    old_value: Some(current.title.clone()),
                    new_value: Some(title.clone()),
                });
            }
        }
        if let Some(ref description) = self.description {
            if *description != current.description {
                changes.push(FieldChange {
                    field: TrackedField::Description,
                    old_value: Some(current.description.clone()),
                    new_value: Some(description.clone()),
                });
            }
        }
        if let Some(priority) = self.priority {
            if priority != current.priority {
                changes.push(FieldChange {
                    field: TrackedField::Priority,
                    old_value: Some(current.priority.to_string()),
                    new_value: Some(priority.to_string()),
                });
            }
        }
        if let Some(status) = self.status {
            if status != current.status {
                changes.push(FieldChange {
                    field: TrackedField::Status,
                    old_value: Some(current.status.to_string()),
                    new_value: Some(status.to_string()),
                });
            }
        }
        if let Some(assignee_id) = self.assignee_id {
            if assignee_id != current.assignee_id {
                changes.push(FieldChange {
                    field: TrackedField::AssigneeId,
                    old_value: current.assignee_id.map(|id| id.to_string()),
                    new_value: assignee_id.map(|id| id.to_string()),
                });
            }
        }

        changes
    }
}

fn text_value(field: TrackedField, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        _ => Err(ValidationError::WrongType {
            field: field.as_str(),
            expected: "a string",
        }),
    }
}

fn assignee_value(value: &Value) -> Result<Option<i64>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidAssignee(n.to_string())),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ValidationError::InvalidAssignee(s.clone())),
        _ => Err(ValidationError::WrongType {
            field: "assignee_id",
            expected: "a user id or null",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bug::BugBuilder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let patch = BugPatch::from_json_map(&map(json!({"reporter_id": 4, "bug_id": 1}))).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn parses_all_tracked_fields() {
        let patch = BugPatch::from_json_map(&map(json!({
            "title": "  New title ",
            "description": "d",
            "priority": "Critical",
            "status": "In Progress",
            "assignee_id": "7",
        })))
        .unwrap();
        assert_eq!(
            patch,
            BugPatch {
                title: Some("New title".into()),
                description: Some("d".into()),
                priority: Some(Priority::Critical),
                status: Some(Status::InProgress),
                assignee_id: Some(Some(7)),
            }
        );
    }

    #[test]
    fn null_assignee_clears() {
        let patch = BugPatch::from_json_map(&map(json!({"assignee_id": null}))).unwrap();
        assert_eq!(patch.assignee_id, Some(None));
        assert!(!patch.is_empty());
    }

    #[test]
    fn bad_enum_values_are_rejected() {
        let err = BugPatch::from_json_map(&map(json!({"status": "Done"}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidStatus(ref s) if s == "Done"));
        let err = BugPatch::from_json_map(&map(json!({"priority": 3}))).unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { field: "priority", .. }));
        let err = BugPatch::from_json_map(&map(json!({"assignee_id": "bob"}))).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidAssignee(_)));
    }

    #[test]
    fn diff_skips_unchanged_fields() {
        let bug = BugBuilder::new("Same", 1)
            .description("desc")
            .priority(Priority::High)
            .build();
        let patch = BugPatch {
            title: Some("Same".into()),
            priority: Some(Priority::Low),
            ..Default::default()
        };
        let changes = patch.diff(&bug);
        assert_eq!(
            changes,
            vec![FieldChange {
                field: TrackedField::Priority,
                old_value: Some("High".into()),
                new_value: Some("Low".into()),
            }]
        );
    }

    #[test]
    fn diff_records_null_to_assignee() {
        let bug = BugBuilder::new("t", 1).build();
        let patch = BugPatch {
            status: Some(Status::Resolved),
            assignee_id: Some(Some(7)),
            ..Default::default()
        };
        let changes = patch.diff(&bug);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].field, TrackedField::Status);
        assert_eq!(changes[0].old_value.as_deref(), Some("New"));
        assert_eq!(changes[0].new_value.as_deref(), Some("Resolved"));
        assert_eq!(changes[1].field, TrackedField::AssigneeId);
        assert_eq!(changes[1].old_value, None);
        assert_eq!(changes[1].new_value.as_deref(), Some("7"));
    }

    #[test]
    fn provided_fields_in_canonical_order() {
        let patch = BugPatch {
            assignee_id: Some(None),
            title: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            patch.provided_fields(),
            vec![TrackedField::Title, TrackedField::AssigneeId]
        );
    }
}
