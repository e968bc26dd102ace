//! Comment type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a bug. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: i64,

    pub bug_id: i64,

    pub user_id: i64,

    /// Author display name, filled in by read projections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    pub comment: String,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_serde_roundtrip() {
        let c = Comment {
            comment_id: 42,
            bug_id: 3,
            user_id: 1,
            user_name: None,
            comment: "Reproduced on staging".into(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&c).unwrap();
        assert!(json.get("user_name").is_none());
        let back: Comment = serde_json::from_value(json).unwrap();
        assert_eq!(back.comment_id, 42);
        assert_eq!(back.comment, "Reproduced on staging");
    }
}
