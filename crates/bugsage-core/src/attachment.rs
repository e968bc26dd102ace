//! Attachment metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file stored alongside a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: i64,
    pub bug_id: i64,
    /// Original file name as uploaded.
    pub filename: String,
    /// Path of the stored copy, normally under the uploads directory.
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Metadata for a file that has already been copied into storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    pub bug_id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: i64,
}

/// Lower-cased extension of `filename`, if it has one.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
