//! Storage backend for BugSage.
//!
//! Provides the [`BugStore`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::BugStore;

// ---------------------------------------------------------------------------
// BugStore trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};

use bugsage_core::attachment::{Attachment, NewAttachment};
use bugsage_core::bug::{Bug, BugSummary, DuplicateCandidate};
use bugsage_core::comment::Comment;
use bugsage_core::enums::{Priority, Status};
use bugsage_core::filter::BugQuery;
use bugsage_core::history::{BugHistoryEntry, BugPatch, FieldChange};
use bugsage_core::user::{Project, User};
use bugsage_core::validation::Registration;

use crate::error::Result;

impl BugStore for SqliteStore {
    fn insert_bug(&self, bug: &Bug) -> Result<i64> {
        self.insert_bug_impl(bug)
    }

    fn get_bug(&self, bug_id: i64) -> Result<Bug> {
        self.get_bug_impl(bug_id)
    }

    fn find_duplicates(&self, needle: &str, limit: u32) -> Result<Vec<DuplicateCandidate>> {
        self.find_duplicates_impl(needle, limit)
    }

    fn apply_update(
        &self,
        bug_id: i64,
        patch: &BugPatch,
        changes: &[FieldChange],
        changed_by: i64,
    ) -> Result<()> {
        self.apply_update_impl(bug_id, patch, changes, changed_by)
    }

    fn get_history(&self, bug_id: i64) -> Result<Vec<BugHistoryEntry>> {
        self.get_history_impl(bug_id)
    }

    fn add_comment(&self, bug_id: i64, user_id: i64, text: &str) -> Result<Comment> {
        self.add_comment_impl(bug_id, user_id, text)
    }

    fn get_comments(&self, bug_id: i64) -> Result<Vec<Comment>> {
        self.get_comments_impl(bug_id)
    }

    fn add_attachment(&self, attachment: &NewAttachment) -> Result<Attachment> {
        self.add_attachment_impl(attachment)
    }

    fn get_attachments(&self, bug_id: i64) -> Result<Vec<Attachment>> {
        self.get_attachments_impl(bug_id)
    }

    fn get_bug_summary(&self, bug_id: i64) -> Result<BugSummary> {
        self.get_bug_summary_impl(bug_id)
    }

    fn list_bugs(&self, query: &BugQuery) -> Result<Vec<BugSummary>> {
        self.list_bugs_impl(query)
    }

    fn count_bugs(&self, query: &BugQuery) -> Result<u64> {
        self.count_bugs_impl(query)
    }

    fn search_bugs(&self, text: &str, limit: u32) -> Result<Vec<BugSummary>> {
        self.search_bugs_impl(text, limit)
    }

    fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64> {
        self.count_created_since_impl(since)
    }

    fn status_counts(&self) -> Result<Vec<(Status, u64)>> {
        self.status_counts_impl()
    }

    fn priority_counts(&self) -> Result<Vec<(Priority, u64)>> {
        self.priority_counts_impl()
    }

    fn daily_created_since(&self, since: DateTime<Utc>) -> Result<Vec<(String, u64)>> {
        self.daily_created_since_impl(since)
    }

    fn resolution_averages(&self) -> Result<Vec<(Priority, f64)>> {
        self.resolution_averages_impl()
    }

    fn create_user(&self, registration: &Registration, password_hash: &str) -> Result<User> {
        self.create_user_impl(registration, password_hash)
    }

    fn get_user(&self, user_id: i64) -> Result<User> {
        self.get_user_impl(user_id)
    }

    fn get_user_credentials(&self, email: &str) -> Result<(User, String)> {
        self.get_user_credentials_impl(email)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.list_users_impl()
    }

    fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        self.create_project_impl(name, description)
    }

    fn get_project(&self, project_id: i64) -> Result<Project> {
        self.get_project_impl(project_id)
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.list_projects_impl()
    }
}
