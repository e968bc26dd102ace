//! The [`BugStore`] trait -- the public API for bug persistence.
//!
//! The lifecycle engine depends on this trait rather than on [`SqliteStore`]
//! so that alternative backends (mocks, failing stores in tests) can be
//! substituted.
//!
//! [`SqliteStore`]: crate::SqliteStore

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

/// Persistence operations for bugs and their reference targets.
pub trait BugStore: Send + Sync {
    // -- Bugs ----------------------------------------------------------------

    /// Inserts a bug (its `bug_id` is ignored) and returns the new id.
    fn insert_bug(&self, bug: &Bug) -> Result<i64>;

    /// Retrieves a bug by id.
    fn get_bug(&self, bug_id: i64) -> Result<Bug>;

    /// Bugs whose title or description contains `needle` (ASCII
    /// case-insensitive, `%`/`_` matched literally), newest first.
    fn find_duplicates(&self, needle: &str, limit: u32) -> Result<Vec<DuplicateCandidate>>;

    /// Writes every provided field of `patch` plus `updated_at`, and one
    /// history row per entry in `changes`, in a single transaction.
    fn apply_update(
        &self,
        bug_id: i64,
        patch: &BugPatch,
        changes: &[FieldChange],
        changed_by: i64,
    ) -> Result<()>;

    /// History of a bug, oldest first, with the author's display name.
    fn get_history(&self, bug_id: i64) -> Result<Vec<BugHistoryEntry>>;

    // -- Comments & attachments ---------------------------------------------

    /// Appends a comment and returns it.
    fn add_comment(&self, bug_id: i64, user_id: i64, text: &str) -> Result<Comment>;

    /// Comments on a bug, oldest first, with the author's display name.
    fn get_comments(&self, bug_id: i64) -> Result<Vec<Comment>>;

    /// Records an attachment whose file has already been stored.
    fn add_attachment(&self, attachment: &NewAttachment) -> Result<Attachment>;

    /// Attachments of a bug, oldest first.
    fn get_attachments(&self, bug_id: i64) -> Result<Vec<Attachment>>;

    // -- Read projections -----------------------------------------------------

    /// A bug joined with project, reporter and assignee names.
    fn get_bug_summary(&self, bug_id: i64) -> Result<BugSummary>;

    /// One page of bugs matching `query`, newest first.
    fn list_bugs(&self, query: &BugQuery) -> Result<Vec<BugSummary>>;

    /// Number of bugs matching `query`, ignoring its limit and offset.
    fn count_bugs(&self, query: &BugQuery) -> Result<u64>;

    /// Substring search over title and description, newest first.
    fn search_bugs(&self, text: &str, limit: u32) -> Result<Vec<BugSummary>>;

    // -- Aggregates -----------------------------------------------------------

    /// Bugs created at or after `since`.
    fn count_created_since(&self, since: DateTime<Utc>) -> Result<u64>;

    /// Sparse counts per status (statuses with no bugs are absent).
    fn status_counts(&self) -> Result<Vec<(Status, u64)>>;

    /// Sparse counts per priority.
    fn priority_counts(&self) -> Result<Vec<(Priority, u64)>>;

    /// Creation counts per calendar day (`YYYY-MM-DD`) since `since`.
    fn daily_created_since(&self, since: DateTime<Utc>) -> Result<Vec<(String, u64)>>;

    /// Average whole days from creation to last update, per priority, over
    /// Resolved and Closed bugs.
    fn resolution_averages(&self) -> Result<Vec<(Priority, f64)>>;

    // -- Users & projects -----------------------------------------------------

    /// Creates a user; a taken email yields [`StorageError::Conflict`].
    ///
    /// [`StorageError::Conflict`]: crate::StorageError::Conflict
    fn create_user(&self, registration: &Registration, password_hash: &str) -> Result<User>;

    fn get_user(&self, user_id: i64) -> Result<User>;

    /// The user with this email together with the stored credential hash.
    fn get_user_credentials(&self, email: &str) -> Result<(User, String)>;

    /// All users ordered by name.
    fn list_users(&self) -> Result<Vec<User>>;

    fn create_project(&self, name: &str, description: &str) -> Result<Project>;

    fn get_project(&self, project_id: i64) -> Result<Project>;

    /// All projects ordered by name.
    fn list_projects(&self) -> Result<Vec<Project>>;
}
