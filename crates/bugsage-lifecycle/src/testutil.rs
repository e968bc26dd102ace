//! Shared fixtures for the engine's unit tests.

use chrono::{DateTime, Utc};

use bugsage_core::attachment::{Attachment, NewAttachment};
use bugsage_core::bug::{Bug, BugBuilder, BugSummary, DuplicateCandidate, NewBug};
use bugsage_core::comment::Comment;
use bugsage_core::enums::{Priority, Role, Status};
use bugsage_core::filter::BugQuery;
use bugsage_core::history::{BugHistoryEntry, BugPatch, FieldChange};
use bugsage_core::user::{CallerContext, Project, User};
use bugsage_core::validation::Registration;
use bugsage_storage::error::Result;
use bugsage_storage::{BugStore, SqliteStore, StorageError};

use crate::engine::LifecycleEngine;
use crate::settings::EngineSettings;

/// Placeholder PHC string; seeded users are never logged in.
const FIXTURE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA";

/// An in-memory engine with two registered users.
pub(crate) struct TestEnv {
    pub engine: LifecycleEngine<SqliteStore>,
    pub caller: CallerContext,
    pub other: User,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        let store = SqliteStore::open_in_memory().unwrap();
        let caller = store
            .create_user(&registration("Caller", Role::Developer), FIXTURE_HASH)
            .unwrap();
        let other = store
            .create_user(&registration("Other", Role::Tester), FIXTURE_HASH)
            .unwrap();
        Self {
            engine: LifecycleEngine::new(store, settings),
            caller: CallerContext::from(&caller),
            other,
        }
    }

    /// Inserts a bug reported by the caller, bypassing duplicate detection.
    pub fn seed_bug(&self, title: &str, description: &str) -> i64 {
        self.seed_bug_at(title, description, Utc::now())
    }

    pub fn seed_bug_at(&self, title: &str, description: &str, at: DateTime<Utc>) -> i64 {
        let bug = BugBuilder::new(title, self.caller.user_id)
            .description(description)
            .created_at(at)
            .updated_at(at)
            .build();
        self.engine.store().insert_bug(&bug).unwrap()
    }

    pub fn bug_count(&self) -> u64 {
        self.engine.store().count_bugs(&BugQuery::default()).unwrap()
    }
}

fn registration(name: &str, role: Role) -> Registration {
    Registration {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        password: "secret1".into(),
        role,
    }
}

pub(crate) fn new_bug(title: &str, description: &str) -> NewBug {
    NewBug {
        title: title.to_string(),
        description: description.to_string(),
        ..Default::default()
    }
}

/// A store whose every call fails, for exercising fallbacks.
pub(crate) struct FailingStore;

fn down<T>() -> Result<T> {
    Err(StorageError::Connection("database is unavailable".into()))
}

impl BugStore for FailingStore {
    fn insert_bug(&self, _: &Bug) -> Result<i64> {
        down()
    }
    fn get_bug(&self, _: i64) -> Result<Bug> {
        down()
    }
    fn find_duplicates(&self, _: &str, _: u32) -> Result<Vec<DuplicateCandidate>> {
        down()
    }
    fn apply_update(&self, _: i64, _: &BugPatch, _: &[FieldChange], _: i64) -> Result<()> {
        down()
    }
    fn get_history(&self, _: i64) -> Result<Vec<BugHistoryEntry>> {
        down()
    }
    fn add_comment(&self, _: i64, _: i64, _: &str) -> Result<Comment> {
        down()
    }
    fn get_comments(&self, _: i64) -> Result<Vec<Comment>> {
        down()
    }
    fn add_attachment(&self, _: &NewAttachment) -> Result<Attachment> {
        down()
    }
    fn get_attachments(&self, _: i64) -> Result<Vec<Attachment>> {
        down()
    }
    fn get_bug_summary(&self, _: i64) -> Result<BugSummary> {
        down()
    }
    fn list_bugs(&self, _: &BugQuery) -> Result<Vec<BugSummary>> {
        down()
    }
    fn count_bugs(&self, _: &BugQuery) -> Result<u64> {
        down()
    }
    fn search_bugs(&self, _: &str, _: u32) -> Result<Vec<BugSummary>> {
        down()
    }
    fn count_created_since(&self, _: DateTime<Utc>) -> Result<u64> {
        down()
    }
    fn status_counts(&self) -> Result<Vec<(Status, u64)>> {
        down()
    }
    fn priority_counts(&self) -> Result<Vec<(Priority, u64)>> {
        down()
    }
    fn daily_created_since(&self, _: DateTime<Utc>) -> Result<Vec<(String, u64)>> {
        down()
    }
    fn resolution_averages(&self) -> Result<Vec<(Priority, f64)>> {
        down()
    }
    fn create_user(&self, _: &Registration, _: &str) -> Result<User> {
        down()
    }
    fn get_user(&self, _: i64) -> Result<User> {
        down()
    }
    fn get_user_credentials(&self, _: &str) -> Result<(User, String)> {
        down()
    }
    fn list_users(&self) -> Result<Vec<User>> {
        down()
    }
    fn create_project(&self, _: &str, _: &str) -> Result<Project> {
        down()
    }
    fn get_project(&self, _: i64) -> Result<Project> {
        down()
    }
    fn list_projects(&self) -> Result<Vec<Project>> {
        down()
    }
}
