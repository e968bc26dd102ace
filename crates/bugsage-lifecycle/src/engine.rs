//! Write-side lifecycle operations: create, update, status and comments.
//!
//! Every operation takes the caller explicitly. Reference checks happen
//! before any write, so a rejected request never leaves partial state.

use chrono::Utc;
use tracing::{debug, info};

use bugsage_core::bug::{BugBuilder, DuplicateCandidate, NewBug};
use bugsage_core::comment::Comment;
use bugsage_core::enums::Status;
use bugsage_core::history::BugPatch;
use bugsage_core::user::CallerContext;
use bugsage_core::validation::{self, ValidationError};
use bugsage_storage::BugStore;

use crate::error::{LifecycleError, Result};
use crate::settings::EngineSettings;

/// Result of a creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { bug_id: i64 },
    /// Possible duplicates were found and nothing was written.
    Duplicates(Vec<DuplicateCandidate>),
}

/// The bug lifecycle engine. Sole writer of bugs and their history.
pub struct LifecycleEngine<S> {
    pub(crate) store: S,
    pub(crate) settings: EngineSettings,
}

impl<S: BugStore> LifecycleEngine<S> {
    pub fn new(store: S, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validates and inserts a bug, unless similar bugs already exist and
    /// `force_create` is unset.
    pub fn create_bug(&self, caller: &CallerContext, new: &NewBug) -> Result<CreateOutcome> {
        let (title, description) = validation::validate_bug_text(&new.title, &new.description)?;
        let priority = validation::validate_priority(new.priority.as_deref())?;

        if !new.force_create {
            let candidates = self
                .store
                .find_duplicates(&title, self.settings.max_candidates)?;
            if !candidates.is_empty() {
                debug!(count = candidates.len(), %title, "duplicate candidates found");
                return Ok(CreateOutcome::Duplicates(candidates));
            }
        }

        if let Some(project_id) = new.project_id {
            self.check_reference("project", self.store.get_project(project_id).map(|_| ()))?;
        }
        if let Some(assignee_id) = new.assignee_id {
            self.check_reference("assignee", self.store.get_user(assignee_id).map(|_| ()))?;
        }

        let now = Utc::now();
        let mut builder = BugBuilder::new(title, caller.user_id)
            .description(description)
            .priority(priority)
            .status(Status::New)
            .created_at(now)
            .updated_at(now);
        if let Some(project_id) = new.project_id {
            builder = builder.project_id(project_id);
        }
        if let Some(assignee_id) = new.assignee_id {
            builder = builder.assignee_id(assignee_id);
        }

        let bug_id = self.store.insert_bug(&builder.build())?;
        info!(bug_id, reporter = caller.user_id, "bug created");
        Ok(CreateOutcome::Created { bug_id })
    }

    /// Applies a partial update, recording one history entry per field whose
    /// value actually changes.
    pub fn update_bug(&self, caller: &CallerContext, bug_id: i64, patch: &BugPatch) -> Result<()> {
        self.update_bug_with(caller, bug_id, || Ok(patch.clone()))
    }

    /// Like [`update_bug`](Self::update_bug), but the patch is built only
    /// once the bug is known to exist, so a missing bug reports not-found
    /// even when the raw input would not parse.
    pub fn update_bug_with<F>(&self, caller: &CallerContext, bug_id: i64, build: F) -> Result<()>
    where
        F: FnOnce() -> std::result::Result<BugPatch, ValidationError>,
    {
        let current = self.store.get_bug(bug_id)?;
        let patch = build()?;

        if patch.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate.into());
        }
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ValidationError::TitleRequired.into());
        }
        if patch.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(ValidationError::DescriptionRequired.into());
        }
        if let Some(Some(assignee_id)) = patch.assignee_id {
            self.check_reference("assignee", self.store.get_user(assignee_id).map(|_| ()))?;
        }

        let normalized = BugPatch {
            title: patch.title.as_deref().map(|t| t.trim().to_string()),
            description: patch.description.as_deref().map(|d| d.trim().to_string()),
            ..patch
        };
        let changes = normalized.diff(&current);
        self.store
            .apply_update(bug_id, &normalized, &changes, caller.user_id)?;

        info!(
            bug_id,
            changed = changes.len(),
            provided = normalized.provided_fields().len(),
            "bug updated"
        );
        Ok(())
    }

    /// Moves a bug to `raw_status`. Returns `false` without writing when the
    /// bug is already there.
    pub fn update_status(&self, caller: &CallerContext, bug_id: i64, raw_status: &str) -> Result<bool> {
        let status = Status::parse(raw_status.trim())
            .ok_or_else(|| ValidationError::InvalidStatus(raw_status.trim().to_string()))?;
        let current = self.store.get_bug(bug_id)?;

        if current.status == status {
            debug!(bug_id, %status, "status unchanged");
            return Ok(false);
        }

        let patch = BugPatch {
            status: Some(status),
            ..Default::default()
        };
        let changes = patch.diff(&current);
        self.store
            .apply_update(bug_id, &patch, &changes, caller.user_id)?;
        info!(bug_id, from = %current.status, to = %status, "status changed");
        Ok(true)
    }

    /// Appends a comment to an existing bug.
    pub fn add_comment(&self, caller: &CallerContext, bug_id: i64, text: &str) -> Result<Comment> {
        self.store.get_bug(bug_id)?;
        let text = validation::validate_comment(text)?;
        let comment = self.store.add_comment(bug_id, caller.user_id, &text)?;
        debug!(bug_id, comment_id = comment.comment_id, "comment added");
        Ok(comment)
    }

    /// Turns a failed lookup into a reference error; store faults pass
    /// through.
    pub(crate) fn check_reference(
        &self,
        field: &'static str,
        lookup: bugsage_storage::error::Result<()>,
    ) -> Result<()> {
        match lookup {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Err(LifecycleError::Reference { field }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{TestEnv, new_bug};
    use bugsage_core::enums::{Priority, TrackedField};
    use bugsage_storage::BugStore;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn created(outcome: CreateOutcome) -> i64 {
        match outcome {
            CreateOutcome::Created { bug_id } => bug_id,
            CreateOutcome::Duplicates(d) => panic!("unexpected duplicates: {d:?}"),
        }
    }

    #[test]
    fn login_fails_scenario() {
        let env = TestEnv::new();
        let mut new = new_bug("  Login fails ", "Cannot log in");
        new.priority = Some("High".into());
        let id = created(env.engine.create_bug(&env.caller, &new).unwrap());

        let bug = env.engine.store().get_bug(id).unwrap();
        assert_eq!(bug.title, "Login fails");
        assert_eq!(bug.priority, Priority::High);
        assert_eq!(bug.status, Status::New);
        assert_eq!(bug.reporter_id, env.caller.user_id);
        assert_eq!(bug.created_at, bug.updated_at);
        assert!(env.engine.store().get_history(id).unwrap().is_empty());
    }

    #[test]
    fn priority_defaults_to_medium() {
        let env = TestEnv::new();
        let id = created(env.engine.create_bug(&env.caller, &new_bug("t", "d")).unwrap());
        assert_eq!(env.engine.store().get_bug(id).unwrap().priority, Priority::Medium);
    }

    #[test]
    fn blank_title_or_description_writes_nothing() {
        let env = TestEnv::new();
        let err = env
            .engine
            .create_bug(&env.caller, &new_bug("   ", "d"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Title is required");

        let err = env
            .engine
            .create_bug(&env.caller, &new_bug("t", "\n\t"))
            .unwrap_err();
        assert_eq!(err.to_string(), "Description is required");
        assert_eq!(env.bug_count(), 0);
    }

    #[test]
    fn invalid_priority_is_rejected() {
        let env = TestEnv::new();
        let mut new = new_bug("t", "d");
        new.priority = Some("Urgent".into());
        let err = env.engine.create_bug(&env.caller, &new).unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(env.bug_count(), 0);
    }

    #[test]
    fn duplicates_block_creation_until_forced() {
        let env = TestEnv::new();
        for i in 0..7 {
            let new = new_bug(&format!("Login page error {i}"), "d");
            created(env.engine.create_bug(&env.caller, &new).unwrap());
        }

        let outcome = env
            .engine
            .create_bug(&env.caller, &new_bug("login page", "again"))
            .unwrap();
        let CreateOutcome::Duplicates(candidates) = outcome else {
            panic!("expected duplicates");
        };
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[0].title, "Login page error 6");
        assert_eq!(env.bug_count(), 7);

        let mut forced = new_bug("login page", "again");
        forced.force_create = true;
        created(env.engine.create_bug(&env.caller, &forced).unwrap());
        assert_eq!(env.bug_count(), 8);
    }

    #[test]
    fn duplicate_match_on_description() {
        let env = TestEnv::new();
        created(
            env.engine
                .create_bug(&env.caller, &new_bug("Crash", "happens on checkout"))
                .unwrap(),
        );
        let outcome = env
            .engine
            .create_bug(&env.caller, &new_bug("Checkout", "x"))
            .unwrap();
        assert!(matches!(outcome, CreateOutcome::Duplicates(ref d) if d.len() == 1));
    }

    #[test]
    fn dangling_references_write_nothing() {
        let env = TestEnv::new();
        let mut new = new_bug("t", "d");
        new.project_id = Some(404);
        let err = env.engine.create_bug(&env.caller, &new).unwrap_err();
        assert_eq!(err.to_string(), "Invalid project selected");

        let mut new = new_bug("t", "d");
        new.assignee_id = Some(404);
        let err = env.engine.create_bug(&env.caller, &new).unwrap_err();
        assert_eq!(err.to_string(), "Invalid assignee selected");
        assert_eq!(env.bug_count(), 0);
    }

    #[test]
    fn valid_references_are_stored() {
        let env = TestEnv::new();
        let project = env.engine.store().create_project("Web", "").unwrap();
        let mut new = new_bug("t", "d");
        new.project_id = Some(project.project_id);
        new.assignee_id = Some(env.other.user_id);
        let id = created(env.engine.create_bug(&env.caller, &new).unwrap());

        let bug = env.engine.store().get_bug(id).unwrap();
        assert_eq!(bug.project_id, Some(project.project_id));
        assert_eq!(bug.assignee_id, Some(env.other.user_id));
    }

    #[test]
    fn update_missing_bug_is_not_found() {
        let env = TestEnv::new();
        let patch = BugPatch {
            title: Some("x".into()),
            ..Default::default()
        };
        let err = env.engine.update_bug(&env.caller, 99, &patch).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn missing_bug_wins_over_unparsable_patch() {
        let env = TestEnv::new();
        let err = env
            .engine
            .update_bug_with(&env.caller, 99, || {
                Err(ValidationError::InvalidStatus("Done".into()))
            })
            .unwrap_err();
        assert!(err.is_not_found());

        let id = env.seed_bug("t", "d");
        let err = env
            .engine
            .update_bug_with(&env.caller, id, || {
                Err(ValidationError::InvalidStatus("Done".into()))
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: Done");
    }

    #[test]
    fn empty_update_fails() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let err = env
            .engine
            .update_bug(&env.caller, id, &BugPatch::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "No fields to update");
    }

    #[test]
    fn blank_text_in_update_fails() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let patch = BugPatch {
            title: Some("  ".into()),
            ..Default::default()
        };
        let err = env.engine.update_bug(&env.caller, id, &patch).unwrap_err();
        assert_eq!(err.to_string(), "Title is required");
    }

    #[test]
    fn resolve_and_assign_scenario() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let patch = BugPatch {
            status: Some(Status::Resolved),
            assignee_id: Some(Some(env.other.user_id)),
            ..Default::default()
        };
        env.engine.update_bug(&env.caller, id, &patch).unwrap();

        let history = env.engine.store().get_history(id).unwrap();
        let rows: Vec<_> = history
            .iter()
            .map(|h| (h.field_changed, h.old_value.clone(), h.new_value.clone()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (TrackedField::Status, Some("New".into()), Some("Resolved".into())),
                (TrackedField::AssigneeId, None, Some(env.other.user_id.to_string())),
            ]
        );
        assert!(history.iter().all(|h| h.changed_by == env.caller.user_id));
    }

    #[test]
    fn unchanged_fields_do_not_block_changed_ones() {
        let env = TestEnv::new();
        let id = env.seed_bug("same", "d");
        let patch = BugPatch {
            title: Some("same".into()),
            priority: Some(Priority::Critical),
            ..Default::default()
        };
        env.engine.update_bug(&env.caller, id, &patch).unwrap();

        let history = env.engine.store().get_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].field_changed, TrackedField::Priority);
    }

    #[test]
    fn all_unchanged_still_touches_updated_at() {
        let env = TestEnv::new();
        let id = env.seed_bug_at("same", "d", Utc::now() - Duration::days(2));
        let before = env.engine.store().get_bug(id).unwrap().updated_at;

        let patch = BugPatch {
            title: Some(" same ".into()),
            ..Default::default()
        };
        env.engine.update_bug(&env.caller, id, &patch).unwrap();

        assert!(env.engine.store().get_history(id).unwrap().is_empty());
        assert!(env.engine.store().get_bug(id).unwrap().updated_at > before);
    }

    #[test]
    fn n_changes_give_n_history_rows() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let patch = BugPatch {
            title: Some("t2".into()),
            description: Some("d2".into()),
            priority: Some(Priority::Low),
            status: Some(Status::InProgress),
            assignee_id: Some(Some(env.other.user_id)),
        };
        env.engine.update_bug(&env.caller, id, &patch).unwrap();
        assert_eq!(env.engine.store().get_history(id).unwrap().len(), 5);
    }

    #[test]
    fn clearing_assignee_records_null() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let assign = BugPatch {
            assignee_id: Some(Some(env.other.user_id)),
            ..Default::default()
        };
        env.engine.update_bug(&env.caller, id, &assign).unwrap();
        let clear = BugPatch {
            assignee_id: Some(None),
            ..Default::default()
        };
        env.engine.update_bug(&env.caller, id, &clear).unwrap();

        assert_eq!(env.engine.store().get_bug(id).unwrap().assignee_id, None);
        let history = env.engine.store().get_history(id).unwrap();
        assert_eq!(history[1].new_value, None);
    }

    #[test]
    fn update_with_dangling_assignee_writes_nothing() {
        let env = TestEnv::new();
        let id = env.seed_bug("t", "d");
        let patch = BugPatch {
            title: Some("new".into()),
            assignee_id: Some(Some(777)),
            ..Default::default()
        };
        let err = env.engine.update_bug(&env.caller, id, &patch).unwrap_err();
        assert!(matches!(err, LifecycleError::Reference { field: "assignee" }));
        assert_eq!(env.engine.store().get_bug(id).unwrap().title, "t");
    }

    #[test]
    fn status_noop_writes_nothing() {
        let env = TestEnv::new();
        let id = env.seed_bug_at("t", "d", Utc::now() - Duration::days(1));
        let before = env.engine.store().get_bug(id).unwrap();

        let changed = env.engine.update_status(&env.caller, id, "New").unwrap();
        assert!(!changed);
        assert_eq!(env.engine.store().get_bug(id).unwrap(), before);
        assert!(env.engine.store().get_history(id).unwrap().is_empty());
    }

    #[test]
    fn status_change_writes_one_entry_and_advances_updated_at() {
        let env = TestEnv::new();
        let id = env.seed_bug_at("t", "d", Utc::now() - Duration::days(1));
        let before = env.engine.store().get_bug(id).unwrap().updated_at;

        let changed = env
            .engine
            .update_status(&env.caller, id, "In Progress")
            .unwrap();
        assert!(changed);

        let bug = env.engine.store().get_bug(id).unwrap();
        assert_eq!(bug.status, Status::InProgress);
        assert!(bug.updated_at > before);
        let history = env.engine.store().get_history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].old_value.as_deref(), Some("New"));
        assert_eq!(history[0].new_value.as_deref(), Some("In Progress"));
    }

    #[test]
    fn status_validation_precedes_lookup() {
        let env = TestEnv::new();
        let err = env.engine.update_status(&env.caller, 99, "Done").unwrap_err();
        assert_eq!(err.to_string(), "Invalid status: Done");
        let err = env.engine.update_status(&env.caller, 99, "Closed").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn comments_require_bug_and_text() {
        let env = TestEnv::new();
        let err = env.engine.add_comment(&env.caller, 5, "hi").unwrap_err();
        assert!(err.is_not_found());

        let id = env.seed_bug("t", "d");
        let err = env.engine.add_comment(&env.caller, id, "   ").unwrap_err();
        assert_eq!(err.to_string(), "Comment text is required");

        let comment = env.engine.add_comment(&env.caller, id, " looks good ").unwrap();
        assert_eq!(comment.comment, "looks good");
        assert!(env.engine.store().get_history(id).unwrap().is_empty());
    }
}
