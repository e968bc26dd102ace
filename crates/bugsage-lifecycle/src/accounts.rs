//! Users, credentials and projects.

use tracing::info;

use bugsage_core::credential::{hash_password, verify_password};
use bugsage_core::user::{Project, User};
use bugsage_core::validation::{ValidationError, validate_registration};
use bugsage_storage::{BugStore, StorageError};

use crate::engine::LifecycleEngine;
use crate::error::{LifecycleError, Result};

impl<S: BugStore> LifecycleEngine<S> {
    /// Registers a user; `role` defaults to Developer when absent or blank.
    pub fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<User> {
        let registration = validate_registration(name, email, password, role)?;
        let hash = hash_password(&registration.password)?;
        match self.store.create_user(&registration, &hash) {
            Ok(user) => {
                info!(user_id = user.user_id, role = %user.role, "user registered");
                Ok(user)
            }
            Err(StorageError::Conflict { .. }) => Err(ValidationError::EmailTaken.into()),
            Err(e) => Err(e.into()),
        }
    }

    /// The user owning `email` if `password` matches.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User> {
        let (user, stored) = match self.store.get_user_credentials(email.trim()) {
            Ok(found) => found,
            Err(e) if e.is_not_found() => return Err(ValidationError::InvalidCredentials.into()),
            Err(e) => return Err(e.into()),
        };
        if verify_password(&stored, password) {
            Ok(user)
        } else {
            Err(ValidationError::InvalidCredentials.into())
        }
    }

    pub fn get_user(&self, user_id: i64) -> Result<User> {
        Ok(self.store.get_user(user_id)?)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.store.list_users()?)
    }

    pub fn create_project(&self, name: &str, description: &str) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LifecycleError::from(ValidationError::ProjectNameRequired));
        }
        let project = self.store.create_project(name, description.trim())?;
        info!(project_id = project.project_id, "project created");
        Ok(project)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.store.list_projects()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::TestEnv;
    use bugsage_core::enums::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_and_login() {
        let env = TestEnv::new();
        let user = env
            .engine
            .register_user(" Dana ", "dana@example.com", "hunter22", Some("Tester"))
            .unwrap();
        assert_eq!(user.name, "Dana");
        assert_eq!(user.role, Role::Tester);

        let logged_in = env
            .engine
            .verify_credentials("dana@example.com", "hunter22")
            .unwrap();
        assert_eq!(logged_in.user_id, user.user_id);

        let err = env
            .engine
            .verify_credentials("dana@example.com", "wrong")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        let err = env
            .engine
            .verify_credentials("nobody@example.com", "hunter22")
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn registration_rules() {
        let env = TestEnv::new();
        let short = env
            .engine
            .register_user("A", "a@example.com", "12345", None)
            .unwrap_err();
        assert_eq!(short.to_string(), "Password must be at least 6 characters long");

        let bad_email = env
            .engine
            .register_user("A", "not-an-email", "123456", None)
            .unwrap_err();
        assert_eq!(bad_email.to_string(), "Invalid email format");

        let user = env
            .engine
            .register_user("A", "a@example.com", "123456", None)
            .unwrap();
        assert_eq!(user.role, Role::Developer);

        let taken = env
            .engine
            .register_user("B", "A@example.com", "123456", None)
            .unwrap_err();
        assert_eq!(taken.to_string(), "Email address is already registered");
    }

    #[test]
    fn projects_need_a_name() {
        let env = TestEnv::new();
        let err = env.engine.create_project("  ", "x").unwrap_err();
        assert_eq!(err.to_string(), "Project name is required");

        env.engine.create_project("Web", " front end ").unwrap();
        env.engine.create_project("API", "").unwrap();
        let names: Vec<_> = env
            .engine
            .list_projects()
            .unwrap()
            .into_iter()
            .map(|p| p.project_name)
            .collect();
        assert_eq!(names, vec!["API", "Web"]);
    }
}
