//! User and project operations for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{Row, params};

use bugsage_core::user::{Project, User};
use bugsage_core::validation::Registration;

use crate::error::{Result, StorageError};
use crate::sqlite::bugs::{format_datetime, not_found_or, parse_column, parse_datetime};
use crate::sqlite::store::SqliteStore;

const USER_COLUMNS: &str = "user_id, name, email, role, created_at";

fn scan_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        role: parse_column(row, "role")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn scan_project(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        project_id: row.get("project_id")?,
        project_name: row.get("project_name")?,
        description: row.get("description")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

impl SqliteStore {
    /// Creates a user. The email column is UNIQUE; a clash becomes
    /// [`StorageError::Conflict`].
    pub fn create_user_impl(&self, reg: &Registration, password_hash: &str) -> Result<User> {
        let conn = self.lock_conn()?;
        let now = Utc::now();
        let inserted = conn.execute(
            "INSERT INTO users (name, email, password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                reg.name,
                reg.email,
                password_hash,
                reg.role.as_str(),
                format_datetime(&now)
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StorageError::conflict("Email address is already registered"));
            }
            Err(e) => return Err(e.into()),
        }
        Ok(User {
            user_id: conn.last_insert_rowid(),
            name: reg.name.clone(),
            email: reg.email.clone(),
            role: reg.role,
            created_at: now,
        })
    }

    pub fn get_user_impl(&self, user_id: i64) -> Result<User> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
        conn.query_row(&sql, params![user_id], scan_user)
            .map_err(not_found_or("user", user_id))
    }

    /// Looks a user up by email (case-insensitive) and returns the stored
    /// credential hash alongside.
    pub fn get_user_credentials_impl(&self, email: &str) -> Result<(User, String)> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE lower(email) = lower(?1)"
        );
        conn.query_row(&sql, params![email], |row| {
            Ok((scan_user(row)?, row.get::<_, String>("password_hash")?))
        })
        .map_err(not_found_or("user", email))
    }

    pub fn list_users_impl(&self) -> Result<Vec<User>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name ASC, user_id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], scan_user)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    pub fn create_project_impl(&self, name: &str, description: &str) -> Result<Project> {
        let conn = self.lock_conn()?;
        let now = Utc::now();
        conn.execute(
            "INSERT INTO projects (project_name, description, created_at) VALUES (?1, ?2, ?3)",
            params![name, description, format_datetime(&now)],
        )?;
        Ok(Project {
            project_id: conn.last_insert_rowid(),
            project_name: name.to_string(),
            description: description.to_string(),
            created_at: now,
        })
    }

    pub fn get_project_impl(&self, project_id: i64) -> Result<Project> {
        let conn = self.lock_conn()?;
        conn.query_row(
            "SELECT project_id, project_name, description, created_at
             FROM projects WHERE project_id = ?1",
            params![project_id],
            scan_project,
        )
        .map_err(not_found_or("project", project_id))
    }

    pub fn list_projects_impl(&self) -> Result<Vec<Project>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT project_id, project_name, description, created_at
             FROM projects ORDER BY project_name ASC, project_id ASC",
        )?;
        let rows = stmt.query_map([], scan_project)?;
        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bugsage_core::enums::Role;
    use pretty_assertions::assert_eq;

    const FIXTURE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaA";

    /// Inserts a Developer named `name` with a throwaway hash.
    pub(crate) fn seed_user(store: &SqliteStore, name: &str) -> i64 {
        let reg = Registration {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password: "secret1".into(),
            role: Role::Developer,
        };
        store.create_user_impl(&reg, FIXTURE_HASH).unwrap().user_id
    }

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_get_user() {
        let store = test_store();
        let id = seed_user(&store, "Ana");
        let user = store.get_user_impl(id).unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::Developer);
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let store = test_store();
        seed_user(&store, "Ana");
        let reg = Registration {
            name: "Other".into(),
            email: "ana@example.com".into(),
            password: "secret1".into(),
            role: Role::Tester,
        };
        let err = store.create_user_impl(&reg, "h").unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(err.to_string(), "conflict: Email address is already registered");
    }

    #[test]
    fn credentials_lookup_ignores_case() {
        let store = test_store();
        seed_user(&store, "Ana");
        let (user, hash) = store.get_user_credentials_impl("ANA@example.com").unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(hash, FIXTURE_HASH);
        assert!(
            store
                .get_user_credentials_impl("nobody@example.com")
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn users_and_projects_listed_by_name() {
        let store = test_store();
        seed_user(&store, "Zed");
        seed_user(&store, "Ana");
        let names: Vec<_> = store.list_users_impl().unwrap().into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["Ana", "Zed"]);

        store.create_project_impl("Mobile", "apps").unwrap();
        let web = store.create_project_impl("Web", "").unwrap();
        let projects = store.list_projects_impl().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].project_name, "Mobile");
        assert_eq!(store.get_project_impl(web.project_id).unwrap().project_name, "Web");
        assert!(store.get_project_impl(999).unwrap_err().is_not_found());
    }
}
