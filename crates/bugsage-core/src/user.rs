//! Users and projects: the reference targets of a bug.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Role;

/// A registered user. The credential hash never leaves the store layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A project bugs can be filed against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: i64,
    pub project_name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, as vouched for by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub user_id: i64,
    pub role: Role,
}

impl CallerContext {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for CallerContext {
    fn from(user: &User) -> Self {
        Self::new(user.user_id, user.role)
    }
}
