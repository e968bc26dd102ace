//! Input validation rules for bugs, comments, users and projects.

use crate::enums::{Priority, Role};

/// Minimum accepted password length.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Error type for validation failures.
///
/// Messages are shown to end users verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Description is required")]
    DescriptionRequired,

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),

    #[error("Invalid assignee value: {0}")]
    InvalidAssignee(String),

    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Comment text is required")]
    CommentRequired,

    #[error("Search query is required")]
    SearchQueryRequired,

    #[error("Name, email, and password are required")]
    RegistrationFieldsRequired,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be at least {} characters long", PASSWORD_MIN_LENGTH)]
    PasswordTooShort,

    #[error("Email address is already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Project name is required")]
    ProjectNameRequired,

    #[error("File type .{0} is not allowed")]
    ExtensionNotAllowed(String),

    #[error("File is too large ({size} bytes, limit {limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },
}

/// Trims `title` and `description` and rejects either being empty.
pub fn validate_bug_text(title: &str, description: &str) -> Result<(String, String), ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::TitleRequired);
    }
    let description = description.trim();
    if description.is_empty() {
        return Err(ValidationError::DescriptionRequired);
    }
    Ok((title.to_string(), description.to_string()))
}

/// Resolves an optional raw priority; absent or blank means Medium.
pub fn validate_priority(raw: Option<&str>) -> Result<Priority, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Priority::default()),
        Some(s) => Priority::parse(s).ok_or_else(|| ValidationError::InvalidPriority(s.to_string())),
    }
}

/// Trims comment text and rejects an empty body.
pub fn validate_comment(text: &str) -> Result<String, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::CommentRequired);
    }
    Ok(text.to_string())
}

/// Loose `local@domain.tld` check.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// Validated registration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Checks registration fields; the role defaults to Developer when blank.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    role: Option<&str>,
) -> Result<Registration, ValidationError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ValidationError::RegistrationFieldsRequired);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    let role = match role.map(str::trim) {
        None | Some("") => Role::default(),
        Some(r) => Role::parse(r).ok_or_else(|| ValidationError::InvalidRole(r.to_string()))?,
    };
    Ok(Registration {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
    })
}
