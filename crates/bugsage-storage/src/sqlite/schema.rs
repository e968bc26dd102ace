//! DDL statements and migrations for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond
//! precision (SQLite has no native datetime type). Enum columns store the
//! display string and are guarded by CHECK constraints.

/// Current schema version. Bumped whenever DDL or migrations change.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Users ---------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
        password_hash TEXT NOT NULL,
        role          TEXT NOT NULL DEFAULT 'Developer'
                      CHECK (role IN ('Developer', 'Tester', 'Admin')),
        created_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    // -- Projects ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS projects (
        project_id   INTEGER PRIMARY KEY AUTOINCREMENT,
        project_name TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    )
    "#,
    // -- Bugs ----------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS bugs (
        bug_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL CHECK (length(title) > 0),
        description TEXT NOT NULL CHECK (length(description) > 0),
        priority    TEXT NOT NULL DEFAULT 'Medium'
                    CHECK (priority IN ('Low', 'Medium', 'High', 'Critical')),
        status      TEXT NOT NULL DEFAULT 'New'
                    CHECK (status IN ('New', 'In Progress', 'Resolved', 'Closed')),
        project_id  INTEGER REFERENCES projects(project_id) ON DELETE SET NULL,
        reporter_id INTEGER NOT NULL REFERENCES users(user_id),
        assignee_id INTEGER REFERENCES users(user_id) ON DELETE SET NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bugs_status ON bugs(status)",
    "CREATE INDEX IF NOT EXISTS idx_bugs_assignee ON bugs(assignee_id)",
    "CREATE INDEX IF NOT EXISTS idx_bugs_project ON bugs(project_id)",
    "CREATE INDEX IF NOT EXISTS idx_bugs_created_at ON bugs(created_at)",
    // -- Comments ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        comment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id     INTEGER NOT NULL REFERENCES bugs(bug_id) ON DELETE CASCADE,
        user_id    INTEGER NOT NULL REFERENCES users(user_id),
        comment    TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_comments_bug ON comments(bug_id)",
    // -- Attachments ---------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS attachments (
        attachment_id INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id        INTEGER NOT NULL REFERENCES bugs(bug_id) ON DELETE CASCADE,
        filename      TEXT NOT NULL,
        file_path     TEXT NOT NULL,
        file_size     INTEGER NOT NULL DEFAULT 0,
        uploaded_by   INTEGER NOT NULL REFERENCES users(user_id),
        uploaded_at   TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_attachments_bug ON attachments(bug_id)",
    // -- Bug history ---------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS bug_history (
        history_id    INTEGER PRIMARY KEY AUTOINCREMENT,
        bug_id        INTEGER NOT NULL REFERENCES bugs(bug_id),
        changed_by    INTEGER NOT NULL REFERENCES users(user_id),
        field_changed TEXT NOT NULL
                      CHECK (field_changed IN ('title', 'description', 'priority', 'status', 'assignee_id')),
        old_value     TEXT,
        new_value     TEXT,
        changed_at    TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bug_history_bug ON bug_history(bug_id)",
    // -- Config table --------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS config (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
    // -- Metadata table ------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

/// Schema migrations applied after initial DDL.
///
/// Each migration is a `(name, sql)` pair. Migrations are tracked in the
/// `metadata` table under the key `migration:<name>` so they run at most once.
pub const MIGRATIONS: &[(&str, &str)] = &[(
    "001_bug_history_append_only",
    r#"
    CREATE TRIGGER IF NOT EXISTS bug_history_no_update
    BEFORE UPDATE ON bug_history
    BEGIN
        SELECT RAISE(ABORT, 'bug_history is append-only');
    END;
    CREATE TRIGGER IF NOT EXISTS bug_history_no_delete
    BEFORE DELETE ON bug_history
    BEGIN
        SELECT RAISE(ABORT, 'bug_history is append-only');
    END;
    "#,
)];
