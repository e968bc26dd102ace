//! Bug CRUD, history writes and read projections for [`SqliteStore`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{Connection, Row, params};

use bugsage_core::bug::{Bug, BugSummary, DuplicateCandidate};
use bugsage_core::filter::BugQuery;
use bugsage_core::history::{BugHistoryEntry, BugPatch, FieldChange};

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Bug columns for single-table SELECTs.
pub(crate) const BUG_COLUMNS: &str = r#"
    bug_id, title, description, priority, status, project_id,
    reporter_id, assignee_id, created_at, updated_at
"#;

/// SELECT + JOINs producing a [`BugSummary`] row. Callers append WHERE /
/// ORDER BY / LIMIT.
pub(crate) const SUMMARY_SELECT: &str = r#"
    SELECT b.bug_id AS bug_id, b.title AS title, b.description AS description,
           b.priority AS priority, b.status AS status, b.project_id AS project_id,
           b.reporter_id AS reporter_id, b.assignee_id AS assignee_id,
           b.created_at AS created_at, b.updated_at AS updated_at,
           p.project_name AS project_name,
           r.name AS reporter_name,
           a.name AS assignee_name
    FROM bugs b
    LEFT JOIN projects p ON p.project_id = b.project_id
    LEFT JOIN users r ON r.user_id = b.reporter_id
    LEFT JOIN users a ON a.user_id = b.assignee_id
"#;

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

/// Deserialises a row into a [`Bug`]. Columns are looked up by name.
pub(crate) fn scan_bug(row: &Row<'_>) -> rusqlite::Result<Bug> {
    Ok(Bug {
        bug_id: row.get("bug_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: parse_column(row, "priority")?,
        status: parse_column(row, "status")?,
        project_id: row.get("project_id")?,
        reporter_id: row.get("reporter_id")?,
        assignee_id: row.get("assignee_id")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(&row.get::<_, String>("updated_at")?),
    })
}

/// Deserialises a [`SUMMARY_SELECT`] row.
pub(crate) fn scan_summary(row: &Row<'_>) -> rusqlite::Result<BugSummary> {
    Ok(BugSummary {
        bug: scan_bug(row)?,
        project_name: row.get("project_name")?,
        reporter_name: row.get("reporter_name")?,
        assignee_name: row.get("assignee_name")?,
    })
}

fn scan_history(row: &Row<'_>) -> rusqlite::Result<BugHistoryEntry> {
    Ok(BugHistoryEntry {
        history_id: row.get("history_id")?,
        bug_id: row.get("bug_id")?,
        changed_by: row.get("changed_by")?,
        changed_by_name: row.get("changed_by_name")?,
        field_changed: parse_column(row, "field_changed")?,
        old_value: row.get("old_value")?,
        new_value: row.get("new_value")?,
        changed_at: parse_datetime(&row.get::<_, String>("changed_at")?),
    })
}

/// Reads a TEXT column and parses it into a closed enum.
pub(crate) fn parse_column<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(col)?;
    raw.parse().map_err(|e| {
        let idx = row.as_ref().column_index(col).unwrap_or_default();
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Formats a `DateTime<Utc>` as ISO 8601 TEXT for SQLite.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Parses an ISO 8601 TEXT string from SQLite into a `DateTime<Utc>`.
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // Try full RFC 3339 first, then common SQLite formats.
    s.parse::<DateTime<Utc>>().unwrap_or_else(|_| {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .map(|ndt| ndt.and_utc())
            .unwrap_or_else(|_| Utc::now())
    })
}

/// Builds a `LIKE ... ESCAPE '\'` pattern matching `text` as a literal
/// substring.
pub(crate) fn like_contains(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Maps `QueryReturnedNoRows` to [`StorageError::NotFound`].
pub(crate) fn not_found_or(entity: &str, id: impl ToString) -> impl FnOnce(rusqlite::Error) -> StorageError {
    let id = id.to_string();
    let entity = entity.to_string();
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => StorageError::not_found(entity, id),
        other => StorageError::Query(other),
    }
}

// ---------------------------------------------------------------------------
// SqliteStore bug methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Inserts a bug.
    pub fn insert_bug_impl(&self, bug: &Bug) -> Result<i64> {
        let conn = self.lock_conn()?;
        insert_bug_on_conn(&conn, bug)
    }

    /// Retrieves a bug by id.
    pub fn get_bug_impl(&self, bug_id: i64) -> Result<Bug> {
        let conn = self.lock_conn()?;
        get_bug_on_conn(&conn, bug_id)
    }

    /// Duplicate-candidate lookup.
    pub fn find_duplicates_impl(&self, needle: &str, limit: u32) -> Result<Vec<DuplicateCandidate>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            r"SELECT bug_id, title FROM bugs
              WHERE title LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\'
              ORDER BY created_at DESC, bug_id DESC
              LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![like_contains(needle), limit], |row| {
            Ok(DuplicateCandidate {
                bug_id: row.get(0)?,
                title: row.get(1)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Applies a patch and its history rows atomically.
    pub fn apply_update_impl(
        &self,
        bug_id: i64,
        patch: &BugPatch,
        changes: &[FieldChange],
        changed_by: i64,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StorageError::Transaction(format!("failed to begin: {e}")))?;
        apply_update_on_conn(&tx, bug_id, patch, changes, changed_by)?;
        tx.commit()
            .map_err(|e| StorageError::Transaction(format!("failed to commit: {e}")))?;
        Ok(())
    }

    /// History of one bug.
    pub fn get_history_impl(&self, bug_id: i64) -> Result<Vec<BugHistoryEntry>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT h.history_id, h.bug_id, h.changed_by, u.name AS changed_by_name,
                    h.field_changed, h.old_value, h.new_value, h.changed_at
             FROM bug_history h
             LEFT JOIN users u ON u.user_id = h.changed_by
             WHERE h.bug_id = ?1
             ORDER BY h.changed_at ASC, h.history_id ASC",
        )?;
        let rows = stmt.query_map(params![bug_id], scan_history)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Joined projection of one bug.
    pub fn get_bug_summary_impl(&self, bug_id: i64) -> Result<BugSummary> {
        let conn = self.lock_conn()?;
        let sql = format!("{SUMMARY_SELECT} WHERE b.bug_id = ?1");
        conn.query_row(&sql, params![bug_id], scan_summary)
            .map_err(not_found_or("bug", bug_id))
    }

    /// Filtered, paginated listing.
    pub fn list_bugs_impl(&self, query: &BugQuery) -> Result<Vec<BugSummary>> {
        let conn = self.lock_conn()?;
        list_bugs_on_conn(&conn, query)
    }

    /// Filtered count.
    pub fn count_bugs_impl(&self, query: &BugQuery) -> Result<u64> {
        let conn = self.lock_conn()?;
        let (where_sql, param_values) = build_where(query);
        let sql = format!("SELECT COUNT(*) FROM bugs b {where_sql}");
        let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let count: i64 = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Text search over title and description.
    pub fn search_bugs_impl(&self, text: &str, limit: u32) -> Result<Vec<BugSummary>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            r"{SUMMARY_SELECT}
              WHERE b.title LIKE ?1 ESCAPE '\' OR b.description LIKE ?1 ESCAPE '\'
              ORDER BY b.created_at DESC, b.bug_id DESC
              LIMIT ?2"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![like_contains(text), limit], scan_summary)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Inserts a single bug using the provided connection.
pub(crate) fn insert_bug_on_conn(conn: &Connection, bug: &Bug) -> Result<i64> {
    conn.execute(
        "INSERT INTO bugs (title, description, priority, status, project_id,
                           reporter_id, assignee_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            bug.title,
            bug.description,
            bug.priority.as_str(),
            bug.status.as_str(),
            bug.project_id,
            bug.reporter_id,
            bug.assignee_id,
            format_datetime(&bug.created_at),
            format_datetime(&bug.updated_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Retrieves a single bug by id on the given connection.
pub(crate) fn get_bug_on_conn(conn: &Connection, bug_id: i64) -> Result<Bug> {
    let sql = format!("SELECT {BUG_COLUMNS} FROM bugs WHERE bug_id = ?1");
    conn.query_row(&sql, params![bug_id], scan_bug)
        .map_err(not_found_or("bug", bug_id))
}

/// Writes the provided patch fields plus `updated_at`, then one history row
/// per change. Run inside a transaction.
pub(crate) fn apply_update_on_conn(
    conn: &Connection,
    bug_id: i64,
    patch: &BugPatch,
    changes: &[FieldChange],
    changed_by: i64,
) -> Result<()> {
    if patch.is_empty() {
        return Err(StorageError::validation("no fields to update"));
    }

    let now_str = format_datetime(&Utc::now());

    // Build SET clause dynamically from provided fields.
    let mut set_clauses: Vec<&str> = Vec::new();
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref title) = patch.title {
        set_clauses.push("title = ?");
        param_values.push(Box::new(title.clone()));
    }
    if let Some(ref description) = patch.description {
        set_clauses.push("description = ?");
        param_values.push(Box::new(description.clone()));
    }
    if let Some(priority) = patch.priority {
        set_clauses.push("priority = ?");
        param_values.push(Box::new(priority.as_str()));
    }
    if let Some(status) = patch.status {
        set_clauses.push("status = ?");
        param_values.push(Box::new(status.as_str()));
    }
    if let Some(assignee_id) = patch.assignee_id {
        set_clauses.push("assignee_id = ?");
        param_values.push(Box::new(assignee_id));
    }

    // Always touch updated_at.
    set_clauses.push("updated_at = ?");
    param_values.push(Box::new(now_str.clone()));

    let sql = format!("UPDATE bugs SET {} WHERE bug_id = ?", set_clauses.join(", "));
    param_values.push(Box::new(bug_id));

    let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

    let affected = conn.execute(&sql, param_refs.as_slice())?;
    if affected == 0 {
        return Err(StorageError::not_found("bug", bug_id));
    }

    for change in changes {
        conn.execute(
            "INSERT INTO bug_history (bug_id, changed_by, field_changed, old_value, new_value, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                bug_id,
                changed_by,
                change.field.as_str(),
                change.old_value,
                change.new_value,
                now_str,
            ],
        )?;
    }

    Ok(())
}

/// Builds the WHERE clause (table alias `b`) for a [`BugQuery`].
fn build_where(query: &BugQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let mut where_clauses: Vec<String> = Vec::new();
    let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();
    let mut param_idx = 1;

    if let Some(status) = query.status {
        where_clauses.push(format!("b.status = ?{param_idx}"));
        param_values.push(Box::new(status.as_str()));
        param_idx += 1;
    }
    if let Some(priority) = query.priority {
        where_clauses.push(format!("b.priority = ?{param_idx}"));
        param_values.push(Box::new(priority.as_str()));
        param_idx += 1;
    }
    if let Some(assignee_id) = query.assignee_id {
        where_clauses.push(format!("b.assignee_id = ?{param_idx}"));
        param_values.push(Box::new(assignee_id));
        param_idx += 1;
    }
    if let Some(project_id) = query.project_id {
        where_clauses.push(format!("b.project_id = ?{param_idx}"));
        param_values.push(Box::new(project_id));
    }

    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };
    (where_sql, param_values)
}

/// Lists bugs on the given connection.
pub(crate) fn list_bugs_on_conn(conn: &Connection, query: &BugQuery) -> Result<Vec<BugSummary>> {
    let (where_sql, mut param_values) = build_where(query);
    let next = param_values.len() + 1;
    let sql = format!(
        "{SUMMARY_SELECT} {where_sql} ORDER BY b.created_at DESC, b.bug_id DESC LIMIT ?{} OFFSET ?{}",
        next,
        next + 1
    );
    param_values.push(Box::new(query.limit));
    param_values.push(Box::new(i64::try_from(query.offset).unwrap_or(i64::MAX)));

    let param_refs: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), scan_summary)?;

    let mut bugs = Vec::new();
    for row in rows {
        bugs.push(row?);
    }
    Ok(bugs)
}
