//! Comment and attachment operations for [`SqliteStore`].

use chrono::Utc;
use rusqlite::{Connection, Row, params};

use bugsage_core::attachment::{Attachment, NewAttachment};
use bugsage_core::comment::Comment;

use crate::error::Result;
use crate::sqlite::bugs::{format_datetime, parse_datetime};
use crate::sqlite::store::SqliteStore;

fn scan_comment(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        comment_id: row.get("comment_id")?,
        bug_id: row.get("bug_id")?,
        user_id: row.get("user_id")?,
        user_name: row.get("user_name")?,
        comment: row.get("comment")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?),
    })
}

fn scan_attachment(row: &Row<'_>) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        attachment_id: row.get("attachment_id")?,
        bug_id: row.get("bug_id")?,
        filename: row.get("filename")?,
        file_path: row.get("file_path")?,
        file_size: row.get("file_size")?,
        uploaded_by: row.get("uploaded_by")?,
        uploaded_at: parse_datetime(&row.get::<_, String>("uploaded_at")?),
    })
}

// ---------------------------------------------------------------------------
// Connection-level helpers
// ---------------------------------------------------------------------------

/// Adds a comment on the given connection, returning the created comment.
pub(crate) fn add_comment_on_conn(
    conn: &Connection,
    bug_id: i64,
    user_id: i64,
    text: &str,
) -> Result<Comment> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO comments (bug_id, user_id, comment, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![bug_id, user_id, text, format_datetime(&now)],
    )?;
    let comment_id = conn.last_insert_rowid();

    let user_name: Option<String> = conn
        .query_row(
            "SELECT name FROM users WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .ok();

    Ok(Comment {
        comment_id,
        bug_id,
        user_id,
        user_name,
        comment: text.to_string(),
        created_at: now,
    })
}

/// Records attachment metadata on the given connection.
pub(crate) fn add_attachment_on_conn(conn: &Connection, new: &NewAttachment) -> Result<Attachment> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO attachments (bug_id, filename, file_path, file_size, uploaded_by, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.bug_id,
            new.filename,
            new.file_path,
            new.file_size,
            new.uploaded_by,
            format_datetime(&now),
        ],
    )?;
    Ok(Attachment {
        attachment_id: conn.last_insert_rowid(),
        bug_id: new.bug_id,
        filename: new.filename.clone(),
        file_path: new.file_path.clone(),
        file_size: new.file_size,
        uploaded_by: new.uploaded_by,
        uploaded_at: now,
    })
}

// ---------------------------------------------------------------------------
// SqliteStore comment/attachment methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Adds a comment to a bug.
    pub fn add_comment_impl(&self, bug_id: i64, user_id: i64, text: &str) -> Result<Comment> {
        let conn = self.lock_conn()?;
        add_comment_on_conn(&conn, bug_id, user_id, text)
    }

    /// Gets all comments for a bug, ordered by creation time.
    pub fn get_comments_impl(&self, bug_id: i64) -> Result<Vec<Comment>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.comment_id, c.bug_id, c.user_id, u.name AS user_name,
                    c.comment, c.created_at
             FROM comments c
             LEFT JOIN users u ON u.user_id = c.user_id
             WHERE c.bug_id = ?1
             ORDER BY c.created_at ASC, c.comment_id ASC",
        )?;
        let rows = stmt.query_map(params![bug_id], scan_comment)?;
        let mut comments = Vec::new();
        for row in rows {
            comments.push(row?);
        }
        Ok(comments)
    }

    /// Records an attachment.
    pub fn add_attachment_impl(&self, new: &NewAttachment) -> Result<Attachment> {
        let conn = self.lock_conn()?;
        add_attachment_on_conn(&conn, new)
    }

    /// Gets all attachments for a bug, oldest first.
    pub fn get_attachments_impl(&self, bug_id: i64) -> Result<Vec<Attachment>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT attachment_id, bug_id, filename, file_path, file_size, uploaded_by, uploaded_at
             FROM attachments
             WHERE bug_id = ?1
             ORDER BY uploaded_at ASC, attachment_id ASC",
        )?;
        let rows = stmt.query_map(params![bug_id], scan_attachment)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
