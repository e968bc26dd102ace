//! Aggregate queries backing the dashboard.

use chrono::{DateTime, Utc};
use rusqlite::params;

use bugsage_core::enums::{Priority, Status};

use crate::error::Result;
use crate::sqlite::bugs::{format_datetime, parse_column};
use crate::sqlite::store::SqliteStore;

impl SqliteStore {
    /// Bugs whose `created_at` is at or after `since`.
    pub fn count_created_since_impl(&self, since: DateTime<Utc>) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bugs WHERE created_at >= ?1",
            params![format_datetime(&since)],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    /// Counts grouped by status. Statuses with no bugs are omitted.
    pub fn status_counts_impl(&self) -> Result<Vec<(Status, u64)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT status, COUNT(*) AS n FROM bugs GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((parse_column::<Status>(row, "status")?, row.get::<_, i64>("n")?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (status, n) = row?;
            out.push((status, n.max(0) as u64));
        }
        Ok(out)
    }

    /// Counts grouped by priority. Priorities with no bugs are omitted.
    pub fn priority_counts_impl(&self) -> Result<Vec<(Priority, u64)>> {
        let conn = self.lock_conn()?;
        let mut stmt =
            conn.prepare("SELECT priority, COUNT(*) AS n FROM bugs GROUP BY priority")?;
        let rows = stmt.query_map([], |row| {
            Ok((parse_column::<Priority>(row, "priority")?, row.get::<_, i64>("n")?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (priority, n) = row?;
            out.push((priority, n.max(0) as u64));
        }
        Ok(out)
    }

    /// Creation counts per UTC calendar day, ascending by day.
    pub fn daily_created_since_impl(&self, since: DateTime<Utc>) -> Result<Vec<(String, u64)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT date(created_at) AS day, COUNT(*) AS n
             FROM bugs
             WHERE created_at >= ?1
             GROUP BY day
             ORDER BY day ASC",
        )?;
        let rows = stmt.query_map(params![format_datetime(&since)], |row| {
            Ok((row.get::<_, String>("day")?, row.get::<_, i64>("n")?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (day, n) = row?;
            out.push((day, n.max(0) as u64));
        }
        Ok(out)
    }

    /// Mean calendar days between creation and last update for Resolved and
    /// Closed bugs, per priority.
    pub fn resolution_averages_impl(&self) -> Result<Vec<(Priority, f64)>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT priority,
                    AVG(julianday(date(updated_at)) - julianday(date(created_at))) AS avg_days
             FROM bugs
             WHERE status IN ('Resolved', 'Closed')
             GROUP BY priority",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                parse_column::<Priority>(row, "priority")?,
                row.get::<_, Option<f64>>("avg_days")?.unwrap_or(0.0),
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
