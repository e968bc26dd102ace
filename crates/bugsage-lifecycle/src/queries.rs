//! Read-side operations: listing, detail, search, history and dashboards.

use chrono::{Duration, NaiveDate, Utc};
use tracing::warn;

use bugsage_core::bug::{BugDetail, BugSummary};
use bugsage_core::dashboard::{
    ChartData, DashboardStats, zero_fill_days, zero_fill_priorities, zero_fill_resolution,
    zero_fill_statuses,
};
use bugsage_core::filter::{BugFilter, BugPage, BugQuery, Pagination};
use bugsage_core::history::BugHistoryEntry;
use bugsage_core::user::CallerContext;
use bugsage_core::validation::ValidationError;
use bugsage_storage::BugStore;
use bugsage_storage::error::Result as StoreResult;

use crate::engine::LifecycleEngine;
use crate::error::Result;

impl<S: BugStore> LifecycleEngine<S> {
    /// One page of bugs, newest first.
    pub fn list_bugs(&self, caller: &CallerContext, filter: &BugFilter) -> Result<BugPage> {
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter
            .per_page
            .unwrap_or(self.settings.per_page)
            .clamp(1, self.settings.max_per_page.max(1));

        let query = BugQuery {
            status: filter.status,
            priority: filter.priority,
            assignee_id: filter.assignee.map(|a| a.resolve(caller.user_id)),
            project_id: filter.project_id,
            limit: per_page,
            offset: u64::from(page - 1) * u64::from(per_page),
        };

        let total = self.store.count_bugs(&query)?;
        let bugs = self.store.list_bugs(&query)?;
        Ok(BugPage {
            bugs,
            pagination: Pagination::new(page, per_page, total),
        })
    }

    /// A bug with its comments, attachments and history.
    pub fn bug_detail(&self, bug_id: i64) -> Result<BugDetail> {
        let summary = self.store.get_bug_summary(bug_id)?;
        Ok(BugDetail {
            summary,
            comments: self.store.get_comments(bug_id)?,
            attachments: self.store.get_attachments(bug_id)?,
            history: self.store.get_history(bug_id)?,
        })
    }

    /// Title/description substring search.
    pub fn search_bugs(&self, query: &str) -> Result<Vec<BugSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::SearchQueryRequired.into());
        }
        Ok(self.store.search_bugs(query, self.settings.search_limit)?)
    }

    pub fn bug_history(&self, bug_id: i64) -> Result<Vec<BugHistoryEntry>> {
        self.store.get_bug(bug_id)?;
        Ok(self.store.get_history(bug_id)?)
    }

    // -- Dashboard ------------------------------------------------------------
    //
    // These never fail: a store error is logged and the zero-filled shape is
    // returned instead.

    pub fn dashboard_stats(&self, caller: &CallerContext) -> DashboardStats {
        self.gather_stats(caller).unwrap_or_else(|e| {
            warn!(error = %e, "dashboard stats unavailable, returning zeros");
            DashboardStats::zeroed()
        })
    }

    pub fn dashboard_recent(&self) -> Vec<BugSummary> {
        let query = BugQuery {
            limit: self.settings.recent_limit,
            ..Default::default()
        };
        self.store.list_bugs(&query).unwrap_or_else(|e| {
            warn!(error = %e, "recent bugs unavailable, returning none");
            Vec::new()
        })
    }

    pub fn dashboard_charts(&self) -> ChartData {
        let today = Utc::now().date_naive();
        self.gather_charts(today).unwrap_or_else(|e| {
            warn!(error = %e, "chart data unavailable, returning zeros");
            ChartData::zeroed(today)
        })
    }

    fn gather_stats(&self, caller: &CallerContext) -> StoreResult<DashboardStats> {
        let since = Utc::now() - Duration::days(i64::from(self.settings.recent_days));
        let mine = BugQuery {
            assignee_id: Some(caller.user_id),
            ..Default::default()
        };
        Ok(DashboardStats {
            total_bugs: self.store.count_bugs(&BugQuery::default())?,
            my_bugs: self.store.count_bugs(&mine)?,
            recent_bugs: self.store.count_created_since(since)?,
            status_counts: zero_fill_statuses(&self.store.status_counts()?),
            priority_counts: zero_fill_priorities(&self.store.priority_counts()?),
        })
    }

    fn gather_charts(&self, today: NaiveDate) -> StoreResult<ChartData> {
        let days = self.settings.chart_days.max(1);
        let first_day = today - Duration::days(i64::from(days) - 1);
        let daily = match first_day.and_hms_opt(0, 0, 0) {
            Some(midnight) => self.store.daily_created_since(midnight.and_utc())?,
            None => Vec::new(),
        };
        Ok(ChartData {
            bugs_over_time: zero_fill_days(today, days, &daily),
            resolution_times: zero_fill_resolution(&self.store.resolution_averages()?),
        })
    }
}
