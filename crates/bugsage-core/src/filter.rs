//! Filter and pagination types for bug listings.

use serde::{Deserialize, Serialize};

use crate::bug::BugSummary;
use crate::enums::{Priority, Status};

/// Assignee filter as written by a caller: `me` or a user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssigneeFilter {
    /// Resolves to the calling user.
    Me,
    User(i64),
}

impl AssigneeFilter {
    /// Parses `"me"` (any case) or a numeric id.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("me") {
            return Some(Self::Me);
        }
        s.parse().ok().map(Self::User)
    }

    /// The concrete user id once the caller is known.
    pub fn resolve(self, caller_id: i64) -> i64 {
        match self {
            Self::Me => caller_id,
            Self::User(id) => id,
        }
    }
}

/// Caller-facing listing filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<AssigneeFilter>,
    pub project_id: Option<i64>,
    /// 1-based; `None` means the first page.
    pub page: Option<u32>,
    /// `None` means the configured default.
    pub per_page: Option<u32>,
}

/// Fully resolved query handed to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugQuery {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee_id: Option<i64>,
    pub project_id: Option<i64>,
    pub limit: u32,
    pub offset: u64,
}

/// Page metadata returned with a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub total_bugs: u64,
}

impl Pagination {
    pub fn new(current_page: u32, per_page: u32, total_bugs: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total_bugs.div_ceil(u64::from(per_page))
        };
        Self {
            current_page,
            per_page,
            total_pages,
            total_bugs,
        }
    }
}

/// One page of bug summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BugPage {
    pub bugs: Vec<BugSummary>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignee_filter_parsing() {
        assert_eq!(AssigneeFilter::parse("me"), Some(AssigneeFilter::Me));
        assert_eq!(AssigneeFilter::parse("ME"), Some(AssigneeFilter::Me));
        assert_eq!(AssigneeFilter::parse("12"), Some(AssigneeFilter::User(12)));
        assert_eq!(AssigneeFilter::parse("bob"), None);
    }

    #[test]
    fn me_resolves_to_caller() {
        assert_eq!(AssigneeFilter::Me.resolve(5), 5);
        assert_eq!(AssigneeFilter::User(9).resolve(5), 9);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
    }
}
